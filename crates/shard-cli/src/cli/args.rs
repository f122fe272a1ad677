//! Command-line argument definitions using clap.

use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;

/// Line printed when any positional argument is missing.
pub const USAGE: &str = "Usage: init-shard <channel> <prefix> <count>";

/// Initialize a sharded ledger with generated accounts
///
/// Submits InitLedger(prefix, count) to the contract serving the channel.
/// channel1 and channel2 have their own shard contracts; any other channel
/// uses the default contract.
#[derive(Parser, Debug)]
#[command(name = "init-shard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Channel, account prefix and account count; extra values are ignored
    ///
    /// Values are taken verbatim, so a prefix or count may start with `-`.
    /// Options must come before the first positional value.
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        num_args = 0..,
        value_name = "CHANNEL PREFIX COUNT"
    )]
    pub positionals: Vec<String>,

    /// Settings file (TOML)
    #[arg(short, long, env = "INIT_SHARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root of the test network checkout
    #[arg(long, env = "INIT_SHARD_NETWORK_DIR")]
    pub network_dir: Option<PathBuf>,

    /// Wallet directory
    #[arg(short, long, env = "INIT_SHARD_WALLET")]
    pub wallet: Option<PathBuf>,

    /// Wallet label of the application identity
    #[arg(long)]
    pub identity: Option<String>,

    /// Membership service provider of the imported identity
    #[arg(long)]
    pub msp_id: Option<String>,

    /// Dial peers on localhost instead of their advertised host names
    #[arg(long, env = "DISCOVERY_AS_LOCALHOST", value_parser = BoolishValueParser::new())]
    pub discovery_as_localhost: Option<bool>,

    /// Evaluate GetAllAccounts after initialization and print the result
    #[arg(long)]
    pub query_all: bool,

    /// Increase verbosity
    #[arg(short, long)]
    pub verbose: bool,
}

/// The three positional values, all present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitArgs {
    pub channel: String,
    pub prefix: String,
    pub count: String,
}

impl Cli {
    /// The first three positional values, or `None` when fewer were given
    #[must_use]
    pub fn init_args(&self) -> Option<InitArgs> {
        match self.positionals.as_slice() {
            [channel, prefix, count, ..] => Some(InitArgs {
                channel: channel.clone(),
                prefix: prefix.clone(),
                count: count.clone(),
            }),
            _ => None,
        }
    }
}
