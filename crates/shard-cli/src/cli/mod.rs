//! CLI argument parsing and the initialization pipeline.

pub mod args;

use anyhow::{Context, Result};
use args::{Cli, InitArgs, USAGE};
use clap::Parser;
use shard_core::ContractTarget;
use shard_gateway::{ConnectionProfile, FileSystemWallet, Gateway};
use std::io::IsTerminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::init;
use crate::provision;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Missing positionals print usage and succeed without touching anything
    let Some(init_args) = cli.init_args() else {
        println!("{USAGE}");
        return Ok(());
    };

    init_tracing(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply(&cli);

    execute(&settings, &init_args, cli.query_all).await
}

/// Log to stderr; `RUST_LOG` overrides the level picked by `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

/// Provision the wallet, connect, initialize and print the contract output.
pub async fn execute(settings: &Settings, init_args: &InitArgs, query_all: bool) -> Result<()> {
    let target = ContractTarget::resolve(&init_args.channel);
    if target.is_fallback() {
        warn!("{}", ContractTarget::fallback_warning());
    }
    info!(%target, "initializing ledger");

    let wallet = FileSystemWallet::open(&settings.wallet_dir).context("failed to create wallet")?;
    provision::ensure_identity(
        &wallet,
        &settings.identity,
        &settings.msp_id,
        &settings.credentials(),
    )
    .context("failed to populate wallet contents")?;

    let profile_path = settings.profile_path();
    let profile = ConnectionProfile::from_file(&profile_path).with_context(|| {
        format!(
            "failed to load connection profile {}",
            profile_path.display()
        )
    })?;

    let gateway = Gateway::builder()
        .profile(profile)
        .identity(&wallet, settings.identity.as_str())
        .options(settings.session_options())
        .connect()
        .await
        .context("failed to connect to gateway")?;

    let outcome = init::initialize(
        &gateway,
        &target,
        &init_args.prefix,
        &init_args.count,
        query_all,
    )
    .await;
    gateway.close();

    let outcome = outcome.context("failed to submit transaction")?;
    for line in outcome.lines() {
        println!("{line}");
    }

    Ok(())
}
