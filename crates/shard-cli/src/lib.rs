//! # shard-cli
//!
//! Command-line bootstrapper for a sharded account ledger.
//!
//! `init-shard <channel> <prefix> <count>` picks the contract that serves the
//! channel, makes sure the wallet holds the application identity, connects to
//! the peer gateway and submits `InitLedger(prefix, count)`.
//!
//! ## Features
//!
//! - **Channel routing**: `channel1` and `channel2` map to their shard
//!   contracts, anything else falls back to the default contract
//! - **Wallet provisioning**: imports the network's user credentials once
//! - **Layered settings**: flags, environment, then a TOML settings file

pub mod cli;
pub mod config;
pub mod init;
pub mod provision;

pub use cli::run;
