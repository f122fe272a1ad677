//! Client for the Hyperledger Fabric peer gateway.
//!
//! This crate provides the [`Gateway`] session used to submit and evaluate
//! transactions, plus the pieces needed to open one:
//!
//! - **Wallets**: [`FileSystemWallet`] and [`InMemoryWallet`] behind [`IdentityStore`]
//! - **Connection profiles**: [`ConnectionProfile`] resolves the gateway peer
//! - **Options**: [`SessionOptions`], e.g. dialing peers on localhost
//!
//! # Example
//!
//! ```rust,ignore
//! use shard_gateway::{ConnectionProfile, FileSystemWallet, Gateway, SessionOptions};
//!
//! let wallet = FileSystemWallet::open("wallet")?;
//! let gateway = Gateway::builder()
//!     .profile(ConnectionProfile::from_file("connection-org1.yaml")?)
//!     .identity(&wallet, "appUser")
//!     .options(SessionOptions::new().discovery_as_localhost(true))
//!     .connect()
//!     .await?;
//!
//! let network = gateway.network("channel1");
//! let result = network
//!     .contract("sharding1")
//!     .submit_transaction("InitLedger", &["acct", "10"])
//!     .await?;
//! gateway.close();
//! ```

mod client;
mod config;
mod identity;
mod profile;
pub mod proto;
mod signer;
mod transaction;
mod transport;
mod wallet;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{Contract, Gateway, GatewayBuilder, Network, SubmittedTransaction};
pub use config::SessionOptions;
pub use identity::SigningIdentity;
pub use profile::{ConnectionProfile, PeerEndpoint, TlsSettings};
pub use shard_core::{LedgerError, Result};
pub use signer::Signer;
pub use transport::{GatewayTransport, GrpcTransport};
pub use wallet::{FileSystemWallet, IdentityStore, InMemoryWallet};
