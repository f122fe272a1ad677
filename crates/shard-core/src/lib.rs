//! Core types and errors for the shard ledger initializer.
//!
//! This crate provides the foundational types shared by the gateway client and the CLI:
//!
//! - **Types**: [`X509Identity`] and the channel-to-contract resolver [`ContractTarget`]
//! - **Errors**: Typed failures with [`LedgerError`]
//!
//! # Example
//!
//! ```rust
//! use shard_core::ContractTarget;
//!
//! let target = ContractTarget::resolve("channel1");
//! assert_eq!(target.contract, "sharding1");
//! ```

mod error;
pub mod types;

pub use error::{LedgerError, Result};
pub use types::*;
