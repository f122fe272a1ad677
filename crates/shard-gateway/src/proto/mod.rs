//! Protobuf messages exchanged with the peer gateway.
//!
//! Only the messages and fields this client reads or writes are declared; prost
//! skips unknown fields on decode, so the subsets stay wire compatible.

pub mod common;
pub mod gateway;
pub mod peer;
