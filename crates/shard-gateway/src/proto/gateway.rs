//! `gateway` package messages for the peer's Gateway service.

use prost::Message;

use super::common::Envelope;
use super::peer::{Response, SignedProposal, TxValidationCode};

#[derive(Clone, PartialEq, Message)]
pub struct EndorseRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: String,

    #[prost(string, tag = "2")]
    pub channel_id: String,

    #[prost(message, optional, tag = "3")]
    pub proposed_transaction: Option<SignedProposal>,

    /// Restrict endorsement to these organizations; empty lets the gateway choose
    #[prost(string, repeated, tag = "4")]
    pub endorsing_organizations: Vec<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct EndorseResponse {
    /// Unsigned transaction assembled from the endorsements
    #[prost(message, optional, tag = "1")]
    pub prepared_transaction: Option<Envelope>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SubmitRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: String,

    #[prost(string, tag = "2")]
    pub channel_id: String,

    #[prost(message, optional, tag = "3")]
    pub prepared_transaction: Option<Envelope>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SubmitResponse {}

#[derive(Clone, PartialEq, Message)]
pub struct CommitStatusRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: String,

    #[prost(string, tag = "2")]
    pub channel_id: String,

    /// Marshalled `SerializedIdentity` of the requester
    #[prost(bytes = "vec", tag = "3")]
    pub identity: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SignedCommitStatusRequest {
    /// Marshalled [`CommitStatusRequest`]
    #[prost(bytes = "vec", tag = "1")]
    pub request: Vec<u8>,

    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CommitStatusResponse {
    #[prost(enumeration = "TxValidationCode", tag = "1")]
    pub result: i32,

    #[prost(uint64, tag = "2")]
    pub block_number: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct EvaluateRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: String,

    #[prost(string, tag = "2")]
    pub channel_id: String,

    #[prost(message, optional, tag = "3")]
    pub proposed_transaction: Option<SignedProposal>,

    #[prost(string, repeated, tag = "4")]
    pub target_organizations: Vec<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct EvaluateResponse {
    #[prost(message, optional, tag = "1")]
    pub result: Option<Response>,
}
