//! `common` and `msp` package messages.

use prost::Message;

/// Header type for transactions that invoke a contract
pub const HEADER_TYPE_ENDORSER_TRANSACTION: i32 = 3;

/// A signed payload, the unit the ordering service accepts.
#[derive(Clone, PartialEq, Message)]
pub struct Envelope {
    /// Marshalled [`Payload`]
    #[prost(bytes = "vec", tag = "1")]
    pub payload: Vec<u8>,

    /// Signature by the creator named in the payload header
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Payload {
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,

    /// Marshalled transaction body, a `peer::Transaction` for endorser transactions
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Header {
    /// Marshalled [`ChannelHeader`]
    #[prost(bytes = "vec", tag = "1")]
    pub channel_header: Vec<u8>,

    /// Marshalled [`SignatureHeader`]
    #[prost(bytes = "vec", tag = "2")]
    pub signature_header: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChannelHeader {
    #[prost(int32, tag = "1")]
    pub r#type: i32,

    #[prost(int32, tag = "2")]
    pub version: i32,

    #[prost(message, optional, tag = "3")]
    pub timestamp: Option<prost_types::Timestamp>,

    #[prost(string, tag = "4")]
    pub channel_id: String,

    #[prost(string, tag = "5")]
    pub tx_id: String,

    #[prost(uint64, tag = "6")]
    pub epoch: u64,

    /// Marshalled `peer::ChaincodeHeaderExtension`
    #[prost(bytes = "vec", tag = "7")]
    pub extension: Vec<u8>,

    #[prost(bytes = "vec", tag = "8")]
    pub tls_cert_hash: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SignatureHeader {
    /// Marshalled [`SerializedIdentity`] of the signer
    #[prost(bytes = "vec", tag = "1")]
    pub creator: Vec<u8>,

    #[prost(bytes = "vec", tag = "2")]
    pub nonce: Vec<u8>,
}

/// Identity as it appears on the wire: MSP id plus the PEM certificate.
#[derive(Clone, PartialEq, Message)]
pub struct SerializedIdentity {
    #[prost(string, tag = "1")]
    pub mspid: String,

    #[prost(bytes = "vec", tag = "2")]
    pub id_bytes: Vec<u8>,
}
