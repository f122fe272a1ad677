//! `protos` (peer) package messages.

use prost::Message;

#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeId {
    #[prost(string, tag = "1")]
    pub path: String,

    #[prost(string, tag = "2")]
    pub name: String,

    #[prost(string, tag = "3")]
    pub version: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeInput {
    /// Function name followed by its arguments
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub args: Vec<Vec<u8>>,

    #[prost(bool, tag = "3")]
    pub is_init: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeSpec {
    #[prost(int32, tag = "1")]
    pub r#type: i32,

    #[prost(message, optional, tag = "2")]
    pub chaincode_id: Option<ChaincodeId>,

    #[prost(message, optional, tag = "3")]
    pub input: Option<ChaincodeInput>,

    #[prost(int32, tag = "4")]
    pub timeout: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeInvocationSpec {
    #[prost(message, optional, tag = "1")]
    pub chaincode_spec: Option<ChaincodeSpec>,
}

/// Channel header extension naming the contract being invoked.
#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeHeaderExtension {
    #[prost(message, optional, tag = "2")]
    pub chaincode_id: Option<ChaincodeId>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeProposalPayload {
    /// Marshalled [`ChaincodeInvocationSpec`]
    #[prost(bytes = "vec", tag = "1")]
    pub input: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Proposal {
    /// Marshalled `common::Header`
    #[prost(bytes = "vec", tag = "1")]
    pub header: Vec<u8>,

    /// Marshalled [`ChaincodeProposalPayload`]
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,

    #[prost(bytes = "vec", tag = "3")]
    pub extension: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SignedProposal {
    #[prost(bytes = "vec", tag = "1")]
    pub proposal_bytes: Vec<u8>,

    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

/// Contract response: status code, message and payload.
#[derive(Clone, PartialEq, Message)]
pub struct Response {
    #[prost(int32, tag = "1")]
    pub status: i32,

    #[prost(string, tag = "2")]
    pub message: String,

    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProposalResponsePayload {
    #[prost(bytes = "vec", tag = "1")]
    pub proposal_hash: Vec<u8>,

    /// Marshalled [`ChaincodeAction`]
    #[prost(bytes = "vec", tag = "2")]
    pub extension: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeAction {
    #[prost(bytes = "vec", tag = "1")]
    pub results: Vec<u8>,

    #[prost(bytes = "vec", tag = "2")]
    pub events: Vec<u8>,

    #[prost(message, optional, tag = "3")]
    pub response: Option<Response>,

    #[prost(message, optional, tag = "4")]
    pub chaincode_id: Option<ChaincodeId>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Endorsement {
    #[prost(bytes = "vec", tag = "1")]
    pub endorser: Vec<u8>,

    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeEndorsedAction {
    /// Marshalled [`ProposalResponsePayload`]
    #[prost(bytes = "vec", tag = "1")]
    pub proposal_response_payload: Vec<u8>,

    #[prost(message, repeated, tag = "2")]
    pub endorsements: Vec<Endorsement>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeActionPayload {
    #[prost(bytes = "vec", tag = "1")]
    pub chaincode_proposal_payload: Vec<u8>,

    #[prost(message, optional, tag = "2")]
    pub action: Option<ChaincodeEndorsedAction>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransactionAction {
    #[prost(bytes = "vec", tag = "1")]
    pub header: Vec<u8>,

    /// Marshalled [`ChaincodeActionPayload`]
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Transaction {
    #[prost(message, repeated, tag = "1")]
    pub actions: Vec<TransactionAction>,
}

/// Validation outcome recorded by committing peers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum TxValidationCode {
    Valid = 0,
    NilEnvelope = 1,
    BadPayload = 2,
    BadCommonHeader = 3,
    BadCreatorSignature = 4,
    InvalidEndorserTransaction = 5,
    InvalidConfigTransaction = 6,
    UnsupportedTxPayload = 7,
    BadProposalTxid = 8,
    DuplicateTxid = 9,
    EndorsementPolicyFailure = 10,
    MvccReadConflict = 11,
    PhantomReadConflict = 12,
    UnknownTxType = 13,
    TargetChainNotFound = 14,
    MarshalTxError = 15,
    NilTxaction = 16,
    ExpiredChaincode = 17,
    ChaincodeVersionConflict = 18,
    BadHeaderExtension = 19,
    BadChannelHeader = 20,
    BadResponsePayload = 21,
    BadRwset = 22,
    IllegalWriteset = 23,
    InvalidWriteset = 24,
    InvalidChaincode = 25,
    NotValidated = 254,
    InvalidOtherReason = 255,
}

impl TxValidationCode {
    /// Name used by the ledger for this code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::NilEnvelope => "NIL_ENVELOPE",
            Self::BadPayload => "BAD_PAYLOAD",
            Self::BadCommonHeader => "BAD_COMMON_HEADER",
            Self::BadCreatorSignature => "BAD_CREATOR_SIGNATURE",
            Self::InvalidEndorserTransaction => "INVALID_ENDORSER_TRANSACTION",
            Self::InvalidConfigTransaction => "INVALID_CONFIG_TRANSACTION",
            Self::UnsupportedTxPayload => "UNSUPPORTED_TX_PAYLOAD",
            Self::BadProposalTxid => "BAD_PROPOSAL_TXID",
            Self::DuplicateTxid => "DUPLICATE_TXID",
            Self::EndorsementPolicyFailure => "ENDORSEMENT_POLICY_FAILURE",
            Self::MvccReadConflict => "MVCC_READ_CONFLICT",
            Self::PhantomReadConflict => "PHANTOM_READ_CONFLICT",
            Self::UnknownTxType => "UNKNOWN_TX_TYPE",
            Self::TargetChainNotFound => "TARGET_CHAIN_NOT_FOUND",
            Self::MarshalTxError => "MARSHAL_TX_ERROR",
            Self::NilTxaction => "NIL_TXACTION",
            Self::ExpiredChaincode => "EXPIRED_CHAINCODE",
            Self::ChaincodeVersionConflict => "CHAINCODE_VERSION_CONFLICT",
            Self::BadHeaderExtension => "BAD_HEADER_EXTENSION",
            Self::BadChannelHeader => "BAD_CHANNEL_HEADER",
            Self::BadResponsePayload => "BAD_RESPONSE_PAYLOAD",
            Self::BadRwset => "BAD_RWSET",
            Self::IllegalWriteset => "ILLEGAL_WRITESET",
            Self::InvalidWriteset => "INVALID_WRITESET",
            Self::InvalidChaincode => "INVALID_CHAINCODE",
            Self::NotValidated => "NOT_VALIDATED",
            Self::InvalidOtherReason => "INVALID_OTHER_REASON",
        }
    }

    /// Name for a raw code, falling back to the number for codes this client does not know
    #[must_use]
    pub fn name_of(code: i32) -> String {
        Self::try_from(code).map_or_else(|_| code.to_string(), |c| c.as_str().to_string())
    }
}
