//! Proposal construction and transaction result extraction.

use chrono::Utc;
use prost::Message;
use ring::digest::{digest, SHA256};
use ring::rand::{SecureRandom, SystemRandom};
use shard_core::{LedgerError, Result};

use crate::identity::SigningIdentity;
use crate::proto::common::{
    ChannelHeader, Envelope, Header, Payload, SignatureHeader, HEADER_TYPE_ENDORSER_TRANSACTION,
};
use crate::proto::peer::{
    ChaincodeAction, ChaincodeActionPayload, ChaincodeHeaderExtension, ChaincodeId,
    ChaincodeInput, ChaincodeInvocationSpec, ChaincodeProposalPayload, ChaincodeSpec, Proposal,
    ProposalResponsePayload, SignedProposal, Transaction,
};

/// Length of the random nonce in each signature header
const NONCE_LEN: usize = 24;

/// A signed proposal and the transaction id derived from it
#[derive(Clone)]
pub struct ProposedTransaction {
    /// Transaction id: hex SHA-256 of nonce and creator
    pub transaction_id: String,

    /// Channel the proposal targets
    pub channel: String,

    /// Signed proposal ready for endorsement or evaluation
    pub signed_proposal: SignedProposal,
}

impl std::fmt::Debug for ProposedTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProposedTransaction")
            .field("transaction_id", &self.transaction_id)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// Build and sign a proposal invoking `function(args…)` on `contract`
pub fn propose(
    identity: &SigningIdentity,
    channel: &str,
    contract: &str,
    function: &str,
    args: &[&str],
) -> Result<ProposedTransaction> {
    let nonce = new_nonce()?;
    let transaction_id = transaction_id(&nonce, identity.creator());
    let chaincode_id = ChaincodeId {
        name: contract.to_string(),
        ..ChaincodeId::default()
    };

    let now = Utc::now();
    let channel_header = ChannelHeader {
        r#type: HEADER_TYPE_ENDORSER_TRANSACTION,
        timestamp: Some(prost_types::Timestamp {
            seconds: now.timestamp(),
            nanos: i32::try_from(now.timestamp_subsec_nanos()).unwrap_or_default(),
        }),
        channel_id: channel.to_string(),
        tx_id: transaction_id.clone(),
        extension: ChaincodeHeaderExtension {
            chaincode_id: Some(chaincode_id.clone()),
        }
        .encode_to_vec(),
        ..ChannelHeader::default()
    };

    let signature_header = SignatureHeader {
        creator: identity.creator().to_vec(),
        nonce,
    };

    let header = Header {
        channel_header: channel_header.encode_to_vec(),
        signature_header: signature_header.encode_to_vec(),
    };

    let input = ChaincodeInput {
        args: std::iter::once(function)
            .chain(args.iter().copied())
            .map(|arg| arg.as_bytes().to_vec())
            .collect(),
        is_init: false,
    };

    let invocation = ChaincodeInvocationSpec {
        chaincode_spec: Some(ChaincodeSpec {
            chaincode_id: Some(chaincode_id),
            input: Some(input),
            ..ChaincodeSpec::default()
        }),
    };

    let proposal = Proposal {
        header: header.encode_to_vec(),
        payload: ChaincodeProposalPayload {
            input: invocation.encode_to_vec(),
        }
        .encode_to_vec(),
        extension: Vec::new(),
    };

    let proposal_bytes = proposal.encode_to_vec();
    let signature = identity.sign(&proposal_bytes)?;

    Ok(ProposedTransaction {
        transaction_id,
        channel: channel.to_string(),
        signed_proposal: SignedProposal {
            proposal_bytes,
            signature,
        },
    })
}

/// Sign the payload of a prepared transaction in place
pub fn sign_envelope(identity: &SigningIdentity, envelope: &mut Envelope) -> Result<()> {
    envelope.signature = identity.sign(&envelope.payload)?;
    Ok(())
}

/// Pull the contract's response payload out of a prepared transaction
pub fn transaction_result(envelope: &Envelope) -> Result<Vec<u8>> {
    let payload = Payload::decode(envelope.payload.as_slice()).map_err(decode_error("payload"))?;
    let transaction =
        Transaction::decode(payload.data.as_slice()).map_err(decode_error("transaction"))?;

    let action = transaction
        .actions
        .first()
        .ok_or_else(|| LedgerError::Decode("transaction has no actions".to_string()))?;

    let action_payload = ChaincodeActionPayload::decode(action.payload.as_slice())
        .map_err(decode_error("chaincode action payload"))?;

    let endorsed = action_payload
        .action
        .ok_or_else(|| LedgerError::Decode("chaincode action payload has no action".to_string()))?;

    let response_payload =
        ProposalResponsePayload::decode(endorsed.proposal_response_payload.as_slice())
            .map_err(decode_error("proposal response payload"))?;

    let chaincode_action = ChaincodeAction::decode(response_payload.extension.as_slice())
        .map_err(decode_error("chaincode action"))?;

    Ok(chaincode_action
        .response
        .map(|response| response.payload)
        .unwrap_or_default())
}

fn decode_error(what: &'static str) -> impl Fn(prost::DecodeError) -> LedgerError {
    move |e| LedgerError::Decode(format!("{what}: {e}"))
}

fn new_nonce() -> Result<Vec<u8>> {
    let mut nonce = vec![0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce)
        .map_err(|_| LedgerError::Credential("failed to generate nonce".to_string()))?;
    Ok(nonce)
}

fn transaction_id(nonce: &[u8], creator: &[u8]) -> String {
    let mut input = Vec::with_capacity(nonce.len() + creator.len());
    input.extend_from_slice(nonce);
    input.extend_from_slice(creator);
    hex::encode(digest(&SHA256, &input).as_ref())
}
