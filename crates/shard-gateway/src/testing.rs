//! Test helpers: throwaway identities and an in-process gateway transport.

use async_trait::async_trait;
use prost::Message;
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use shard_core::{LedgerError, Result, X509Identity};
use std::sync::{Mutex, PoisonError};

use crate::proto::common::{Envelope, Payload};
use crate::proto::gateway::{
    CommitStatusResponse, EndorseRequest, EndorseResponse, EvaluateRequest, EvaluateResponse,
    SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};
use crate::proto::peer::{
    ChaincodeAction, ChaincodeActionPayload, ChaincodeEndorsedAction, ProposalResponsePayload,
    Response, Transaction, TransactionAction, TxValidationCode,
};
use crate::transport::GatewayTransport;

/// Certificate placeholder; peers are never contacted with it
pub const TEST_CERT: &str = "-----BEGIN CERTIFICATE-----\nMIIBfake\n-----END CERTIFICATE-----\n";

/// A freshly generated P-256 key as a PKCS#8 PEM document
pub fn test_key_pem() -> String {
    let rng = SystemRandom::new();
    let doc = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng)
        .expect("key generation failed");
    pem::encode(&pem::Pem::new("PRIVATE KEY", doc.as_ref().to_vec()))
}

/// An identity with a usable signing key
pub fn test_identity(msp_id: &str) -> X509Identity {
    X509Identity::new(msp_id, TEST_CERT, test_key_pem())
}

/// An unsigned prepared transaction whose contract response carries `result`
pub fn prepared_transaction(result: &[u8]) -> Envelope {
    let chaincode_action = ChaincodeAction {
        response: Some(Response {
            status: 200,
            message: String::new(),
            payload: result.to_vec(),
        }),
        ..ChaincodeAction::default()
    };

    let response_payload = ProposalResponsePayload {
        proposal_hash: Vec::new(),
        extension: chaincode_action.encode_to_vec(),
    };

    let action_payload = ChaincodeActionPayload {
        chaincode_proposal_payload: Vec::new(),
        action: Some(ChaincodeEndorsedAction {
            proposal_response_payload: response_payload.encode_to_vec(),
            endorsements: Vec::new(),
        }),
    };

    let transaction = Transaction {
        actions: vec![TransactionAction {
            header: Vec::new(),
            payload: action_payload.encode_to_vec(),
        }],
    };

    Envelope {
        payload: Payload {
            header: None,
            data: transaction.encode_to_vec(),
        }
        .encode_to_vec(),
        signature: Vec::new(),
    }
}

/// A call received by [`RecordingTransport`]
#[derive(Debug, Clone)]
pub enum RecordedCall {
    Endorse(EndorseRequest),
    Submit(SubmitRequest),
    CommitStatus(SignedCommitStatusRequest),
    Evaluate(EvaluateRequest),
}

/// Transport that answers from memory and records every request
#[derive(Debug)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    result: Vec<u8>,
    commit_code: TxValidationCode,
    endorse_failure: Option<String>,
}

impl RecordingTransport {
    /// Endorse and evaluate return `result`; commits are valid
    pub fn returning(result: impl Into<Vec<u8>>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            result: result.into(),
            commit_code: TxValidationCode::Valid,
            endorse_failure: None,
        }
    }

    /// Report this validation code from commit status
    #[must_use]
    pub fn with_commit_code(mut self, code: TxValidationCode) -> Self {
        self.commit_code = code;
        self
    }

    /// Reject endorsement with this message
    #[must_use]
    pub fn failing_endorse(mut self, message: impl Into<String>) -> Self {
        self.endorse_failure = Some(message.into());
        self
    }

    /// Requests received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

#[async_trait]
impl GatewayTransport for RecordingTransport {
    async fn endorse(&self, request: EndorseRequest) -> Result<EndorseResponse> {
        self.record(RecordedCall::Endorse(request));
        if let Some(message) = &self.endorse_failure {
            return Err(LedgerError::Endorse {
                code: "Aborted".to_string(),
                message: message.clone(),
            });
        }

        Ok(EndorseResponse {
            prepared_transaction: Some(prepared_transaction(&self.result)),
        })
    }

    async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse> {
        self.record(RecordedCall::Submit(request));
        Ok(SubmitResponse {})
    }

    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
    ) -> Result<CommitStatusResponse> {
        self.record(RecordedCall::CommitStatus(request));
        Ok(CommitStatusResponse {
            result: self.commit_code as i32,
            block_number: 7,
        })
    }

    async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse> {
        self.record(RecordedCall::Evaluate(request));
        Ok(EvaluateResponse {
            result: Some(Response {
                status: 200,
                message: String::new(),
                payload: self.result.clone(),
            }),
        })
    }
}
