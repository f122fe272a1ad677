//! Signing identity used for proposals, transactions and status requests.

use prost::Message;
use shard_core::{LedgerError, Result, X509Identity};

use crate::proto::common::SerializedIdentity;
use crate::signer::Signer;

/// An [`X509Identity`] ready to sign on the wire.
#[derive(Debug)]
pub struct SigningIdentity {
    msp_id: String,
    creator: Vec<u8>,
    signer: Signer,
}

impl SigningIdentity {
    /// Build a signing identity from a stored X.509 identity
    pub fn new(identity: &X509Identity) -> Result<Self> {
        if !identity.certificate().contains("-----BEGIN CERTIFICATE-----") {
            return Err(LedgerError::Credential(format!(
                "certificate for {} is not PEM encoded",
                identity.msp_id()
            )));
        }

        let signer = Signer::from_pkcs8_pem(identity.private_key())?;
        let creator = SerializedIdentity {
            mspid: identity.msp_id().to_string(),
            id_bytes: identity.certificate().as_bytes().to_vec(),
        }
        .encode_to_vec();

        Ok(Self {
            msp_id: identity.msp_id().to_string(),
            creator,
            signer,
        })
    }

    /// Membership service provider of this identity
    #[must_use]
    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// Marshalled `SerializedIdentity`
    #[must_use]
    pub fn creator(&self) -> &[u8] {
        &self.creator
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.signer.sign(message)
    }
}
