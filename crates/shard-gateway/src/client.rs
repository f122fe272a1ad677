//! Gateway session and the channel/contract handles derived from it.

use prost::Message;
use shard_core::{LedgerError, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SessionOptions;
use crate::identity::SigningIdentity;
use crate::profile::ConnectionProfile;
use crate::proto::gateway::{
    CommitStatusRequest, EndorseRequest, EvaluateRequest, SignedCommitStatusRequest, SubmitRequest,
};
use crate::proto::peer::TxValidationCode;
use crate::transaction::{propose, sign_envelope, transaction_result};
use crate::transport::{GatewayTransport, GrpcTransport};
use crate::wallet::IdentityStore;

/// An open session with a peer gateway, acting as one identity
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    transport: Arc<dyn GatewayTransport>,
    identity: SigningIdentity,
}

impl Gateway {
    /// Create a builder for a new session
    #[must_use]
    pub fn builder<'a>() -> GatewayBuilder<'a> {
        GatewayBuilder::new()
    }

    /// Access a channel of the network
    #[must_use]
    pub fn network(&self, channel: impl Into<String>) -> Network<'_> {
        Network {
            gateway: self,
            channel: channel.into(),
        }
    }

    /// Identity this session signs with
    #[must_use]
    pub fn identity(&self) -> &SigningIdentity {
        &self.inner.identity
    }

    /// Release the session.
    ///
    /// Connections are dropped once every clone of this gateway is gone.
    pub fn close(self) {
        debug!(msp_id = %self.inner.identity.msp_id(), "closing gateway session");
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("identity", &self.inner.identity)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Gateway`] session
pub struct GatewayBuilder<'a> {
    profile: Option<ConnectionProfile>,
    wallet: Option<(&'a dyn IdentityStore, String)>,
    options: SessionOptions,
    transport: Option<Arc<dyn GatewayTransport>>,
}

impl Default for GatewayBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> GatewayBuilder<'a> {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            profile: None,
            wallet: None,
            options: SessionOptions::default(),
            transport: None,
        }
    }

    /// Network topology used to locate the gateway peer
    #[must_use]
    pub fn profile(mut self, profile: ConnectionProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Identity to act as: the entry stored under `label` in `wallet`
    #[must_use]
    pub fn identity(mut self, wallet: &'a dyn IdentityStore, label: impl Into<String>) -> Self {
        self.wallet = Some((wallet, label.into()));
        self
    }

    /// Session options
    #[must_use]
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Use an existing transport instead of dialing the profile's peer
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn GatewayTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Load the identity and connect
    pub async fn connect(self) -> Result<Gateway> {
        let (wallet, label) = self
            .wallet
            .ok_or_else(|| LedgerError::Config("no identity configured for the gateway".to_string()))?;

        let stored = wallet.get(&label)?;
        let identity = SigningIdentity::new(&stored)?;
        debug!(label = %label, msp_id = %identity.msp_id(), "loaded gateway identity");

        let transport: Arc<dyn GatewayTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                let profile = self.profile.ok_or_else(|| {
                    LedgerError::Config("no connection profile configured for the gateway".to_string())
                })?;
                let endpoint = profile.gateway_endpoint(&self.options)?;
                let timeout = self.options.request_timeout.or_else(|| profile.endorser_timeout());
                Arc::new(GrpcTransport::connect(&endpoint, &self.options, timeout).await?)
            }
        };

        Ok(Gateway {
            inner: Arc::new(GatewayInner {
                transport,
                identity,
            }),
        })
    }
}

/// A channel of the network
#[derive(Debug)]
pub struct Network<'a> {
    gateway: &'a Gateway,
    channel: String,
}

impl Network<'_> {
    /// Channel name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.channel
    }

    /// Access a contract deployed on this channel
    #[must_use]
    pub fn contract(&self, name: impl Into<String>) -> Contract<'_> {
        Contract {
            gateway: self.gateway,
            channel: &self.channel,
            name: name.into(),
        }
    }
}

/// Outcome of a committed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    /// Transaction id
    pub transaction_id: String,

    /// Block the transaction was committed in
    pub block_number: u64,

    /// Payload returned by the contract
    pub result: Vec<u8>,
}

/// A contract on a channel
#[derive(Debug)]
pub struct Contract<'a> {
    gateway: &'a Gateway,
    channel: &'a str,
    name: String,
}

impl Contract<'_> {
    /// Contract name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Submit a transaction and return the contract's response payload
    pub async fn submit_transaction(&self, function: &str, args: &[&str]) -> Result<Vec<u8>> {
        Ok(self.submit(function, args).await?.result)
    }

    /// Endorse, order and wait for commit of a transaction.
    ///
    /// Fails unless the ledger marks the transaction `VALID`.
    pub async fn submit(&self, function: &str, args: &[&str]) -> Result<SubmittedTransaction> {
        let gateway = &self.gateway.inner;
        let proposed = propose(&gateway.identity, self.channel, &self.name, function, args)?;
        let transaction_id = proposed.transaction_id.clone();

        debug!(
            transaction_id = %transaction_id,
            channel = %self.channel,
            contract = %self.name,
            function,
            "endorsing transaction"
        );

        let endorsed = gateway
            .transport
            .endorse(EndorseRequest {
                transaction_id: transaction_id.clone(),
                channel_id: self.channel.to_string(),
                proposed_transaction: Some(proposed.signed_proposal),
                endorsing_organizations: Vec::new(),
            })
            .await?;

        let mut envelope = endorsed.prepared_transaction.ok_or_else(|| {
            LedgerError::Decode("endorse response has no prepared transaction".to_string())
        })?;
        let result = transaction_result(&envelope)?;
        sign_envelope(&gateway.identity, &mut envelope)?;

        debug!(transaction_id = %transaction_id, "submitting transaction");
        gateway
            .transport
            .submit(SubmitRequest {
                transaction_id: transaction_id.clone(),
                channel_id: self.channel.to_string(),
                prepared_transaction: Some(envelope),
            })
            .await?;

        let request = CommitStatusRequest {
            transaction_id: transaction_id.clone(),
            channel_id: self.channel.to_string(),
            identity: gateway.identity.creator().to_vec(),
        }
        .encode_to_vec();
        let signature = gateway.identity.sign(&request)?;

        let status = gateway
            .transport
            .commit_status(SignedCommitStatusRequest { request, signature })
            .await?;

        if status.result != TxValidationCode::Valid as i32 {
            return Err(LedgerError::TransactionInvalid {
                transaction_id,
                code: TxValidationCode::name_of(status.result),
            });
        }

        info!(
            transaction_id = %transaction_id,
            block = status.block_number,
            "transaction committed"
        );

        Ok(SubmittedTransaction {
            transaction_id,
            block_number: status.block_number,
            result,
        })
    }

    /// Evaluate a transaction on one peer without updating the ledger
    pub async fn evaluate_transaction(&self, function: &str, args: &[&str]) -> Result<Vec<u8>> {
        let gateway = &self.gateway.inner;
        let proposed = propose(&gateway.identity, self.channel, &self.name, function, args)?;

        debug!(
            transaction_id = %proposed.transaction_id,
            contract = %self.name,
            function,
            "evaluating transaction"
        );

        let response = gateway
            .transport
            .evaluate(EvaluateRequest {
                transaction_id: proposed.transaction_id,
                channel_id: self.channel.to_string(),
                proposed_transaction: Some(proposed.signed_proposal),
                target_organizations: Vec::new(),
            })
            .await?;

        let result = response
            .result
            .ok_or_else(|| LedgerError::Decode("evaluate response has no result".to_string()))?;

        if result.status >= 400 {
            return Err(LedgerError::Evaluate {
                code: result.status.to_string(),
                message: result.message,
            });
        }

        Ok(result.payload)
    }
}
