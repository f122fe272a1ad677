//! Ledger initialization against a connected gateway.

use shard_core::{ContractTarget, Result};
use shard_gateway::{Gateway, SubmittedTransaction};
use tracing::{debug, info};

/// Contract function that creates the accounts.
pub const INIT_FUNCTION: &str = "InitLedger";

/// Contract function listing every account.
pub const QUERY_ALL_FUNCTION: &str = "GetAllAccounts";

/// Result of an initialization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    /// The committed `InitLedger` transaction
    pub submitted: SubmittedTransaction,

    /// `GetAllAccounts` output, when requested
    pub accounts: Option<Vec<u8>>,
}

impl InitOutcome {
    /// Lines to print, decoded as lossy UTF-8
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        std::iter::once(&self.submitted.result)
            .chain(self.accounts.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }
}

/// Submit `InitLedger(prefix, count)` to the target contract, then
/// optionally evaluate `GetAllAccounts`.
pub async fn initialize(
    gateway: &Gateway,
    target: &ContractTarget,
    prefix: &str,
    count: &str,
    query_all: bool,
) -> Result<InitOutcome> {
    let network = gateway.network(target.channel.as_str());
    let contract = network.contract(target.contract.as_str());

    info!(%target, prefix, count, "submitting {INIT_FUNCTION}");
    let submitted = contract.submit(INIT_FUNCTION, &[prefix, count]).await?;

    let accounts = if query_all {
        debug!(%target, "evaluating {QUERY_ALL_FUNCTION}");
        Some(contract.evaluate_transaction(QUERY_ALL_FUNCTION, &[]).await?)
    } else {
        None
    };

    Ok(InitOutcome {
        submitted,
        accounts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;
    use shard_core::LedgerError;
    use shard_gateway::proto::common::{ChannelHeader, Header};
    use shard_gateway::proto::gateway::EndorseRequest;
    use shard_gateway::proto::peer::{
        ChaincodeHeaderExtension, ChaincodeInvocationSpec, ChaincodeProposalPayload, Proposal,
        TxValidationCode,
    };
    use shard_gateway::testing::{test_identity, RecordedCall, RecordingTransport};
    use shard_gateway::{IdentityStore, InMemoryWallet};
    use std::sync::Arc;

    async fn connect(transport: Arc<RecordingTransport>) -> Gateway {
        let wallet = InMemoryWallet::new();
        wallet.put("appUser", &test_identity("Org1MSP")).unwrap();

        Gateway::builder()
            .identity(&wallet, "appUser")
            .transport(transport)
            .connect()
            .await
            .unwrap()
    }

    /// Channel, contract and arguments of an endorsement
    fn invocation(request: &EndorseRequest) -> (String, String, Vec<String>) {
        let signed = request.proposed_transaction.as_ref().unwrap();
        let proposal = Proposal::decode(signed.proposal_bytes.as_slice()).unwrap();

        let header = Header::decode(proposal.header.as_slice()).unwrap();
        let channel_header = ChannelHeader::decode(header.channel_header.as_slice()).unwrap();
        let extension =
            ChaincodeHeaderExtension::decode(channel_header.extension.as_slice()).unwrap();

        let payload = ChaincodeProposalPayload::decode(proposal.payload.as_slice()).unwrap();
        let spec = ChaincodeInvocationSpec::decode(payload.input.as_slice())
            .unwrap()
            .chaincode_spec
            .unwrap();
        let args = spec
            .input
            .unwrap()
            .args
            .into_iter()
            .map(|a| String::from_utf8(a).unwrap())
            .collect();

        (
            channel_header.channel_id,
            extension.chaincode_id.unwrap().name,
            args,
        )
    }

    fn endorsements(transport: &RecordingTransport) -> Vec<EndorseRequest> {
        transport
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Endorse(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_shard_channel_routes_to_shard_contract() {
        let transport = Arc::new(RecordingTransport::returning("created 10 accounts"));
        let gateway = connect(transport.clone()).await;
        let target = ContractTarget::resolve("channel1");

        let outcome = initialize(&gateway, &target, "acct", "10", false).await.unwrap();
        assert_eq!(outcome.lines(), vec!["created 10 accounts"]);
        assert_eq!(outcome.accounts, None);

        let endorsed = endorsements(&transport);
        assert_eq!(endorsed.len(), 1);
        let (channel, contract, args) = invocation(&endorsed[0]);
        assert_eq!(channel, "channel1");
        assert_eq!(contract, "sharding1");
        assert_eq!(args, vec!["InitLedger", "acct", "10"]);
    }

    #[tokio::test]
    async fn test_unknown_channel_keeps_name_with_default_contract() {
        let transport = Arc::new(RecordingTransport::returning("ok"));
        let gateway = connect(transport.clone()).await;
        let target = ContractTarget::resolve("unknownChannel");
        assert!(target.is_fallback());

        initialize(&gateway, &target, "x", "5", false).await.unwrap();

        let (channel, contract, args) = invocation(&endorsements(&transport)[0]);
        assert_eq!(channel, "unknownChannel");
        assert_eq!(contract, "sharding");
        assert_eq!(args, vec!["InitLedger", "x", "5"]);
    }

    #[tokio::test]
    async fn test_query_all_evaluates_after_submit() {
        let transport = Arc::new(RecordingTransport::returning("[]"));
        let gateway = connect(transport.clone()).await;
        let target = ContractTarget::resolve("channel2");

        let outcome = initialize(&gateway, &target, "p", "1", true).await.unwrap();
        assert_eq!(outcome.lines(), vec!["[]", "[]"]);

        let calls = transport.calls();
        assert_eq!(calls.len(), 4);
        assert!(matches!(calls[3], RecordedCall::Evaluate(_)));
    }

    #[tokio::test]
    async fn test_invalid_commit_is_an_error() {
        let transport = Arc::new(
            RecordingTransport::returning("ok").with_commit_code(TxValidationCode::MvccReadConflict),
        );
        let gateway = connect(transport.clone()).await;
        let target = ContractTarget::resolve("channel1");

        let err = initialize(&gateway, &target, "p", "1", true)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::TransactionInvalid { .. }));
        assert!(!transport
            .calls()
            .iter()
            .any(|call| matches!(call, RecordedCall::Evaluate(_))));
    }

    #[tokio::test]
    async fn test_endorsement_failure_stops_before_submit() {
        let transport =
            Arc::new(RecordingTransport::returning("ok").failing_endorse("chaincode not found"));
        let gateway = connect(transport.clone()).await;

        let err = initialize(&gateway, &ContractTarget::resolve("channel9"), "p", "1", false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("chaincode not found"));
        assert_eq!(transport.calls().len(), 1);
    }

    #[test]
    fn test_result_is_decoded_lossily() {
        let outcome = InitOutcome {
            submitted: SubmittedTransaction {
                transaction_id: "tx".to_string(),
                block_number: 1,
                result: vec![b'o', b'k', 0xff],
            },
            accounts: None,
        };
        assert_eq!(outcome.lines(), vec!["ok\u{fffd}"]);
    }
}
