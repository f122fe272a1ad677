//! Mapping from channel names to the contract deployed on them.

use serde::{Deserialize, Serialize};

/// Channel used by the test network when none of the known shards match
pub const DEFAULT_CHANNEL: &str = "mychannel";

/// Contract deployed on the default channel
pub const DEFAULT_CONTRACT: &str = "sharding";

/// Known shard channels and their contracts
const SHARD_CONTRACTS: &[(&str, &str)] = &[("channel1", "sharding1"), ("channel2", "sharding2")];

/// Channel and contract a transaction is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTarget {
    /// Channel name, exactly as requested
    pub channel: String,

    /// Contract name resolved for the channel
    pub contract: String,

    /// True if the channel was not recognized and the default contract was used
    pub fallback: bool,
}

impl ContractTarget {
    /// Resolve the contract for a channel.
    ///
    /// Unknown channels keep their name but get [`DEFAULT_CONTRACT`]; whether the
    /// channel actually exists is left to the network.
    #[must_use]
    pub fn resolve(channel: &str) -> Self {
        let known = SHARD_CONTRACTS
            .iter()
            .find(|(name, _)| *name == channel)
            .map(|(_, contract)| *contract);

        Self {
            channel: channel.to_string(),
            contract: known.unwrap_or(DEFAULT_CONTRACT).to_string(),
            fallback: known.is_none(),
        }
    }

    /// Returns true if the default contract was substituted
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Warning text shown when defaults are used
    #[must_use]
    pub fn fallback_warning() -> String {
        format!("Using default channel({DEFAULT_CHANNEL}) and smartcontract({DEFAULT_CONTRACT})")
    }
}

impl std::fmt::Display for ContractTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.channel, self.contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_channels() {
        let first = ContractTarget::resolve("channel1");
        assert_eq!(first.contract, "sharding1");
        assert!(!first.is_fallback());

        let second = ContractTarget::resolve("channel2");
        assert_eq!(second.contract, "sharding2");
        assert!(!second.is_fallback());
    }

    #[test]
    fn test_unknown_channel_keeps_name() {
        let target = ContractTarget::resolve("unknownChannel");
        assert_eq!(target.channel, "unknownChannel");
        assert_eq!(target.contract, DEFAULT_CONTRACT);
        assert!(target.is_fallback());
    }

    #[test]
    fn test_default_channel_is_not_special() {
        // mychannel is only named in the warning; it still takes the fallback path
        let target = ContractTarget::resolve(DEFAULT_CHANNEL);
        assert_eq!(target.contract, "sharding");
        assert!(target.is_fallback());
    }

    #[test]
    fn test_resolution_is_case_sensitive() {
        assert!(ContractTarget::resolve("Channel1").is_fallback());
        assert!(ContractTarget::resolve("").is_fallback());
    }

    #[test]
    fn test_display() {
        assert_eq!(ContractTarget::resolve("channel2").to_string(), "channel2/sharding2");
        assert!(ContractTarget::fallback_warning().contains("mychannel"));
    }
}
