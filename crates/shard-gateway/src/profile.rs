//! Connection profile parsing and peer endpoint resolution.

use serde::Deserialize;
use shard_core::{LedgerError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::SessionOptions;

/// gRPC options that carry the TLS server name, in order of preference
const SERVER_NAME_OPTIONS: &[&str] = &["ssl-target-name-override", "hostnameOverride"];

/// Network topology document describing organizations and their peers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionProfile {
    /// Profile name
    #[serde(default)]
    pub name: Option<String>,

    /// Client section: which organization this client belongs to
    #[serde(default)]
    pub client: ClientConfig,

    /// Organizations by name
    #[serde(default)]
    pub organizations: HashMap<String, OrganizationConfig>,

    /// Peers by name
    #[serde(default)]
    pub peers: HashMap<String, PeerConfig>,

    /// Directory relative `tlsCACerts.path` entries are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// The `client` section of a profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    /// Organization this client acts for
    #[serde(default)]
    pub organization: Option<String>,

    /// Connection tuning
    #[serde(default)]
    pub connection: Option<ConnectionConfig>,
}

/// `client.connection`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionConfig {
    /// Timeouts by component
    #[serde(default)]
    pub timeout: Option<TimeoutConfig>,
}

/// `client.connection.timeout`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeoutConfig {
    /// Peer call timeouts
    #[serde(default)]
    pub peer: Option<PeerTimeouts>,
}

/// `client.connection.timeout.peer`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeerTimeouts {
    /// Endorsement timeout
    #[serde(default)]
    pub endorser: Option<Seconds>,
}

/// Seconds written either as a number or a quoted string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Seconds {
    /// `300`
    Number(u64),
    /// `'300'`
    Text(String),
}

impl Seconds {
    fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Number(n) => Some(Duration::from_secs(*n)),
            Self::Text(s) => s.trim().parse().ok().map(Duration::from_secs),
        }
    }
}

/// An entry of `organizations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationConfig {
    /// Membership service provider id
    #[serde(default)]
    pub mspid: Option<String>,

    /// Names of the organization's peers, gateway peer first
    #[serde(default)]
    pub peers: Vec<String>,
}

/// An entry of `peers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeerConfig {
    /// `grpcs://host:port` or `grpc://host:port`
    pub url: String,

    /// Trust roots for TLS peers
    #[serde(default, rename = "tlsCACerts")]
    pub tls_ca_certs: Option<TlsCaCerts>,

    /// Channel options, e.g. `ssl-target-name-override`
    #[serde(default, rename = "grpcOptions")]
    pub grpc_options: HashMap<String, serde_yaml::Value>,
}

/// A peer's `tlsCACerts`: inline PEM or a file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsCaCerts {
    /// Inline PEM, preferred over `path`
    #[serde(default)]
    pub pem: Option<PemSource>,

    /// PEM file, relative to the profile's directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Inline PEM, either a single document or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PemSource {
    /// A single PEM string
    One(String),
    /// Several PEM strings, concatenated on use
    Many(Vec<String>),
}

/// TLS settings for dialing a peer
#[derive(Clone, PartialEq, Eq)]
pub struct TlsSettings {
    /// PEM encoded trust roots
    pub ca_pem: Vec<u8>,

    /// Name the peer's certificate is checked against
    pub server_name: String,
}

impl std::fmt::Debug for TlsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsSettings")
            .field("ca_pem_len", &self.ca_pem.len())
            .field("server_name", &self.server_name)
            .finish()
    }
}

/// A resolved peer address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEndpoint {
    /// Peer name from the profile
    pub name: String,

    /// `https://` or `http://` address to dial
    pub address: String,

    /// TLS settings, present for `grpcs://` peers
    pub tls: Option<TlsSettings>,
}

impl ConnectionProfile {
    /// Load a profile from a YAML (or JSON) file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LedgerError::io(path, e))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        debug!(path = %path.display(), "loading connection profile");
        Self::from_yaml(&content, base_dir)
    }

    /// Parse a profile from YAML text
    pub fn from_yaml(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut profile: Self = serde_yaml::from_str(content)
            .map_err(|e| LedgerError::Profile(format!("invalid connection profile: {e}")))?;
        profile.base_dir = base_dir.into();
        Ok(profile)
    }

    /// Organization the client acts for
    pub fn client_organization(&self) -> Result<&str> {
        if let Some(org) = self.client.organization.as_deref() {
            return Ok(org);
        }

        match self.organizations.keys().next() {
            Some(org) if self.organizations.len() == 1 => Ok(org.as_str()),
            _ => Err(LedgerError::Profile(
                "client.organization is not set and the profile lists more than one organization"
                    .to_string(),
            )),
        }
    }

    /// Endorser timeout from `client.connection.timeout.peer.endorser`
    #[must_use]
    pub fn endorser_timeout(&self) -> Option<Duration> {
        self.client
            .connection
            .as_ref()?
            .timeout
            .as_ref()?
            .peer
            .as_ref()?
            .endorser
            .as_ref()?
            .as_duration()
    }

    /// Resolve the gateway peer: the first peer of the client organization
    pub fn gateway_endpoint(&self, options: &SessionOptions) -> Result<PeerEndpoint> {
        let org_name = self.client_organization()?;
        let org = self
            .organizations
            .get(org_name)
            .ok_or_else(|| LedgerError::Profile(format!("organization {org_name} not found")))?;

        let peer_name = org
            .peers
            .first()
            .ok_or_else(|| LedgerError::Profile(format!("organization {org_name} has no peers")))?;

        self.peer_endpoint(peer_name, options)
    }

    /// Resolve a named peer
    pub fn peer_endpoint(&self, peer_name: &str, options: &SessionOptions) -> Result<PeerEndpoint> {
        let peer = self
            .peers
            .get(peer_name)
            .ok_or_else(|| LedgerError::Profile(format!("peer {peer_name} not found")))?;

        let url = Url::parse(&peer.url)
            .map_err(|e| LedgerError::Profile(format!("invalid url for {peer_name}: {e}")))?;

        let (scheme, secure) = match url.scheme() {
            "grpcs" | "https" => ("https", true),
            "grpc" | "http" => ("http", false),
            other => {
                return Err(LedgerError::Profile(format!(
                    "unsupported scheme {other} for {peer_name}"
                )))
            }
        };

        let host = url
            .host_str()
            .ok_or_else(|| LedgerError::Profile(format!("url for {peer_name} has no host")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| LedgerError::Profile(format!("url for {peer_name} has no port")))?;

        let dial_host = if options.discovery_as_localhost {
            "localhost"
        } else {
            host
        };
        let address = format!("{scheme}://{dial_host}:{port}");

        let tls = if secure {
            Some(TlsSettings {
                ca_pem: self.tls_roots(peer_name, peer)?,
                server_name: server_name(peer).unwrap_or(host).to_string(),
            })
        } else {
            None
        };

        debug!(peer = peer_name, address = %address, tls = secure, "resolved peer endpoint");
        Ok(PeerEndpoint {
            name: peer_name.to_string(),
            address,
            tls,
        })
    }

    fn tls_roots(&self, peer_name: &str, peer: &PeerConfig) -> Result<Vec<u8>> {
        let certs = peer.tls_ca_certs.as_ref().ok_or_else(|| {
            LedgerError::Tls(format!("peer {peer_name} uses TLS but has no tlsCACerts"))
        })?;

        match (&certs.pem, &certs.path) {
            (Some(PemSource::One(pem)), _) => Ok(pem.as_bytes().to_vec()),
            (Some(PemSource::Many(pems)), _) => Ok(pems.join("\n").into_bytes()),
            (None, Some(path)) => {
                let path = self.base_dir.join(path);
                std::fs::read(&path).map_err(|e| LedgerError::io(&path, e))
            }
            (None, None) => Err(LedgerError::Tls(format!(
                "tlsCACerts for peer {peer_name} has neither pem nor path"
            ))),
        }
    }
}

fn server_name(peer: &PeerConfig) -> Option<&str> {
    SERVER_NAME_OPTIONS
        .iter()
        .find_map(|key| peer.grpc_options.get(*key).and_then(serde_yaml::Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PROFILE: &str = r"
---
name: test-network-org1
version: 1.0.0
client:
  organization: Org1
  connection:
    timeout:
      peer:
        endorser: '300'
organizations:
  Org1:
    mspid: Org1MSP
    peers:
    - peer0.org1.example.com
    certificateAuthorities:
    - ca.org1.example.com
peers:
  peer0.org1.example.com:
    url: grpcs://peer0.org1.example.com:7051
    tlsCACerts:
      pem: |
        -----BEGIN CERTIFICATE-----
        MIICJzCCAc2gAwIBAgIUfake
        -----END CERTIFICATE-----
    grpcOptions:
      ssl-target-name-override: peer0.org1.example.com
      hostnameOverride: peer0.org1.example.com
certificateAuthorities:
  ca.org1.example.com:
    url: https://localhost:7054
    caName: ca-org1
";

    #[test]
    fn test_parse_test_network_profile() {
        let profile = ConnectionProfile::from_yaml(PROFILE, ".").unwrap();
        assert_eq!(profile.name.as_deref(), Some("test-network-org1"));
        assert_eq!(profile.client_organization().unwrap(), "Org1");
        assert_eq!(profile.endorser_timeout(), Some(Duration::from_secs(300)));
        assert_eq!(
            profile.organizations["Org1"].mspid.as_deref(),
            Some("Org1MSP")
        );
    }

    #[test]
    fn test_endpoint_as_advertised() {
        let profile = ConnectionProfile::from_yaml(PROFILE, ".").unwrap();
        let endpoint = profile.gateway_endpoint(&SessionOptions::new()).unwrap();

        assert_eq!(endpoint.name, "peer0.org1.example.com");
        assert_eq!(endpoint.address, "https://peer0.org1.example.com:7051");
        let tls = endpoint.tls.unwrap();
        assert_eq!(tls.server_name, "peer0.org1.example.com");
        assert!(String::from_utf8(tls.ca_pem).unwrap().contains("BEGIN CERTIFICATE"));
    }

    #[test]
    fn test_endpoint_as_localhost_keeps_server_name() {
        let profile = ConnectionProfile::from_yaml(PROFILE, ".").unwrap();
        let options = SessionOptions::new().discovery_as_localhost(true);
        let endpoint = profile.gateway_endpoint(&options).unwrap();

        assert_eq!(endpoint.address, "https://localhost:7051");
        assert_eq!(endpoint.tls.unwrap().server_name, "peer0.org1.example.com");
    }

    #[test]
    fn test_plaintext_peer() {
        let yaml = r"
organizations:
  Org1:
    peers: [peer0]
peers:
  peer0:
    url: grpc://peer0.example.com:7051
";
        let profile = ConnectionProfile::from_yaml(yaml, ".").unwrap();
        // single organization is picked without client.organization
        let endpoint = profile.gateway_endpoint(&SessionOptions::new()).unwrap();
        assert_eq!(endpoint.address, "http://peer0.example.com:7051");
        assert!(endpoint.tls.is_none());
        assert!(profile.endorser_timeout().is_none());
    }

    #[test]
    fn test_tls_roots_from_path() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("ca.pem"), "PEM-FROM-FILE").unwrap();
        let yaml = r"
client:
  organization: Org1
organizations:
  Org1:
    peers: [peer0]
peers:
  peer0:
    url: grpcs://peer0.example.com:7051
    tlsCACerts:
      path: ca.pem
";
        let profile = ConnectionProfile::from_yaml(yaml, tmp.path()).unwrap();
        let endpoint = profile.gateway_endpoint(&SessionOptions::new()).unwrap();
        let tls = endpoint.tls.unwrap();
        assert_eq!(tls.ca_pem, b"PEM-FROM-FILE");
        // no override: the advertised host is the server name
        assert_eq!(tls.server_name, "peer0.example.com");
    }

    #[test]
    fn test_tls_peer_without_roots() {
        let yaml = r"
client:
  organization: Org1
organizations:
  Org1:
    peers: [peer0]
peers:
  peer0:
    url: grpcs://peer0.example.com:7051
";
        let profile = ConnectionProfile::from_yaml(yaml, ".").unwrap();
        let err = profile.gateway_endpoint(&SessionOptions::new()).unwrap_err();
        assert!(matches!(err, LedgerError::Tls(_)));
    }

    #[test]
    fn test_missing_pieces() {
        let no_peers = r"
client:
  organization: Org1
organizations:
  Org1:
    peers: []
";
        let profile = ConnectionProfile::from_yaml(no_peers, ".").unwrap();
        assert!(profile.gateway_endpoint(&SessionOptions::new()).unwrap_err().is_config_error());

        let unknown_org = "client:\n  organization: Org9\n";
        let profile = ConnectionProfile::from_yaml(unknown_org, ".").unwrap();
        assert!(profile.gateway_endpoint(&SessionOptions::new()).is_err());
    }

    #[test]
    fn test_malformed_profile() {
        let err = ConnectionProfile::from_yaml("peers: [not, a, map", ".").unwrap_err();
        assert!(matches!(err, LedgerError::Profile(_)));
    }

    #[test]
    fn test_missing_profile_file() {
        let err = ConnectionProfile::from_file("/nonexistent/connection-org1.yaml").unwrap_err();
        assert!(matches!(err, LedgerError::Io { .. }));
    }
}
