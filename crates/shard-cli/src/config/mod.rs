//! Settings management.
//!
//! Values come from, in order of precedence: command-line flags (and the
//! environment variables clap binds to them), a TOML settings file, and the
//! built-in defaults that match the standard test network layout.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use shard_gateway::SessionOptions;
use std::path::{Path, PathBuf};

use crate::cli::args::Cli;

/// Organization whose user credentials are imported.
const ORG_DOMAIN: &str = "org1.example.com";

/// User whose credentials are imported.
const ORG_USER: &str = "User1@org1.example.com";

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the test network checkout.
    pub network_dir: PathBuf,

    /// Wallet directory.
    pub wallet_dir: PathBuf,

    /// Wallet label of the application identity.
    pub identity: String,

    /// Membership service provider recorded on import.
    pub msp_id: String,

    /// Dial peers on localhost.
    pub discovery_as_localhost: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network_dir: PathBuf::from("../../test-network"),
            wallet_dir: PathBuf::from("wallet"),
            identity: "appUser".to_string(),
            msp_id: "Org1MSP".to_string(),
            discovery_as_localhost: true,
        }
    }
}

/// Where the user's enrollment material lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPaths {
    /// PEM certificate file
    pub certificate: PathBuf,

    /// Directory expected to hold exactly one private key
    pub keystore: PathBuf,
}

impl Settings {
    /// Default settings file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("org", "hyperledger", "init-shard")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load settings from `explicit`, or from the default file when present.
    ///
    /// An explicit file must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    /// Parse a settings file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    /// Overlay values given on the command line.
    pub fn apply(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.network_dir {
            self.network_dir.clone_from(dir);
        }
        if let Some(dir) = &cli.wallet {
            self.wallet_dir.clone_from(dir);
        }
        if let Some(label) = &cli.identity {
            self.identity.clone_from(label);
        }
        if let Some(msp_id) = &cli.msp_id {
            self.msp_id.clone_from(msp_id);
        }
        if let Some(enabled) = cli.discovery_as_localhost {
            self.discovery_as_localhost = enabled;
        }
    }

    fn org_dir(&self) -> PathBuf {
        self.network_dir
            .join("organizations")
            .join("peerOrganizations")
            .join(ORG_DOMAIN)
    }

    /// Connection profile of the organization.
    #[must_use]
    pub fn profile_path(&self) -> PathBuf {
        self.org_dir().join("connection-org1.yaml")
    }

    /// Certificate and keystore of the imported user.
    #[must_use]
    pub fn credentials(&self) -> CredentialPaths {
        let msp = self.org_dir().join("users").join(ORG_USER).join("msp");
        CredentialPaths {
            certificate: msp.join("signcerts").join(format!("{ORG_USER}-cert.pem")),
            keystore: msp.join("keystore"),
        }
    }

    /// Gateway session options.
    #[must_use]
    pub const fn session_options(&self) -> SessionOptions {
        SessionOptions::new().discovery_as_localhost(self.discovery_as_localhost)
    }
}
