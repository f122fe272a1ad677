//! Identity stores ("wallets") keyed by a human readable label.

use shard_core::{LedgerError, Result, X509Identity};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// File extension of identities in a [`FileSystemWallet`]
const IDENTITY_EXTENSION: &str = "id";

/// A store of named identities
pub trait IdentityStore: Send + Sync {
    /// Returns true if an identity is stored under `label`
    fn exists(&self, label: &str) -> bool;

    /// Load the identity stored under `label`
    fn get(&self, label: &str) -> Result<X509Identity>;

    /// Store `identity` under `label`, replacing any previous one
    fn put(&self, label: &str, identity: &X509Identity) -> Result<()>;
}

/// Wallet keeping one JSON file per identity in a directory
#[derive(Debug, Clone)]
pub struct FileSystemWallet {
    dir: PathBuf,
}

impl FileSystemWallet {
    /// Open a wallet rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| LedgerError::io(&dir, e))?;
        debug!(path = %dir.display(), "opened file system wallet");
        Ok(Self { dir })
    }

    /// Directory holding the identity files
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Labels of all identities in the wallet, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| LedgerError::io(&self.dir, e))?;

        let mut labels = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| LedgerError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(IDENTITY_EXTENSION) {
                continue;
            }
            if let Some(label) = path.file_stem().and_then(|s| s.to_str()) {
                labels.push(label.to_string());
            }
        }

        labels.sort();
        Ok(labels)
    }

    fn identity_path(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{label}.{IDENTITY_EXTENSION}"))
    }
}

impl IdentityStore for FileSystemWallet {
    fn exists(&self, label: &str) -> bool {
        self.identity_path(label).is_file()
    }

    fn get(&self, label: &str) -> Result<X509Identity> {
        let path = self.identity_path(label);
        if !path.is_file() {
            return Err(LedgerError::IdentityNotFound {
                label: label.to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| LedgerError::io(&path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| LedgerError::Wallet(format!("{}: {e}", path.display())))
    }

    fn put(&self, label: &str, identity: &X509Identity) -> Result<()> {
        let path = self.identity_path(label);
        let content = serde_json::to_string(identity)?;
        std::fs::write(&path, content).map_err(|e| LedgerError::io(&path, e))?;
        debug!(label, path = %path.display(), "stored identity");
        Ok(())
    }
}

/// Wallet held in memory, lost when dropped
#[derive(Debug, Default)]
pub struct InMemoryWallet {
    identities: RwLock<HashMap<String, X509Identity>>,
}

impl InMemoryWallet {
    /// Create an empty wallet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for InMemoryWallet {
    fn exists(&self, label: &str) -> bool {
        self.identities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(label)
    }

    fn get(&self, label: &str) -> Result<X509Identity> {
        self.identities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(label)
            .cloned()
            .ok_or_else(|| LedgerError::IdentityNotFound {
                label: label.to_string(),
            })
    }

    fn put(&self, label: &str, identity: &X509Identity) -> Result<()> {
        self.identities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(label.to_string(), identity.clone());
        Ok(())
    }
}
