use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while provisioning an identity or talking to the gateway
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration is missing or invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// The keystore directory does not hold exactly one key file
    #[error("keystore folder {} should contain exactly one file, found {found}", .dir.display())]
    Keystore {
        /// Directory that was listed
        dir: PathBuf,
        /// Number of entries found
        found: usize,
    },

    /// Reading or writing a file failed
    #[error("I/O error on {}", .path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Certificate or private key material could not be used
    #[error("invalid credentials: {0}")]
    Credential(String),

    /// Identity store operation failed
    #[error("wallet error: {0}")]
    Wallet(String),

    /// No identity stored under the requested label
    #[error("identity not found in wallet: {label}")]
    IdentityNotFound {
        /// Label that was looked up
        label: String,
    },

    /// Connection profile could not be parsed or lacks a required entry
    #[error("connection profile error: {0}")]
    Profile(String),

    /// TLS setup for the gateway connection failed
    #[error("TLS error: {0}")]
    Tls(String),

    /// Could not connect to the gateway peer
    #[error("connection failed: {0}")]
    Connection(String),

    /// Endorsement of a transaction proposal failed
    #[error("endorsement failed ({code}): {message}")]
    Endorse {
        /// gRPC status code name
        code: String,
        /// Status message returned by the gateway
        message: String,
    },

    /// Submission of an endorsed transaction to ordering failed
    #[error("submit failed ({code}): {message}")]
    Submit {
        /// gRPC status code name
        code: String,
        /// Status message returned by the gateway
        message: String,
    },

    /// Commit status could not be obtained
    #[error("commit status failed ({code}): {message}")]
    CommitStatus {
        /// gRPC status code name
        code: String,
        /// Status message returned by the gateway
        message: String,
    },

    /// The transaction was committed but marked invalid by the ledger
    #[error("transaction {transaction_id} failed to commit with status code {code}")]
    TransactionInvalid {
        /// Transaction identifier
        transaction_id: String,
        /// Validation code name (e.g. `MVCC_READ_CONFLICT`)
        code: String,
    },

    /// Evaluation of a query failed
    #[error("evaluate failed ({code}): {message}")]
    Evaluate {
        /// gRPC status code name
        code: String,
        /// Status message returned by the gateway
        message: String,
    },

    /// Protobuf payload returned by the gateway could not be decoded
    #[error("malformed gateway response: {0}")]
    Decode(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LedgerError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns true if the error comes from local configuration rather than the network
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Keystore { .. } | Self::Profile(_)
        )
    }

    /// Returns true if the error was reported by the remote gateway
    #[must_use]
    pub const fn is_remote_error(&self) -> bool {
        matches!(
            self,
            Self::Endorse { .. }
                | Self::Submit { .. }
                | Self::CommitStatus { .. }
                | Self::TransactionInvalid { .. }
                | Self::Evaluate { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keystore_error_is_config() {
        let err = LedgerError::Keystore {
            dir: PathBuf::from("msp/keystore"),
            found: 2,
        };
        assert!(err.is_config_error());
        assert!(!err.is_remote_error());
        assert_eq!(
            err.to_string(),
            "keystore folder msp/keystore should contain exactly one file, found 2"
        );
    }

    #[test]
    fn test_io_error_keeps_path() {
        let err = LedgerError::io(
            "signcerts/cert.pem",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("signcerts/cert.pem"));
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_io_cause_reported_once_in_chain() {
        use std::error::Error as _;

        let err = LedgerError::io(
            "signcerts/cert.pem",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "I/O error on signcerts/cert.pem");

        let mut chain = vec![err.to_string()];
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        let joined = chain.join(": ");
        assert_eq!(joined.matches("missing").count(), 1);
    }

    #[test]
    fn test_remote_errors() {
        let err = LedgerError::TransactionInvalid {
            transaction_id: "abc".into(),
            code: "MVCC_READ_CONFLICT".into(),
        };
        assert!(err.is_remote_error());
    }
}
