use serde::{Deserialize, Serialize};

/// Identity type tag used by X.509 identities
pub const X509_IDENTITY_TYPE: &str = "X.509";

/// Version of the persisted identity layout
pub const IDENTITY_VERSION: u32 = 1;

/// Certificate and private key in PEM form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// PEM encoded X.509 certificate
    pub certificate: String,

    /// PEM encoded PKCS#8 private key
    #[serde(rename = "privateKey")]
    pub private_key: String,
}

/// An X.509 identity belonging to a membership service provider
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct X509Identity {
    /// Layout version
    pub version: u32,

    /// Membership service provider the certificate was issued by
    #[serde(rename = "mspId")]
    pub msp_id: String,

    /// Identity type, always `X.509`
    #[serde(rename = "type")]
    pub id_type: String,

    /// Certificate and key
    pub credentials: Credentials,
}

impl X509Identity {
    /// Create an identity from an MSP label, a certificate and a private key
    pub fn new(
        msp_id: impl Into<String>,
        certificate: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            version: IDENTITY_VERSION,
            msp_id: msp_id.into(),
            id_type: X509_IDENTITY_TYPE.to_string(),
            credentials: Credentials {
                certificate: certificate.into(),
                private_key: private_key.into(),
            },
        }
    }

    /// The membership service provider label
    #[must_use]
    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// The PEM encoded certificate
    #[must_use]
    pub fn certificate(&self) -> &str {
        &self.credentials.certificate
    }

    /// The PEM encoded private key
    #[must_use]
    pub fn private_key(&self) -> &str {
        &self.credentials.private_key
    }
}

// Keep key material out of logs.
impl std::fmt::Debug for X509Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X509Identity")
            .field("version", &self.version)
            .field("msp_id", &self.msp_id)
            .field("id_type", &self.id_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_json_layout() {
        let identity = X509Identity::new("Org1MSP", "CERT", "KEY");
        let value = serde_json::to_value(&identity).unwrap();

        assert_eq!(value["mspId"], "Org1MSP");
        assert_eq!(value["type"], "X.509");
        assert_eq!(value["version"], 1);
        assert_eq!(value["credentials"]["certificate"], "CERT");
        assert_eq!(value["credentials"]["privateKey"], "KEY");
    }

    #[test]
    fn test_debug_hides_key() {
        let identity = X509Identity::new("Org1MSP", "CERT", "SECRET-KEY");
        let debug = format!("{identity:?}");
        assert!(debug.contains("Org1MSP"));
        assert!(!debug.contains("SECRET-KEY"));
    }
}
