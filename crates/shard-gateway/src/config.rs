//! Session configuration types.

use std::time::Duration;

/// Default time allowed for establishing the peer connection
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Options applied when a gateway session is established
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Dial every peer on `localhost`, keeping its port and TLS server name.
    ///
    /// Used with local test networks whose advertised host names do not resolve.
    pub discovery_as_localhost: bool,

    /// Maximum time to establish the connection
    pub connect_timeout: Duration,

    /// Per-request deadline; when unset the profile's endorser timeout applies
    pub request_timeout: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionOptions {
    /// Create options with local discovery disabled
    #[must_use]
    pub const fn new() -> Self {
        Self {
            discovery_as_localhost: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: None,
        }
    }

    /// Enable or disable dialing peers on localhost
    #[must_use]
    pub const fn discovery_as_localhost(mut self, enabled: bool) -> Self {
        self.discovery_as_localhost = enabled;
        self
    }

    /// Set the connection timeout
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-request deadline
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
