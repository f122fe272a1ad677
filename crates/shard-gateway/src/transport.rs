//! Transport to the peer's Gateway gRPC service.

use async_trait::async_trait;
use shard_core::{LedgerError, Result};
use std::time::Duration;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::{Code, Status};
use tracing::{debug, info};

use crate::config::SessionOptions;
use crate::profile::PeerEndpoint;
use crate::proto::gateway::{
    CommitStatusResponse, EndorseRequest, EndorseResponse, EvaluateRequest, EvaluateResponse,
    SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};

const ENDORSE_PATH: &str = "/gateway.Gateway/Endorse";
const SUBMIT_PATH: &str = "/gateway.Gateway/Submit";
const COMMIT_STATUS_PATH: &str = "/gateway.Gateway/CommitStatus";
const EVALUATE_PATH: &str = "/gateway.Gateway/Evaluate";

/// The four unary calls of the Gateway service
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// Collect endorsements for a signed proposal
    async fn endorse(&self, request: EndorseRequest) -> Result<EndorseResponse>;

    /// Send a signed, endorsed transaction to ordering
    async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse>;

    /// Wait for the commit status of a submitted transaction
    async fn commit_status(&self, request: SignedCommitStatusRequest)
        -> Result<CommitStatusResponse>;

    /// Run a proposal on one peer without ordering it
    async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse>;
}

/// [`GatewayTransport`] over a tonic channel
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    channel: Channel,
    peer: String,
}

impl GrpcTransport {
    /// Open a channel to the given peer
    pub async fn connect(
        endpoint: &PeerEndpoint,
        options: &SessionOptions,
        request_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Endpoint::from_shared(endpoint.address.clone())
            .map_err(|e| LedgerError::Profile(format!("invalid address {}: {e}", endpoint.address)))?
            .connect_timeout(options.connect_timeout);

        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(tls) = &endpoint.tls {
            let config = ClientTlsConfig::new()
                .ca_certificate(Certificate::from_pem(&tls.ca_pem))
                .domain_name(tls.server_name.clone());
            builder = builder
                .tls_config(config)
                .map_err(|e| LedgerError::Tls(error_chain(&e)))?;
        }

        debug!(peer = %endpoint.name, address = %endpoint.address, "connecting to gateway peer");
        let channel = builder.connect().await.map_err(|e| {
            LedgerError::Connection(format!("{}: {}", endpoint.address, error_chain(&e)))
        })?;

        info!(peer = %endpoint.name, "connected to gateway peer");
        Ok(Self {
            channel,
            peer: endpoint.name.clone(),
        })
    }

    /// Name of the connected peer
    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    async fn unary<Req, Resp>(&self, path: &'static str, request: Req) -> std::result::Result<Resp, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("gateway service not ready: {e}")))?;

        debug!(path, peer = %self.peer, "gateway call");
        let codec = tonic::codec::ProstCodec::default();
        let response = grpc
            .unary(tonic::Request::new(request), PathAndQuery::from_static(path), codec)
            .await?;

        Ok(response.into_inner())
    }
}

#[async_trait]
impl GatewayTransport for GrpcTransport {
    async fn endorse(&self, request: EndorseRequest) -> Result<EndorseResponse> {
        self.unary(ENDORSE_PATH, request)
            .await
            .map_err(|s| LedgerError::Endorse {
                code: code_name(s.code()),
                message: s.message().to_string(),
            })
    }

    async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse> {
        self.unary(SUBMIT_PATH, request)
            .await
            .map_err(|s| LedgerError::Submit {
                code: code_name(s.code()),
                message: s.message().to_string(),
            })
    }

    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
    ) -> Result<CommitStatusResponse> {
        self.unary(COMMIT_STATUS_PATH, request)
            .await
            .map_err(|s| LedgerError::CommitStatus {
                code: code_name(s.code()),
                message: s.message().to_string(),
            })
    }

    async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse> {
        self.unary(EVALUATE_PATH, request)
            .await
            .map_err(|s| LedgerError::Evaluate {
                code: code_name(s.code()),
                message: s.message().to_string(),
            })
    }
}

fn code_name(code: Code) -> String {
    format!("{code:?}")
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "transport error")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_chain() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(error_chain(&err), "transport error: refused");
    }

    #[test]
    fn test_code_name() {
        assert_eq!(code_name(Code::Unavailable), "Unavailable");
        assert_eq!(code_name(Code::Aborted), "Aborted");
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let endpoint = PeerEndpoint {
            name: "peer0".to_string(),
            // port 1 on loopback is never a gateway
            address: "http://127.0.0.1:1".to_string(),
            tls: None,
        };
        let options = SessionOptions::new().connect_timeout(Duration::from_secs(2));

        let err = GrpcTransport::connect(&endpoint, &options, None).await.unwrap_err();
        assert!(matches!(err, LedgerError::Connection(_)));
    }
}
