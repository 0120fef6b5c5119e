//! Transport Layer for service calls
//!
//! Abstracts the wire for testability. Provides:
//! - Transport trait: one request envelope in, one response envelope out
//! - MockTransport: in-process sandbox server for tests and `--sandbox`
//! - HttpTransport: JSON over HTTP for production

use std::time::Duration;

use adwords_protocol::{ApiRequest, ApiResponse};

use crate::sandbox::SandboxServer;

/// Transport trait for service calls
pub trait Transport: Send + Sync {
    /// Deliver `request` to `endpoint` and return the response envelope
    fn execute(&self, endpoint: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("Connection dropped before a response was received")]
    ConnectionDropped,

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Mock transport for testing - routes requests to a SandboxServer in-process
#[derive(Clone, Default)]
pub struct MockTransport {
    server: SandboxServer,
}

impl MockTransport {
    /// Create a new mock transport with an empty sandbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock transport over a pre-configured sandbox
    pub fn with_server(server: SandboxServer) -> Self {
        Self { server }
    }

    /// Get a reference to the underlying sandbox for test configuration
    pub fn server(&self) -> &SandboxServer {
        &self.server
    }
}

impl Transport for MockTransport {
    fn execute(&self, endpoint: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.server.handle_request(endpoint, request)
    }
}

/// Longest response body excerpt kept in an error
const BODY_EXCERPT_CHARS: usize = 512;

/// HTTP transport for production use
///
/// Posts the JSON request envelope to the service endpoint and decodes the
/// JSON response envelope. API errors may arrive with a non-2xx status; they
/// are still returned as responses when the body decodes.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport with the given request timeout
    pub fn new(timeout: Duration, gzip: bool) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .gzip(gzip)
            .build()
            .map_err(|e| TransportError::ConnectionFailed(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self { client })
    }

    fn map_error(error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::ConnectionTimeout
        } else if error.is_connect() {
            TransportError::ConnectionFailed(error.to_string())
        } else if error.is_body() || error.is_decode() {
            TransportError::ConnectionDropped
        } else {
            TransportError::Protocol(error.to_string())
        }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, endpoint: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let body = serde_json::to_vec(request)?;

        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(Self::map_error)?;

        let status = response.status();
        let bytes = response.bytes().map_err(Self::map_error)?;

        match serde_json::from_slice::<ApiResponse>(&bytes) {
            Ok(envelope) => Ok(envelope),
            Err(e) if status.is_success() => Err(TransportError::Protocol(format!(
                "Invalid response JSON: {}",
                e
            ))),
            Err(_) => Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes)
                    .chars()
                    .take(BODY_EXCERPT_CHARS)
                    .collect(),
            }),
        }
    }
}
