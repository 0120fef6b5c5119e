//! Service-layer errors.

use adwords_protocol::ApiError;

use super::transport::TransportError;

/// Failure of a single service call
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("{service}.{method} failed: {error}")]
    Api {
        service: String,
        method: String,
        error: ApiError,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl ServiceError {
    /// True when the remote refused the request on its merits.
    ///
    /// Transient API errors, transport failures and malformed responses
    /// are not rejections.
    pub fn is_rejection(&self) -> bool {
        match self {
            ServiceError::Api { error, .. } => !error.code.is_transient(),
            ServiceError::Transport(_) | ServiceError::Protocol(_) => false,
        }
    }

    /// The remote API error, if this is one
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ServiceError::Api { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Result type for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors building a service client
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("developer token is not configured (api.developer_token)")]
    MissingDeveloperToken,

    #[error("invalid server URL '{server}': {reason}")]
    InvalidServer { server: String, reason: String },
}
