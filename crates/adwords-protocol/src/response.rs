//! Response envelope and response header.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Response header returned with every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeader {
    /// Server-side request ID for this call.
    pub request_id: String,
    /// Number of operations in the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations: Option<i64>,
    /// Server response time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<i64>,
    /// API units consumed by the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<i64>,
}

/// Response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// Request ID echoed from the request.
    pub request_id: String,
    /// Whether the call succeeded.
    pub ok: bool,
    /// Response header (absent on transport-level rejections).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<ResponseHeader>,
    /// Success payload (present when ok=true).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Error details (present when ok=false).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl ApiResponse {
    /// Create a success response.
    pub fn success(request_id: String, header: ResponseHeader, payload: serde_json::Value) -> Self {
        Self {
            request_id,
            ok: true,
            header: Some(header),
            payload: Some(payload),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(request_id: String, header: Option<ResponseHeader>, error: ApiError) -> Self {
        Self {
            request_id,
            ok: false,
            header,
            payload: None,
            error: Some(error),
        }
    }
}
