//! Request envelope and SOAP-style request header.

use serde::{Deserialize, Serialize};

/// Request header attached to every call.
///
/// Enumerates every header field the client knows about; there is no
/// string-keyed escape hatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHeader {
    /// Developer token identifying the API consumer.
    pub developer_token: String,
    /// Customer the call acts on behalf of (`123-456-7890`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_customer_id: Option<String>,
    /// `<library signature>|<application user agent>`.
    pub user_agent: String,
    /// Pre-acquired authentication token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Validate the request without applying mutations.
    #[serde(default)]
    pub validate_only: bool,
    /// Apply valid operations even if others in the same call fail.
    #[serde(default)]
    pub partial_failure: bool,
}

/// Request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    /// Service name, e.g. `BulkMutateJobService`.
    pub service: String,
    /// Method name, e.g. `mutate`.
    pub method: String,
    /// Caller-chosen request ID for correlation.
    pub request_id: String,
    /// Request header.
    pub header: RequestHeader,
    /// Method-specific payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl ApiRequest {
    /// `Service.method` key used for routing and logging.
    pub fn method_key(&self) -> String {
        format!("{}.{}", self.service, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_omits_unset_optionals() {
        let header = RequestHeader {
            developer_token: "dev-token".to_string(),
            user_agent: "AwApi-Rust/0.1.0|test".to_string(),
            ..Default::default()
        };

        let value = serde_json::to_value(&header).unwrap();
        assert_eq!(value["developerToken"], "dev-token");
        assert!(value.get("clientCustomerId").is_none());
        assert!(value.get("authToken").is_none());
        assert_eq!(value["validateOnly"], false);
    }

    #[test]
    fn test_method_key() {
        let request = ApiRequest {
            service: "DataService".to_string(),
            method: "getCriterionBidLandscape".to_string(),
            request_id: "req-1".to_string(),
            header: RequestHeader::default(),
            payload: json!({}),
        };
        assert_eq!(request.method_key(), "DataService.getCriterionBidLandscape");
    }
}
