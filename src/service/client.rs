//! Configured handle on one remote service.

use std::sync::{Arc, Mutex, PoisonError};

use adwords_protocol::{ApiError, ApiRequest, ErrorCode, RequestHeader, ResponseHeader};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::error::{ServiceError, ServiceResult};
use super::signature::ServiceSignature;
use super::transport::{Transport, TransportError};

/// A service proxy: endpoint, request header and transport.
///
/// Built by [`ServiceFactory`](super::ServiceFactory); every call carries the
/// same header.
pub struct ServiceClient {
    signature: ServiceSignature,
    endpoint: String,
    header: RequestHeader,
    transport: Arc<dyn Transport>,
    last_response_header: Mutex<Option<ResponseHeader>>,
}

impl ServiceClient {
    pub(crate) fn new(
        signature: ServiceSignature,
        endpoint: String,
        header: RequestHeader,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            signature,
            endpoint,
            header,
            transport,
            last_response_header: Mutex::new(None),
        }
    }

    pub fn signature(&self) -> &ServiceSignature {
        &self.signature
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    /// Response header of the most recent call that returned one
    pub fn last_response_header(&self) -> Option<ResponseHeader> {
        self.last_response_header
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Perform one call of `method` with `request` as payload.
    pub fn invoke<Req, Resp>(&self, method: &str, request: &Req) -> ServiceResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_value(request).map_err(TransportError::Serialization)?;
        let request = ApiRequest {
            service: self.signature.name.to_string(),
            method: method.to_string(),
            request_id: next_request_id(),
            header: self.header.clone(),
            payload,
        };

        debug!(
            service = self.signature.name,
            method,
            request_id = %request.request_id,
            "invoking service"
        );

        let response = self.transport.execute(&self.endpoint, &request)?;

        if response.request_id != request.request_id {
            return Err(ServiceError::Protocol(format!(
                "response request_id '{}' does not match '{}'",
                response.request_id, request.request_id
            )));
        }

        if let Some(header) = &response.header {
            debug!(
                service = self.signature.name,
                method,
                server_request_id = %header.request_id,
                operations = ?header.operations,
                response_time_ms = ?header.response_time,
                units = ?header.units,
                "response header"
            );
            *self
                .last_response_header
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(header.clone());
        }

        if !response.ok {
            let error = response.error.unwrap_or_else(|| {
                ApiError::new(ErrorCode::InternalError, "error response without details")
            });
            return Err(ServiceError::Api {
                service: self.signature.name.to_string(),
                method: method.to_string(),
                error,
            });
        }

        let payload = response.payload.ok_or_else(|| {
            ServiceError::Protocol(format!(
                "{}.{} response missing payload",
                self.signature.name, method
            ))
        })?;

        serde_json::from_value(payload).map_err(|e| {
            ServiceError::Protocol(format!(
                "malformed {}.{} payload: {}",
                self.signature.name, method, e
            ))
        })
    }
}

/// Generate a unique request ID
fn next_request_id() -> String {
    format!("req-{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::signature::AD_GROUP_SERVICE;
    use adwords_protocol::ApiResponse;
    use serde_json::{json, Value};

    /// Answers every request with a canned reply built from the request.
    struct CannedTransport<F>(F);

    impl<F> Transport for CannedTransport<F>
    where
        F: Fn(&ApiRequest) -> ApiResponse + Send + Sync,
    {
        fn execute(&self, _endpoint: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            Ok((self.0)(request))
        }
    }

    fn client_with<F>(reply: F) -> ServiceClient
    where
        F: Fn(&ApiRequest) -> ApiResponse + Send + Sync + 'static,
    {
        ServiceClient::new(
            AD_GROUP_SERVICE,
            "http://test/api/adwords/cm/v201101/AdGroupService".to_string(),
            RequestHeader {
                developer_token: "dev".to_string(),
                user_agent: "ua".to_string(),
                ..Default::default()
            },
            Arc::new(CannedTransport(reply)),
        )
    }

    fn header() -> ResponseHeader {
        ResponseHeader {
            request_id: "srv-9".to_string(),
            operations: Some(1),
            response_time: Some(4),
            units: Some(1),
        }
    }

    #[test]
    fn test_invoke_decodes_payload_and_keeps_header() {
        let client = client_with(|req| {
            ApiResponse::success(req.request_id.clone(), header(), json!({"echo": req.payload}))
        });

        let value: Value = client.invoke("get", &json!({"selector": {}})).unwrap();
        assert_eq!(value["echo"]["selector"], json!({}));
        assert_eq!(client.last_response_header(), Some(header()));
    }

    #[test]
    fn test_invoke_maps_api_error() {
        let client = client_with(|req| {
            ApiResponse::error(
                req.request_id.clone(),
                Some(header()),
                ApiError::new(ErrorCode::EntityNotFound, "no such ad group"),
            )
        });

        let err = client.invoke::<_, Value>("get", &json!({})).unwrap_err();
        assert_eq!(err.api_error().map(|e| e.code), Some(ErrorCode::EntityNotFound));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_invoke_rejects_malformed_payload() {
        let client = client_with(|req| {
            ApiResponse::success(req.request_id.clone(), header(), json!("not a number"))
        });

        let err = client.invoke::<_, u64>("get", &json!({})).unwrap_err();
        assert!(matches!(err, ServiceError::Protocol(_)));
    }

    #[test]
    fn test_invoke_rejects_mismatched_request_id() {
        let client = client_with(|_| ApiResponse::success("other".to_string(), header(), json!({})));
        let err = client.invoke::<_, Value>("get", &json!({})).unwrap_err();
        assert!(matches!(err, ServiceError::Protocol(_)));
    }

    #[test]
    fn test_request_ids_unique() {
        let id1 = next_request_id();
        let id2 = next_request_id();
        assert_ne!(id1, id2);
        assert!(id1.starts_with("req-"));
    }
}
