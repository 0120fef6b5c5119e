//! Builds configured service clients from an explicit session config.

use std::sync::Arc;

use adwords_protocol::{RequestHeader, LIBRARY_SIGNATURE, LIBRARY_VERSION};
use reqwest::Url;
use tracing::debug;

use super::client::ServiceClient;
use super::error::FactoryError;
use super::services::{
    AdGroupCriterionService, AdGroupService, BulkMutateJobService, DataService,
};
use super::signature::{
    ServiceSignature, AD_GROUP_CRITERION_SERVICE, AD_GROUP_SERVICE, BULK_MUTATE_JOB_SERVICE,
    DATA_SERVICE,
};
use super::transport::Transport;
use crate::config::ApiConfig;

/// Creates service clients sharing one config and one transport.
pub struct ServiceFactory {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
}

impl ServiceFactory {
    pub fn new(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Header attached to every call made by clients of this factory
    pub fn request_header(&self) -> RequestHeader {
        RequestHeader {
            developer_token: self.config.developer_token.clone(),
            client_customer_id: self.config.client_customer_id.clone(),
            user_agent: format!(
                "{}/{}|{}",
                LIBRARY_SIGNATURE, LIBRARY_VERSION, self.config.user_agent
            ),
            auth_token: self.config.auth_token.clone(),
            validate_only: self.config.validate_only,
            partial_failure: self.config.partial_failure,
        }
    }

    /// Build a client for `signature`.
    ///
    /// Fails if the developer token is empty or the server is not an
    /// absolute http(s) URL.
    pub fn create_service(&self, signature: &ServiceSignature) -> Result<ServiceClient, FactoryError> {
        if self.config.developer_token.trim().is_empty() {
            return Err(FactoryError::MissingDeveloperToken);
        }
        self.validate_server()?;

        let endpoint = signature.endpoint(&self.config.server);
        debug!(service = signature.name, endpoint = %endpoint, "creating service client");

        Ok(ServiceClient::new(
            *signature,
            endpoint,
            self.request_header(),
            Arc::clone(&self.transport),
        ))
    }

    fn validate_server(&self) -> Result<(), FactoryError> {
        let server = &self.config.server;
        let invalid = |reason: String| FactoryError::InvalidServer {
            server: server.clone(),
            reason,
        };

        let url = Url::parse(server).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        Ok(())
    }

    pub fn bulk_mutate_job_service(&self) -> Result<BulkMutateJobService, FactoryError> {
        self.create_service(&BULK_MUTATE_JOB_SERVICE).map(BulkMutateJobService::new)
    }

    pub fn data_service(&self) -> Result<DataService, FactoryError> {
        self.create_service(&DATA_SERVICE).map(DataService::new)
    }

    pub fn ad_group_service(&self) -> Result<AdGroupService, FactoryError> {
        self.create_service(&AD_GROUP_SERVICE).map(AdGroupService::new)
    }

    pub fn ad_group_criterion_service(&self) -> Result<AdGroupCriterionService, FactoryError> {
        self.create_service(&AD_GROUP_CRITERION_SERVICE)
            .map(AdGroupCriterionService::new)
    }
}
