//! Service proxies
//!
//! A [`ServiceFactory`] turns an explicit [`ApiConfig`](crate::config::ApiConfig)
//! and a [`Transport`] into configured [`ServiceClient`]s, wrapped by typed
//! facades per remote service.

mod client;
mod error;
mod factory;
mod services;
mod signature;
mod transport;

pub use client::ServiceClient;
pub use error::{FactoryError, ServiceError, ServiceResult};
pub use factory::ServiceFactory;
pub use services::{AdGroupCriterionService, AdGroupService, BulkMutateJobService, DataService};
pub use signature::{
    find_service, ServiceSignature, AD_GROUP_CRITERION_SERVICE, AD_GROUP_SERVICE, ALL_SERVICES,
    BULK_MUTATE_JOB_SERVICE, DATA_SERVICE,
};
pub use transport::{HttpTransport, MockTransport, Transport, TransportError};
