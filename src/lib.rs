//! AdWords API client
//!
//! A service factory that builds typed service clients over a pluggable
//! transport, lazy paged queries over `get` style calls, and a coordinator
//! for multi-part bulk mutate jobs. An in-process sandbox server implements
//! the same wire contract for tests and offline use.

pub mod cancel;
pub mod config;
pub mod jobs;
pub mod logging;
pub mod paging;
pub mod polling;
pub mod sandbox;
pub mod service;
pub mod summary;

pub use adwords_protocol as protocol;

pub use config::{AppConfig, EffectiveConfig};
pub use jobs::{JobCoordinator, JobError, JobHandle, JobPart, JobStatus};
pub use paging::PagedQuery;
pub use sandbox::SandboxServer;
pub use service::{ServiceFactory, Transport};
