//! AdWords Protocol Types
//!
//! Defines the request/response envelope exchanged with AdWords API services
//! and the typed data objects carried inside it.

pub mod error;
pub mod ops;
pub mod request;
pub mod response;

pub use error::{ApiError, ErrorCode};
pub use request::{ApiRequest, RequestHeader};
pub use response::{ApiResponse, ResponseHeader};

/// Library name reported in the user agent.
pub const LIBRARY_SIGNATURE: &str = "AwApi-Rust";

/// Library version reported in the user agent.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default AdWords API server.
pub const DEFAULT_SERVER: &str = "https://adwords.google.com";

/// Default number of results requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 500;
