//! Built-in defaults (layer 1)
//!
//! Hardcoded defaults for all configuration values.

use adwords_protocol::DEFAULT_SERVER;
use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// API server base URL
    pub server: String,

    /// Application part of the user agent (default: "adwords-client")
    pub user_agent: String,

    /// Per-call HTTP timeout in seconds (default: 100)
    pub timeout_seconds: u64,

    /// Request gzip-compressed responses (default: true)
    pub enable_gzip: bool,

    /// Poll interval in milliseconds (default: 2000)
    pub poll_interval_ms: u64,

    /// Overall job wait in seconds (default: 1800 = 30 minutes)
    pub job_timeout_seconds: u64,

    /// Consecutive failed status queries tolerated (default: 3)
    pub status_retries: u32,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            user_agent: "adwords-client".to_string(),
            timeout_seconds: 100,
            enable_gzip: true,
            poll_interval_ms: 2000,
            job_timeout_seconds: 1800,
            status_retries: 3,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "api": {
                "server": self.server,
                "user_agent": self.user_agent,
                "developer_token": "",
                "timeout_seconds": self.timeout_seconds,
                "enable_gzip": self.enable_gzip,
                "validate_only": false,
                "partial_failure": false
            },
            "jobs": {
                "poll_interval_ms": self.poll_interval_ms,
                "timeout_seconds": self.job_timeout_seconds,
                "status_retries": self.status_retries
            }
        })
    }
}
