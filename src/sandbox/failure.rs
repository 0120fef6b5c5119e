//! Failure injection for the sandbox server
//!
//! Failures are keyed by `Service.method`.

use std::collections::HashMap;
use std::time::Duration;

use adwords_protocol::ErrorCode;

/// Failure configuration for one method
#[derive(Debug, Clone, Default)]
pub struct FailureConfig {
    /// API error to return (if any)
    pub error_code: Option<ErrorCode>,
    pub error_message: Option<String>,
    /// Delay before responding
    pub delay: Option<Duration>,
    /// Drop the connection instead of answering
    pub drop_connection: bool,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    /// Return an API error
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error_code: Some(code),
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Drop the connection without a response
    pub fn dropped() -> Self {
        Self {
            drop_connection: true,
            ..Self::default()
        }
    }

    /// Only add delay
    pub fn delay(duration: Duration) -> Self {
        Self {
            delay: Some(duration),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, duration: Duration) -> Self {
        self.delay = Some(duration);
        self
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }

    /// True when the call must not reach the handler
    pub fn is_failure(&self) -> bool {
        self.drop_connection || self.error_code.is_some()
    }
}

/// Per-method failure injection
#[derive(Debug, Default)]
pub struct FailureInjector {
    configs: HashMap<String, FailureConfig>,
    /// Call counts per method (for fail_count tracking)
    call_counts: HashMap<String, u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, method_key: impl Into<String>, config: FailureConfig) {
        let key = method_key.into();
        self.call_counts.insert(key.clone(), 0);
        self.configs.insert(key, config);
    }

    pub fn clear(&mut self) {
        self.configs.clear();
        self.call_counts.clear();
    }

    pub fn clear_method(&mut self, method_key: &str) {
        self.configs.remove(method_key);
        self.call_counts.remove(method_key);
    }

    /// The failure to apply to this call, if any.
    ///
    /// Counts the call against the configured `fail_count`.
    pub fn check(&mut self, method_key: &str) -> Option<&FailureConfig> {
        let config = self.configs.get(method_key)?;
        let count = self.call_counts.entry(method_key.to_string()).or_insert(0);
        *count += 1;

        match config.fail_count {
            Some(limit) if *count > limit => None,
            _ => Some(config),
        }
    }
}
