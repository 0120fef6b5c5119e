//! Layered client configuration
//!
//! The effective config captures the merged configuration, the typed view
//! the client runs with, and where each layer came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use adwords_protocol::DEFAULT_SERVER;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use crate::polling::{PollConfig, MAX_TIMEOUT};

/// Schema version for effective_config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "adwords/effective_config@1";

/// Credentials that never appear in printable output
const SECRET_PATHS: &[&str] = &["api.developer_token", "api.auth_token"];

const REDACTED: &str = "[REDACTED]";

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    User,
    Project,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Session settings handed to the service factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    pub server: String,
    pub user_agent: String,
    pub developer_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    pub timeout_seconds: u64,
    pub enable_gzip: bool,
    pub validate_only: bool,
    pub partial_failure: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let defaults = BuiltinDefaults::default();
        Self {
            server: DEFAULT_SERVER.to_string(),
            user_agent: defaults.user_agent,
            developer_token: String::new(),
            client_customer_id: None,
            auth_token: None,
            timeout_seconds: defaults.timeout_seconds,
            enable_gzip: defaults.enable_gzip,
            validate_only: false,
            partial_failure: false,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Job polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobsConfig {
    pub poll_interval_ms: u64,
    pub timeout_seconds: u64,
    pub status_retries: u32,
}

impl JobsConfig {
    pub fn poll_config(&self) -> PollConfig {
        PollConfig::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_secs(self.timeout_seconds),
        )
        .with_max_status_retries(self.status_retries)
    }
}

/// Typed configuration the client runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub jobs: JobsConfig,
}

/// Merged configuration plus the provenance of every layer
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub schema_version: u32,
    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration with secrets redacted
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,

    /// Redacted key paths
    pub redactions: Vec<String>,

    #[serde(skip)]
    app: AppConfig,
}

impl EffectiveConfig {
    /// Merge the builtin defaults with the optional file and CLI layers
    pub fn build(
        user_config_path: Option<&Path>,
        project_config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        for (origin, path) in [
            (ConfigOrigin::User, user_config_path),
            (ConfigOrigin::Project, project_config_path),
        ] {
            let Some(path) = path.filter(|p| p.exists()) else {
                continue;
            };
            let (value, digest) = Self::load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);

        let app: AppConfig = serde_json::from_value(merged.clone())
            .map_err(|e| ConfigError::SchemaError(e.to_string()))?;
        Self::validate_config(&app)?;

        let mut config = merged;
        let redactions = Self::redact_secrets(&mut config);

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config,
            sources,
            redactions,
            app,
        })
    }

    /// Build from the standard file locations
    pub fn load_default(cli_overrides: Option<Value>) -> Result<Self, ConfigError> {
        let user = user_config_path();
        let project = PathBuf::from("adwords.toml");
        Self::build(user.as_deref(), Some(&project), cli_overrides)
    }

    /// The typed configuration, secrets included
    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Parse one TOML layer and digest its raw bytes
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        let digest = hex::encode(Sha256::digest(&bytes));

        let text = std::str::from_utf8(&bytes)
            .map_err(|e| ConfigError::ParseError(format!("{}: not UTF-8: {}", path.display(), e)))?;
        let layer: Value = toml::from_str(text)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok((layer, digest))
    }

    /// Replace every non-empty secret with a marker, returning the dotted
    /// paths that were replaced
    fn redact_secrets(config: &mut Value) -> Vec<String> {
        SECRET_PATHS
            .iter()
            .filter_map(|path| {
                let pointer = format!("/{}", path.replace('.', "/"));
                match config.pointer_mut(&pointer) {
                    Some(slot) if slot.as_str().is_some_and(|s| !s.is_empty()) => {
                        *slot = Value::String(REDACTED.to_string());
                        Some(path.to_string())
                    }
                    _ => None,
                }
            })
            .collect()
    }

    fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::ValidationError(message));
        let max = MAX_TIMEOUT.as_secs();
        let in_bounds = |secs: u64| secs > 0 && secs <= max;

        if config.api.server.trim().is_empty() {
            return invalid("api.server must not be empty".to_string());
        }
        if !in_bounds(config.api.timeout_seconds) {
            return invalid(format!("api.timeout_seconds must be in (0, {}]", max));
        }
        if config.jobs.poll_interval_ms == 0 {
            return invalid("jobs.poll_interval_ms must be greater than 0".to_string());
        }
        if !in_bounds(config.jobs.timeout_seconds) {
            return invalid(format!("jobs.timeout_seconds must be in (0, {}]", max));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let bytes = serde_json::to_vec_pretty(self).map_err(io::Error::other)?;
        fs::write(path, bytes)
    }

    /// Look up a value of the printable (redacted) config, e.g. `api.server`
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.config.pointer(&format!("/{}", path.replace('.', "/")))
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path)?.as_u64()
    }
}

/// `~/.config/adwords/adwords.toml`, when HOME is set
fn user_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("adwords")
            .join("adwords.toml")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    IoError(String),

    #[error("malformed config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    SchemaError(String),

    #[error("invalid value: {0}")]
    ValidationError(String),
}
