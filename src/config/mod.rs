//! Configuration merge system
//!
//! Implements the 4-layer configuration merge:
//! 1. Built-in defaults
//! 2. User config (~/.config/adwords/adwords.toml)
//! 3. Project config (./adwords.toml)
//! 4. CLI flags
//!
//! The merged value is deserialized into a typed [`AppConfig`]; unknown keys
//! are rejected.

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{
    ApiConfig, AppConfig, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, JobsConfig,
};
pub use merge::{deep_merge, merge_layers};
