//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Process-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Game rules
    #[serde(default)]
    pub rules: RawRules,
}

/// Process-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Data directory for the store
    pub data_dir: Option<PathBuf>,
}

/// Game rule overrides. Every field falls back to the built-in default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawRules {
    /// How long a completed or deleted item can be taken back
    pub undo_window_seconds: Option<u64>,

    /// "flat" or "dampened"
    pub reward_policy: Option<String>,

    /// Items kept per monthly history list
    pub history_limit: Option<usize>,

    /// Infestation level at which the meter starts warning
    pub warning_threshold: Option<u32>,
}
