//! Validated configuration structures

use crate::schema::{RawConfig, RawServiceConfig};
use crate::validation::parse_reward_policy;
use smash_api::{DEFAULT_HISTORY_LIMIT, DEFAULT_WARNING_THRESHOLD};
use std::path::PathBuf;
use std::time::Duration;

/// Default length of the undo and restore windows
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(10);

/// How smash rewards react to infestation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewardPolicy {
    /// Always the table value
    #[default]
    Flat,
    /// Table value scaled by `max(0.5, 1 - 0.05 * infestation)`
    Dampened,
}

/// Validated configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub service: ServiceConfig,
    pub rules: Rules,
}

impl Config {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let defaults = Rules::default();
        let rules = Rules {
            undo_window: raw
                .rules
                .undo_window_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.undo_window),
            reward_policy: raw
                .rules
                .reward_policy
                .as_deref()
                .and_then(|p| parse_reward_policy(p).ok())
                .unwrap_or(defaults.reward_policy),
            history_limit: raw.rules.history_limit.unwrap_or(defaults.history_limit),
            warning_threshold: raw
                .rules
                .warning_threshold
                .unwrap_or(defaults.warning_threshold),
        };

        Self {
            service: ServiceConfig::from_raw(raw.service),
            rules,
        }
    }
}

/// Process-level settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            data_dir: raw.data_dir.unwrap_or_else(smash_util::default_data_dir),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: smash_util::default_data_dir(),
        }
    }
}

/// Game rules consumed by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    pub undo_window: Duration,
    pub reward_policy: RewardPolicy,
    pub history_limit: usize,
    pub warning_threshold: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            undo_window: DEFAULT_UNDO_WINDOW,
            reward_policy: RewardPolicy::Flat,
            history_limit: DEFAULT_HISTORY_LIMIT,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
        }
    }
}
