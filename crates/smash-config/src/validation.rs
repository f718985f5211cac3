//! Configuration validation

use crate::schema::{RawConfig, RawRules};
use crate::RewardPolicy;
use smash_api::MAX_INFESTATION;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("rules.undo_window_seconds must be greater than zero")]
    ZeroUndoWindow,

    #[error("rules.history_limit must be greater than zero")]
    ZeroHistoryLimit,

    #[error("rules.warning_threshold {value} must be between 1 and {max}")]
    WarningThresholdOutOfRange { value: u32, max: u32 },

    #[error("Unknown reward policy '{0}' (expected 'flat' or 'dampened')")]
    UnknownRewardPolicy(String),
}

/// Validate a raw configuration, collecting every problem
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    validate_rules(&config.rules)
}

fn validate_rules(rules: &RawRules) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if rules.undo_window_seconds == Some(0) {
        errors.push(ValidationError::ZeroUndoWindow);
    }

    if rules.history_limit == Some(0) {
        errors.push(ValidationError::ZeroHistoryLimit);
    }

    if let Some(value) = rules.warning_threshold {
        if value == 0 || value > MAX_INFESTATION {
            errors.push(ValidationError::WarningThresholdOutOfRange {
                value,
                max: MAX_INFESTATION,
            });
        }
    }

    if let Some(policy) = &rules.reward_policy {
        if let Err(e) = parse_reward_policy(policy) {
            errors.push(e);
        }
    }

    errors
}

/// Parse a reward policy name
pub fn parse_reward_policy(s: &str) -> Result<RewardPolicy, ValidationError> {
    match s.trim().to_lowercase().as_str() {
        "flat" => Ok(RewardPolicy::Flat),
        "dampened" => Ok(RewardPolicy::Dampened),
        _ => Err(ValidationError::UnknownRewardPolicy(s.to_string())),
    }
}
