//! Guard rails for loaded configuration values

use std::fmt;

use cisprobe_core::config::{
    MAX_ANNOTATION_CHARS, MIN_POLL_INTERVAL_MS, ProbeConfig,
};
use thiserror::Error;

/// Configuration that would break the evaluator outright.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("poll.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("poll.max_duration_ms must be greater than zero")]
    ZeroDuration,

    #[error(
        "poll.interval_ms must be at least {min}ms between status checks, got {interval_ms}ms"
    )]
    ShortPollInterval { interval_ms: u64, min: u64 },

    #[error(
        "poll.max_duration_ms ({max_duration_ms}ms) must cover at least one poll interval ({interval_ms}ms)"
    )]
    DurationBelowInterval {
        max_duration_ms: u64,
        interval_ms: u64,
    },

    #[error("benchmark.name must not be empty")]
    EmptyDocument,

    #[error("resource_type must not be empty")]
    EmptyResourceType,

    #[error("annotation_max_chars must be within 1..={max}, got {got}")]
    AnnotationLimit { got: usize, max: usize },
}

/// Suspicious but workable configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The deadline ends polling before the attempt cap can be reached.
    AttemptsUnreachable { max_attempts: u32, reachable: u64 },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::AttemptsUnreachable {
                max_attempts,
                reachable,
            } => write!(
                f,
                "poll.max_attempts is {max_attempts} but the poll deadline allows at most {reachable} status checks"
            ),
        }
    }
}

pub fn validate(
    config: &ProbeConfig,
) -> Result<Vec<ConfigWarning>, ConfigGuardRailError> {
    if config.resource_type.trim().is_empty() {
        return Err(ConfigGuardRailError::EmptyResourceType);
    }
    if config.benchmark.name.trim().is_empty() {
        return Err(ConfigGuardRailError::EmptyDocument);
    }

    let poll = &config.poll;
    if poll.max_attempts == 0 {
        return Err(ConfigGuardRailError::ZeroAttempts);
    }
    if poll.max_duration_ms == 0 {
        return Err(ConfigGuardRailError::ZeroDuration);
    }
    if poll.interval_ms < MIN_POLL_INTERVAL_MS {
        return Err(ConfigGuardRailError::ShortPollInterval {
            interval_ms: poll.interval_ms,
            min: MIN_POLL_INTERVAL_MS,
        });
    }
    if poll.max_duration_ms < poll.interval_ms {
        return Err(ConfigGuardRailError::DurationBelowInterval {
            max_duration_ms: poll.max_duration_ms,
            interval_ms: poll.interval_ms,
        });
    }
    if !(1..=MAX_ANNOTATION_CHARS).contains(&config.annotation_max_chars) {
        return Err(ConfigGuardRailError::AnnotationLimit {
            got: config.annotation_max_chars,
            max: MAX_ANNOTATION_CHARS,
        });
    }

    let mut warnings = Vec::new();
    // One check at the start, then one per full interval.
    let reachable = poll.max_duration_ms / poll.interval_ms + 1;
    if u64::from(poll.max_attempts) > reachable {
        warnings.push(ConfigWarning::AttemptsUnreachable {
            max_attempts: poll.max_attempts,
            reachable,
        });
    }
    Ok(warnings)
}
