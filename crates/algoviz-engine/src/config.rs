//! Engine configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::playback::AnimationSpeed;

/// Tunables shared by every run of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Multiplier on every base delay; 0 disables sleeping
    pub delay_scale: f64,
    /// Events the render queue holds before the worker blocks
    pub event_capacity: usize,
    /// Largest accepted input length
    pub max_len: usize,
    /// Speed a new session starts at
    pub default_speed: AnimationSpeed,
    /// Start each run paused, waiting for play or step
    pub start_paused: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delay_scale: 1.0,
            event_capacity: 4096,
            max_len: 1000,
            default_speed: AnimationSpeed::NORMAL,
            start_paused: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `ALGOVIZ_DELAY_SCALE`, `ALGOVIZ_EVENT_CAPACITY`, `ALGOVIZ_MAX_LEN`,
    /// `ALGOVIZ_SPEED` and `ALGOVIZ_START_PAUSED`. Unset or unparsable values
    /// keep their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            delay_scale: env_or("ALGOVIZ_DELAY_SCALE", defaults.delay_scale),
            event_capacity: env_or("ALGOVIZ_EVENT_CAPACITY", defaults.event_capacity),
            max_len: env_or("ALGOVIZ_MAX_LEN", defaults.max_len),
            default_speed: AnimationSpeed::new(env_or(
                "ALGOVIZ_SPEED",
                defaults.default_speed.multiplier(),
            )),
            start_paused: env_or("ALGOVIZ_START_PAUSED", defaults.start_paused),
        }
    }

    /// No animation delays. Playback gating still applies.
    pub fn instant() -> Self {
        Self {
            delay_scale: 0.0,
            ..Self::default()
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable configuration value");
            default
        }),
        Err(_) => default,
    }
}
