/// Runtime configuration
///
/// Values come from the environment (a `.env` file is loaded first when
/// present) and fall back to defaults:
///
/// | variable            | field                  | default     |
/// |---------------------|------------------------|-------------|
/// | `STEP_DELAY_MS`     | `playback.delay_ms`    | `500`       |
/// | `STEP_GRANULARITY`  | `playback.granularity` | `iteration` |
/// | `LOG_LEVEL`         | `logging.level`        | `info`      |
/// | `LOG_FORMAT`        | `logging.format`       | `pretty`    |
/// | `RANDOM_SEED`       | `random_seed`          | unset       |

use crate::engine::{Granularity, StepDelay};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepperConfig {
    pub playback: PlaybackConfig,
    pub logging: LoggingConfig,
    /// Seed for random-first discovery; entropy when unset
    pub random_seed: Option<u64>,
}

/// Speed and unit of auto-advance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// `0` runs to completion, negative single-steps, positive is the
    /// delay between steps in milliseconds
    pub delay_ms: i64,
    pub granularity: Granularity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            delay_ms: 500,
            granularity: Granularity::Iteration,
        }
    }
}

impl PlaybackConfig {
    pub fn step_delay(&self) -> StepDelay {
        StepDelay::from_millis(self.delay_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            logging: LoggingConfig::default(),
            random_seed: None,
        }
    }
}

impl StepperConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from a variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let delay_ms = match lookup("STEP_DELAY_MS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("STEP_DELAY_MS is not an integer: {:?}", raw))?,
            None => defaults.playback.delay_ms,
        };
        let granularity = match lookup("STEP_GRANULARITY") {
            Some(raw) => raw.trim().parse().map_err(anyhow::Error::msg)?,
            None => defaults.playback.granularity,
        };
        let random_seed = match lookup("RANDOM_SEED") {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .with_context(|| format!("RANDOM_SEED is not a u64: {:?}", raw))?,
            ),
            None => defaults.random_seed,
        };

        let config = Self {
            playback: PlaybackConfig {
                delay_ms,
                granularity,
            },
            logging: LoggingConfig {
                level: lookup("LOG_LEVEL").unwrap_or(defaults.logging.level),
                format: lookup("LOG_FORMAT").unwrap_or(defaults.logging.format),
            },
            random_seed,
        };

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = StepperConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, StepperConfig::default());
        assert_eq!(config.playback.step_delay(), StepDelay::Every(std::time::Duration::from_millis(500)));
    }

    #[test]
    fn test_reads_variables() {
        let config = StepperConfig::from_lookup(lookup_from(&[
            ("STEP_DELAY_MS", "-1"),
            ("STEP_GRANULARITY", "Action"),
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "json"),
            ("RANDOM_SEED", "42"),
        ]))
        .unwrap();

        assert_eq!(config.playback.delay_ms, -1);
        assert_eq!(config.playback.step_delay(), StepDelay::SingleStep);
        assert_eq!(config.playback.granularity, Granularity::Action);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.random_seed, Some(42));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(StepperConfig::from_lookup(lookup_from(&[("STEP_DELAY_MS", "fast")])).is_err());
        assert!(StepperConfig::from_lookup(lookup_from(&[("STEP_GRANULARITY", "leap")])).is_err());
        assert!(StepperConfig::from_lookup(lookup_from(&[("RANDOM_SEED", "-3")])).is_err());
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: StepperConfig = serde_json::from_str(
            r#"{
                "playback": {"delay_ms": 0, "granularity": "completion"},
                "logging": {"level": "warn", "format": "pretty"},
                "random_seed": null
            }"#,
        )
        .unwrap();
        assert_eq!(config.playback.step_delay(), StepDelay::RunToCompletion);
        assert_eq!(config.playback.granularity, Granularity::Completion);
    }
}
