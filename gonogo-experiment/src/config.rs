use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest delay or window a session accepts: one day.
pub const MAX_DURATION_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub trial_count: usize,
    /// Probability that any single trial is a go trial.
    pub go_probability: f64,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
    pub response_window_ms: u64,
    /// Keep the stimulus up for the whole window even after a response.
    pub fixed_pace: bool,
    /// Seed for a reproducible stimulus sequence; entropy from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            trial_count: 20,
            go_probability: 0.6,
            base_delay_ms: 1000,
            max_jitter_ms: 2000,
            response_window_ms: 1500,
            fixed_pace: false,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trial_count == 0 {
            return Err(ConfigError::NoTrials);
        }
        if !(0.0..=1.0).contains(&self.go_probability) {
            return Err(ConfigError::GoProbability(self.go_probability));
        }
        if self.response_window_ms == 0 {
            return Err(ConfigError::EmptyResponseWindow);
        }
        if self.response_window_ms > MAX_DURATION_MS {
            return Err(ConfigError::DurationTooLong {
                field: "response_window_ms",
                ms: self.response_window_ms,
            });
        }
        let longest_delay_ms = self.base_delay_ms.saturating_add(self.max_jitter_ms);
        if longest_delay_ms > MAX_DURATION_MS {
            return Err(ConfigError::DurationTooLong {
                field: "base_delay_ms + max_jitter_ms",
                ms: longest_delay_ms,
            });
        }
        Ok(())
    }

    pub fn response_window(&self) -> Duration {
        Duration::from_millis(self.response_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_standard_task() {
        let config = SessionConfig::default();
        assert_eq!(config.trial_count, 20);
        assert_eq!(config.go_probability, 0.6);
        assert_eq!(config.base_delay_ms, 1000);
        assert_eq!(config.max_jitter_ms, 2000);
        assert_eq!(config.response_window(), Duration::from_millis(1500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_trials() {
        let config = SessionConfig {
            trial_count: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoTrials)));
    }

    #[test]
    fn rejects_probability_out_of_range() {
        for p in [-0.1, 1.01, f64::NAN] {
            let config = SessionConfig {
                go_probability: p,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::GoProbability(_))),
                "accepted {p}"
            );
        }
    }

    #[test]
    fn accepts_probability_bounds() {
        for p in [0.0, 1.0] {
            let config = SessionConfig {
                go_probability: p,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn rejects_empty_window() {
        let config = SessionConfig {
            response_window_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyResponseWindow)
        ));
    }

    #[test]
    fn rejects_window_longer_than_a_day() {
        let config = SessionConfig {
            response_window_ms: 18_446_744_073_710,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DurationTooLong {
                field: "response_window_ms",
                ..
            })
        ));
    }

    #[test]
    fn rejects_delay_that_would_overflow() {
        let err = SessionConfig::from_json(r#"{"base_delay_ms": 18446744073709551615}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::DurationTooLong { ms, .. } if ms == u64::MAX));

        let config = SessionConfig {
            base_delay_ms: MAX_DURATION_MS,
            max_jitter_ms: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DurationTooLong { .. })
        ));
    }

    #[test]
    fn accepts_durations_at_the_limit() {
        let config = SessionConfig {
            base_delay_ms: MAX_DURATION_MS - 10,
            max_jitter_ms: 10,
            response_window_ms: MAX_DURATION_MS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = SessionConfig::from_json(r#"{"trial_count": 5, "seed": 9}"#).unwrap();
        assert_eq!(config.trial_count, 5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.response_window_ms, 1500);
    }

    #[test]
    fn json_is_validated() {
        let err = SessionConfig::from_json(r#"{"go_probability": 2.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::GoProbability(p) if p == 2.0));
    }

    #[test]
    fn negative_durations_fail_to_parse() {
        let err = SessionConfig::from_json(r#"{"base_delay_ms": -10}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
