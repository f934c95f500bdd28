// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Options recognized by the AFK tracker.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Placeholder replaced with the `MM:SS` countdown in warning messages.
pub const TIME_LEFT_PLACEHOLDER: &str = "{time_left}";

/// Errors raised while loading or validating an [`AfkConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for this schema.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
    /// A duration option that must be positive was zero.
    #[error("option `{option}` must be greater than zero")]
    ZeroDuration {
        /// The camelCase name of the offending option.
        option: &'static str,
    },
}

/// Configuration for the AFK tracker.
///
/// All durations are expressed in milliseconds, matching the option names
/// used in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AfkConfig {
    /// Population floor below which tracking is disabled.
    pub min_players_for_afk_kick: usize,
    /// Time from track start until the actor is removed.
    pub kick_timeout: u64,
    /// Time between two warnings.
    pub warning_interval: u64,
    /// Time tracking stays suppressed after a new round begins.
    pub grace_period: u64,
    /// Period of the background reconciliation sweep.
    pub reconcile_interval: u64,
    /// Privilege scope whose holders are never tracked.
    pub privileged_scope: String,
    /// Warning text; `{time_left}` is replaced with the countdown.
    pub warning_message: String,
    /// Reason attached to the removal command.
    pub kick_reason: String,
}

impl Default for AfkConfig {
    fn default() -> Self {
        Self {
            min_players_for_afk_kick: 50,
            kick_timeout: 10 * 60 * 1000,
            warning_interval: 2 * 60 * 1000,
            grace_period: 15 * 60 * 1000,
            reconcile_interval: 60 * 1000,
            privileged_scope: "cameraman".to_string(),
            warning_message: format!(
                "Join a squad or you will be kicked in {TIME_LEFT_PLACEHOLDER}"
            ),
            kick_reason: "AFK".to_string(),
        }
    }
}

impl AfkConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// Missing options fall back to their defaults.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every periodic option can actually be scheduled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("kickTimeout", self.kick_timeout),
            ("warningInterval", self.warning_interval),
            ("reconcileInterval", self.reconcile_interval),
        ];
        for (option, value) in periods {
            if value == 0 {
                return Err(ConfigError::ZeroDuration { option });
            }
        }
        Ok(())
    }

    /// [`kick_timeout`](Self::kick_timeout) as a [`Duration`].
    pub fn kick_timeout(&self) -> Duration {
        Duration::from_millis(self.kick_timeout)
    }

    /// [`warning_interval`](Self::warning_interval) as a [`Duration`].
    pub fn warning_interval(&self) -> Duration {
        Duration::from_millis(self.warning_interval)
    }

    /// [`grace_period`](Self::grace_period) as a [`Duration`].
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period)
    }

    /// [`reconcile_interval`](Self::reconcile_interval) as a [`Duration`].
    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_millis(self.reconcile_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AfkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reconcile_interval(), Duration::from_secs(60));
        assert!(config.warning_message.contains(TIME_LEFT_PLACEHOLDER));
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = AfkConfig::from_json(
            r#"{ "minPlayersForAfkKick": 10, "kickTimeout": 600000, "warningInterval": 120000 }"#,
        )
        .expect("valid config");

        assert_eq!(config.min_players_for_afk_kick, 10);
        assert_eq!(config.kick_timeout(), Duration::from_secs(600));
        assert_eq!(config.warning_interval(), Duration::from_secs(120));
        assert_eq!(config.grace_period, AfkConfig::default().grace_period);
        assert_eq!(config.privileged_scope, "cameraman");
    }

    #[test]
    fn test_zero_warning_interval_is_rejected() {
        let err = AfkConfig::from_json(r#"{ "warningInterval": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZeroDuration {
                option: "warningInterval"
            }
        ));
    }

    #[test]
    fn test_unknown_option_is_a_parse_error() {
        let err = AfkConfig::from_json(r#"{ "kickTimout": 1000 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_grace_period_is_allowed() {
        let config = AfkConfig::from_json(r#"{ "gracePeriod": 0 }"#).expect("valid config");
        assert_eq!(config.grace_period(), Duration::ZERO);
    }
}
