//! Configuration management and environment variable loading

use crate::types::settings::SettingsStore;
use crate::{OpsdeskError, Result};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Load environment variables from a .env file
///
/// Loads variables from a .env file in the current directory or a parent
/// directory. Safe to call multiple times (only loads once).
pub fn load_env() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::info!("Loaded environment from: {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::LineParse(line, pos)) => Err(OpsdeskError::config(format!(
            "Failed to parse .env file at line {}, position {}",
            line, pos
        ))),
        Err(dotenvy::Error::Io(_)) => {
            tracing::debug!("No .env file found - using system environment variables only");
            Ok(())
        }
        Err(e) => Err(OpsdeskError::config(format!(
            "Failed to load .env file: {}",
            e
        ))),
    }
}

/// Load environment variables from a specific file
pub fn load_env_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    match dotenvy::from_path(path.as_ref()) {
        Ok(_) => {
            tracing::info!("Loaded environment from: {}", path.as_ref().display());
            Ok(())
        }
        Err(e) => Err(OpsdeskError::config(format!(
            "Failed to load {} environment file: {}",
            path.as_ref().display(),
            e
        ))),
    }
}

/// Get required environment variable
///
/// Returns an error if the variable is not set
pub fn get_required_env(key: &str) -> Result<String> {
    env::var(key).map_err(|_| {
        OpsdeskError::config(format!(
            "Required environment variable '{}' is not set. \
             Check your .env file or system environment.",
            key
        ))
    })
}

/// Get optional environment variable with default
pub fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable as boolean
pub fn get_env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| match v.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Get environment variable as u64
pub fn get_env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

/// Get environment variable as f64
pub fn get_env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}

/// Engine cadence and trigger configuration
///
/// Built from hard defaults, overridable through the environment or a
/// [`SettingsStore`]. The poll cadences feed the two `LiveRefresh` loops;
/// the near-top threshold feeds the backward-load trigger policy.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cadence of the live page-1 poll
    pub poll_interval: Duration,
    /// Cadence of the participant directory poll
    pub participant_poll_interval: Duration,
    /// Scroll offset (in rendered units) under which a backward load triggers
    pub near_top_threshold: f64,
    /// Capacity of the session event broadcast channel
    pub event_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            participant_poll_interval: Duration::from_secs(3),
            near_top_threshold: 80.0,
            event_buffer: 64,
        }
    }
}

impl EngineConfig {
    /// Build a config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: Duration::from_millis(get_env_u64(
                "OPSDESK_POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )),
            participant_poll_interval: Duration::from_millis(get_env_u64(
                "OPSDESK_PARTICIPANT_POLL_INTERVAL_MS",
                defaults.participant_poll_interval.as_millis() as u64,
            )),
            near_top_threshold: get_env_f64(
                "OPSDESK_NEAR_TOP_THRESHOLD",
                defaults.near_top_threshold,
            ),
            event_buffer: defaults.event_buffer,
        }
    }

    /// Build a config from a settings store, falling back to defaults
    ///
    /// Recognized keys: `pollIntervalMs`, `participantPollIntervalMs`,
    /// `nearTopThreshold`.
    pub fn from_settings(store: &dyn SettingsStore) -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: store
                .get_u64("pollIntervalMs")
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            participant_poll_interval: store
                .get_u64("participantPollIntervalMs")
                .map(Duration::from_millis)
                .unwrap_or(defaults.participant_poll_interval),
            near_top_threshold: store
                .get_f64("nearTopThreshold")
                .unwrap_or(defaults.near_top_threshold),
            event_buffer: defaults.event_buffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::settings::{InMemorySettings, SettingValue};

    #[test]
    fn test_default_cadences() {
        let config = EngineConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.participant_poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_from_settings_overrides() {
        let store = InMemorySettings::new();
        store
            .set("pollIntervalMs", SettingValue::Number(250.0))
            .unwrap();
        store
            .set("nearTopThreshold", SettingValue::Number(120.0))
            .unwrap();

        let config = EngineConfig::from_settings(&store);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.near_top_threshold, 120.0);
        // Untouched keys keep their defaults
        assert_eq!(config.participant_poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_get_env_or_default() {
        assert_eq!(get_env_or("OPSDESK_TEST_UNSET_VAR", "fallback"), "fallback");
        assert_eq!(get_env_u64("OPSDESK_TEST_UNSET_VAR", 7), 7);
        assert!(get_env_bool("OPSDESK_TEST_UNSET_VAR", true));
    }
}
