//! Settings types and the settings store abstraction
//!
//! Cross-session memory (last active conversation, cadence overrides)
//! goes through an injected [`SettingsStore`] with typed get/set and an
//! explicit lifecycle: loaded once at session start, persisted on every
//! change. No component reads ambient global state.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Setting value variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// String value
    String(String),
    /// Boolean value
    Bool(bool),
    /// Number value
    Number(f64),
    /// Null value
    Null,
    /// Complex value
    Object(serde_json::Value),
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::String(s)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::String(s.to_string())
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Bool(b)
    }
}

impl From<f64> for SettingValue {
    fn from(n: f64) -> Self {
        SettingValue::Number(n)
    }
}

impl From<SettingValue> for serde_json::Value {
    fn from(val: SettingValue) -> Self {
        match val {
            SettingValue::String(s) => serde_json::Value::String(s),
            SettingValue::Bool(b) => serde_json::Value::Bool(b),
            SettingValue::Number(n) => serde_json::Value::Number(
                serde_json::Number::from_f64(n).unwrap_or(serde_json::Number::from(0)),
            ),
            SettingValue::Null => serde_json::Value::Null,
            SettingValue::Object(o) => o,
        }
    }
}

/// Typed settings store with an explicit lifecycle
///
/// `load` runs once at session start; `set` persists immediately.
pub trait SettingsStore: Send + Sync {
    /// Load persisted settings into memory
    fn load(&self) -> Result<()>;

    /// Get a raw setting value
    fn get(&self, key: &str) -> Option<SettingValue>;

    /// Set and persist a setting value
    fn set(&self, key: &str, value: SettingValue) -> Result<()>;

    /// Get a string setting
    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(SettingValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Get a boolean setting
    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(SettingValue::Bool(b)) => Some(b),
            _ => None,
        }
    }

    /// Get a numeric setting as f64
    fn get_f64(&self, key: &str) -> Option<f64> {
        match self.get(key) {
            Some(SettingValue::Number(n)) => Some(n),
            _ => None,
        }
    }

    /// Get a numeric setting as u64, rejecting negatives and NaN
    fn get_u64(&self, key: &str) -> Option<u64> {
        self.get_f64(key)
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n as u64)
    }
}

/// In-memory settings store
///
/// Persistence is the map itself; a durable implementation would write
/// through to disk or a backend in `set`.
#[derive(Default)]
pub struct InMemorySettings {
    values: RwLock<HashMap<String, SettingValue>>,
}

impl InMemorySettings {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with initial values
    pub fn with_values(values: HashMap<String, SettingValue>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }
}

impl SettingsStore for InMemorySettings {
    fn load(&self) -> Result<()> {
        Ok(())
    }

    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: SettingValue) -> Result<()> {
        self.values.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_value_from_str() {
        let val: SettingValue = "test".into();
        match val {
            SettingValue::String(s) => assert_eq!(s, "test"),
            _ => panic!("Expected String variant"),
        }
    }

    #[test]
    fn test_typed_get_set_roundtrip() {
        let store = InMemorySettings::new();
        store.load().unwrap();

        store.set("lastActiveConversation", "abc".into()).unwrap();
        store.set("pollIntervalMs", SettingValue::Number(1500.0)).unwrap();
        store.set("compactMode", true.into()).unwrap();

        assert_eq!(
            store.get_string("lastActiveConversation").as_deref(),
            Some("abc")
        );
        assert_eq!(store.get_u64("pollIntervalMs"), Some(1500));
        assert_eq!(store.get_bool("compactMode"), Some(true));
        assert_eq!(store.get_string("missing"), None);
    }

    #[test]
    fn test_get_u64_rejects_negative() {
        let store = InMemorySettings::new();
        store.set("n", SettingValue::Number(-4.0)).unwrap();
        assert_eq!(store.get_u64("n"), None);
    }
}
