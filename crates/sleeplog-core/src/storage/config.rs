//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Patient details the SRT floor depends on
//! - Timeline grid layout
//! - SRT window and fixed wake time
//! - Display theme
//!
//! Configuration is stored at `~/.config/sleeplog/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::srt::Window;
use crate::time::parse_clock_time;

/// Patient details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientConfig {
    #[serde(default)]
    pub name: String,
    /// Years; 65 and over raises the SRT safety floor
    #[serde(default = "default_age")]
    pub age: u32,
}

/// Timeline grid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Hour the 24-hour axis starts at
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    /// Spacing of grid columns, minutes
    #[serde(default = "default_resolution_min")]
    pub resolution_min: u32,
}

/// Sleep restriction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrtConfig {
    /// Nights averaged: a count, or "all"
    #[serde(default = "default_window")]
    pub window: String,
    #[serde(default = "default_fixed_wake_time")]
    pub fixed_wake_time: String,
}

/// UI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/sleeplog/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub patient: PatientConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub srt: SrtConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

fn default_age() -> u32 {
    30
}
fn default_start_hour() -> u32 {
    crate::timeline::DEFAULT_GRID_START_HOUR
}
fn default_resolution_min() -> u32 {
    30
}
fn default_window() -> String {
    Window::default().to_string()
}
fn default_fixed_wake_time() -> String {
    "06:00".into()
}
fn default_theme() -> String {
    "dark".into()
}

impl Default for PatientConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: default_age(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start_hour: default_start_hour(),
            resolution_min: default_resolution_min(),
        }
    }
}

impl Default for SrtConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            fixed_wake_time: default_fixed_wake_time(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

impl SrtConfig {
    /// The configured window.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] if `window` is not a positive
    /// count or "all".
    pub fn window(&self) -> Result<Window, ConfigError> {
        self.window.parse().map_err(|e| ConfigError::InvalidValue {
            key: "srt.window".to_string(),
            message: format!("{e}"),
        })
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        for part in parents.into_iter().flat_map(|p| p.split('.')) {
            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else {
                    return Err(invalid(format!("cannot parse '{value}' as a whole number")));
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(invalid("cannot replace a whole section".to_string()));
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default config first if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// [`Config::load`] against an explicit file.
    ///
    /// # Errors
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config found, writing defaults");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// [`Config::save`] to an explicit file.
    ///
    /// # Errors
    /// See [`Config::save`].
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Every leaf setting as `(dot.key, value)`, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Set a config value by dot-separated key, in memory.
    ///
    /// The caller persists with [`Config::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails [`Config::validate`]. `self` is left untouched
    /// on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check values the rest of the crate relies on.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.start_hour > 23 {
            return Err(ConfigError::InvalidValue {
                key: "grid.start_hour".to_string(),
                message: format!("expected an hour 0-23, got {}", self.grid.start_hour),
            });
        }
        if self.grid.resolution_min == 0 || 60 % self.grid.resolution_min != 0 {
            return Err(ConfigError::InvalidValue {
                key: "grid.resolution_min".to_string(),
                message: format!("expected a divisor of 60, got {}", self.grid.resolution_min),
            });
        }
        parse_clock_time(&self.srt.fixed_wake_time).map_err(|e| ConfigError::InvalidValue {
            key: "srt.fixed_wake_time".to_string(),
            message: e.to_string(),
        })?;
        self.srt.window()?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
