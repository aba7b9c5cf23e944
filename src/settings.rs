//! Persistent user preferences.
//!
//! Settings are stored at ~/.config/agentdeck/settings.toml

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User settings with defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Color handling: "auto" detects capabilities, "mono" disables color
    pub theme: String,
    /// Render loop tick interval in milliseconds
    pub tick_ms: u64,
    /// Maximum transcript entries kept before FIFO eviction
    pub history_cap: usize,
    /// Left (task list) sidebar width in columns
    pub left_width: u16,
    /// Right (context) sidebar width in columns
    pub right_width: u16,
    /// Whether both sidebars start visible
    pub sidebars_visible: bool,
    /// Show collapsible thought blocks in the transcript
    pub show_thinking: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "auto".to_string(),
            tick_ms: 16,
            history_cap: 500,
            left_width: 22,
            right_width: 28,
            sidebars_visible: true,
            show_thinking: true,
        }
    }
}

/// Errors from [`Settings::set`].
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    #[error("invalid value '{value}' for '{key}': {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

impl Settings {
    /// Get the settings file path
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to resolve config directory: not found.")?
            .join("agentdeck");
        Ok(config_dir.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;
        settings.normalize();
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    /// Clamp out-of-range values loaded from an edited file.
    fn normalize(&mut self) {
        if self.theme != "mono" {
            self.theme = "auto".to_string();
        }
        self.tick_ms = self.tick_ms.clamp(1, 1000);
        self.history_cap = self.history_cap.clamp(10, 100_000);
        self.left_width = self.left_width.clamp(12, 60);
        self.right_width = self.right_width.clamp(12, 60);
    }

    /// Set a single setting by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        match key {
            "theme" => {
                if !["auto", "mono"].contains(&value) {
                    return Err(SettingsError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        expected: "auto or mono",
                    });
                }
                self.theme = value.to_string();
            }
            "tick_ms" => {
                self.tick_ms = parse_number(key, value)?;
            }
            "history_cap" => {
                self.history_cap = parse_number(key, value)?;
            }
            "left_width" => {
                self.left_width = parse_number(key, value)?;
            }
            "right_width" => {
                self.right_width = parse_number(key, value)?;
            }
            "sidebars_visible" | "sidebars" => {
                self.sidebars_visible = parse_bool(key, value)?;
            }
            "show_thinking" | "thinking" => {
                self.show_thinking = parse_bool(key, value)?;
            }
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        self.normalize();
        Ok(())
    }

    /// Key/value listing for the `settings list` subcommand.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("theme", self.theme.clone()),
            ("tick_ms", self.tick_ms.to_string()),
            ("history_cap", self.history_cap.to_string()),
            ("left_width", self.left_width.to_string()),
            ("right_width", self.right_width.to_string()),
            ("sidebars_visible", self.sidebars_visible.to_string()),
            ("show_thinking", self.show_thinking.to_string()),
        ]
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
    value.parse().map_err(|_| SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: "a number",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.theme, "auto");
        assert!(settings.sidebars_visible);
        assert!(settings.history_cap >= 10);
    }

    #[test]
    fn set_accepts_known_keys() {
        let mut settings = Settings::default();
        settings.set("theme", "mono").unwrap();
        assert_eq!(settings.theme, "mono");
        settings.set("sidebars", "off").unwrap();
        assert!(!settings.sidebars_visible);
        settings.set("tick_ms", "50").unwrap();
        assert_eq!(settings.tick_ms, 50);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.set("no_such", "1"),
            Err(SettingsError::UnknownKey(_))
        ));
        assert!(matches!(
            settings.set("theme", "rainbow"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings.set("tick_ms", "fast"),
            Err(SettingsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn normalize_clamps_hostile_values() {
        let mut settings = Settings {
            tick_ms: 0,
            history_cap: 1,
            left_width: 2,
            right_width: 500,
            theme: "disco".into(),
            ..Settings::default()
        };
        settings.normalize();
        assert_eq!(settings.tick_ms, 1);
        assert_eq!(settings.history_cap, 10);
        assert_eq!(settings.left_width, 12);
        assert_eq!(settings.right_width, 60);
        assert_eq!(settings.theme, "auto");
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let mut settings = Settings::default();
        settings.set("history_cap", "250").unwrap();
        let text = toml::to_string_pretty(&settings).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back.history_cap, 250);
        assert_eq!(back.theme, settings.theme);
    }
}
