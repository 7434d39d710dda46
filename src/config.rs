//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/pathbind/pathbind.toml`
//! 3. Environment variables: `PATHBIND_*` prefix

use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::cli::error::CliError;
use crate::key;

/// Default base key assumed when a template does not name one. The `$`
/// prefix keeps the sentinel out of the data property namespace.
pub const DEFAULT_BASE_KEY: &str = "$pathbind";

/// Unified configuration for pathbind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base key for template references (default: "$pathbind")
    pub base_key: String,
    /// Text rendered for values that are unset or projected away
    pub placeholder: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_key: DEFAULT_BASE_KEY.to_string(),
            placeholder: String::new(),
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect
/// "not specified", so an absent field inherits from the layer below).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub base_key: Option<String>,
    pub placeholder: Option<String>,
}

/// Get the XDG config directory for pathbind.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pathbind").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("pathbind.toml"))
}

fn load_raw_settings(path: &std::path::Path) -> Result<RawSettings, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| CliError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self: overlay wins if Some, otherwise keep.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            base_key: overlay
                .base_key
                .clone()
                .unwrap_or_else(|| self.base_key.clone()),
            placeholder: overlay
                .placeholder
                .clone()
                .unwrap_or_else(|| self.placeholder.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/pathbind/pathbind.toml`
    /// 3. Environment variables: `PATHBIND_*` prefix
    ///
    /// The effective `base_key` is validated against the key grammar, so a
    /// sloppy config fails here rather than deep inside a bind.
    pub fn load() -> Result<Self, CliError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;

        key::validate(&current.base_key).map_err(|e| CliError::Config {
            message: e.to_string(),
        })?;

        Ok(current)
    }

    /// Apply PATHBIND_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, CliError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(Environment::with_prefix("PATHBIND"));
        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("base_key") {
            settings.base_key = val;
        }
        if let Ok(val) = config.get_string("placeholder") {
            settings.placeholder = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, CliError> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# pathbind configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/pathbind/pathbind.toml
#   Env:    PATHBIND_* environment variables (explicit overrides)

# Base key assumed when a template does not name one.
# Must match the key grammar: dot-separated [A-Za-z0-9_$] segments.
# base_key = "$pathbind"

# Text rendered for values that are unset or projected away.
# placeholder = ""
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> CliError {
    CliError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_overrides_when_defaulting_then_uses_sentinel_base_key() {
        let settings = Settings::default();
        assert_eq!(settings.base_key, "$pathbind");
        assert!(settings.placeholder.is_empty());
        assert!(key::validate(&settings.base_key).is_ok());
    }

    #[test]
    fn given_overlay_when_merging_then_specified_fields_win() {
        let base = Settings::default();
        let overlay = RawSettings {
            base_key: Some("$app".to_string()),
            placeholder: None,
        };
        let merged = base.merge_with(&overlay);
        assert_eq!(merged.base_key, "$app");
        assert_eq!(merged.placeholder, base.placeholder);
    }

    #[test]
    fn given_empty_overlay_when_merging_then_keeps_base() {
        let base = Settings {
            base_key: "$app".to_string(),
            placeholder: "-".to_string(),
        };
        let merged = base.merge_with(&RawSettings::default());
        assert_eq!(merged, base);
    }

    #[test]
    fn given_template_when_generated_then_mentions_every_field() {
        let template = Settings::template();
        assert!(template.contains("base_key"));
        assert!(template.contains("placeholder"));
        // The template must itself be valid TOML (all fields commented out).
        let parsed: Result<RawSettings, _> = toml::from_str(&template);
        assert!(parsed.is_ok());
    }

    #[test]
    fn given_settings_when_serializing_then_round_trips() {
        let settings = Settings {
            base_key: "$data".to_string(),
            placeholder: "?".to_string(),
        };
        let toml_text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed, settings);
    }
}
