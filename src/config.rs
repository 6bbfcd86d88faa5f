//! User configuration, read from `<config dir>/pinsnap/config.toml`.
//!
//! A missing file means defaults. A broken file is reported by `main` and
//! also means defaults; it never stops the app from starting.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_HOTKEY: &str = "ctrl+shift+KeyA";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global shortcut that starts a capture, in global-hotkey syntax.
    /// Empty or absent disables it.
    pub hotkey: Option<String>,
    /// Default `env_logger` filter; `RUST_LOG` still wins.
    pub log_level: String,
    /// Whether new pinned captures show their toolbar.
    pub show_toolbar: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hotkey: Some(DEFAULT_HOTKEY.to_string()),
            log_level: "info".to_string(),
            show_toolbar: true,
        }
    }
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pinsnap").join("config.toml"))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Loads the user config. A missing file gives defaults; a file that
    /// cannot be read or parsed is an error the caller reports.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// The hotkey to register, if any.
    pub fn hotkey(&self) -> Option<&str> {
        self.hotkey.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            hotkey = "alt+KeyS"
            show_toolbar = false
            "#,
        )
        .unwrap();
        assert_eq!(config.hotkey(), Some("alt+KeyS"));
        assert!(!config.show_toolbar);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn blank_hotkey_disables_it() {
        let config = Config::from_toml_str("hotkey = \"  \"").unwrap();
        assert_eq!(config.hotkey(), None);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let result = Config::from_toml_str("show_toolbar = maybe");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
