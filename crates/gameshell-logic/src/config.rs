//! Overlay configuration.
//!
//! Which key opens the pause menu, which key cancels it, and whether held
//! keys (auto-repeat) count as presses. Loaded from JSON and/or command-line
//! flags, then validated.
//!
//! ```
//! use gameshell_logic::config::{validate_config, OverlayConfig};
//!
//! let config = OverlayConfig::from_json_str(r#"{ "open_key": "KeyP" }"#).unwrap();
//! assert_eq!(config.cancel_key, "Escape");
//! assert!(validate_config(&config).is_empty());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::keys;
use crate::overlay::PauseOverlay;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Key that dismisses the open overlay (fires `on_resume`).
    pub cancel_key: String,
    /// Key the host listens for to open the overlay while closed.
    pub open_key: String,
    /// Drop auto-repeat presses from held keys.
    pub ignore_repeats: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            cancel_key: keys::ESCAPE.to_string(),
            open_key: keys::ESCAPE.to_string(),
            ignore_repeats: true,
        }
    }
}

impl OverlayConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Build from process arguments: `--config <file>` first, then
    /// `--cancel-key`, `--open-key` and `--allow-repeats` overrides.
    pub fn from_args() -> Result<Self, ConfigLoadError> {
        let args: Vec<String> = std::env::args().collect();
        Self::from_arg_list(&args)
    }

    pub fn from_arg_list(args: &[String]) -> Result<Self, ConfigLoadError> {
        let mut config = match find_flag(args, &["--config", "-c"]) {
            Some(path) => Self::load(Path::new(path))?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validated()
    }

    /// Apply flag overrides. Unknown arguments are ignored.
    pub fn apply_args(&mut self, args: &[String]) {
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--cancel-key" if i + 1 < args.len() => {
                    self.cancel_key = args[i + 1].clone();
                    i += 2;
                }
                "--open-key" if i + 1 < args.len() => {
                    self.open_key = args[i + 1].clone();
                    i += 2;
                }
                "--allow-repeats" => {
                    self.ignore_repeats = false;
                    i += 1;
                }
                _ => i += 1,
            }
        }
    }

    pub fn overlay(&self) -> PauseOverlay {
        PauseOverlay::new(self.cancel_key.as_str())
    }

    fn validated(self) -> Result<Self, ConfigLoadError> {
        let errors = validate_config(&self);
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigLoadError::Invalid(errors))
        }
    }
}

fn find_flag<'a>(args: &'a [String], names: &[&str]) -> Option<&'a str> {
    // args[0] is the program name
    args.iter()
        .skip(1)
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 2))
        .map(String::as_str)
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyCancelKey,
    EmptyOpenKey,
    /// Not a key identifier any host delivers.
    UnknownKey(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyCancelKey => write!(f, "cancel key is empty"),
            ConfigError::EmptyOpenKey => write!(f, "open key is empty"),
            ConfigError::UnknownKey(k) => write!(f, "unknown key '{}'", k),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate an overlay configuration, returning all errors found.
pub fn validate_config(config: &OverlayConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.cancel_key.trim().is_empty() {
        errors.push(ConfigError::EmptyCancelKey);
    } else if !keys::is_known_key(&config.cancel_key) {
        errors.push(ConfigError::UnknownKey(config.cancel_key.clone()));
    }

    if config.open_key.trim().is_empty() {
        errors.push(ConfigError::EmptyOpenKey);
    } else if !keys::is_known_key(&config.open_key) {
        errors.push(ConfigError::UnknownKey(config.open_key.clone()));
    }

    errors
}

/// Errors that can occur while loading a configuration
#[derive(Debug)]
pub enum ConfigLoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(Vec<ConfigError>),
}

impl From<std::io::Error> for ConfigLoadError {
    fn from(e: std::io::Error) -> Self {
        ConfigLoadError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigLoadError {
    fn from(e: serde_json::Error) -> Self {
        ConfigLoadError::Json(e)
    }
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadError::Io(e) => write!(f, "IO error: {}", e),
            ConfigLoadError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigLoadError::Invalid(errors) => {
                let list: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "invalid config: {}", list.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigLoadError::Io(e) => Some(e),
            ConfigLoadError::Json(e) => Some(e),
            ConfigLoadError::Invalid(_) => None,
        }
    }
}
