//! Directory configuration loaded once at process start.
//!
//! # Responsibility
//! - Resolve the minimum allowed age and hardening switches.
//! - Layer sources: defaults, then TOML file, then environment.
//!
//! # Invariants
//! - A resolved `DirectoryConfig` is immutable for the process lifetime;
//!   the service copies it at construction.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment override for `min_allowed_age`.
pub const ENV_MIN_AGE_ALLOWED: &str = "PERSONDIR_MIN_AGE_ALLOWED";
/// Environment override for `reject_duplicate_email`.
pub const ENV_REJECT_DUPLICATE_EMAIL: &str = "PERSONDIR_REJECT_DUPLICATE_EMAIL";

const DEFAULT_MIN_ALLOWED_AGE: u32 = 18;

/// Error raised while resolving configuration.
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidEnv { name: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::InvalidEnv { name, value } => {
                write!(f, "invalid value `{value}` for environment variable {name}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidEnv { .. } => None,
        }
    }
}

/// Runtime settings for the directory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Minimum age in whole years required to register or change birth date.
    #[serde(alias = "minAgeAllowed")]
    pub min_allowed_age: u32,
    /// Rejects `register` when the email is already stored.
    ///
    /// Off by default: the directory historically accepts duplicate emails.
    pub reject_duplicate_email: bool,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            min_allowed_age: DEFAULT_MIN_ALLOWED_AGE,
            reject_duplicate_email: false,
        }
    }
}

impl DirectoryConfig {
    pub fn with_min_allowed_age(min_allowed_age: u32) -> Self {
        Self {
            min_allowed_age,
            ..Self::default()
        }
    }

    /// Parses TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads and parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves configuration from an optional file and the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.apply_env_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides read through `lookup`, keyed by env var name.
    pub fn apply_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MIN_AGE_ALLOWED) {
            self.min_allowed_age = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_MIN_AGE_ALLOWED,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_REJECT_DUPLICATE_EMAIL) {
            self.reject_duplicate_email =
                parse_flag(&value).ok_or_else(|| ConfigError::InvalidEnv {
                    name: ENV_REJECT_DUPLICATE_EMAIL,
                    value: value.clone(),
                })?;
        }
        Ok(self)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
