//! Configuration management for regform.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::backend::PickerOptions;
use crate::error::{Error, Result};

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "REGFORM_";

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "regform";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "records.db";

/// Default photo directory name, inside the data directory.
const PHOTO_DIR_NAME: &str = "photos";

/// Five mebibytes.
const DEFAULT_MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `REGFORM_`, `__` between sections)
/// 2. TOML config file at `~/.config/regform/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record storage configuration.
    pub storage: StorageConfig,
    /// Photo handling configuration.
    pub photos: PhotoConfig,
    /// Form behaviour configuration.
    pub form: FormConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/regform/records.db`
    pub database_path: Option<PathBuf>,
    /// Collection registrant records are written to.
    pub collection: String,
}

/// Photo-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoConfig {
    /// Directory photos are copied into.
    /// Defaults to `~/.local/share/regform/photos`
    pub directory: Option<PathBuf>,
    /// Largest accepted photo in bytes.
    pub max_bytes: u64,
    /// Accepted MIME types (compared case-insensitively).
    pub allowed_types: Vec<String>,
    /// JPEG quality requested from the picker.
    pub quality: f32,
    /// Maximum width requested from the picker.
    pub max_width: u32,
    /// Maximum height requested from the picker.
    pub max_height: u32,
}

/// How full-form validation reports problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Stop at the first failing field.
    FirstError,
    /// Report every failing field and focus the first one.
    #[default]
    AllErrors,
}

/// Form behaviour configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Validation reporting mode.
    pub validation_mode: ValidationMode,
    /// Reject names that do not start with an uppercase letter while typing.
    pub require_capital_initial: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            collection: "users".to_string(),
        }
    }
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            directory: None,
            max_bytes: DEFAULT_MAX_PHOTO_BYTES,
            allowed_types: default_allowed_types(),
            quality: 0.8,
            max_width: 1000,
            max_height: 1000,
        }
    }
}

/// Default accepted photo MIME types.
fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/jpg".to_string(),
        "image/png".to_string(),
    ]
}

impl PhotoConfig {
    /// Picker options derived from this configuration.
    #[must_use]
    pub fn picker_options(&self) -> PickerOptions {
        PickerOptions {
            quality: self.quality,
            max_width: self.max_width,
            max_height: self.max_height,
            ..PickerOptions::default()
        }
    }

    /// Whether `mime` is an accepted photo type.
    #[must_use]
    pub fn allows_type(&self, mime: &str) -> bool {
        self.allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime.trim()))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::extract(Self::figment(&config_file, Env::prefixed(ENV_PREFIX)))
    }

    /// Layer defaults, the TOML file and `env`, lowest precedence first.
    ///
    /// The file's `[storage]`, `[photos]` and `[form]` tables merge into
    /// the default profile.
    fn figment(config_file: &Path, env: Env) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(env.split("__"))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.collection.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage.collection must not be empty".to_string(),
            });
        }

        if self.photos.max_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "photos.max_bytes must be greater than 0".to_string(),
            });
        }

        if self.photos.allowed_types.is_empty() {
            return Err(Error::ConfigValidation {
                message: "photos.allowed_types must list at least one MIME type".to_string(),
            });
        }

        if !(self.photos.quality > 0.0 && self.photos.quality <= 1.0) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "photos.quality ({}) must be in the range (0, 1]",
                    self.photos.quality
                ),
            });
        }

        if self.photos.max_width == 0 || self.photos.max_height == 0 {
            return Err(Error::ConfigValidation {
                message: "photos.max_width and photos.max_height must be greater than 0"
                    .to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the photo directory, resolving defaults if not set.
    #[must_use]
    pub fn photo_dir(&self) -> PathBuf {
        self.photos
            .directory
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(PHOTO_DIR_NAME))
    }
}
