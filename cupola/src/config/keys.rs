//! Addressing single settings as `section.key` strings.

use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};

/// Every setting that can be read or written from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    AcquisitionMaxAttempts,
    AcquisitionRetryDelayMs,
    AcquisitionTimeoutSecs,
    AcquisitionUserAgent,
    ViewerViewportMargin,
    ViewerSlideshowIntervalMs,
    ViewerSaveDirectory,
    LoggingLevel,
    LoggingDirectory,
    CatalogPath,
}

const ALL_KEYS: [ConfigKey; 10] = [
    ConfigKey::AcquisitionMaxAttempts,
    ConfigKey::AcquisitionRetryDelayMs,
    ConfigKey::AcquisitionTimeoutSecs,
    ConfigKey::AcquisitionUserAgent,
    ConfigKey::ViewerViewportMargin,
    ConfigKey::ViewerSlideshowIntervalMs,
    ConfigKey::ViewerSaveDirectory,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingDirectory,
    ConfigKey::CatalogPath,
];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ConfigKey {
    /// All keys, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    pub fn section(&self) -> &'static str {
        match self {
            Self::AcquisitionMaxAttempts
            | Self::AcquisitionRetryDelayMs
            | Self::AcquisitionTimeoutSecs
            | Self::AcquisitionUserAgent => "acquisition",
            Self::ViewerViewportMargin
            | Self::ViewerSlideshowIntervalMs
            | Self::ViewerSaveDirectory => "viewer",
            Self::LoggingLevel | Self::LoggingDirectory => "logging",
            Self::CatalogPath => "catalog",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            Self::AcquisitionMaxAttempts => "max_attempts",
            Self::AcquisitionRetryDelayMs => "retry_delay_ms",
            Self::AcquisitionTimeoutSecs => "timeout_secs",
            Self::AcquisitionUserAgent => "user_agent",
            Self::ViewerViewportMargin => "viewport_margin",
            Self::ViewerSlideshowIntervalMs => "slideshow_interval_ms",
            Self::ViewerSaveDirectory => "save_directory",
            Self::LoggingLevel => "level",
            Self::LoggingDirectory => "directory",
            Self::CatalogPath => "path",
        }
    }

    /// Current value as text; empty when an optional setting is unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::AcquisitionMaxAttempts => config.acquisition.max_attempts.to_string(),
            Self::AcquisitionRetryDelayMs => config.acquisition.retry_delay_ms.to_string(),
            Self::AcquisitionTimeoutSecs => config.acquisition.timeout_secs.to_string(),
            Self::AcquisitionUserAgent => config.acquisition.user_agent.clone(),
            Self::ViewerViewportMargin => config.viewer.viewport_margin.to_string(),
            Self::ViewerSlideshowIntervalMs => config.viewer.slideshow_interval_ms.to_string(),
            Self::ViewerSaveDirectory => display_path(&config.viewer.save_directory),
            Self::LoggingLevel => config.logging.level.clone(),
            Self::LoggingDirectory => display_path(&config.logging.directory),
            Self::CatalogPath => display_path(&config.catalog.path),
        }
    }

    /// Validates `value` and stores it. An empty value clears optional paths.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            Self::AcquisitionMaxAttempts => {
                let attempts: u32 = self.parse_number(value)?;
                if attempts == 0 {
                    return Err(self.invalid(value, "must be at least 1"));
                }
                config.acquisition.max_attempts = attempts;
            }
            Self::AcquisitionRetryDelayMs => {
                config.acquisition.retry_delay_ms = self.parse_number(value)?;
            }
            Self::AcquisitionTimeoutSecs => {
                let secs: u64 = self.parse_number(value)?;
                if secs == 0 {
                    return Err(self.invalid(value, "must be at least 1"));
                }
                config.acquisition.timeout_secs = secs;
            }
            Self::AcquisitionUserAgent => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.acquisition.user_agent = value.to_string();
            }
            Self::ViewerViewportMargin => {
                config.viewer.viewport_margin = self.parse_number(value)?;
            }
            Self::ViewerSlideshowIntervalMs => {
                let ms: u64 = self.parse_number(value)?;
                if ms == 0 {
                    return Err(self.invalid(value, "must be at least 1"));
                }
                config.viewer.slideshow_interval_ms = ms;
            }
            Self::ViewerSaveDirectory => config.viewer.save_directory = optional_path(value),
            Self::LoggingLevel => {
                let level = value.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(self.invalid(value, "expected trace, debug, info, warn or error"));
                }
                config.logging.level = level;
            }
            Self::LoggingDirectory => config.logging.directory = optional_path(value),
            Self::CatalogPath => config.catalog.path = optional_path(value),
        }
        Ok(())
    }

    fn parse_number<T: FromStr>(&self, value: &str) -> Result<T, ConfigError> {
        value
            .parse()
            .map_err(|_| self.invalid(value, "expected a non-negative integer"))
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}
