//! Typed view of the INI configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use tracing::warn;

use super::{config_file_path, ConfigError, ConfigKey};
use crate::acquisition::{
    RetryPolicy, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS,
};
use crate::provider::DEFAULT_USER_AGENT;
use crate::session::DEFAULT_SLIDESHOW_INTERVAL_MS;
use crate::transform::DEFAULT_VIEWPORT_MARGIN;

/// Log level used when neither `RUST_LOG` nor the config file sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// `[acquisition]` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcquisitionConfig {
    /// Attempts per item during the initial pass.
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds.
    pub retry_delay_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl AcquisitionConfig {
    /// Retry policy for the initial acquisition pass.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[viewer]` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Pixels kept free around the image when fitting it to the viewport.
    pub viewport_margin: u32,
    pub slideshow_interval_ms: u64,
    /// Where saved images go; the working directory when unset.
    pub save_directory: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            viewport_margin: DEFAULT_VIEWPORT_MARGIN,
            slideshow_interval_ms: DEFAULT_SLIDESHOW_INTERVAL_MS,
            save_directory: None,
        }
    }
}

impl ViewerConfig {
    pub fn slideshow_interval(&self) -> Duration {
        Duration::from_millis(self.slideshow_interval_ms)
    }

    pub fn save_directory(&self) -> PathBuf {
        self.save_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// `[logging]` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Directory for daily rolling log files; stderr only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// `[catalog]` section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogConfig {
    /// JSON catalog file; the built-in catalog when unset.
    pub path: Option<PathBuf>,
}

/// The whole configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub acquisition: AcquisitionConfig,
    pub viewer: ViewerConfig,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
}

impl ConfigFile {
    /// Loads the file at [`config_file_path`], or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads the file at `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parses INI text.
    ///
    /// Every value goes through the same validation as `config set`; values
    /// that fail it are skipped with a warning and the default is kept.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        for key in ConfigKey::all() {
            let Some(raw) = non_empty(ini.get_from(Some(key.section()), key.key_name())) else {
                continue;
            };
            if let Err(e) = key.set(&mut config, raw) {
                warn!(
                    key = %key.name(),
                    error = %e,
                    "Ignoring invalid config value; using default"
                );
            }
        }

        Ok(config)
    }

    /// Writes the configuration to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        self.to_ini().write_to_file(path).map_err(io_error)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        let a = &self.acquisition;
        ini.with_section(Some("acquisition"))
            .set("max_attempts", a.max_attempts.to_string())
            .set("retry_delay_ms", a.retry_delay_ms.to_string())
            .set("timeout_secs", a.timeout_secs.to_string())
            .set("user_agent", a.user_agent.as_str());

        let v = &self.viewer;
        ini.with_section(Some("viewer"))
            .set("viewport_margin", v.viewport_margin.to_string())
            .set("slideshow_interval_ms", v.slideshow_interval_ms.to_string())
            .set("save_directory", path_value(&v.save_directory));

        ini.with_section(Some("logging"))
            .set("level", self.logging.level.as_str())
            .set("directory", path_value(&self.logging.directory));

        ini.with_section(Some("catalog"))
            .set("path", path_value(&self.catalog.path));
        ini
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn path_value(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}
