//! Application error types.

use std::fmt;

use crate::acquisition::SpawnError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::export::ExportError;
use crate::provider::FetchError;
use crate::session::NavigationError;
use crate::transform::TransformError;

/// Errors surfaced by [`super::ViewerContext`].
///
/// Per-item acquisition failures never appear here; they are recorded on the
/// records themselves.
#[derive(Debug)]
pub enum AppError {
    /// Failed to load the catalog.
    Catalog(CatalogError),

    /// Failed to read or apply configuration.
    Config(ConfigError),

    /// Failed to build the HTTP client.
    HttpClient(FetchError),

    /// A background pass could not be started.
    WorkerSpawn(SpawnError),

    /// A navigation precondition was not met.
    Navigation(NavigationError),

    /// The active image could not be rendered.
    Transform(TransformError),

    /// The active image could not be saved.
    Export(ExportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Catalog(e) => write!(f, "Catalog error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            AppError::WorkerSpawn(e) => write!(f, "{}", e),
            AppError::Navigation(e) => write!(f, "{}", e),
            AppError::Transform(e) => write!(f, "{}", e),
            AppError::Export(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Catalog(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::HttpClient(e) => Some(e),
            AppError::WorkerSpawn(e) => Some(e),
            AppError::Navigation(e) => Some(e),
            AppError::Transform(e) => Some(e),
            AppError::Export(e) => Some(e),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        AppError::Catalog(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<SpawnError> for AppError {
    fn from(e: SpawnError) -> Self {
        AppError::WorkerSpawn(e)
    }
}

impl From<NavigationError> for AppError {
    fn from(e: NavigationError) -> Self {
        AppError::Navigation(e)
    }
}

impl From<TransformError> for AppError {
    fn from(e: TransformError) -> Self {
        AppError::Transform(e)
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Export(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Navigation(NavigationError::NoLoadedItems {
            collection: "Window 2".to_string(),
        });
        assert_eq!(err.to_string(), "No images available in Window 2");

        let err = AppError::Config(ConfigError::UnknownKey("viewer.x".to_string()));
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("viewer.x"));
    }

    #[test]
    fn test_app_error_from_spawn_error() {
        let err: AppError = SpawnError::PassInProgress.into();
        assert!(matches!(err, AppError::WorkerSpawn(_)));
        assert_eq!(err.to_string(), "An acquisition pass is already running");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_app_error_from_transform_error() {
        let err: AppError = TransformError::ViewportNotReady {
            width: 0,
            height: 0,
        }
        .into();
        assert!(matches!(err, AppError::Transform(_)));
    }
}
