//! Error types for the rendering pipeline.

use thiserror::Error;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

/// Boxed error raised by an external feature source.
pub type BoxedSourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Primary error type for style, projection and rendering operations.
#[derive(Debug, Error)]
pub enum MapError {
    // === Input Errors ===
    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    #[error("Unsupported projection: {0}")]
    UnsupportedProjection(String),

    #[error("Invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    // === Collaborator Errors ===
    /// Raised by a [`FeatureSource`](crate::FeatureSource); the inner error is
    /// kept as-is so callers can downcast it.
    #[error("Feature source error: {0}")]
    FeatureSource(#[source] BoxedSourceError),

    // === Pipeline Errors ===
    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MapError {
    /// Wrap an error raised by a feature source.
    pub fn feature_source<E>(err: E) -> Self
    where
        E: Into<BoxedSourceError>,
    {
        MapError::FeatureSource(err.into())
    }

    /// Stable machine-readable name for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            MapError::InvalidStyle(_) => "InvalidStyle",
            MapError::UnsupportedProjection(_) => "UnsupportedProjection",
            MapError::InvalidSize { .. } => "InvalidSize",
            MapError::InvalidExtent(_) => "InvalidExtent",
            MapError::FeatureSource(_) => "FeatureSource",
            MapError::Projection(_) => "ProjectionError",
            MapError::Encode(_) => "EncodeError",
            MapError::Config(_) => "ConfigError",
            MapError::Io(_) => "IoError",
        }
    }

    /// Whether retrying the same call could succeed.
    ///
    /// Only feature source failures can be transient; everything else is a
    /// caller or input error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MapError::FeatureSource(_))
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::InvalidStyle(format!("JSON error: {}", err))
    }
}
