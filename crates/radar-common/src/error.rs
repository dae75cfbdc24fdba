//! Error types shared across the radar processing crates.

use thiserror::Error;

/// Result type alias using RadarError.
pub type RadarResult<T> = Result<T, RadarError>;

/// Primary error type for radar processing operations.
#[derive(Debug, Error)]
pub enum RadarError {
    // === Data Errors ===
    #[error("No data available: {0}")]
    MissingData(String),

    #[error("Malformed scan: {0}")]
    MalformedScan(String),

    #[error("Transient I/O failure: {0}")]
    TransientIo(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    // === Attribute Errors ===
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    #[error("Type mismatch for attribute '{attribute}': expected {expected}")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
    },

    // === Storage Errors ===
    #[error("Cache error: {0}")]
    CacheError(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl RadarError {
    /// Whether the error means "no usable data for this unit of work".
    ///
    /// The processing pipeline treats these as a skip, not a failure: a
    /// missing elevation or an unreadable file never aborts the volume.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            RadarError::MissingData(_)
                | RadarError::MalformedScan(_)
                | RadarError::TransientIo(_)
        )
    }
}

impl From<std::io::Error> for RadarError {
    fn from(err: std::io::Error) -> Self {
        RadarError::TransientIo(err.to_string())
    }
}

impl From<serde_json::Error> for RadarError {
    fn from(err: serde_json::Error) -> Self {
        RadarError::InternalError(format!("JSON error: {}", err))
    }
}
