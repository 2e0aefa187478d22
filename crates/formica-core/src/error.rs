//! Error types for Formica operations.
//!
//! The simulation itself never fails: out-of-range reads see solid rock and
//! starvation is a state transition. Errors only surface at the edges, when
//! a checkpoint or a configuration document cannot be understood.

use thiserror::Error;

/// Result type for Formica operations.
pub type Result<T> = std::result::Result<T, FormicaError>;

/// Errors that can occur during Formica operations.
#[derive(Debug, Error)]
pub enum FormicaError {
    /// Checkpoint decoding errors.
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
    /// Configuration errors.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons a checkpoint cannot be turned back into a colony.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckpointError {
    /// Terrain blob is not valid base64.
    #[error("terrain blob could not be decoded: {0}")]
    TerrainDecode(String),
    /// Terrain blob decoded to the wrong number of cells.
    #[error("terrain has {found} cells, expected {expected}")]
    TerrainSize { expected: usize, found: usize },
    /// Grid dimensions are zero or missing.
    #[error("invalid grid dimensions {cols}x{rows}")]
    Dimensions { cols: usize, rows: usize },
    /// Document is not a checkpoint at all.
    #[error("malformed checkpoint: {0}")]
    Malformed(String),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid value for a field.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<base64::DecodeError> for CheckpointError {
    fn from(e: base64::DecodeError) -> Self {
        CheckpointError::TerrainDecode(e.to_string())
    }
}

impl FormicaError {
    /// Create an invalid config error.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FormicaError::Config(ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Create a malformed checkpoint error.
    pub fn malformed_checkpoint(msg: impl Into<String>) -> Self {
        FormicaError::Checkpoint(CheckpointError::Malformed(msg.into()))
    }

    /// Whether this error means "no usable checkpoint" rather than an I/O failure.
    pub fn is_checkpoint_rejection(&self) -> bool {
        matches!(self, FormicaError::Checkpoint(_) | FormicaError::Serialization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = FormicaError::Checkpoint(CheckpointError::TerrainSize { expected: 10, found: 4 });
        assert_eq!(err.to_string(), "Checkpoint error: terrain has 4 cells, expected 10");
    }

    #[test]
    fn invalid_config_constructor() {
        let err = FormicaError::invalid_config("cols", "must be at least 8");
        assert!(err.to_string().contains("cols"));
        assert!(!err.is_checkpoint_rejection());
    }

    #[test]
    fn base64_errors_become_terrain_decode() {
        let err: CheckpointError = base64::DecodeError::InvalidLength(3).into();
        assert!(matches!(err, CheckpointError::TerrainDecode(_)));
    }
}
