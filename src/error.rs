//! Error types for the rig

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, RigError>;

/// Errors raised by the controller, the vision pipeline and their collaborators
///
/// Missed detections are not errors; they are reported as `None`.
#[derive(Debug, Error)]
pub enum RigError {
    /// Controller options failed validation
    #[error("Invalid controller options: {0}")]
    InvalidOptions(String),

    /// Another controller already owns the active window
    #[error("Another input controller is already active")]
    MultipleControllers,

    /// Color tolerances or mask input rejected
    #[error("Invalid color spec: {0}")]
    InvalidColorSpec(String),

    /// Parameter file exists but could not be parsed
    #[error("Failed to read parameters from {path}: {reason}")]
    ParamRead { path: PathBuf, reason: String },

    /// A required file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// An image with zero width or height was supplied
    #[error("Image is empty")]
    EmptyImage,

    /// Circle search range is inverted
    #[error("Invalid radius range: min {min} > max {max}")]
    InvalidRadiusRange { min: u32, max: u32 },

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Frame acquisition failed
    #[error("Capture error: {0}")]
    Capture(String),

    /// Capture worker is already running
    #[error("Capture already running")]
    AlreadyRunning,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RigError {
    /// Build a parameter read error for the given path
    pub fn param_read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RigError::ParamRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Map an IO error on `path`, keeping missing files distinguishable
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            RigError::FileNotFound(path.into())
        } else {
            RigError::Io(err)
        }
    }

    /// Whether this is a configuration error (bad options or parameter files)
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RigError::InvalidOptions(_)
                | RigError::InvalidColorSpec(_)
                | RigError::ParamRead { .. }
                | RigError::Config(_)
                | RigError::InvalidRadiusRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct() {
        let err = RigError::from_io(
            "missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, RigError::FileNotFound(_)));
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_other_io_errors_pass_through() {
        let err = RigError::from_io(
            "locked.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, RigError::Io(_)));
    }

    #[test]
    fn test_json_errors_convert() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: RigError = json_err.into();
        assert!(matches!(err, RigError::Json(_)));
        assert!(err.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_display() {
        let err = RigError::param_read("params.txt", "expected 6 integers, found 5");
        let s = err.to_string();
        assert!(s.contains("params.txt"));
        assert!(s.contains("expected 6 integers"));
        assert!(err.is_config_error());
    }
}
