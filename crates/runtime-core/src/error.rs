//! Error types for checkpoint resume and weight initialization

use thiserror::Error;

/// Result type alias using the runtime Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for checkpoint discovery and state dict reconciliation
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // Checkpoint folder errors
    #[error("Malformed checkpoint filename: {filename} ({reason})")]
    MalformedCheckpointName { filename: String, reason: String },

    // State dict errors
    #[error("Unknown state dict key: {key}")]
    MissingStateDictKey { key: String },

    #[error("Unexpected value at state dict key {key}: expected {expected}")]
    UnexpectedStateValue { key: String, expected: String },

    #[error(
        "State dict is not compatible with the model: layer {layer} matches neither \
         the trunk nor the head prefix. Please set MODEL.PARAMS_FILE.APPEND_PREFIX and \
         MODEL.PARAMS_FILE.REMOVE_PREFIX for making model compatible. \
         Expected trunk prefix: {expected_trunk_prefix}"
    )]
    IncompatibleStateDict {
        layer: String,
        expected_trunk_prefix: String,
        expected_head_prefix: String,
    },

    // Tensor errors
    #[error("Shape mismatch for layer {layer}: model has {expected:?}, checkpoint has {actual:?}")]
    ShapeMismatch {
        layer: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Invalid tensor: shape {shape:?} needs {expected} elements, got {actual}")]
    InvalidTensor {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns true if this error indicates a misconfiguration the operator has to fix
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig { .. }
                | Error::MalformedCheckpointName { .. }
                | Error::IncompatibleStateDict { .. }
        )
    }

    /// Returns the state dict key involved in this error, if any
    pub fn layer(&self) -> Option<&str> {
        match self {
            Error::MissingStateDictKey { key } | Error::UnexpectedStateValue { key, .. } => {
                Some(key.as_str())
            }
            Error::IncompatibleStateDict { layer, .. } | Error::ShapeMismatch { layer, .. } => {
                Some(layer.as_str())
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
