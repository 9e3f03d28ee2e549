use thiserror::Error;

use crate::backend::BackendError;
use crate::model::ValidationError;

pub(crate) const FILE_TOO_LARGE: &str = "File too large. Maximum size is 16MB";
pub(crate) const UNSUPPORTED_TYPE: &str =
    "Unsupported file type. Please choose a JPG or PNG photo.";

/// Every failure an operation can end in. All of them are rendered as
/// notifications; none escapes the shell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Network(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    /// OK status, but the payload reports the operation did not succeed.
    #[error("{0}")]
    Semantic(String),
}

impl WorkflowError {
    /// Maps a transport failure to user-facing text. `fallback` is used when
    /// the service gave no message, `network_text` when it gave no response.
    pub fn from_backend(error: &BackendError, fallback: &str, network_text: &str) -> Self {
        match error {
            BackendError::Server { status: 413, .. } => Self::Server {
                status: 413,
                message: FILE_TOO_LARGE.to_string(),
            },
            BackendError::Server { status: 415, .. } => Self::Server {
                status: 415,
                message: UNSUPPORTED_TYPE.to_string(),
            },
            BackendError::Server { status, body } => Self::Server {
                status: *status,
                message: body.best_message().unwrap_or(fallback).to_string(),
            },
            BackendError::Network(_) | BackendError::Decode(_) => {
                Self::Network(network_text.to_string())
            }
        }
    }

    pub fn semantic(message: Option<&str>, fallback: &str) -> Self {
        Self::Semantic(message.unwrap_or(fallback).to_string())
    }
}
