use thiserror::Error;

use super::ErrorBody;

pub type Result<T> = std::result::Result<T, BackendError>;

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("server responded with HTTP {status}")]
    Server { status: u16, body: ErrorBody },

    #[error("malformed response body: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { body, .. } => body.best_message(),
            _ => None,
        }
    }
}
