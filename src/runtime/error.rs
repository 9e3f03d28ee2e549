use thiserror::Error;

use crate::backend::BackendError;
use crate::model::ModelError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("config JSON failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("config YAML failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("photo error: {0}")]
    Model(#[from] ModelError),

    #[error("service error: {0}")]
    Backend(#[from] BackendError),

    #[error("window error: {0}")]
    Ui(String),
}
