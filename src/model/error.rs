use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("photo I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid image reference: {0}")]
    InvalidImageRef(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Client-side, pre-flight rejection. Raised before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{name}: only JPG and PNG photos are supported")]
    UnsupportedExtension { name: String },

    #[error("{name}: `{mime}` is not an image type")]
    NotAnImage { name: String, mime: String },

    #[error("{name} is too large ({size} bytes). Maximum size is {limit_mib}MB")]
    TooLarge {
        name: String,
        size: u64,
        limit_mib: u64,
    },
}
