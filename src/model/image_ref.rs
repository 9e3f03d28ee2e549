use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::{ModelError, Result};

/// Opaque image reference as returned by the service, normally a
/// `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            _ => "bin",
        }
    }
}

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn decode(&self) -> Result<DecodedImage> {
        let rest = self
            .0
            .strip_prefix("data:")
            .ok_or_else(|| ModelError::InvalidImageRef("missing `data:` scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ModelError::InvalidImageRef("missing payload separator".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| ModelError::InvalidImageRef("payload is not base64".to_string()))?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|error| ModelError::InvalidImageRef(error.to_string()))?;
        Ok(DecodedImage {
            mime: mime.to_string(),
            bytes,
        })
    }
}
