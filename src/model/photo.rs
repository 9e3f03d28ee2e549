use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use image::ImageFormat;

use super::{Result, ValidationError};

pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

const UNKNOWN_MIME: &str = "application/octet-stream";

/// One named file payload as picked by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoFile {
    name: String,
    mime: String,
    bytes: Vec<u8>,
}

impl fmt::Debug for PhotoFile {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PhotoFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl PhotoFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Reads a photo from disk. The MIME type is sniffed from the content and
    /// falls back to the extension when the bytes are not a known image.
    /// Files above `MAX_UPLOAD_BYTES` are refused without being read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|value| value.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());
        let too_large = |name: String, size: u64| ValidationError::TooLarge {
            name,
            size,
            limit_mib: MAX_UPLOAD_BYTES / (1024 * 1024),
        };

        let size = fs::metadata(path)?.len();
        if size > MAX_UPLOAD_BYTES {
            return Err(too_large(name, size).into());
        }
        let mut bytes = Vec::with_capacity(size as usize);
        File::open(path)?
            .take(MAX_UPLOAD_BYTES + 1)
            .read_to_end(&mut bytes)?;
        if bytes.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(too_large(name, bytes.len() as u64).into());
        }
        let mime = sniff_mime(path, &bytes);
        Ok(Self::new(name, mime, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|value| value.to_str())
            .map(|value| value.to_ascii_lowercase())
    }
}

fn sniff_mime(path: &Path, bytes: &[u8]) -> String {
    image::guess_format(bytes)
        .or_else(|_| ImageFormat::from_path(path))
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| UNKNOWN_MIME.to_string())
}

pub fn validate_photo(photo: &PhotoFile, limit: u64) -> std::result::Result<(), ValidationError> {
    let accepted = photo
        .extension()
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()));
    if !accepted {
        return Err(ValidationError::UnsupportedExtension {
            name: photo.name.clone(),
        });
    }
    if !photo.mime.starts_with("image/") {
        return Err(ValidationError::NotAnImage {
            name: photo.name.clone(),
            mime: photo.mime.clone(),
        });
    }
    if photo.size() > limit {
        return Err(ValidationError::TooLarge {
            name: photo.name.clone(),
            size: photo.size(),
            limit_mib: limit / (1024 * 1024),
        });
    }
    Ok(())
}

/// Album photos sent together in one multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBatch {
    files: Vec<PhotoFile>,
}

impl UploadBatch {
    /// Validates every file; the first violation rejects the whole batch.
    pub fn new(files: Vec<PhotoFile>, limit: u64) -> std::result::Result<Self, ValidationError> {
        for file in &files {
            validate_photo(file, limit)?;
        }
        Ok(Self { files })
    }

    pub fn files(&self) -> &[PhotoFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// The single probe photo of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    file: PhotoFile,
}

impl SearchQuery {
    pub fn new(file: PhotoFile, limit: u64) -> std::result::Result<Self, ValidationError> {
        validate_photo(&file, limit)?;
        Ok(Self { file })
    }

    pub fn file(&self) -> &PhotoFile {
        &self.file
    }
}
