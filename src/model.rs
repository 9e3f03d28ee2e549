mod credentials;
mod error;
mod image_ref;
mod matches;
mod photo;
mod session;


pub use credentials::Credentials;
pub use error::{ModelError, Result, ValidationError};
pub use image_ref::{DecodedImage, ImageRef};
pub use matches::{MatchResult, ResultSet};
pub use photo::{
    ACCEPTED_EXTENSIONS, MAX_UPLOAD_BYTES, PhotoFile, SearchQuery, UploadBatch, validate_photo,
};
pub use session::Session;
