mod api;
mod contract;
mod error;
mod http;
mod multipart;

#[cfg(test)]
mod tests;

pub use api::Backend;
pub use contract::{
    ActionReply, CacheStatus, ErrorBody, HealthReport, LoginReply, SearchReply, SessionStatus,
    UserStats,
};
pub use error::{BackendError, Result};
pub use http::HttpBackend;
pub use multipart::MultipartForm;
