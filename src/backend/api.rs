use crate::model::{Credentials, SearchQuery, UploadBatch};

use super::{ActionReply, HealthReport, LoginReply, Result, SearchReply, SessionStatus, UserStats};

/// The recognition service as seen by the client. Every call is blocking and
/// is expected to run off the UI thread.
pub trait Backend: Send + Sync {
    fn check_session(&self) -> Result<SessionStatus>;
    fn login(&self, credentials: &Credentials) -> Result<LoginReply>;
    fn register(&self, credentials: &Credentials) -> Result<ActionReply>;
    fn upload_album(&self, batch: &UploadBatch) -> Result<ActionReply>;
    fn search(&self, query: &SearchQuery) -> Result<SearchReply>;
    fn update_cache(&self) -> Result<ActionReply>;
    /// Best effort; the reply body is ignored.
    fn logout(&self) -> Result<()>;
    fn user_stats(&self) -> Result<UserStats>;
    fn delete_photo(&self, filename: &str) -> Result<ActionReply>;
    fn health(&self) -> Result<HealthReport>;
}
