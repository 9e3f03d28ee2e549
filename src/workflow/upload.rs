use std::time::Instant;

use log::debug;

use crate::backend::{self, ActionReply};
use crate::model::{PhotoFile, UploadBatch, ValidationError};

use super::{AppState, NoticeKind, WorkflowError};

const UPLOAD_RETRY: &str = "Upload failed. Please try again.";

#[derive(Debug, Default, Clone, Copy)]
pub struct UploadController;

impl UploadController {
    /// `Ok(None)` for an empty selection.
    pub fn prepare(
        files: Vec<PhotoFile>,
        limit: u64,
    ) -> Result<Option<UploadBatch>, ValidationError> {
        if files.is_empty() {
            return Ok(None);
        }
        UploadBatch::new(files, limit).map(Some)
    }

    /// Returns whether the service accepted the batch.
    pub(crate) fn finish(
        state: &mut AppState,
        result: backend::Result<ActionReply>,
        now: Instant,
    ) -> bool {
        let failure = match result {
            Ok(reply) if reply.success => {
                debug!("album upload accepted: {:?}", reply.files);
                state.upload.complete(now);
                let text = reply.best_message().unwrap_or("Upload complete").to_string();
                state.notifications.post(NoticeKind::Success, text, now);
                return true;
            }
            Ok(reply) => WorkflowError::semantic(reply.best_message(), "Upload failed"),
            Err(error) => WorkflowError::from_backend(&error, "Upload failed", UPLOAD_RETRY),
        };
        state.upload.reset();
        state
            .notifications
            .post(NoticeKind::Error, failure.to_string(), now);
        false
    }
}
