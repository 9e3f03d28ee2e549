use std::time::Instant;

use crate::backend::{self, ActionReply};

use super::{AppState, NoticeKind, WorkflowError};

/// Triggers re-indexing of the album. Holds no state of its own: every
/// completion is reported and nothing else changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheController;

impl CacheController {
    pub(crate) fn finish(
        state: &mut AppState,
        result: backend::Result<ActionReply>,
        now: Instant,
    ) {
        let failure = match result {
            Ok(reply) if reply.success => {
                state
                    .notifications
                    .post(NoticeKind::Success, "Cache updated successfully!", now);
                return;
            }
            Ok(reply) => WorkflowError::semantic(reply.best_message(), "Cache update failed"),
            Err(error) => WorkflowError::from_backend(
                &error,
                "Cache update failed",
                "Network error during cache update",
            ),
        };
        state
            .notifications
            .post(NoticeKind::Error, failure.to_string(), now);
    }
}
