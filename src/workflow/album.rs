use std::time::Instant;

use log::{debug, warn};

use crate::backend::{self, ActionReply, UserStats};

use super::{AppState, NoticeKind, WorkflowError};

/// Album bookkeeping beyond upload: usage stats and photo removal.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlbumController;

impl AlbumController {
    /// Stats are a background read. A failure keeps the last known value.
    pub(crate) fn finish_stats(state: &mut AppState, result: backend::Result<UserStats>) {
        match result {
            Ok(stats) => {
                debug!(
                    "{} has {} photos, {} cached embeddings",
                    stats.username, stats.photo_count, stats.cached_embeddings
                );
                state.stats = Some(stats);
            }
            Err(error) => warn!("could not refresh album stats: {error}"),
        }
    }

    /// Returns whether the album changed.
    pub(crate) fn finish_delete(
        state: &mut AppState,
        filename: &str,
        result: backend::Result<ActionReply>,
        now: Instant,
    ) -> bool {
        let failure = match result {
            Ok(reply) if reply.success => {
                let text = reply
                    .best_message()
                    .unwrap_or("Photo deleted successfully")
                    .to_string();
                state.notifications.post(NoticeKind::Success, text, now);
                return true;
            }
            Ok(reply) => WorkflowError::semantic(reply.best_message(), "Delete failed"),
            Err(error) => WorkflowError::from_backend(
                &error,
                "Delete failed",
                "Delete failed. Please try again.",
            ),
        };
        warn!("could not delete {filename}: {failure}");
        state
            .notifications
            .post(NoticeKind::Error, failure.to_string(), now);
        false
    }
}
