mod album;
mod cache;
mod error;
mod job;
mod modal;
mod notify;
mod progress;
mod search;
mod session;
mod shell;
mod state;
mod upload;

#[cfg(test)]
mod testing;

pub use album::AlbumController;
pub use cache::CacheController;
pub use error::WorkflowError;
pub use job::{
    Clock, Dispatch, Job, JobKind, JobRunner, JobTicket, SystemClock, ThreadRunner,
};
pub use modal::{
    CLOSE_TRANSITION, MAX_ZOOM, MIN_ZOOM, ModalImage, ModalPhase, ModalViewer, ShareError,
    ShareRequest, ShareResult, ShareTarget,
};
pub use notify::{
    FULL_NOTICE_TTL, LITE_NOTICE_TTL, NoticeKind, Notification, NotificationCenter,
};
pub use progress::{COMPLETE_DISPLAY, SyntheticProgress, UploadProgress};
pub use search::{SearchController, SearchFailure, SearchOutcome};
pub use session::SessionManager;
pub use shell::{AppShell, ShellSettings};
pub use state::{AlbumTab, AppState, AuthTab, View};
pub use upload::UploadController;
