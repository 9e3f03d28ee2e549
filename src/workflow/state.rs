use std::time::Instant;

use crate::backend::UserStats;
use crate::model::{Credentials, ResultSet, Session};

use super::{
    JobTicket, ModalViewer, NotificationCenter, SearchOutcome, SyntheticProgress, UploadProgress,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthTab {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlbumTab {
    #[default]
    Upload,
    Search,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    /// Waiting for the startup session check.
    #[default]
    Startup,
    Auth(AuthTab),
    Album(AlbumTab),
}

/// Everything the adapters render. Only `AppShell` and the controllers
/// mutate it.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub(crate) view: View,
    pub(crate) session: Session,
    pub(crate) busy: Option<JobTicket>,
    pub(crate) results: ResultSet,
    pub(crate) last_search: Option<SearchOutcome>,
    pub(crate) notifications: NotificationCenter,
    pub(crate) modal: ModalViewer,
    pub(crate) upload: UploadProgress,
    pub(crate) stats: Option<UserStats>,
    pub(crate) login_form: Credentials,
    pub(crate) register_form: Credentials,
}

impl AppState {
    pub(crate) fn new(notifications: NotificationCenter) -> Self {
        Self {
            notifications,
            ..Self::default()
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn identity(&self) -> Option<&str> {
        self.session.identity()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub fn busy_job(&self) -> Option<JobTicket> {
        self.busy
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn last_search(&self) -> Option<&SearchOutcome> {
        self.last_search.as_ref()
    }

    /// The "no matches" panel is shown after a finished search that the
    /// service judged as not matching.
    pub fn shows_no_matches(&self) -> bool {
        self.results.is_empty()
            && self
                .last_search
                .as_ref()
                .is_some_and(|outcome| !outcome.match_found)
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn modal(&self) -> &ModalViewer {
        &self.modal
    }

    pub fn upload(&self) -> &UploadProgress {
        &self.upload
    }

    pub fn upload_percent(&self, policy: &SyntheticProgress, now: Instant) -> u8 {
        self.upload.percent(policy, now)
    }

    pub fn stats(&self) -> Option<&UserStats> {
        self.stats.as_ref()
    }

    pub fn login_form(&self) -> &Credentials {
        &self.login_form
    }

    pub fn register_form(&self) -> &Credentials {
        &self.register_form
    }
}
