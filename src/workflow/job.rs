use std::io;
use std::thread;
use std::time::Instant;

use crate::backend::{self, ActionReply, LoginReply, SearchReply, SessionStatus, UserStats};

use super::WorkflowError;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs network jobs off the UI thread.
pub trait JobRunner {
    fn spawn(&self, name: &str, job: Job) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRunner;

impl JobRunner for ThreadRunner {
    fn spawn(&self, name: &str, job: Job) -> io::Result<()> {
        thread::Builder::new().name(name.to_string()).spawn(job)?;
        Ok(())
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    SessionCheck,
    Login,
    Register,
    Upload,
    Search,
    CacheUpdate,
    Logout,
    Stats,
    DeletePhoto,
}

impl JobKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SessionCheck => "session-check",
            Self::Login => "login",
            Self::Register => "register",
            Self::Upload => "upload",
            Self::Search => "search",
            Self::CacheUpdate => "cache-update",
            Self::Logout => "logout",
            Self::Stats => "stats",
            Self::DeletePhoto => "delete-photo",
        }
    }

    /// Cache refresh and stats reads run alongside whatever holds Busy.
    pub fn holds_busy(&self) -> bool {
        !matches!(self, Self::CacheUpdate | Self::Stats)
    }

    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::Upload | Self::Search | Self::CacheUpdate | Self::Stats | Self::DeletePhoto
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTicket {
    pub job_id: u64,
    pub kind: JobKind,
}

/// What an intent did.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Started(JobTicket),
    /// Nothing to do, e.g. an empty file selection.
    Skipped,
    /// Another network action holds the Busy flag.
    Busy,
    /// Startup has not finished or the current view does not allow it.
    NotPermitted,
    /// Refused before any request was made; an error notice was posted.
    Rejected(WorkflowError),
}

impl Dispatch {
    pub fn ticket(&self) -> Option<JobTicket> {
        match self {
            Self::Started(ticket) => Some(*ticket),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ActiveJob {
    pub ticket: JobTicket,
    pub epoch: u64,
}

#[derive(Debug)]
pub(crate) struct JobEvent {
    pub job_id: u64,
    pub epoch: u64,
    pub outcome: JobOutcome,
}

#[derive(Debug)]
pub(crate) enum JobOutcome {
    SessionChecked(backend::Result<SessionStatus>),
    LoggedIn {
        username: String,
        result: backend::Result<LoginReply>,
    },
    Registered(backend::Result<ActionReply>),
    Uploaded(backend::Result<ActionReply>),
    Searched(backend::Result<SearchReply>),
    CacheUpdated(backend::Result<ActionReply>),
    LoggedOut(backend::Result<()>),
    Stats(backend::Result<UserStats>),
    Deleted {
        filename: String,
        result: backend::Result<ActionReply>,
    },
}

impl JobOutcome {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::SessionChecked(_) => JobKind::SessionCheck,
            Self::LoggedIn { .. } => JobKind::Login,
            Self::Registered(_) => JobKind::Register,
            Self::Uploaded(_) => JobKind::Upload,
            Self::Searched(_) => JobKind::Search,
            Self::CacheUpdated(_) => JobKind::CacheUpdate,
            Self::LoggedOut(_) => JobKind::Logout,
            Self::Stats(_) => JobKind::Stats,
            Self::Deleted { .. } => JobKind::DeletePhoto,
        }
    }

    pub fn unauthorized_error(&self) -> Option<&backend::BackendError> {
        let error = match self {
            Self::Uploaded(Err(error))
            | Self::Searched(Err(error))
            | Self::CacheUpdated(Err(error))
            | Self::Stats(Err(error))
            | Self::Deleted {
                result: Err(error), ..
            } => error,
            _ => return None,
        };
        error.is_unauthorized().then_some(error)
    }
}
