use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::backend::{Backend, BackendError};
use crate::model::{Credentials, MAX_UPLOAD_BYTES, PhotoFile, ValidationError};

use super::job::{ActiveJob, JobEvent, JobOutcome};
use super::{
    AlbumController, AlbumTab, AppState, AuthTab, CacheController, Clock, Dispatch,
    FULL_NOTICE_TTL, Job, JobKind, JobRunner, JobTicket, NoticeKind, NotificationCenter,
    SearchController, SessionManager, ShareResult, ShareTarget, SyntheticProgress,
    UploadController, View, WorkflowError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellSettings {
    pub max_upload_bytes: u64,
    pub notice_ttl: Duration,
    /// Re-index the album on this period while signed in.
    pub cache_refresh: Option<Duration>,
    pub progress: SyntheticProgress,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            notice_ttl: FULL_NOTICE_TTL,
            cache_refresh: None,
            progress: SyntheticProgress::default(),
        }
    }
}

/// Single owner of the application state. Intents start network jobs on the
/// runner; `poll` applies their results on the calling thread.
pub struct AppShell {
    backend: Arc<dyn Backend>,
    runner: Box<dyn JobRunner>,
    clock: Arc<dyn Clock>,
    settings: ShellSettings,
    state: AppState,
    events_tx: Sender<JobEvent>,
    events_rx: Receiver<JobEvent>,
    /// Bumped whenever the identity is dropped; older jobs are stale.
    epoch: u64,
    next_job_id: u64,
    active: Option<ActiveJob>,
    detached: HashMap<u64, ActiveJob>,
    last_cache_refresh: Option<Instant>,
}

impl AppShell {
    pub fn new(
        backend: Arc<dyn Backend>,
        runner: Box<dyn JobRunner>,
        clock: Arc<dyn Clock>,
        settings: ShellSettings,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            backend,
            runner,
            clock,
            state: AppState::new(NotificationCenter::new(settings.notice_ttl)),
            settings,
            events_tx,
            events_rx,
            epoch: 0,
            next_job_id: 1,
            active: None,
            detached: HashMap::new(),
            last_cache_refresh: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn has_pending_jobs(&self) -> bool {
        self.active.is_some() || !self.detached.is_empty()
    }

    pub fn upload_percent(&self) -> u8 {
        self.state
            .upload_percent(&self.settings.progress, self.clock.now())
    }

    /// Startup session check. Runs once; every other intent is refused
    /// until it finishes.
    pub fn start(&mut self) -> Dispatch {
        if self.state.view != View::Startup || self.active.is_some() {
            return Dispatch::Skipped;
        }
        self.launch(JobKind::SessionCheck, |backend| {
            JobOutcome::SessionChecked(backend.check_session())
        })
    }

    pub fn select_auth_tab(&mut self, tab: AuthTab) -> bool {
        if !matches!(self.state.view, View::Auth(_)) {
            return false;
        }
        self.state.view = View::Auth(tab);
        true
    }

    pub fn select_album_tab(&mut self, tab: AlbumTab) -> bool {
        if !matches!(self.state.view, View::Album(_)) || !self.state.session.is_authenticated() {
            return false;
        }
        self.state.view = View::Album(tab);
        true
    }

    pub fn login_form_mut(&mut self) -> &mut Credentials {
        &mut self.state.login_form
    }

    pub fn register_form_mut(&mut self) -> &mut Credentials {
        &mut self.state.register_form
    }

    pub fn submit_login(&mut self) -> Dispatch {
        let credentials = self.state.login_form.clone();
        self.login(credentials)
    }

    pub fn login(&mut self, credentials: Credentials) -> Dispatch {
        if let Some(refused) = self.gate(JobKind::Login) {
            return refused;
        }
        if let Err(error) = credentials.validate() {
            return self.reject(error);
        }
        let username = credentials.username.trim().to_string();
        self.launch(JobKind::Login, move |backend| JobOutcome::LoggedIn {
            result: backend.login(&credentials),
            username,
        })
    }

    pub fn submit_register(&mut self) -> Dispatch {
        let credentials = self.state.register_form.clone();
        self.register(credentials)
    }

    pub fn register(&mut self, credentials: Credentials) -> Dispatch {
        if let Some(refused) = self.gate(JobKind::Register) {
            return refused;
        }
        if let Err(error) = credentials.validate() {
            return self.reject(error);
        }
        self.launch(JobKind::Register, move |backend| {
            JobOutcome::Registered(backend.register(&credentials))
        })
    }

    pub fn upload(&mut self, files: Vec<PhotoFile>) -> Dispatch {
        if let Some(refused) = self.gate(JobKind::Upload) {
            return refused;
        }
        let batch = match UploadController::prepare(files, self.settings.max_upload_bytes) {
            Ok(Some(batch)) => batch,
            Ok(None) => return Dispatch::Skipped,
            Err(error) => return self.reject(error),
        };
        debug!("uploading {} photos", batch.len());
        let now = self.clock.now();
        self.state.upload.begin(now);
        self.launch(JobKind::Upload, move |backend| {
            JobOutcome::Uploaded(backend.upload_album(&batch))
        })
    }

    pub fn search(&mut self, file: Option<PhotoFile>) -> Dispatch {
        if let Some(refused) = self.gate(JobKind::Search) {
            return refused;
        }
        let query = match SearchController::prepare(file, self.settings.max_upload_bytes) {
            Ok(Some(query)) => query,
            Ok(None) => return Dispatch::Skipped,
            Err(error) => return self.reject(error),
        };
        SearchController::begin(&mut self.state);
        self.launch(JobKind::Search, move |backend| {
            JobOutcome::Searched(backend.search(&query))
        })
    }

    /// Not Busy-gated; every call reports its own completion.
    pub fn update_cache(&mut self) -> Dispatch {
        if let Some(refused) = self.gate(JobKind::CacheUpdate) {
            return refused;
        }
        self.launch(JobKind::CacheUpdate, |backend| {
            JobOutcome::CacheUpdated(backend.update_cache())
        })
    }

    pub fn refresh_stats(&mut self) -> Dispatch {
        if let Some(refused) = self.gate(JobKind::Stats) {
            return refused;
        }
        self.launch(JobKind::Stats, |backend| {
            JobOutcome::Stats(backend.user_stats())
        })
    }

    pub fn delete_photo(&mut self, filename: &str) -> Dispatch {
        if let Some(refused) = self.gate(JobKind::DeletePhoto) {
            return refused;
        }
        let filename = filename.trim().to_string();
        if filename.is_empty() {
            return self.reject(ValidationError::MissingField { field: "filename" });
        }
        self.launch(JobKind::DeletePhoto, move |backend| JobOutcome::Deleted {
            result: backend.delete_photo(&filename),
            filename,
        })
    }

    /// Leaves the session locally right away and tells the service after.
    /// Ignores Busy: whatever was in flight becomes stale.
    pub fn logout(&mut self) -> Dispatch {
        if self.state.view == View::Startup || !self.state.session.is_authenticated() {
            return Dispatch::NotPermitted;
        }
        SessionManager::sign_out(&mut self.state);
        self.invalidate_jobs();
        self.launch(JobKind::Logout, |backend| {
            JobOutcome::LoggedOut(backend.logout())
        })
    }

    /// Opens the match at `index` in the viewer.
    pub fn preview(&mut self, index: usize) -> bool {
        let Some(found) = self.state.results.get(index) else {
            return false;
        };
        let title = found.display_name();
        let (preview, original) = (found.preview.clone(), found.original.clone());
        self.state.modal.open(preview, original, title);
        true
    }

    pub fn zoom_preview(&mut self, factor: f32) -> f32 {
        self.state.modal.zoom(factor)
    }

    pub fn close_preview(&mut self) {
        let now = self.clock.now();
        self.state.modal.close(now);
    }

    pub fn share_preview(&mut self, target: &dyn ShareTarget) -> ShareResult {
        let result = self.state.modal.share(target);
        if let Some((kind, text)) = result.notice() {
            let now = self.clock.now();
            self.state.notifications.post(kind, text, now);
        }
        result
    }

    /// Reports an adapter-side outcome, e.g. a file that could not be read.
    pub fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        let now = self.clock.now();
        self.state.notifications.post(kind, text, now);
    }

    pub fn dismiss_notification(&mut self) {
        self.state.notifications.dismiss();
    }

    /// Applies every finished job. Returns whether anything was applied.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events_rx.try_recv() {
            let now = self.clock.now();
            changed |= self.apply(event, now);
        }
        changed
    }

    /// Blocks until no job is pending or `timeout` passes. Returns whether
    /// the shell went idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.has_pending_jobs() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events_rx.recv_timeout(remaining) {
                Ok(event) => {
                    let now = self.clock.now();
                    self.apply(event, now);
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    /// Advances every timer. Returns whether any visible state changed.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let mut changed = self.state.notifications.tick(now);
        changed |= self.state.modal.tick(now);
        changed |= self.state.upload.tick(now);
        changed |= self.refresh_cache_on_schedule(now);
        changed
    }

    fn refresh_cache_on_schedule(&mut self, now: Instant) -> bool {
        let Some(interval) = self.settings.cache_refresh else {
            return false;
        };
        if !self.state.session.is_authenticated() {
            return false;
        }
        match self.last_cache_refresh {
            None => {
                self.last_cache_refresh = Some(now);
                false
            }
            Some(last) if now.saturating_duration_since(last) >= interval => {
                self.last_cache_refresh = Some(now);
                debug!("scheduled cache refresh");
                matches!(self.update_cache(), Dispatch::Started(_))
            }
            Some(_) => false,
        }
    }

    fn gate(&self, kind: JobKind) -> Option<Dispatch> {
        let signed_in = self.state.session.is_authenticated();
        let permitted = match kind {
            _ if self.state.view == View::Startup => false,
            JobKind::Login | JobKind::Register => !signed_in,
            _ => signed_in,
        };
        if !permitted {
            return Some(Dispatch::NotPermitted);
        }
        if kind.holds_busy() && self.active.is_some() {
            debug!("ignoring {} while busy", kind.label());
            return Some(Dispatch::Busy);
        }
        None
    }

    fn reject(&mut self, error: ValidationError) -> Dispatch {
        let failure = WorkflowError::from(error);
        let now = self.clock.now();
        self.state
            .notifications
            .post(NoticeKind::Error, failure.to_string(), now);
        Dispatch::Rejected(failure)
    }

    fn launch<F>(&mut self, kind: JobKind, work: F) -> Dispatch
    where
        F: FnOnce(&dyn Backend) -> JobOutcome + Send + 'static,
    {
        let ticket = JobTicket {
            job_id: self.next_job_id,
            kind,
        };
        self.next_job_id += 1;
        let epoch = self.epoch;
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        let job: Job = Box::new(move || {
            let outcome = work(backend.as_ref());
            let _ = tx.send(JobEvent {
                job_id: ticket.job_id,
                epoch,
                outcome,
            });
        });

        let name = format!("snapid-{}-{}", kind.label(), ticket.job_id);
        if let Err(error) = self.runner.spawn(&name, job) {
            warn!("could not start {name}: {error}");
            let failure =
                WorkflowError::Network(format!("Could not start {}: {error}", kind.label()));
            let now = self.clock.now();
            match kind {
                JobKind::Upload => self.state.upload.reset(),
                JobKind::SessionCheck => self.state.view = View::Auth(AuthTab::Login),
                _ => {}
            }
            self.state
                .notifications
                .post(NoticeKind::Error, failure.to_string(), now);
            return Dispatch::Rejected(failure);
        }

        debug!("started {name}");
        let active = ActiveJob { ticket, epoch };
        if kind.holds_busy() {
            self.active = Some(active);
            self.state.busy = Some(ticket);
        } else {
            self.detached.insert(ticket.job_id, active);
        }
        Dispatch::Started(ticket)
    }

    /// Forgets every outstanding job so its response is discarded.
    fn invalidate_jobs(&mut self) {
        self.epoch += 1;
        self.active = None;
        self.state.busy = None;
        self.detached.clear();
        self.last_cache_refresh = None;
    }

    fn take_registered(&mut self, job_id: u64) -> Option<ActiveJob> {
        if self.active.is_some_and(|job| job.ticket.job_id == job_id) {
            self.state.busy = None;
            return self.active.take();
        }
        self.detached.remove(&job_id)
    }

    fn apply(&mut self, event: JobEvent, now: Instant) -> bool {
        let kind = event.outcome.kind();
        let Some(job) = self.take_registered(event.job_id) else {
            debug!("discarding late {} response (job {})", kind.label(), event.job_id);
            return false;
        };
        if job.epoch != self.epoch || event.epoch != self.epoch {
            debug!("discarding {} response from an earlier session", kind.label());
            return true;
        }

        if let Some(error) = event.outcome.unauthorized_error() {
            self.expire(error, now);
            return true;
        }

        match event.outcome {
            JobOutcome::SessionChecked(result) => {
                SessionManager::finish_check(&mut self.state, result, now);
                self.after_sign_in();
            }
            JobOutcome::LoggedIn { username, result } => {
                SessionManager::finish_login(&mut self.state, username, result, now);
                self.after_sign_in();
            }
            JobOutcome::Registered(result) => {
                SessionManager::finish_register(&mut self.state, result, now)
            }
            JobOutcome::Uploaded(result) => {
                if UploadController::finish(&mut self.state, result, now) {
                    self.refresh_stats();
                }
            }
            JobOutcome::Searched(result) => SearchController::finish(&mut self.state, result, now),
            JobOutcome::CacheUpdated(result) => {
                CacheController::finish(&mut self.state, result, now)
            }
            JobOutcome::LoggedOut(result) => {
                SessionManager::finish_logout(&mut self.state, result, now)
            }
            JobOutcome::Stats(result) => AlbumController::finish_stats(&mut self.state, result),
            JobOutcome::Deleted { filename, result } => {
                if AlbumController::finish_delete(&mut self.state, &filename, result, now) {
                    self.refresh_stats();
                }
            }
        }
        debug!("applied {} (job {})", kind.label(), event.job_id);
        true
    }

    fn after_sign_in(&mut self) {
        if self.state.session.is_authenticated() {
            self.refresh_stats();
        }
    }

    fn expire(&mut self, error: &BackendError, now: Instant) {
        info!("session expired: {error}");
        SessionManager::expire(&mut self.state, error, now);
        self.invalidate_jobs();
    }
}
