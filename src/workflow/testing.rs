use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::{
    self, ActionReply, Backend, BackendError, ErrorBody, HealthReport, LoginReply, SearchReply,
    SessionStatus, UserStats,
};
use crate::model::{Credentials, SearchQuery, UploadBatch};

use super::{Clock, Job, JobRunner};

#[derive(Default)]
struct Script {
    queued: VecDeque<backend::Result<Value>>,
    last: Option<backend::Result<Value>>,
}

/// Scripted service. Queued replies are served in order and the last one
/// keeps answering; an endpoint with no script fails like an unreachable
/// host.
#[derive(Default)]
pub(crate) struct FakeBackend {
    scripts: Mutex<HashMap<&'static str, Script>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, endpoint: &'static str, body: Value) {
        self.push(endpoint, Ok(body));
    }

    pub fn status(&self, endpoint: &'static str, status: u16, body: Value) {
        let body: ErrorBody = serde_json::from_value(body).expect("error body");
        self.push(endpoint, Err(BackendError::Server { status, body }));
    }

    pub fn unreachable(&self, endpoint: &'static str) {
        self.push(
            endpoint,
            Err(BackendError::Network("connection refused".to_string())),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(':').next() == Some(endpoint))
            .count()
    }

    fn push(&self, endpoint: &'static str, reply: backend::Result<Value>) {
        self.scripts
            .lock()
            .expect("scripts")
            .entry(endpoint)
            .or_default()
            .queued
            .push_back(reply);
    }

    fn answer<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        detail: &str,
    ) -> backend::Result<T> {
        self.calls
            .lock()
            .expect("calls")
            .push(format!("{endpoint}:{detail}"));
        let mut scripts = self.scripts.lock().expect("scripts");
        let reply = scripts.get_mut(endpoint).and_then(|script| {
            if let Some(next) = script.queued.pop_front() {
                script.last = Some(next);
            }
            script.last.clone()
        });
        match reply {
            Some(Ok(body)) => serde_json::from_value(body)
                .map_err(|error| BackendError::Decode(error.to_string())),
            Some(Err(error)) => Err(error),
            None => Err(BackendError::Network(format!("no route to {endpoint}"))),
        }
    }
}

impl Backend for FakeBackend {
    fn check_session(&self) -> backend::Result<SessionStatus> {
        self.answer("check_session", "")
    }

    fn login(&self, credentials: &Credentials) -> backend::Result<LoginReply> {
        self.answer("login", &credentials.username)
    }

    fn register(&self, credentials: &Credentials) -> backend::Result<ActionReply> {
        self.answer("register", &credentials.username)
    }

    fn upload_album(&self, batch: &UploadBatch) -> backend::Result<ActionReply> {
        self.answer("upload_album", &batch.len().to_string())
    }

    fn search(&self, query: &SearchQuery) -> backend::Result<SearchReply> {
        self.answer("search", query.file().name())
    }

    fn update_cache(&self) -> backend::Result<ActionReply> {
        self.answer("update_cache", "")
    }

    fn logout(&self) -> backend::Result<()> {
        self.answer::<Value>("logout", "").map(|_| ())
    }

    fn user_stats(&self) -> backend::Result<UserStats> {
        self.answer("user_stats", "")
    }

    fn delete_photo(&self, filename: &str) -> backend::Result<ActionReply> {
        self.answer("delete_photo", filename)
    }

    fn health(&self) -> backend::Result<HealthReport> {
        self.answer("health", "")
    }
}

/// Holds jobs until the test runs them.
#[derive(Clone, Default)]
pub(crate) struct ManualRunner {
    queue: Arc<Mutex<VecDeque<(String, Job)>>>,
    refuse: bool,
}

impl ManualRunner {
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn pending(&self) -> Vec<String> {
        self.queue
            .lock()
            .expect("queue")
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn run_next(&self) -> bool {
        let next = self.queue.lock().expect("queue").pop_front();
        match next {
            Some((_, job)) => {
                job();
                true
            }
            None => false,
        }
    }

    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }
}

impl JobRunner for ManualRunner {
    fn spawn(&self, name: &str, job: Job) -> io::Result<()> {
        if self.refuse {
            return Err(io::Error::other("thread limit reached"));
        }
        self.queue
            .lock()
            .expect("queue")
            .push_back((name.to_string(), job));
        Ok(())
    }
}

pub(crate) struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Instant::now()),
        })
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().expect("clock") += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().expect("clock")
    }
}
