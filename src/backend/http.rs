use std::time::Duration;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use ureq::{Agent, AgentBuilder, Response};

use crate::model::{Credentials, SearchQuery, UploadBatch};

use super::contract::DeleteRequest;
use super::{
    ActionReply, Backend, BackendError, ErrorBody, HealthReport, LoginReply, MultipartForm,
    Result, SearchReply, SessionStatus, UserStats,
};

const ALBUM_FIELD: &str = "album_photos";
const PROBE_FIELD: &str = "solo_photo";

/// `Backend` over HTTP. The agent keeps the session cookie the service sets
/// on login, so every later call is credentialed.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    agent: Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// `/health` lives at the service root, outside the API prefix.
    fn health_url(&self) -> String {
        let origin = self
            .base_url
            .strip_suffix("/api")
            .unwrap_or(&self.base_url);
        format!("{origin}/health")
    }

    fn post_form(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> std::result::Result<Response, ureq::Error> {
        let content_type = form.content_type();
        let body = form.finish();
        debug!("POST {path} ({} bytes multipart)", body.len());
        self.agent
            .post(&self.endpoint(path))
            .set("Content-Type", &content_type)
            .send_bytes(&body)
    }
}

impl Backend for HttpBackend {
    fn check_session(&self) -> Result<SessionStatus> {
        read_json(self.agent.get(&self.endpoint("check_session")).call())
    }

    fn login(&self, credentials: &Credentials) -> Result<LoginReply> {
        read_json(
            self.agent
                .post(&self.endpoint("login"))
                .send_json(credentials),
        )
    }

    fn register(&self, credentials: &Credentials) -> Result<ActionReply> {
        read_json(
            self.agent
                .post(&self.endpoint("register"))
                .send_json(credentials),
        )
    }

    fn upload_album(&self, batch: &UploadBatch) -> Result<ActionReply> {
        let mut form = MultipartForm::new();
        for file in batch.files() {
            form.add_file(ALBUM_FIELD, file);
        }
        read_json(self.post_form("upload_album", form))
    }

    fn search(&self, query: &SearchQuery) -> Result<SearchReply> {
        let mut form = MultipartForm::new();
        form.add_file(PROBE_FIELD, query.file());
        read_json(self.post_form("search", form))
    }

    fn update_cache(&self) -> Result<ActionReply> {
        read_json(self.agent.post(&self.endpoint("update_cache")).call())
    }

    fn logout(&self) -> Result<()> {
        match self.agent.post(&self.endpoint("logout")).call() {
            Ok(_) => Ok(()),
            Err(error) => Err(map_error(error)),
        }
    }

    fn user_stats(&self) -> Result<UserStats> {
        read_json(self.agent.get(&self.endpoint("user_stats")).call())
    }

    fn delete_photo(&self, filename: &str) -> Result<ActionReply> {
        read_json(
            self.agent
                .delete(&self.endpoint("delete_photo"))
                .send_json(DeleteRequest { filename }),
        )
    }

    fn health(&self) -> Result<HealthReport> {
        read_json(self.agent.get(&self.health_url()).call())
    }
}

fn read_json<T: DeserializeOwned>(result: std::result::Result<Response, ureq::Error>) -> Result<T> {
    let response = result.map_err(map_error)?;
    response
        .into_json::<T>()
        .map_err(|error| BackendError::Decode(error.to_string()))
}

fn map_error(error: ureq::Error) -> BackendError {
    match error {
        ureq::Error::Status(status, response) => {
            let body = response.into_json::<ErrorBody>().unwrap_or_default();
            warn!("service answered HTTP {status}");
            BackendError::Server { status, body }
        }
        ureq::Error::Transport(transport) => {
            warn!("transport failure: {transport}");
            BackendError::Network(transport.to_string())
        }
    }
}
