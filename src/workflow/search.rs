use std::time::Instant;

use crate::backend::{self, BackendError, SearchReply};
use crate::model::{PhotoFile, ResultSet, SearchQuery, ValidationError};

use super::error::{FILE_TOO_LARGE, UNSUPPORTED_TYPE};
use super::{AppState, NoticeKind};

const NO_FACE_GUIDANCE: &str = "No face detected in the photo. Try a clear, front-facing photo.";
const SEARCH_RETRY: &str = "Search failed. Please try again.";

/// Why a search produced no results, for user guidance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    PayloadTooLarge,
    UnsupportedMedia,
    /// Only signalled through the service's message text.
    NoFaceDetected,
    Network,
    Server(String),
}

impl SearchFailure {
    pub fn classify(error: &BackendError) -> Self {
        match error {
            BackendError::Server { status: 413, .. } => Self::PayloadTooLarge,
            BackendError::Server { status: 415, .. } => Self::UnsupportedMedia,
            BackendError::Server { body, .. } => {
                let message = body.best_message().unwrap_or("Search failed");
                if mentions_no_face(message) {
                    Self::NoFaceDetected
                } else {
                    Self::Server(message.to_string())
                }
            }
            BackendError::Network(_) | BackendError::Decode(_) => Self::Network,
        }
    }

    pub fn guidance(&self) -> String {
        match self {
            Self::PayloadTooLarge => FILE_TOO_LARGE.to_string(),
            Self::UnsupportedMedia => UNSUPPORTED_TYPE.to_string(),
            Self::NoFaceDetected => NO_FACE_GUIDANCE.to_string(),
            Self::Network => SEARCH_RETRY.to_string(),
            Self::Server(message) => message.clone(),
        }
    }
}

fn mentions_no_face(message: &str) -> bool {
    message.to_ascii_lowercase().contains("no face")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub match_found: bool,
    pub message: String,
    pub failure: Option<SearchFailure>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SearchController;

impl SearchController {
    pub fn prepare(
        file: Option<PhotoFile>,
        limit: u64,
    ) -> Result<Option<SearchQuery>, ValidationError> {
        file.map(|file| SearchQuery::new(file, limit)).transpose()
    }

    /// Stale results are never shown next to a running search.
    pub(crate) fn begin(state: &mut AppState) {
        state.results.clear();
        state.last_search = None;
    }

    pub(crate) fn finish(
        state: &mut AppState,
        result: backend::Result<SearchReply>,
        now: Instant,
    ) {
        match result {
            Ok(reply) => {
                let SearchReply {
                    match_found,
                    message,
                    matches,
                } = reply;
                state.results = ResultSet::from_server(matches);
                let message =
                    message.unwrap_or_else(|| default_message(match_found, &state.results));
                let failure = (!match_found && mentions_no_face(&message))
                    .then_some(SearchFailure::NoFaceDetected);
                let text = failure
                    .as_ref()
                    .map(SearchFailure::guidance)
                    .unwrap_or(message);
                let kind = if match_found {
                    NoticeKind::Success
                } else {
                    NoticeKind::Info
                };
                state.notifications.post(kind, text.clone(), now);
                state.last_search = Some(SearchOutcome {
                    match_found,
                    message: text,
                    failure,
                });
            }
            Err(error) => {
                state.results.clear();
                let failure = SearchFailure::classify(&error);
                let text = failure.guidance();
                state
                    .notifications
                    .post(NoticeKind::Error, text.clone(), now);
                state.last_search = Some(SearchOutcome {
                    match_found: false,
                    message: text,
                    failure: Some(failure),
                });
            }
        }
    }
}

fn default_message(match_found: bool, results: &ResultSet) -> String {
    if match_found {
        format!("Found {} matching images", results.len())
    } else {
        "No matches found in your album".to_string()
    }
}
