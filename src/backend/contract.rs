use serde::{Deserialize, Serialize};

use crate::model::MatchResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    #[serde(rename = "isLoggedIn", default)]
    pub is_logged_in: bool,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply shape shared by register, upload, cache update and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl ActionReply {
    pub fn best_message(&self) -> Option<&str> {
        first_text(&[self.message.as_deref(), self.error.as_deref()])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchReply {
    #[serde(default)]
    pub match_found: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Updating,
    Ready,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub username: String,
    #[serde(default)]
    pub photo_count: u64,
    #[serde(default)]
    pub cached_embeddings: u64,
    #[serde(default)]
    pub cache_status: CacheStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub models_loaded: bool,
}

/// Body of a non-OK response. Every field is optional because the service
/// answers with either `{success, message}` or `{error}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn best_message(&self) -> Option<&str> {
        first_text(&[self.message.as_deref(), self.error.as_deref()])
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DeleteRequest<'a> {
    pub filename: &'a str,
}

fn first_text<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|text| !text.trim().is_empty())
}
