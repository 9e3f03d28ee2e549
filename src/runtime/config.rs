use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::MAX_UPLOAD_BYTES;
use crate::workflow::{FULL_NOTICE_TTL, LITE_NOTICE_TTL, ShellSettings, SyntheticProgress};

use super::ConfigError;

pub const API_URL_ENV: &str = "SNAPID_API_URL";

/// Which adapter drives the shell. The terminal gets shorter notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Full,
    Lite,
}

impl Flow {
    fn default_notice_ttl(self) -> Duration {
        match self {
            Self::Full => FULL_NOTICE_TTL,
            Self::Lite => LITE_NOTICE_TTL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: u64,
    /// Overrides the per-flow notice lifetime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice_ttl_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_refresh_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 30,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            notice_ttl_ms: None,
            cache_refresh_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be an http(s) URL, got `{url}`"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".to_string()));
        }
        if self.max_upload_bytes == 0 || self.max_upload_bytes > MAX_UPLOAD_BYTES {
            return Err(ConfigError::Invalid(format!(
                "max_upload_bytes must be between 1 and {MAX_UPLOAD_BYTES}, got {}",
                self.max_upload_bytes
            )));
        }
        if self.cache_refresh_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "cache_refresh_secs must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies `SNAPID_API_URL` when it is set and not blank.
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shell_settings(&self, flow: Flow) -> ShellSettings {
        ShellSettings {
            max_upload_bytes: self.max_upload_bytes.min(MAX_UPLOAD_BYTES),
            notice_ttl: self
                .notice_ttl_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| flow.default_notice_ttl()),
            cache_refresh: self.cache_refresh_secs.map(Duration::from_secs),
            progress: SyntheticProgress::default(),
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig, ConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let config = if is_yaml(path) {
        serde_yaml::from_str::<ClientConfig>(&raw)?
    } else {
        serde_json::from_str::<ClientConfig>(&raw)?
    };
    config.validate()?;
    Ok(config)
}

pub fn save_config(path: impl AsRef<Path>, config: &ClientConfig) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let serialized = if is_yaml(path) {
        serde_yaml::to_string(config)?
    } else {
        serde_json::to_string_pretty(config)?
    };
    fs::write(path, serialized)?;
    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(extension.as_str(), "yaml" | "yml")
}

/// File (if given), then environment, then an explicit URL flag.
pub fn resolve_config(
    path: Option<&Path>,
    api_url: Option<&str>,
) -> Result<ClientConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    }
    .with_env();
    if let Some(url) = api_url {
        config.api_base_url = url.trim().to_string();
    }
    config.validate()?;
    Ok(config)
}
