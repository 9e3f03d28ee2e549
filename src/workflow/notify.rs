use std::time::{Duration, Instant};

use serde::Serialize;

pub const FULL_NOTICE_TTL: Duration = Duration::from_secs(5);
pub const LITE_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub text: String,
    pub created_at: Instant,
    pub sequence: u64,
}

/// Single-slot notice. A new notice replaces the visible one and restarts
/// the dismissal deadline; there is no queue.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    ttl: Duration,
    current: Option<Notification>,
    posted: u64,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(FULL_NOTICE_TTL)
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: None,
            posted: 0,
        }
    }

    pub fn post(&mut self, kind: NoticeKind, text: impl Into<String>, now: Instant) {
        self.posted = self.posted.saturating_add(1);
        self.current = Some(Notification {
            kind,
            text: text.into(),
            created_at: now,
            sequence: self.posted,
        });
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.current
            .as_ref()
            .map(|notice| notice.created_at + self.ttl)
    }

    /// Clears the notice once its deadline passed. Returns whether it did.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.expires_at() {
            Some(deadline) if now >= deadline => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Total notices ever posted.
    pub fn posted(&self) -> u64 {
        self.posted
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
