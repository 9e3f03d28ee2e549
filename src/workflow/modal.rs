use std::time::{Duration, Instant};

use log::warn;
use thiserror::Error;

use crate::model::ImageRef;

use super::NoticeKind;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;
/// Exit animation length; the zoom level resets only after it.
pub const CLOSE_TRANSITION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModalPhase {
    #[default]
    Closed,
    Open,
    Closing {
        since: Instant,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalImage {
    pub preview: ImageRef,
    pub original: ImageRef,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalViewer {
    phase: ModalPhase,
    image: Option<ModalImage>,
    /// Unclamped product of every zoom factor since opening.
    zoom_product: f32,
}

impl Default for ModalViewer {
    fn default() -> Self {
        Self {
            phase: ModalPhase::Closed,
            image: None,
            zoom_product: 1.0,
        }
    }
}

impl ModalViewer {
    pub fn open(&mut self, preview: ImageRef, original: ImageRef, title: impl Into<String>) {
        self.image = Some(ModalImage {
            preview,
            original,
            title: title.into(),
        });
        self.phase = ModalPhase::Open;
        self.zoom_product = 1.0;
    }

    /// Folds `factor` into the running product. The shown scale is that
    /// product clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn zoom(&mut self, factor: f32) -> f32 {
        if self.phase == ModalPhase::Open && factor.is_finite() && factor > 0.0 {
            self.zoom_product =
                (self.zoom_product * factor).clamp(f32::MIN_POSITIVE, f32::MAX);
        }
        self.scale()
    }

    pub fn close(&mut self, now: Instant) {
        if self.phase == ModalPhase::Open {
            self.phase = ModalPhase::Closing { since: now };
        }
    }

    /// Skips the exit transition.
    pub fn force_close(&mut self) {
        self.finish_close();
    }

    /// Completes a pending close once the transition has run.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            ModalPhase::Closing { since }
                if now.saturating_duration_since(since) >= CLOSE_TRANSITION =>
            {
                self.finish_close();
                true
            }
            _ => false,
        }
    }

    fn finish_close(&mut self) {
        self.phase = ModalPhase::Closed;
        self.image = None;
        self.zoom_product = 1.0;
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == ModalPhase::Open
    }

    pub fn is_visible(&self) -> bool {
        self.phase != ModalPhase::Closed
    }

    pub fn scale(&self) -> f32 {
        self.zoom_product.clamp(MIN_ZOOM, MAX_ZOOM)
    }

    pub fn can_zoom_out(&self) -> bool {
        self.scale() > MIN_ZOOM + f32::EPSILON
    }

    pub fn can_zoom_in(&self) -> bool {
        self.scale() < MAX_ZOOM - f32::EPSILON
    }

    pub fn image(&self) -> Option<&ModalImage> {
        self.image.as_ref()
    }

    pub fn download_name(&self) -> Option<String> {
        self.image
            .as_ref()
            .map(|image| format!("original_{}", image.title))
    }

    /// Never fails outward: every platform answer becomes a `ShareResult`.
    pub fn share(&self, target: &dyn ShareTarget) -> ShareResult {
        let Some(image) = self.image.as_ref().filter(|_| self.is_open()) else {
            return ShareResult::NothingToShare;
        };
        let request = ShareRequest {
            title: &image.title,
            image: &image.original,
        };
        match target.share(&request) {
            Ok(()) => ShareResult::Shared,
            Err(ShareError::Cancelled) => ShareResult::Cancelled,
            Err(ShareError::Unsupported) => {
                ShareResult::LinkReady(image.original.as_str().to_string())
            }
            Err(ShareError::Failed(reason)) => {
                warn!("share failed: {reason}");
                ShareResult::Failed(reason)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShareRequest<'a> {
    pub title: &'a str,
    pub image: &'a ImageRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    #[error("sharing is not available on this platform")]
    Unsupported,

    #[error("share canceled")]
    Cancelled,

    #[error("share failed: {0}")]
    Failed(String),
}

/// Platform share capability.
pub trait ShareTarget {
    fn share(&self, request: &ShareRequest<'_>) -> Result<(), ShareError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareResult {
    Shared,
    Cancelled,
    /// No share capability; the adapter should copy this link.
    LinkReady(String),
    Failed(String),
    NothingToShare,
}

impl ShareResult {
    pub fn notice(&self) -> Option<(NoticeKind, &'static str)> {
        match self {
            Self::Shared => Some((NoticeKind::Success, "Image shared")),
            Self::Cancelled => Some((NoticeKind::Info, "Share canceled")),
            Self::LinkReady(_) => Some((NoticeKind::Info, "Link copied to clipboard")),
            Self::Failed(_) => Some((NoticeKind::Error, "Could not share this image")),
            Self::NothingToShare => None,
        }
    }
}
