use std::time::{Duration, Instant};

/// How long a finished upload keeps showing 100%.
pub const COMPLETE_DISPLAY: Duration = Duration::from_secs(2);

/// Estimated upload progress. This is not byte-level progress: it climbs one
/// step per interval from submission and stops at `ceiling` (always below
/// 100) until the service answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticProgress {
    pub step: u8,
    pub interval: Duration,
    pub ceiling: u8,
}

impl Default for SyntheticProgress {
    fn default() -> Self {
        Self {
            step: 10,
            interval: Duration::from_millis(300),
            ceiling: 90,
        }
    }
}

impl SyntheticProgress {
    pub fn estimate(&self, elapsed: Duration) -> u8 {
        let interval = self.interval.as_millis().max(1);
        let steps = elapsed.as_millis() / interval + 1;
        let percent = steps.saturating_mul(u128::from(self.step));
        percent.min(u128::from(self.ceiling.min(99))) as u8
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadProgress {
    #[default]
    Idle,
    Running {
        started: Instant,
    },
    Complete {
        at: Instant,
    },
}

impl UploadProgress {
    pub fn begin(&mut self, now: Instant) {
        *self = Self::Running { started: now };
    }

    pub fn complete(&mut self, now: Instant) {
        *self = Self::Complete { at: now };
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    pub fn percent(&self, policy: &SyntheticProgress, now: Instant) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running { started } => policy.estimate(now.saturating_duration_since(*started)),
            Self::Complete { .. } => 100,
        }
    }

    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Running { .. } => Some("Uploading..."),
            Self::Complete { .. } => Some("Upload Complete!"),
        }
    }

    /// Drops back to idle once the completion display delay has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self {
            Self::Complete { at } if now.saturating_duration_since(*at) >= COMPLETE_DISPLAY => {
                *self = Self::Idle;
                true
            }
            _ => false,
        }
    }
}
