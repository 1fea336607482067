//! Platform Quirk Layer: Android WebView detection and input de-duplication.

use inlinesync_core::PlatformOverride;
use std::time::{Duration, Instant};
use tracing::debug;

const TARGET: &str = "inlinesync::android";

/// Host family, as far as input quirks are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Android,
    #[default]
    Other,
}

impl Platform {
    /// User-agent sniff, case-insensitive.
    pub fn detect(user_agent: &str) -> Self {
        if user_agent.to_ascii_lowercase().contains("android") {
            Self::Android
        } else {
            Self::Other
        }
    }

    /// An explicit override wins over the user agent.
    pub fn resolve(user_agent: &str, platform_override: Option<PlatformOverride>) -> Self {
        match platform_override {
            Some(PlatformOverride::Android) => Self::Android,
            Some(PlatformOverride::Other) => Self::Other,
            None => Self::detect(user_agent),
        }
    }

    /// Whether the extra `input` listener should be attached.
    pub fn needs_input_listener(self) -> bool {
        self == Self::Android
    }
}

/// Last accepted synthetic Android insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidInputFingerprint {
    pub data: String,
    /// Logical caret index before the insert.
    pub position: usize,
    pub timestamp: Instant,
}

/// Drops the second of two identical inputs fired within `window`.
#[derive(Debug, Clone)]
pub struct AndroidInputGuard {
    last: Option<AndroidInputFingerprint>,
    window: Duration,
}

impl AndroidInputGuard {
    /// Guard with no fingerprint yet.
    pub fn new(window: Duration) -> Self {
        Self { last: None, window }
    }

    /// Fingerprint of the last accepted insert.
    pub fn last(&self) -> Option<&AndroidInputFingerprint> {
        self.last.as_ref()
    }

    /// Same data at the same position inside the window as the last accepted
    /// insert. Does not update the fingerprint.
    pub fn is_duplicate(&self, data: &str, position: usize, now: Instant) -> bool {
        let Some(last) = &self.last else {
            return false;
        };
        let duplicate = last.data == data
            && last.position == position
            && now.saturating_duration_since(last.timestamp) < self.window;
        if duplicate {
            debug!(target: TARGET, position, "duplicate android input suppressed");
        }
        duplicate
    }

    /// Overwrites the fingerprint after an accepted insert.
    pub fn record(&mut self, data: &str, position: usize, now: Instant) {
        self.last = Some(AndroidInputFingerprint {
            data: data.to_string(),
            position,
            timestamp: now,
        });
    }
}
