//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_ANDROID_DEDUP_WINDOW_MS, DEFAULT_COMPOSITION_TEXT_MAX_CHARS,
    DEFAULT_SELECTION_DRAIN_LIMIT,
};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Forced platform selection, bypassing user-agent sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformOverride {
    Android,
    Other,
}

impl PlatformOverride {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "android" => Some(Self::Android),
            "other" | "desktop" | "default" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Runtime tuning for the input synchronization engine.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Window in which an identical Android `input` is dropped as a repeat.
    #[serde(with = "millis")]
    pub android_dedup_window: Duration,
    /// `Selection.toString()` values this long or longer are not used as IME text.
    pub composition_text_max_chars: usize,
    /// Upper bound on queued `selectionchange` notifications drained per dispatch.
    pub selection_drain_limit: usize,
    /// Emit one `info` record per dispatched event.
    pub trace_input: bool,
    pub platform_override: Option<PlatformOverride>,
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            android_dedup_window: Duration::from_millis(DEFAULT_ANDROID_DEDUP_WINDOW_MS),
            composition_text_max_chars: DEFAULT_COMPOSITION_TEXT_MAX_CHARS,
            selection_drain_limit: DEFAULT_SELECTION_DRAIN_LIMIT,
            trace_input: false,
            platform_override: None,
        }
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparsable value; using default");
            None
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`SyncConfig`] with defaults applied when env vars are
    /// missing or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            android_dedup_window: env_parsed::<u64>("INLINESYNC_ANDROID_DEDUP_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.android_dedup_window),
            composition_text_max_chars: env_parsed("INLINESYNC_COMPOSITION_TEXT_MAX_CHARS")
                .unwrap_or(defaults.composition_text_max_chars),
            selection_drain_limit: env_parsed("INLINESYNC_SELECTION_DRAIN_LIMIT")
                .unwrap_or(defaults.selection_drain_limit),
            trace_input: env_flag_enabled("INLINESYNC_TRACE_INPUT"),
            platform_override: env::var("INLINESYNC_PLATFORM").ok().and_then(|value| {
                let parsed = PlatformOverride::parse(&value);
                if parsed.is_none() {
                    tracing::warn!(value = %value, "unknown INLINESYNC_PLATFORM; sniffing user agent");
                }
                parsed
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{env_lock, EnvGuard};

    #[test]
    fn parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_rejects_unknown_values() {
        assert_eq!(parse_env_flag("maybe"), None);
        assert_eq!(parse_env_flag("enabled"), None);
    }

    #[test]
    fn from_env_applies_defaults_for_missing_or_bad_values() {
        let _lock = env_lock().lock().expect("env lock");
        let _dedup = EnvGuard::remove("INLINESYNC_ANDROID_DEDUP_MS");
        let _cap = EnvGuard::set("INLINESYNC_COMPOSITION_TEXT_MAX_CHARS", "lots");
        let _drain = EnvGuard::remove("INLINESYNC_SELECTION_DRAIN_LIMIT");
        let _trace = EnvGuard::remove("INLINESYNC_TRACE_INPUT");
        let _platform = EnvGuard::remove("INLINESYNC_PLATFORM");

        let config = SyncConfig::from_env();
        assert_eq!(config.android_dedup_window, Duration::from_millis(100));
        assert_eq!(config.composition_text_max_chars, 100);
        assert_eq!(config.selection_drain_limit, 8);
        assert!(!config.trace_input);
        assert_eq!(config.platform_override, None);
    }

    #[test]
    fn from_env_reads_overrides() {
        let _lock = env_lock().lock().expect("env lock");
        let _dedup = EnvGuard::set("INLINESYNC_ANDROID_DEDUP_MS", " 250 ");
        let _cap = EnvGuard::set("INLINESYNC_COMPOSITION_TEXT_MAX_CHARS", "12");
        let _drain = EnvGuard::remove("INLINESYNC_SELECTION_DRAIN_LIMIT");
        let _trace = EnvGuard::set("INLINESYNC_TRACE_INPUT", "yes");
        let _platform = EnvGuard::set("INLINESYNC_PLATFORM", "Android");

        let config = SyncConfig::from_env();
        assert_eq!(config.android_dedup_window, Duration::from_millis(250));
        assert_eq!(config.composition_text_max_chars, 12);
        assert!(config.trace_input);
        assert_eq!(config.platform_override, Some(PlatformOverride::Android));
    }

    #[test]
    fn deserializes_window_from_millis() {
        let config: SyncConfig = serde_json::from_str(
            r#"{"android_dedup_window":40,"composition_text_max_chars":5,
                "selection_drain_limit":2,"trace_input":false,"platform_override":"other"}"#,
        )
        .expect("config");
        assert_eq!(config.android_dedup_window, Duration::from_millis(40));
        assert_eq!(config.platform_override, Some(PlatformOverride::Other));
    }
}
