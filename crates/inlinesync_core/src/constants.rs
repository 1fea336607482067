//! Shared constants used across inlinesync crates.

/// Reserved insert value of an embed run. An embed occupies one logical unit.
pub const EMBED_INSERT: &str = "\u{FFFC}";

/// Reserved marker char backing [`EMBED_INSERT`] in flattened text.
pub const EMBED_CHAR: char = '\u{FFFC}';

/// Zero-width filler rendered into an empty line so it stays selectable.
pub const ZERO_WIDTH_SPACE: &str = "\u{200B}";

/// Zero-width filler rendered beside embeds to give the caret a landing node.
pub const ZERO_WIDTH_NON_JOINER: &str = "\u{200C}";

/// Default window in which an identical Android `input` is treated as a repeat.
pub const DEFAULT_ANDROID_DEDUP_WINDOW_MS: u64 = 100;

/// Default cap on `Selection.toString()` length when recovering IME text.
///
/// Values at or above the cap are rejected as unrelated selections.
pub const DEFAULT_COMPOSITION_TEXT_MAX_CHARS: usize = 100;

/// Default bound on queued `selectionchange` notifications drained per dispatch.
pub const DEFAULT_SELECTION_DRAIN_LIMIT: usize = 8;

/// MIME type used for the `dataTransfer` payload fallback.
pub const TEXT_PLAIN_MIME: &str = "text/plain";
