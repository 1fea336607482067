//! Core data model for inlinesync (inline ranges, delta runs, buffer, config).

/// Delta buffer boundary and the rope-backed document.
pub mod buffer;
/// Configuration loading and defaults.
pub mod config;
/// Reserved inserts, placeholders, and default thresholds.
pub mod constants;
/// Delta run and attribute types.
pub mod delta;
/// Error types for buffer and range handling.
pub mod error;
/// Logical inline ranges.
pub mod range;

#[cfg(test)]
mod env;

pub use buffer::{DeltaBuffer, DeltaDocument};
pub use config::{PlatformOverride, SyncConfig};
pub use delta::{Attributes, DeltaRun};
pub use error::SyncError;
pub use range::{is_maybe_inline_range_equal, InlineRange};
