//! Inline text input synchronization: logical ranges over a delta buffer kept
//! in step with native selection and editing events.

/// Script-driven replay of native editing sessions.
pub mod replay;

pub use inlinesync_core::{
    buffer, config, constants, delta, error, is_maybe_inline_range_equal, range, Attributes,
    DeltaBuffer, DeltaDocument, DeltaRun, InlineRange, PlatformOverride, SyncConfig, SyncError,
};
pub use inlinesync_engine::{
    clock, composition, dom, editor, event, hooks, platform, reconciler, render, slot, surface,
    transform, translate, Document, DomPoint, DomRange, InlineEditor, ManualClock, NativeEvent,
    NativeSurface, NodeId,
};
pub use replay::{load_script, run_script, ReplayError, ReplayReport, ReplayScript, ScriptEvent};
