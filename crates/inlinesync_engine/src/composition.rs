//! Composition State Tracker: one IME session at a time.

use crate::dom::DomRange;
use crate::surface::NativeSurface;
use inlinesync_core::InlineRange;
use thiserror::Error;
use tracing::debug;

const TARGET: &str = "inlinesync::composition";

/// Logical range captured at `compositionstart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositionSnapshot {
    pub inline_range: Option<InlineRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionState {
    #[default]
    Idle,
    Composing(CompositionSnapshot),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositionError {
    #[error("composition already in progress")]
    AlreadyComposing,
}

/// Two-state tracker plus a session counter bumped on every accepted start.
#[derive(Debug, Default)]
pub struct CompositionTracker {
    state: CompositionState,
    session: u64,
}

impl CompositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CompositionState {
        self.state
    }

    pub fn is_composing(&self) -> bool {
        matches!(self.state, CompositionState::Composing(_))
    }

    /// Generation of the most recently started session.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Enters `Composing`, keeping `snapshot` until [`Self::finish`].
    ///
    /// # Errors
    /// [`CompositionError::AlreadyComposing`] when a session is active; the
    /// active snapshot is left untouched.
    pub fn begin(&mut self, snapshot: CompositionSnapshot) -> Result<u64, CompositionError> {
        if self.is_composing() {
            return Err(CompositionError::AlreadyComposing);
        }
        self.session = self.session.wrapping_add(1);
        self.state = CompositionState::Composing(snapshot);
        Ok(self.session)
    }

    /// Returns to `Idle` and hands back the snapshot, if a session was active.
    pub fn finish(&mut self) -> Option<CompositionSnapshot> {
        match std::mem::take(&mut self.state) {
            CompositionState::Composing(snapshot) => Some(snapshot),
            CompositionState::Idle => None,
        }
    }
}

/// Where the committed composition text was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommittedTextSource {
    EventData,
    DomRange,
    Selection,
}

/// Recovers the committed IME text.
///
/// Tries the event payload, then the text of a non-collapsed range inside a
/// single text node, then the selection text when shorter than `max_chars`.
pub fn recover_committed_text<S: NativeSurface + ?Sized>(
    surface: &S,
    data: Option<&str>,
    range: Option<&DomRange>,
    max_chars: usize,
) -> Option<(String, CommittedTextSource)> {
    if let Some(data) = data.filter(|data| !data.is_empty()) {
        return Some((data.to_string(), CommittedTextSource::EventData));
    }

    if let Some(range) = range.filter(|range| range.start.node == range.end.node) {
        if let Some(text) = surface.text(range.start.node) {
            let lo = range.start.offset.min(range.end.offset);
            let hi = range.start.offset.max(range.end.offset);
            let slice: String = text.chars().skip(lo).take(hi - lo).collect();
            if !slice.is_empty() {
                debug!(target: TARGET, "committed text recovered from native range");
                return Some((slice, CommittedTextSource::DomRange));
            }
        }
    }

    let selected = surface.selection_text();
    let count = selected.chars().count();
    if count > 0 && count < max_chars {
        debug!(target: TARGET, "committed text recovered from selection");
        return Some((selected, CommittedTextSource::Selection));
    }
    if count >= max_chars {
        debug!(target: TARGET, count, "selection text too long to be composition output");
    }
    None
}

/// Composition commit waiting for the re-render to settle.
///
/// Produced by `compositionend`; finished by resuming it on the editor.
/// Dropping it cancels the commit.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a pending composition does nothing unless resumed"]
pub struct PendingComposition {
    pub(crate) inline_range: Option<InlineRange>,
    pub(crate) text: Option<String>,
    pub(crate) source: Option<CommittedTextSource>,
    pub(crate) session: u64,
}

impl PendingComposition {
    pub fn inline_range(&self) -> Option<InlineRange> {
        self.inline_range
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn source(&self) -> Option<CommittedTextSource> {
        self.source
    }

    pub fn session(&self) -> u64 {
        self.session
    }
}
