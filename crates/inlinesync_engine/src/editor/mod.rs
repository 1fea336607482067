//! `InlineEditor`: one mounted editor instance tying buffer, surface, and
//! reconciler together.

use crate::clock::{Clock, SystemClock};
use crate::composition::PendingComposition;
use crate::dom::{DomRange, NodeId};
use crate::event::{CompositionEvent, EventKind, NativeEvent};
use crate::hooks::Hooks;
use crate::platform::Platform;
use crate::reconciler::EventReconciler;
use crate::render::{ATTR_CONTENTEDITABLE, ATTR_ROOT};
use crate::slot::Slots;
use crate::surface::NativeSurface;
use crate::translate;
use inlinesync_core::{Attributes, DeltaBuffer, InlineRange, SyncConfig, SyncError};
use tracing::{debug, info};

pub(crate) const INPUT_TARGET: &str = "inlinesync::input";

/// Editor state for one editable root.
pub struct InlineEditor<B: DeltaBuffer, S: NativeSurface> {
    pub(crate) buffer: B,
    pub(crate) surface: S,
    pub(crate) root: Option<NodeId>,
    pub(crate) inline_range: Option<InlineRange>,
    pub(crate) read_only: bool,
    pub(crate) range_provider_override: bool,
    pub(crate) sync_locked: bool,
    pub(crate) reconciler: EventReconciler,
    pub(crate) hooks: Hooks,
    pub(crate) slots: Slots,
    pub(crate) config: SyncConfig,
    pub(crate) clock: Box<dyn Clock>,
}

impl<B: DeltaBuffer, S: NativeSurface> InlineEditor<B, S> {
    pub fn new(buffer: B, surface: S, config: SyncConfig) -> Self {
        Self::with_clock(buffer, surface, config, SystemClock)
    }

    pub fn with_clock(
        buffer: B,
        surface: S,
        config: SyncConfig,
        clock: impl Clock + 'static,
    ) -> Self {
        let reconciler = EventReconciler::new(&config);
        Self {
            buffer,
            surface,
            root: None,
            inline_range: None,
            read_only: false,
            range_provider_override: false,
            sync_locked: false,
            reconciler,
            hooks: Hooks::default(),
            slots: Slots::default(),
            config,
            clock: Box::new(clock),
        }
    }

    /// Marks `root` editable, renders the buffer into it, and attaches the
    /// event listeners for the detected platform.
    ///
    /// # Errors
    /// [`SyncError::Detached`] when `root` is not connected to the document.
    pub fn mount(&mut self, root: NodeId) -> Result<(), SyncError> {
        if !self.surface.is_connected(root) {
            return Err(SyncError::Detached);
        }
        self.root = Some(root);
        self.surface.set_attribute(root, ATTR_ROOT, "true");
        self.apply_editable_attribute();
        self.rerender_whole_editor();

        let platform =
            Platform::resolve(self.surface.user_agent(), self.config.platform_override);
        self.reconciler.attach(platform);
        debug!(target: INPUT_TARGET, ?platform, "editor mounted");
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    pub fn slots_mut(&mut self) -> &mut Slots {
        &mut self.slots
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn reconciler(&self) -> &EventReconciler {
        &self.reconciler
    }

    pub fn reconciler_mut(&mut self) -> &mut EventReconciler {
        &mut self.reconciler
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        if self.read_only == read_only {
            return;
        }
        self.read_only = read_only;
        self.apply_editable_attribute();
        self.slots.read_only_change.emit(&read_only);
    }

    fn apply_editable_attribute(&mut self) {
        if let Some(root) = self.root {
            let editable = if self.read_only { "false" } else { "true" };
            self.surface.set_attribute(root, ATTR_CONTENTEDITABLE, editable);
        }
    }

    /// When set, an external provider owns the logical range and
    /// `selectionchange` is ignored.
    pub fn set_range_provider_override(&mut self, enabled: bool) {
        self.range_provider_override = enabled;
    }

    pub fn is_composing(&self) -> bool {
        self.reconciler.composition.is_composing()
    }

    /// Total logical length of the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn get_inline_range(&self) -> Option<InlineRange> {
        self.inline_range
    }

    pub fn is_valid_inline_range(&self, range: InlineRange) -> bool {
        self.buffer.is_valid_inline_range(range)
    }

    /// Stores the logical range, notifies observers, and mirrors it onto the
    /// native selection unless the sync lock is held.
    ///
    /// # Errors
    /// [`SyncError::InvalidInlineRange`] when `range` exceeds the buffer.
    pub fn set_inline_range(&mut self, range: Option<InlineRange>) -> Result<(), SyncError> {
        if let Some(range) = range {
            if !self.buffer.is_valid_inline_range(range) {
                return Err(SyncError::InvalidInlineRange {
                    range,
                    len: self.buffer.len(),
                });
            }
        }
        self.inline_range = range;
        self.slots.inline_range_update.emit(&range);
        if !self.sync_locked {
            self.sync_native_selection();
        }
        Ok(())
    }

    /// Runs `f` with native selection writes suppressed.
    pub(crate) fn with_sync_lock<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.sync_locked, true);
        let out = f(self);
        self.sync_locked = previous;
        out
    }

    fn sync_native_selection(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let target = match self.inline_range {
            Some(range) => match self.to_dom_range(range) {
                Some(dom) => Some(dom),
                None => {
                    debug!(target: INPUT_TARGET, ?range, "logical range has no native position");
                    return;
                }
            },
            None => None,
        };
        let current = self.surface.selection();
        if current == target {
            return;
        }
        if target.is_none()
            && !current.is_some_and(|range| {
                translate::is_range_completely_in_root(&self.surface, root, &range)
            })
        {
            return;
        }
        self.surface.set_selection(target);
    }

    /// Places a caret at the end of the buffer.
    pub fn focus_end(&mut self) {
        let end = InlineRange::caret(self.buffer.len());
        if let Err(err) = self.set_inline_range(Some(end)) {
            debug!(target: INPUT_TARGET, error = %err, "focus_end failed");
        }
    }

    /// Replaces `range` with `text` and re-renders.
    ///
    /// # Errors
    /// Propagates buffer validation failures.
    pub fn insert_text(
        &mut self,
        range: InlineRange,
        text: &str,
        attributes: &Attributes,
    ) -> Result<(), SyncError> {
        self.buffer.insert_text(range, text, attributes)?;
        self.rerender_whole_editor();
        Ok(())
    }

    /// Deletes `range` and re-renders.
    ///
    /// # Errors
    /// Propagates buffer validation failures.
    pub fn delete_text(&mut self, range: InlineRange) -> Result<(), SyncError> {
        self.buffer.delete_text(range)?;
        self.rerender_whole_editor();
        Ok(())
    }

    pub fn rerender_whole_editor(&mut self) {
        if let Some(root) = self.root {
            let deltas = self.buffer.deltas();
            self.surface.rerender(root, &deltas);
        }
    }

    /// Logical range for a native range inside the root.
    pub fn to_inline_range(&self, range: &DomRange) -> Option<InlineRange> {
        let root = self.root?;
        let inline = translate::dom_range_to_inline_range(&self.surface, root, range)?;
        self.buffer.is_valid_inline_range(inline).then_some(inline)
    }

    /// Native range for a logical range.
    pub fn to_dom_range(&self, range: InlineRange) -> Option<DomRange> {
        let root = self.root?;
        if !self.buffer.is_valid_inline_range(range) {
            return None;
        }
        translate::inline_range_to_dom_range(&self.surface, root, range)
    }

    /// Current native range, when it lies completely inside the root.
    pub(crate) fn native_range_in_root(&self) -> Option<DomRange> {
        let root = self.root?;
        let range = self.surface.selection()?;
        translate::is_range_completely_in_root(&self.surface, root, &range).then_some(range)
    }

    /// Routes one native event to its handler, then drains the
    /// `selectionchange` notifications it queued.
    pub fn dispatch(&mut self, event: &mut NativeEvent) {
        let kind = event.kind();
        if !self.reconciler.listens_to(kind) {
            debug!(target: INPUT_TARGET, event = kind.as_str(), "no listener attached");
            return;
        }
        let before = self.inline_range;
        match event {
            NativeEvent::SelectionChange => self.on_selection_change(),
            NativeEvent::BeforeInput(event) => self.on_before_input(event),
            NativeEvent::Input(event) => self.on_input(event),
            NativeEvent::CompositionStart(_) => self.on_composition_start(),
            NativeEvent::CompositionUpdate(_) => self.on_composition_update(),
            NativeEvent::CompositionEnd(event) => {
                if let Some(pending) = self.handle_composition_end(event) {
                    self.resume_composition(pending);
                }
            }
            NativeEvent::KeyDown(event) => self.on_key_down(event),
            NativeEvent::Click(event) => self.on_click(event),
        }
        self.flush_selection_changes();
        if self.config.trace_input {
            info!(
                target: INPUT_TARGET,
                event = kind.as_str(),
                before = ?before,
                after = ?self.inline_range,
                prevented = event.default_prevented(),
                composing = self.is_composing(),
                "input event"
            );
        }
    }

    /// First half of `compositionend` for hosts that re-render
    /// asynchronously; finish with [`Self::resume_composition`].
    pub fn handle_composition_end(
        &mut self,
        event: &mut CompositionEvent,
    ) -> Option<PendingComposition> {
        if !self.reconciler.listens_to(EventKind::CompositionEnd) {
            return None;
        }
        self.on_composition_end(event)
    }

    /// Handles queued `selectionchange` notifications, up to the configured limit.
    pub fn flush_selection_changes(&mut self) {
        if !self.reconciler.listens_to(EventKind::SelectionChange) {
            while self.surface.take_selection_change() {}
            return;
        }
        for _ in 0..self.config.selection_drain_limit {
            if !self.surface.take_selection_change() {
                return;
            }
            self.on_selection_change();
        }
        if self.surface.take_selection_change() {
            debug!(target: INPUT_TARGET, "selectionchange drain limit reached");
            while self.surface.take_selection_change() {}
        }
    }
}

#[cfg(test)]
mod tests;
