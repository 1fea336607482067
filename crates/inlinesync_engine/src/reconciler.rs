//! Event Reconciler: per-event decisions turning native input into buffer
//! mutations and logical range updates.

use crate::composition::{
    recover_committed_text, CompositionSnapshot, CompositionTracker, PendingComposition,
};
use crate::dom::{DomPoint, DomRange, NodeId};
use crate::editor::{InlineEditor, INPUT_TARGET};
use crate::event::{
    BeforeInputEvent, CompositionEvent, EventKind, InputEvent, InputType, KeyboardEvent,
    MouseEvent, KEY_ARROW_LEFT, KEY_ARROW_RIGHT,
};
use crate::hooks::{BeforeInputContext, CompositionEndContext};
use crate::platform::{AndroidInputGuard, Platform};
use crate::render::{ATTR_CONTENTEDITABLE, ATTR_EMBED, ATTR_EMBED_GAP, ATTR_EMPTY_LINE};
use crate::surface::NativeSurface;
use crate::transform::plan_input;
use inlinesync_core::constants::TEXT_PLAIN_MIME;
use inlinesync_core::{is_maybe_inline_range_equal, Attributes, DeltaBuffer, InlineRange, SyncConfig};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

const COMPOSITION_TARGET: &str = "inlinesync::composition";
const ANDROID_TARGET: &str = "inlinesync::android";

/// Per-editor reconciler state: composition tracker, Android guard, and the
/// set of attached listeners.
#[derive(Debug)]
pub struct EventReconciler {
    pub(crate) composition: CompositionTracker,
    pub(crate) android: AndroidInputGuard,
    platform: Platform,
    listeners: BTreeSet<EventKind>,
}

impl EventReconciler {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            composition: CompositionTracker::new(),
            android: AndroidInputGuard::new(config.android_dedup_window),
            platform: Platform::Other,
            listeners: BTreeSet::new(),
        }
    }

    /// Registers listeners for `platform`; `input` only where it is needed.
    pub(crate) fn attach(&mut self, platform: Platform) {
        self.platform = platform;
        self.listeners = [
            EventKind::SelectionChange,
            EventKind::BeforeInput,
            EventKind::CompositionStart,
            EventKind::CompositionUpdate,
            EventKind::CompositionEnd,
            EventKind::KeyDown,
            EventKind::Click,
        ]
        .into_iter()
        .collect();
        if platform.needs_input_listener() {
            self.listeners.insert(EventKind::Input);
        }
    }

    pub fn listens_to(&self, kind: EventKind) -> bool {
        self.listeners.contains(&kind)
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn composition(&self) -> &CompositionTracker {
        &self.composition
    }

    pub fn composition_mut(&mut self) -> &mut CompositionTracker {
        &mut self.composition
    }

    pub fn android_guard(&self) -> &AndroidInputGuard {
        &self.android
    }
}

fn element_children<S: NativeSurface + ?Sized>(surface: &S, node: NodeId) -> usize {
    surface
        .children(node)
        .iter()
        .filter(|child| surface.tag(**child).is_some())
        .count()
}

impl<B: DeltaBuffer, S: NativeSurface> InlineEditor<B, S> {
    pub(crate) fn on_selection_change(&mut self) {
        if self.reconciler.composition.is_composing() {
            trace!(target: INPUT_TARGET, "selectionchange skipped while composing");
            return;
        }
        if self.range_provider_override {
            return;
        }
        let Some(root) = self.root else {
            return;
        };

        let Some(selection) = self.surface.selection() else {
            if self.inline_range.is_some() {
                self.set_range_logged(None);
            }
            return;
        };

        if !self.surface.intersects_node(&selection, root) {
            let start = selection.start.node;
            let end = selection.end.node;
            let container_selected = self.surface.contains(end, root)
                && element_children(&self.surface, end) == 1
                && self.surface.contains(start, root)
                && element_children(&self.surface, start) == 1;
            if container_selected {
                self.focus_end();
            } else if self.inline_range.is_some() {
                self.set_range_logged(None);
            }
            return;
        }

        let next = self.to_inline_range(&selection);
        if !is_maybe_inline_range_equal(self.inline_range, next) {
            self.with_sync_lock(|editor| editor.set_range_logged(next));
        }
    }

    fn set_range_logged(&mut self, range: Option<InlineRange>) {
        if let Err(err) = self.set_inline_range(range) {
            debug!(target: INPUT_TARGET, error = %err, "inline range rejected");
        }
    }

    /// True when a collapsed delete at `index` should consume the unit before it.
    fn deletes_preceding_unit(&self, native: &DomRange, index: usize) -> bool {
        if index == 0 {
            return false;
        }
        let in_embed_gap = self
            .surface
            .closest_with_attribute(native.start.node, ATTR_EMBED_GAP)
            .is_some();
        let in_empty_line = self
            .surface
            .closest_with_attribute(native.start.node, ATTR_EMPTY_LINE)
            .is_some();
        let after_embed = self
            .buffer
            .deltas_by_inline_range(InlineRange::caret(index))
            .iter()
            .any(|(run, span)| span.end() == index && self.buffer.is_embed(run));
        let at_empty_line_start = self.buffer.char_at(index - 1) == Some('\n')
            && (index == self.buffer.len() || self.buffer.char_at(index) == Some('\n'));
        in_embed_gap || in_empty_line || after_embed || at_empty_line_start
    }

    pub(crate) fn on_before_input(&mut self, event: &mut BeforeInputEvent) {
        if self.read_only || self.reconciler.composition.is_composing() || event.is_composing {
            trace!(target: INPUT_TARGET, "beforeinput ignored");
            return;
        }
        let Some(native) = self.native_range_in_root() else {
            trace!(target: INPUT_TARGET, "beforeinput outside root");
            return;
        };
        let Some(mut inline_range) = self.to_inline_range(&native) else {
            return;
        };

        let mut use_target_range = true;
        if event.input_type.is_deletion()
            && inline_range.is_collapsed()
            && self.deletes_preceding_unit(&native, inline_range.index)
        {
            inline_range = InlineRange::new(inline_range.index - 1, 1);
            use_target_range = false;
            debug!(target: INPUT_TARGET, ?inline_range, "delete rewritten to preceding unit");
        }

        if use_target_range {
            if let Some(target) = event.target_ranges.first() {
                let translated = self.to_inline_range(target);
                if !is_maybe_inline_range_equal(Some(inline_range), translated) {
                    match translated {
                        Some(range) => inline_range = range,
                        None => {
                            trace!(target: INPUT_TARGET, "target range has no logical mapping");
                            return;
                        }
                    }
                }
            }
        }

        event.prevent_default();

        let data = event.data.clone().or_else(|| {
            event
                .data_transfer
                .as_ref()
                .map(|transfer| transfer.get_data(TEXT_PLAIN_MIME).to_string())
        });
        let mut ctx = BeforeInputContext::new(event.input_type.clone(), inline_range, data);
        self.hooks.run_before_input(&mut ctx);
        if ctx.is_vetoed() {
            debug!(target: INPUT_TARGET, input_type = %ctx.input_type, "beforeinput vetoed by hook");
            return;
        }
        self.apply_input(&ctx.input_type, ctx.data.as_deref(), &ctx.attributes, ctx.inline_range);
        self.slots.inputting.emit(&());
    }

    /// Applies the default transform; returns whether the buffer changed.
    pub(crate) fn apply_input(
        &mut self,
        input_type: &InputType,
        data: Option<&str>,
        attributes: &Attributes,
        range: InlineRange,
    ) -> bool {
        if !self.buffer.is_valid_inline_range(range) {
            debug!(target: INPUT_TARGET, ?range, "input range no longer valid");
            return false;
        }
        let Some(plan) = plan_input(input_type, data, range) else {
            trace!(target: INPUT_TARGET, %input_type, "input type has no mutation");
            return false;
        };
        let result = if plan.text.is_empty() {
            self.delete_text(plan.range)
        } else {
            self.insert_text(plan.range, &plan.text, attributes)
        };
        if let Err(err) = result {
            debug!(target: INPUT_TARGET, error = %err, "input mutation rejected");
            return false;
        }
        self.set_range_logged(Some(InlineRange::caret(plan.caret)));
        true
    }

    pub(crate) fn on_click(&mut self, event: &MouseEvent) {
        let Some(root) = self.root else {
            return;
        };
        if !self.surface.contains(root, event.target) {
            return;
        }
        let Some(embed) = self.surface.closest_with_attribute(event.target, ATTR_EMBED) else {
            return;
        };
        if !self.surface.contains(root, embed) {
            return;
        }
        let children = self.surface.children(embed).len();
        let range = DomRange::new(DomPoint::new(embed, 0), DomPoint::new(embed, children));
        self.surface.set_selection(Some(range));
    }

    pub(crate) fn on_key_down(&mut self, event: &mut KeyboardEvent) {
        self.slots.keydown.emit(event);
        let Some(range) = self.inline_range else {
            return;
        };
        if event.has_modifier()
            || event.is_composing
            || !(event.key == KEY_ARROW_LEFT || event.key == KEY_ARROW_RIGHT)
            || !range.is_collapsed()
            || self.reconciler.composition.is_composing()
        {
            return;
        }
        let left = event.key == KEY_ARROW_LEFT;
        let index = range.index;
        let runs = self.buffer.deltas_by_inline_range(range);

        let next = match runs.as_slice() {
            [(before, _), (after, _)] => {
                if left && self.buffer.is_embed(before) && index >= 1 {
                    Some(InlineRange::new(index - 1, 1))
                } else if !left && self.buffer.is_embed(after) {
                    Some(InlineRange::new(index, 1))
                } else {
                    None
                }
            }
            [(run, _)] if self.buffer.is_embed(run) => {
                if left && index >= 1 {
                    Some(InlineRange::new(index - 1, 1))
                } else if !left && index < self.buffer.len() {
                    Some(InlineRange::new(index, 1))
                } else {
                    None
                }
            }
            _ => None,
        };
        if let Some(next) = next {
            event.prevent_default();
            event.stop_propagation();
            self.set_range_logged(Some(next));
        }
    }

    pub(crate) fn on_input(&mut self, event: &InputEvent) {
        if self.reconciler.composition.is_composing() || event.is_composing || self.read_only {
            return;
        }
        let Some(data) = event
            .data
            .as_deref()
            .filter(|data| event.input_type == InputType::InsertText && !data.is_empty())
        else {
            return;
        };
        let range = self
            .inline_range
            .or_else(|| self.native_range_in_root().and_then(|native| self.to_inline_range(&native)));
        let Some(range) = range else {
            trace!(target: ANDROID_TARGET, "input without a resolvable range");
            return;
        };
        let now = self.clock.now();
        if self.reconciler.android.is_duplicate(data, range.index, now) {
            return;
        }
        let data = data.to_string();
        if !self.apply_input(&InputType::InsertText, Some(&data), &Attributes::new(), range) {
            return;
        }
        self.reconciler.android.record(&data, range.index, now);
        self.slots.inputting.emit(&());
    }

    pub(crate) fn on_composition_start(&mut self) {
        let snapshot = CompositionSnapshot {
            inline_range: self
                .surface
                .selection()
                .and_then(|native| self.to_inline_range(&native)),
        };
        if let Err(err) = self.reconciler.composition.begin(snapshot) {
            warn!(target: COMPOSITION_TARGET, error = %err, "nested compositionstart ignored");
            return;
        }
        let Some(root) = self.root else {
            return;
        };
        for embed in self.surface.query_all_with_attribute(root, ATTR_EMBED, "true") {
            self.surface.remove_attribute(embed, ATTR_CONTENTEDITABLE);
        }
        debug!(target: COMPOSITION_TARGET, ?snapshot, "composition started");
    }

    pub(crate) fn on_composition_update(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        if !self.surface.is_connected(root) || self.read_only {
            return;
        }
        if self.native_range_in_root().is_none() {
            return;
        }
        self.slots.inputting.emit(&());
    }

    pub(crate) fn on_composition_end(
        &mut self,
        event: &mut CompositionEvent,
    ) -> Option<PendingComposition> {
        let snapshot = self.reconciler.composition.finish();
        let root = self.root?;
        if !self.surface.is_connected(root) || self.read_only {
            return None;
        }
        let native = self.native_range_in_root()?;
        let recovered = recover_committed_text(
            &self.surface,
            event.data.as_deref(),
            Some(&native),
            self.config.composition_text_max_chars,
        );
        if recovered.is_none() {
            debug!(target: COMPOSITION_TARGET, "no committed text recovered");
        }
        self.rerender_whole_editor();

        let inline_range = snapshot.and_then(|snapshot| snapshot.inline_range);
        if inline_range.is_some() {
            event.prevent_default();
        }
        let (text, source) = match recovered {
            Some((text, source)) => (Some(text), Some(source)),
            None => (None, None),
        };
        Some(PendingComposition {
            inline_range,
            text,
            source,
            session: self.reconciler.composition.session(),
        })
    }

    /// Finishes a composition commit once the re-render has settled.
    ///
    /// Does nothing when the root detached or a new session started since.
    pub fn resume_composition(&mut self, pending: PendingComposition) {
        let Some(root) = self.root else {
            return;
        };
        if !self.surface.is_connected(root) {
            debug!(target: COMPOSITION_TARGET, "root detached before composition commit");
            return;
        }
        let composition = &self.reconciler.composition;
        if composition.is_composing() || composition.session() != pending.session {
            debug!(target: COMPOSITION_TARGET, "composition restarted before commit");
            return;
        }

        let mut committed = false;
        if let Some(inline_range) = pending.inline_range {
            let mut ctx = CompositionEndContext {
                inline_range,
                data: pending.text.clone(),
                attributes: Attributes::new(),
            };
            self.hooks.run_composition_end(&mut ctx);
            if let Some(data) = ctx.data.as_deref().filter(|data| !data.is_empty()) {
                match self.insert_text(ctx.inline_range, data, &ctx.attributes) {
                    Ok(()) => {
                        let caret = ctx.inline_range.index + data.chars().count();
                        self.set_range_logged(Some(InlineRange::caret(caret)));
                        committed = true;
                    }
                    Err(err) => {
                        debug!(target: COMPOSITION_TARGET, error = %err, "composition commit rejected");
                    }
                }
            }
        }
        if !committed {
            let settled = self
                .surface
                .selection()
                .and_then(|native| self.to_inline_range(&native));
            if settled.is_some() && !is_maybe_inline_range_equal(self.inline_range, settled) {
                self.with_sync_lock(|editor| editor.set_range_logged(settled));
            }
        }
        if pending.inline_range.is_some() {
            self.slots.inputting.emit(&());
        }
    }
}
