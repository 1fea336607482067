//! Line renderer standing in for the virtual-DOM layer in headless use.
//!
//! Markup: `root > v-line > div > v-element`. Text runs render as
//! `span[data-v-text]`, empty lines as a zero-width-space placeholder, and
//! embeds as a non-editable `v-element` with a caret gap on either side.

use crate::dom::{Document, DomRange, NodeId};
use crate::translate;
use inlinesync_core::constants::{EMBED_INSERT, ZERO_WIDTH_NON_JOINER, ZERO_WIDTH_SPACE};
use inlinesync_core::DeltaRun;

pub const LINE_TAG: &str = "v-line";
pub const ELEMENT_TAG: &str = "v-element";
pub const ATTR_ROOT: &str = "data-v-root";
pub const ATTR_ELEMENT: &str = "data-v-element";
pub const ATTR_TEXT: &str = "data-v-text";
pub const ATTR_EMBED: &str = "data-v-embed";
pub const ATTR_EMBED_GAP: &str = "data-v-embed-gap";
pub const ATTR_EMBED_CONTENT: &str = "data-v-embed-content";
pub const ATTR_EMPTY_LINE: &str = "data-v-empty-line";
pub const ATTR_CONTENTEDITABLE: &str = "contenteditable";

/// Splits runs into lines on `\n`; the separators themselves are dropped.
pub(crate) fn split_lines(deltas: &[DeltaRun]) -> Vec<Vec<DeltaRun>> {
    let mut lines = vec![Vec::new()];
    for run in deltas {
        if run.is_embed() {
            if let Some(line) = lines.last_mut() {
                line.push(run.clone());
            }
            continue;
        }
        for (i, piece) in run.insert.split('\n').enumerate() {
            if i > 0 {
                lines.push(Vec::new());
            }
            if piece.is_empty() {
                continue;
            }
            if let Some(line) = lines.last_mut() {
                line.push(DeltaRun::with_attributes(piece, run.attributes.clone()));
            }
        }
    }
    lines
}

fn embed_label(run: &DeltaRun) -> &str {
    run.attributes
        .get("label")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(EMBED_INSERT)
}

fn append_text_span(doc: &mut Document, parent: NodeId, attr: &str, value: &str, text: &str) {
    let span = doc.create_element("span");
    doc.set_attribute(span, attr, value);
    let node = doc.create_text(text);
    doc.append_child(span, node);
    doc.append_child(parent, span);
}

fn render_embed(doc: &mut Document, parent: NodeId, run: &DeltaRun) {
    let element = doc.create_element(ELEMENT_TAG);
    doc.set_attribute(element, ATTR_ELEMENT, "true");
    doc.set_attribute(element, ATTR_EMBED, "true");
    doc.set_attribute(element, ATTR_CONTENTEDITABLE, "false");
    append_text_span(doc, element, ATTR_EMBED_GAP, "before", ZERO_WIDTH_NON_JOINER);
    append_text_span(doc, element, ATTR_EMBED_CONTENT, "true", embed_label(run));
    append_text_span(doc, element, ATTR_EMBED_GAP, "after", ZERO_WIDTH_NON_JOINER);
    doc.append_child(parent, element);
}

fn render_text(doc: &mut Document, parent: NodeId, run: &DeltaRun) {
    let element = doc.create_element(ELEMENT_TAG);
    doc.set_attribute(element, ATTR_ELEMENT, "true");
    append_text_span(doc, element, ATTR_TEXT, "true", &run.insert);
    doc.append_child(parent, element);
}

/// Replaces the children of `root` with a fresh rendering of `deltas`.
pub fn render_deltas(doc: &mut Document, root: NodeId, deltas: &[DeltaRun]) {
    doc.clear_children(root);
    for line in split_lines(deltas) {
        let v_line = doc.create_element(LINE_TAG);
        let container = doc.create_element("div");
        doc.append_child(v_line, container);
        doc.append_child(root, v_line);
        if line.is_empty() {
            let element = doc.create_element(ELEMENT_TAG);
            doc.set_attribute(element, ATTR_ELEMENT, "true");
            doc.set_attribute(element, ATTR_EMPTY_LINE, "true");
            append_text_span(doc, element, ATTR_TEXT, "true", ZERO_WIDTH_SPACE);
            doc.append_child(container, element);
            continue;
        }
        for run in &line {
            if run.is_embed() {
                render_embed(doc, container, run);
            } else {
                render_text(doc, container, run);
            }
        }
    }
}

/// Re-renders and maps the selection back to the same logical offsets,
/// clamped to the new length.
pub(crate) fn rerender_preserving_selection(doc: &mut Document, root: NodeId, deltas: &[DeltaRun]) {
    let preserved = doc.selection().and_then(|range| {
        let start = translate::point_to_index(doc, root, range.start)?;
        let end = translate::point_to_index(doc, root, range.end)?;
        Some((start, end))
    });
    render_deltas(doc, root, deltas);
    let Some((start, end)) = preserved else {
        return;
    };
    let total: usize = deltas.iter().map(DeltaRun::len).sum();
    let start = translate::index_to_point(doc, root, start.min(total));
    let end = translate::index_to_point(doc, root, end.min(total));
    match (start, end) {
        (Some(start), Some(end)) => doc.restore_selection(Some(DomRange::new(start, end))),
        _ => doc.restore_selection(None),
    }
}
