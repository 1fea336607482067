//! Range Translator: native boundary points to logical offsets and back.
//!
//! Works on the markup produced by [`crate::render`]. Embeds occupy one
//! logical unit; any point inside an embed resolves to one of its two edges.

use crate::dom::{DomPoint, DomRange, NodeId};
use crate::render::{
    ATTR_EMBED, ATTR_EMBED_CONTENT, ATTR_EMBED_GAP, ATTR_EMPTY_LINE, ELEMENT_TAG, LINE_TAG,
};
use crate::surface::NativeSurface;
use inlinesync_core::InlineRange;
use std::cmp::Ordering;
use tracing::debug;

const TARGET: &str = "inlinesync::range";

fn char_len<S: NativeSurface + ?Sized>(surface: &S, node: NodeId) -> usize {
    surface.text(node).map_or(0, |text| text.chars().count())
}

fn is_embed<S: NativeSurface + ?Sized>(surface: &S, element: NodeId) -> bool {
    surface.attribute(element, ATTR_EMBED) == Some("true")
}

fn is_empty_line<S: NativeSurface + ?Sized>(surface: &S, element: NodeId) -> bool {
    surface.attribute(element, ATTR_EMPTY_LINE).is_some()
}

/// Logical length of one `v-element`.
fn element_len<S: NativeSurface + ?Sized>(surface: &S, element: NodeId) -> usize {
    if is_embed(surface, element) {
        return 1;
    }
    if is_empty_line(surface, element) {
        return 0;
    }
    surface
        .text_descendants(element)
        .into_iter()
        .map(|text| char_len(surface, text))
        .sum()
}

fn line_elements<S: NativeSurface + ?Sized>(surface: &S, line: NodeId) -> &[NodeId] {
    match surface.children(line).first() {
        Some(container) => surface.children(*container),
        None => &[],
    }
}

fn line_len<S: NativeSurface + ?Sized>(surface: &S, line: NodeId) -> usize {
    line_elements(surface, line)
        .iter()
        .map(|element| element_len(surface, *element))
        .sum()
}

/// True when both ends of `range` fall inside a range selecting all of `root`.
///
/// Ends are compared in document order since hosts do not guarantee that
/// `start` precedes `end`.
pub fn is_range_completely_in_root<S: NativeSurface + ?Sized>(
    surface: &S,
    root: NodeId,
    range: &DomRange,
) -> bool {
    if !surface.is_connected(root) {
        return false;
    }
    let (Some(parent), Some(index)) = (surface.parent(root), surface.index_in_parent(root)) else {
        return false;
    };
    let root_start = DomPoint::new(parent, index);
    let root_end = DomPoint::new(parent, index + 1);
    let inside = |point: DomPoint| {
        matches!(
            surface.compare_points(point, root_start),
            Some(Ordering::Equal | Ordering::Greater)
        ) && matches!(
            surface.compare_points(point, root_end),
            Some(Ordering::Less | Ordering::Equal)
        )
    };
    inside(range.start) && inside(range.end)
}

/// Moves an element boundary point onto the nearest text node inside it.
fn normalize_to_text<S: NativeSurface + ?Sized>(surface: &S, point: DomPoint) -> Option<DomPoint> {
    if let Some(text) = surface.text(point.node) {
        let len = text.chars().count();
        return Some(DomPoint::new(point.node, point.offset.min(len)));
    }
    let children = surface.children(point.node);
    let split = point.offset.min(children.len());
    if let Some(text) = children[split..]
        .iter()
        .find_map(|child| surface.first_text_descendant(*child))
    {
        return Some(DomPoint::new(text, 0));
    }
    children[..split]
        .iter()
        .rev()
        .find_map(|child| surface.last_text_descendant(*child))
        .map(|text| DomPoint::new(text, char_len(surface, text)))
}

/// Offset inside an embed: `0` for its leading edge, `1` for its trailing edge.
fn embed_offset<S: NativeSurface + ?Sized>(surface: &S, text: NodeId, offset: usize) -> usize {
    if let Some(gap) = surface.closest_with_attribute(text, ATTR_EMBED_GAP) {
        return usize::from(surface.attribute(gap, ATTR_EMBED_GAP) == Some("after"));
    }
    let at_content_start = surface
        .closest_with_attribute(text, ATTR_EMBED_CONTENT)
        .and_then(|content| surface.first_text_descendant(content))
        == Some(text)
        && offset == 0;
    usize::from(!at_content_start)
}

/// Logical offset of a boundary point inside `root`.
pub fn point_to_index<S: NativeSurface + ?Sized>(
    surface: &S,
    root: NodeId,
    point: DomPoint,
) -> Option<usize> {
    let DomPoint { node: text, offset } = normalize_to_text(surface, point)?;
    let element = surface.closest_with_tag(text, ELEMENT_TAG)?;
    let container = surface.parent(element)?;
    let line = surface.parent(container)?;
    if surface.tag(line) != Some(LINE_TAG) || surface.parent(line) != Some(root) {
        return None;
    }

    let mut index = 0usize;
    for previous in surface.children(root) {
        if *previous == line {
            break;
        }
        index += line_len(surface, *previous) + 1;
    }
    for sibling in surface.children(container) {
        if *sibling == element {
            break;
        }
        index += element_len(surface, *sibling);
    }

    if is_embed(surface, element) {
        return Some(index + embed_offset(surface, text, offset));
    }
    if is_empty_line(surface, element) {
        return Some(index);
    }
    for node in surface.text_descendants(element) {
        if node == text {
            return Some(index + offset);
        }
        index += char_len(surface, node);
    }
    None
}

/// Maps a logical offset inside one line to a boundary point.
fn locate_in_line<S: NativeSurface + ?Sized>(
    surface: &S,
    line: NodeId,
    local: usize,
) -> Option<DomPoint> {
    let elements = line_elements(surface, line);
    let mut start = 0usize;
    for (position, element) in elements.iter().enumerate() {
        let element = *element;
        if is_empty_line(surface, element) {
            return surface
                .first_text_descendant(element)
                .map(|text| DomPoint::new(text, 0));
        }
        if is_embed(surface, element) {
            let texts = surface.text_descendants(element);
            if local == start {
                return texts.first().map(|text| DomPoint::new(*text, 0));
            }
            if local == start + 1 && position + 1 == elements.len() {
                return texts
                    .last()
                    .map(|text| DomPoint::new(*text, char_len(surface, *text)));
            }
            start += 1;
            continue;
        }
        let len = element_len(surface, element);
        if local <= start + len {
            let mut remaining = local - start;
            let texts = surface.text_descendants(element);
            for text in &texts {
                let text_len = char_len(surface, *text);
                if remaining <= text_len {
                    return Some(DomPoint::new(*text, remaining));
                }
                remaining -= text_len;
            }
            return texts
                .last()
                .map(|text| DomPoint::new(*text, char_len(surface, *text)));
        }
        start += len;
    }
    None
}

/// Boundary point for a logical offset, or `None` past the rendered end.
pub fn index_to_point<S: NativeSurface + ?Sized>(
    surface: &S,
    root: NodeId,
    index: usize,
) -> Option<DomPoint> {
    let mut start = 0usize;
    for line in surface.children(root) {
        let len = line_len(surface, *line);
        if index <= start + len {
            return locate_in_line(surface, *line, index - start);
        }
        start += len + 1;
    }
    None
}

/// Translates a native range to a logical range.
///
/// Returns `None` when the range leaves `root` or an end has no logical
/// position.
pub fn dom_range_to_inline_range<S: NativeSurface + ?Sized>(
    surface: &S,
    root: NodeId,
    range: &DomRange,
) -> Option<InlineRange> {
    if !is_range_completely_in_root(surface, root, range) {
        debug!(target: TARGET, ?range, "native range is not inside the editable root");
        return None;
    }
    let start = point_to_index(surface, root, range.start);
    let end = point_to_index(surface, root, range.end);
    match (start, end) {
        (Some(start), Some(end)) => Some(InlineRange::between(start, end)),
        _ => {
            debug!(target: TARGET, ?range, "native range has no logical mapping");
            None
        }
    }
}

/// Translates a logical range back to a native range.
pub fn inline_range_to_dom_range<S: NativeSurface + ?Sized>(
    surface: &S,
    root: NodeId,
    range: InlineRange,
) -> Option<DomRange> {
    let start = index_to_point(surface, root, range.index)?;
    let end = index_to_point(surface, root, range.end())?;
    Some(DomRange::new(start, end))
}
