//! Native text surface: the slice of browser API the engine depends on.

use crate::dom::{Document, DomPoint, DomRange, NodeId};
use crate::render;
use inlinesync_core::DeltaRun;
use std::cmp::Ordering;

/// Tree queries, selection access, and re-rendering offered by the host.
///
/// [`Document`] implements this for headless use and tests.
pub trait NativeSurface {
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> &[NodeId];
    /// Data of a text node; `None` for elements.
    fn text(&self, node: NodeId) -> Option<&str>;
    /// Tag name of an element; `None` for text nodes.
    fn tag(&self, node: NodeId) -> Option<&str>;
    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);
    fn is_connected(&self, node: NodeId) -> bool;
    /// Document-order comparison of two boundary points.
    fn compare_points(&self, a: DomPoint, b: DomPoint) -> Option<Ordering>;

    /// First range of the current selection.
    fn selection(&self) -> Option<DomRange>;
    /// Replaces the selection; `None` removes all ranges.
    fn set_selection(&mut self, range: Option<DomRange>);
    /// Equivalent of `window.getSelection().toString()`.
    fn selection_text(&self) -> String;
    /// Pops one queued `selectionchange` notification, if any.
    fn take_selection_change(&mut self) -> bool;

    fn user_agent(&self) -> &str;

    /// Re-renders `root` from `deltas`, keeping the caret where it was.
    fn rerender(&mut self, root: NodeId, deltas: &[DeltaRun]);

    /// Inclusive ancestry check.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|child| *child == node)
    }

    /// Nearest inclusive ancestor carrying `name`.
    fn closest_with_attribute(&self, node: NodeId, name: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.attribute(id, name).is_some() {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// Nearest inclusive ancestor with tag `tag`.
    fn closest_with_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.tag(id) == Some(tag) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    fn first_text_descendant(&self, node: NodeId) -> Option<NodeId> {
        if self.text(node).is_some() {
            return Some(node);
        }
        self.children(node)
            .iter()
            .find_map(|child| self.first_text_descendant(*child))
    }

    fn last_text_descendant(&self, node: NodeId) -> Option<NodeId> {
        if self.text(node).is_some() {
            return Some(node);
        }
        self.children(node)
            .iter()
            .rev()
            .find_map(|child| self.last_text_descendant(*child))
    }

    /// Text nodes below `node` in document order.
    fn text_descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if self.text(id).is_some() {
                out.push(id);
                continue;
            }
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Inclusive descendants of `node` whose `name` attribute equals `value`.
    fn query_all_with_attribute(&self, node: NodeId, name: &str, value: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if self.attribute(id, name) == Some(value) {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Like `Range.intersectsNode`.
    fn intersects_node(&self, range: &DomRange, node: NodeId) -> bool {
        let (Some(parent), Some(index)) = (self.parent(node), self.index_in_parent(node)) else {
            return self.is_connected(node);
        };
        let (start, end) = match self.compare_points(range.start, range.end) {
            Some(Ordering::Greater) => (range.end, range.start),
            Some(_) => (range.start, range.end),
            None => return false,
        };
        let before_end = matches!(
            self.compare_points(DomPoint::new(parent, index), end),
            Some(Ordering::Less)
        );
        let after_start = matches!(
            self.compare_points(DomPoint::new(parent, index + 1), start),
            Some(Ordering::Greater)
        );
        before_end && after_start
    }
}

impl NativeSurface for Document {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Document::parent(self, node)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        Document::children(self, node)
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        Document::text(self, node)
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        Document::tag(self, node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        Document::attribute(self, node, name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        Document::set_attribute(self, node, name, value);
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        Document::remove_attribute(self, node, name);
    }

    fn is_connected(&self, node: NodeId) -> bool {
        Document::is_connected(self, node)
    }

    fn compare_points(&self, a: DomPoint, b: DomPoint) -> Option<Ordering> {
        Document::compare_points(self, a, b)
    }

    fn selection(&self) -> Option<DomRange> {
        Document::selection(self)
    }

    fn set_selection(&mut self, range: Option<DomRange>) {
        Document::set_selection(self, range);
    }

    fn selection_text(&self) -> String {
        self.selection()
            .map(|range| self.range_text(&range))
            .unwrap_or_default()
    }

    fn take_selection_change(&mut self) -> bool {
        Document::take_selection_change(self)
    }

    fn user_agent(&self) -> &str {
        Document::user_agent(self)
    }

    fn rerender(&mut self, root: NodeId, deltas: &[DeltaRun]) {
        render::rerender_preserving_selection(self, root, deltas);
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        Document::contains(self, ancestor, node)
    }
}
