//! Headless arena DOM used as the native text surface outside a browser.
//!
//! Offsets inside text nodes count chars. Boundary points compare in document
//! order the way `Range.compareBoundaryPoints` does.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Handle to a node in a [`Document`] arena.
///
/// Slots are reused once a node is freed; the generation makes handles to the
/// old occupant resolve to nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// Payload of a DOM node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
struct Entry {
    generation: u32,
    node: Option<Node>,
}

/// A boundary point: a container node plus an offset into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DomPoint {
    /// Container node.
    pub node: NodeId,
    /// Char offset for text nodes, child index for elements.
    pub offset: usize,
}

impl DomPoint {
    /// Point at `offset` inside `node`.
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A native range between two boundary points, in whatever order the host gave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DomRange {
    pub start: DomPoint,
    pub end: DomPoint,
}

impl DomRange {
    /// Range from `start` to `end`, unordered.
    pub fn new(start: DomPoint, end: DomPoint) -> Self {
        Self { start, end }
    }

    /// A collapsed range at `point`.
    pub fn collapsed(point: DomPoint) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    /// True when both boundary points are equal.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// In-memory document: node arena, selection, and host metadata.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Entry>,
    free: Vec<usize>,
    body: NodeId,
    selection: Option<DomRange>,
    pending_selection_changes: usize,
    user_agent: String,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl Document {
    /// Creates an empty document with a `body` element.
    pub fn new(user_agent: impl Into<String>) -> Self {
        let body = Node {
            data: NodeData::Element {
                tag: "body".to_string(),
                attributes: BTreeMap::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![Entry {
                generation: 0,
                node: Some(body),
            }],
            free: Vec::new(),
            body: NodeId {
                index: 0,
                generation: 0,
            },
            selection: None,
            pending_selection_changes: 0,
            user_agent: user_agent.into(),
        }
    }

    /// The `body` element every connected node descends from.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Host user agent string, used for platform sniffing.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Replaces the user agent string.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let entry = &mut self.nodes[index];
            entry.node = Some(node);
            return NodeId {
                index,
                generation: entry.generation,
            };
        }
        self.nodes.push(Entry {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.nodes.len() - 1,
            generation: 0,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_mut())
    }

    /// Drops `root` and its descendants, returning their slots to the free list.
    fn free_subtree(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(entry) = self
                .nodes
                .get_mut(id.index)
                .filter(|entry| entry.generation == id.generation)
            else {
                continue;
            };
            let Some(node) = entry.node.take() else {
                continue;
            };
            entry.generation = entry.generation.wrapping_add(1);
            self.free.push(id.index);
            stack.extend(node.children);
        }
    }

    /// Number of live nodes, connected or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of slots the arena has allocated, live or free.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
        })
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    /// Appends `child` to `parent`, moving it out of any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        if parent == child || self.contains(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Removes `node` from its parent. The subtree stays in the arena.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|child| *child != node);
        }
        if let Some(child) = self.node_mut(node) {
            child.parent = None;
        }
    }

    /// Removes every child of `node` and frees their subtrees. Handles into
    /// the removed nodes stop resolving.
    pub fn clear_children(&mut self, node: NodeId) {
        let children = match self.node_mut(node) {
            Some(parent) => std::mem::take(&mut parent.children),
            None => return,
        };
        for child in children {
            self.free_subtree(child);
        }
    }

    /// Parent of `node`; `None` for `body`, detached roots, and freed handles.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    /// Child nodes in order; empty for text nodes and freed handles.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Payload of `node`.
    pub fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.node(node).map(|n| &n.data)
    }

    /// Character data of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.data(node)? {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    /// Tag name of an element.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match self.data(node)? {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    /// Attribute value on an element; `None` for text nodes.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.data(node)? {
            NodeData::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeData::Text(_) => None,
        }
    }

    /// Sets an attribute on an element. Text nodes are ignored.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(Node {
            data: NodeData::Element { attributes, .. },
            ..
        }) = self.node_mut(node)
        {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Removes an attribute from an element.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(Node {
            data: NodeData::Element { attributes, .. },
            ..
        }) = self.node_mut(node)
        {
            attributes.remove(name);
        }
    }

    /// Replaces the data of a text node. Elements are left untouched.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(Node {
            data: NodeData::Text(current),
            ..
        }) = self.node_mut(node)
        {
            *current = text.to_string();
        }
    }

    /// Writes `text` into the text node at the selection start the way an IME
    /// does, leaving the written text selected. Returns the new selection.
    pub fn insert_at_selection(&mut self, text: &str) -> Option<DomRange> {
        let point = self.selection?.start;
        let current = self.text(point.node)?;
        let offset = point.offset.min(current.chars().count());
        let mut updated: String = current.chars().take(offset).collect();
        updated.push_str(text);
        updated.extend(current.chars().skip(offset));
        self.set_text(point.node, &updated);
        let written = DomRange::new(
            DomPoint::new(point.node, offset),
            DomPoint::new(point.node, offset + text.chars().count()),
        );
        self.set_selection(Some(written));
        Some(written)
    }

    /// Inclusive ancestry check.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// True when `node` is reachable from `body`.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    /// Child-index path from `body` to `node`; `None` when detached.
    fn path(&self, node: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = node;
        while current != self.body {
            let parent = self.parent(current)?;
            let index = self.children(parent).iter().position(|c| *c == current)?;
            path.push(index);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    /// Orders two boundary points in document order.
    ///
    /// Returns `None` when either container is detached.
    pub fn compare_points(&self, a: DomPoint, b: DomPoint) -> Option<Ordering> {
        let mut key_a = self.path(a.node)?;
        key_a.push(a.offset);
        let mut key_b = self.path(b.node)?;
        key_b.push(b.offset);
        Some(key_a.cmp(&key_b))
    }

    fn collect_text_nodes(&self, node: NodeId, out: &mut Vec<NodeId>) {
        if self.text(node).is_some() {
            out.push(node);
            return;
        }
        for child in self.children(node) {
            self.collect_text_nodes(*child, out);
        }
    }

    /// Text covered by `range`, like `Range.toString()`.
    pub fn range_text(&self, range: &DomRange) -> String {
        let (start, end) = match self.compare_points(range.start, range.end) {
            Some(Ordering::Greater) => (range.end, range.start),
            Some(_) => (range.start, range.end),
            None => return String::new(),
        };
        let mut texts = Vec::new();
        self.collect_text_nodes(self.body, &mut texts);
        let mut out = String::new();
        for node in texts {
            let Some(text) = self.text(node) else {
                continue;
            };
            let len = text.chars().count();
            let lo = if node == start.node {
                start.offset
            } else if self.compare_points(DomPoint::new(node, 0), start) != Some(Ordering::Less) {
                0
            } else {
                len
            };
            let hi = if node == end.node {
                end.offset
            } else if self.compare_points(DomPoint::new(node, len), end)
                != Some(Ordering::Greater)
            {
                len
            } else {
                0
            };
            if lo < hi {
                out.extend(text.chars().skip(lo).take(hi - lo));
            }
        }
        out
    }

    /// Current selection range, if any.
    pub fn selection(&self) -> Option<DomRange> {
        self.selection
    }

    /// Replaces the selection and queues a `selectionchange` notification.
    pub fn set_selection(&mut self, range: Option<DomRange>) {
        self.selection = range;
        self.pending_selection_changes += 1;
    }

    /// Replaces the selection without queueing a notification.
    pub(crate) fn restore_selection(&mut self, range: Option<DomRange>) {
        self.selection = range;
    }

    /// Pops one queued `selectionchange` notification.
    pub fn take_selection_change(&mut self) -> bool {
        if self.pending_selection_changes == 0 {
            return false;
        }
        self.pending_selection_changes -= 1;
        true
    }

    /// Number of queued `selectionchange` notifications.
    pub fn pending_selection_changes(&self) -> usize {
        self.pending_selection_changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new("test");
        let div = doc.create_element("div");
        let a = doc.create_text("hello");
        let b = doc.create_text("world");
        let body = doc.body();
        doc.append_child(body, div);
        doc.append_child(div, a);
        doc.append_child(div, b);
        (doc, div, a, b)
    }

    #[test]
    fn compare_points_follows_document_order() {
        let (doc, div, a, b) = sample();
        let before_a = DomPoint::new(div, 0);
        let inside_a = DomPoint::new(a, 2);
        let between = DomPoint::new(div, 1);
        let inside_b = DomPoint::new(b, 0);
        assert_eq!(doc.compare_points(before_a, inside_a), Some(Ordering::Less));
        assert_eq!(doc.compare_points(inside_a, between), Some(Ordering::Less));
        assert_eq!(doc.compare_points(between, inside_b), Some(Ordering::Less));
        assert_eq!(doc.compare_points(inside_b, inside_a), Some(Ordering::Greater));
    }

    #[test]
    fn detached_nodes_are_unordered() {
        let (mut doc, div, a, _) = sample();
        doc.detach(div);
        assert!(!doc.is_connected(a));
        assert_eq!(
            doc.compare_points(DomPoint::new(a, 0), DomPoint::new(doc.body(), 0)),
            None
        );
    }

    #[test]
    fn range_text_spans_nodes_in_either_direction() {
        let (doc, _, a, b) = sample();
        let forward = DomRange::new(DomPoint::new(a, 3), DomPoint::new(b, 2));
        assert_eq!(doc.range_text(&forward), "lowo");
        let backward = DomRange::new(DomPoint::new(b, 2), DomPoint::new(a, 3));
        assert_eq!(doc.range_text(&backward), "lowo");
    }

    #[test]
    fn selection_writes_queue_notifications() {
        let (mut doc, _, a, _) = sample();
        doc.set_selection(Some(DomRange::collapsed(DomPoint::new(a, 1))));
        assert_eq!(doc.pending_selection_changes(), 1);
        assert!(doc.take_selection_change());
        assert!(!doc.take_selection_change());
    }

    #[test]
    fn insert_at_selection_selects_written_text() {
        let (mut doc, _, a, _) = sample();
        assert_eq!(doc.insert_at_selection("x"), None);
        doc.set_selection(Some(DomRange::collapsed(DomPoint::new(a, 5))));
        let written = doc.insert_at_selection("!?").expect("written");
        assert_eq!(doc.text(a), Some("hello!?"));
        assert_eq!(written, DomRange::new(DomPoint::new(a, 5), DomPoint::new(a, 7)));
        assert_eq!(doc.range_text(&written), "!?");
    }

    #[test]
    fn append_child_refuses_cycles() {
        let (mut doc, div, a, _) = sample();
        let body = doc.body();
        doc.append_child(div, body);
        assert_eq!(doc.parent(body), None);
        doc.append_child(a, div);
        assert_eq!(doc.parent(div), Some(body));
    }

    #[test]
    fn cleared_children_are_freed_and_slots_reused() {
        let (mut doc, div, a, b) = sample();
        assert_eq!(doc.node_count(), 4);

        doc.clear_children(div);
        assert_eq!(doc.node_count(), 2);
        assert_eq!(doc.text(a), None);
        assert_eq!(doc.parent(b), None);

        let c = doc.create_text("again");
        assert_eq!(doc.arena_len(), 4);
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert_eq!(doc.text(a), None);
        doc.append_child(div, a);
        assert!(doc.children(div).is_empty());
    }
}
