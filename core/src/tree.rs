//! Arena-allocated annotated document tree (spec §3.1, §3.2).
//!
//! Nodes live in a flat `Vec` inside [`Document`] and are addressed by
//! [`NodeId`]. Parent/prev/next links are non-owning indices; a parent's
//! first/last-child links are the owning references. `unlink`,
//! `insert_before`, `insert_after` and `append_child` are the only sanctioned
//! mutation points (spec §9) and keep the sibling chain consistent.

use std::collections::BTreeMap;

use crate::element::ElementName;
use crate::error::{Error, Result};

/// Index into [`Document`]'s arena. Never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// Ordered string→string attribute map; preserves insertion order for
/// serialization while allowing O(log n) lookup.
pub type AttrMap = indexmap_lite::OrderedMap;

/// One node's payload. Exactly one variant, per spec §3.1.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The tree root; exactly one per document.
    Document,
    Element {
        name: ElementName,
        attrs: AttrMap,
    },
    Text {
        content: String,
    },
    Comment {
        content: String,
    },
    Declaration {
        version: String,
        encoding: Option<String>,
        standalone: Option<bool>,
    },
    /// Pass-through for anything outside the accepted SSML subset (§6.5).
    /// Never generated or inspected by pipeline stages.
    Unknown {
        raw: String,
    },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
}

/// An annotated document tree: one arena of nodes rooted at [`Document::root`].
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Create a new, empty document: a single `Document` root node.
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::Document,
            parent: None,
            prev: None,
            next: None,
            first_child: None,
            last_child: None,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].last_child
    }

    /// Children of `id`, in insertion order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.first_child(id);
        while let Some(c) = cur {
            out.push(c);
            cur = self.next_sibling(c);
        }
        out
    }

    /// Allocate a detached node. Callers attach it with [`Document::append_child`]
    /// or [`Document::insert_before`]/[`Document::insert_after`].
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            prev: None,
            next: None,
            first_child: None,
            last_child: None,
        });
        id
    }

    /// Append `child` as the new last child of `parent`. `child` must be
    /// currently detached (no parent).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.0].parent.is_none());
        let old_last = self.nodes[parent.0].last_child;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev = old_last;
        self.nodes[child.0].next = None;
        if let Some(last) = old_last {
            self.nodes[last.0].next = Some(child);
        } else {
            self.nodes[parent.0].first_child = Some(child);
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    /// Insert `node` immediately before `sibling`. `node` must be detached.
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        debug_assert!(self.nodes[node.0].parent.is_none());
        let parent = self.nodes[sibling.0]
            .parent
            .expect("insert_before target must be attached");
        let prev = self.nodes[sibling.0].prev;
        self.nodes[node.0].parent = Some(parent);
        self.nodes[node.0].prev = prev;
        self.nodes[node.0].next = Some(sibling);
        self.nodes[sibling.0].prev = Some(node);
        match prev {
            Some(p) => self.nodes[p.0].next = Some(node),
            None => self.nodes[parent.0].first_child = Some(node),
        }
    }

    /// Insert `node` immediately after `sibling`. `node` must be detached.
    pub fn insert_after(&mut self, sibling: NodeId, node: NodeId) {
        debug_assert!(self.nodes[node.0].parent.is_none());
        let parent = self.nodes[sibling.0]
            .parent
            .expect("insert_after target must be attached");
        let next = self.nodes[sibling.0].next;
        self.nodes[node.0].parent = Some(parent);
        self.nodes[node.0].prev = Some(sibling);
        self.nodes[node.0].next = next;
        self.nodes[sibling.0].next = Some(node);
        match next {
            Some(n) => self.nodes[n.0].prev = Some(node),
            None => self.nodes[parent.0].last_child = Some(node),
        }
    }

    /// Detach `id` (and its subtree) from its parent/siblings in O(1) at the
    /// attach point. The subtree remains valid and re-attachable.
    pub fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let n = &self.nodes[id.0];
            (n.parent, n.prev, n.next)
        };
        match prev {
            Some(p) => self.nodes[p.0].next = next,
            None => {
                if let Some(par) = parent {
                    self.nodes[par.0].first_child = next;
                }
            }
        }
        match next {
            Some(n) => self.nodes[n.0].prev = prev,
            None => {
                if let Some(par) = parent {
                    self.nodes[par.0].last_child = prev;
                }
            }
        }
        self.nodes[id.0].parent = None;
        self.nodes[id.0].prev = None;
        self.nodes[id.0].next = None;
    }

    /// Replace `old` in-place with `new` (same position among siblings).
    /// `new` must be detached; `old` ends up detached.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) {
        let parent = self.nodes[old.0].parent;
        match self.nodes[old.0].prev {
            Some(_) => {
                let prev = self.nodes[old.0].prev.unwrap();
                self.insert_after(prev, new);
            }
            None => {
                if let Some(par) = parent {
                    if let Some(first) = self.first_child(par) {
                        self.insert_before(first, new);
                    } else {
                        self.append_child(par, new);
                    }
                }
            }
        }
        self.unlink(old);
    }

    /// Create and append a text node with `content` to `parent`.
    pub fn append_text(&mut self, parent: NodeId, content: impl Into<String>) -> NodeId {
        let id = self.create_node(NodeKind::Text {
            content: content.into(),
        });
        self.append_child(parent, id);
        id
    }

    /// Create and append an element with `name` to `parent`.
    pub fn append_element(&mut self, parent: NodeId, name: ElementName) -> NodeId {
        let id = self.create_node(NodeKind::Element {
            name,
            attrs: AttrMap::new(),
        });
        self.append_child(parent, id);
        id
    }

    /// Read a single element's attribute, if the node is an `Element`.
    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs.get(key),
            _ => None,
        }
    }

    /// Set an attribute on an element node; re-setting an existing name
    /// updates the value in place (spec §3.1).
    pub fn set_attr(&mut self, id: NodeId, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        match self.kind_mut(id) {
            NodeKind::Element { attrs, .. } => {
                attrs.set(key.into(), value.into());
                Ok(())
            }
            _ => Err(Error::InvalidDocument(
                "set_attr called on a non-element node".into(),
            )),
        }
    }

    /// The element name of `id`, or `None` if it is not an `Element`.
    pub fn element_name(&self, id: NodeId) -> Option<ElementName> {
        match self.kind(id) {
            NodeKind::Element { name, .. } => Some(*name),
            _ => None,
        }
    }

    /// Concatenated text content of a subtree's direct text-node children
    /// (used for invariant checks and tests; not used by stages on the hot
    /// path, which operate on their own flat working vectors per §3.5).
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for c in self.children(id) {
            match self.kind(c) {
                NodeKind::Text { content } => out.push_str(content),
                _ => out.push_str(&self.text_content(c)),
            }
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A minimal insertion-ordered string map, standing in for a dependency-free
/// ordered attribute map (spec §3.1: "attribute ordering... preserved on
/// serialization").
pub mod indexmap_lite {
    use super::BTreeMap;

    #[derive(Debug, Clone, Default)]
    pub struct OrderedMap {
        order: Vec<String>,
        values: BTreeMap<String, String>,
    }

    impl OrderedMap {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get(&self, key: &str) -> Option<&str> {
            self.values.get(key).map(String::as_str)
        }

        pub fn set(&mut self, key: String, value: String) {
            if !self.values.contains_key(&key) {
                self.order.push(key.clone());
            }
            self.values.insert(key, value);
        }

        pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
            self.order
                .iter()
                .map(move |k| (k.as_str(), self.values[k].as_str()))
        }

        pub fn len(&self) -> usize {
            self.order.len()
        }

        pub fn is_empty(&self) -> bool {
            self.order.is_empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_children_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_text(root, "a");
        let b = doc.append_text(root, "b");
        let c = doc.append_text(root, "c");
        assert_eq!(doc.children(root), vec![a, b, c]);
    }

    #[test]
    fn unlink_detaches_in_o1_and_preserves_chain() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_text(root, "a");
        let b = doc.append_text(root, "b");
        let c = doc.append_text(root, "c");
        doc.unlink(b);
        assert_eq!(doc.children(root), vec![a, c]);
        assert_eq!(doc.next_sibling(a), Some(c));
        assert_eq!(doc.prev_sibling(c), Some(a));
    }

    #[test]
    fn insert_before_and_after() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_text(root, "a");
        let c = doc.append_text(root, "c");
        let b = doc.create_node(NodeKind::Text {
            content: "b".into(),
        });
        doc.insert_before(c, b);
        assert_eq!(doc.children(root), vec![a, b, c]);
        let d = doc.create_node(NodeKind::Text {
            content: "d".into(),
        });
        doc.insert_after(c, d);
        assert_eq!(doc.children(root), vec![a, b, c, d]);
    }

    #[test]
    fn set_attr_updates_existing_name() {
        let mut doc = Document::new();
        let root = doc.root();
        let el = doc.append_element(root, ElementName::W);
        doc.set_attr(el, "role", "n").unwrap();
        doc.set_attr(el, "role", "v").unwrap();
        assert_eq!(doc.attr(el, "role"), Some("v"));
    }
}
