//! Shared depth-first traversal harness (spec §4.1, §9).
//!
//! An explicit stack bounds stack usage for deep documents; the teacher's
//! `Engine<P>` carries per-call state the same way (a struct field, not a
//! thread-local), and this harness follows the same discipline for any
//! per-stage context a visitor needs to carry across `enter`/`leave`.

use crate::error::Result;
use crate::tree::{Document, NodeId};

/// What a stage's `enter` callback tells the harness to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterAction {
    /// Continue into this node's children.
    Continue,
    /// Skip this node's subtree entirely (`leave` still fires).
    SkipChildren,
}

/// A stage's traversal callbacks. `enter`/`leave` may mutate the current
/// node's attributes, append/unlink siblings, or append children; they must
/// not detach the current node before `leave` completes (spec §4.1).
pub trait Visitor {
    fn enter(&mut self, doc: &mut Document, node: NodeId) -> Result<EnterAction>;
    fn leave(&mut self, doc: &mut Document, node: NodeId) -> Result<()>;
}

enum Frame {
    /// About to enter `node`; not yet visited.
    Enter(NodeId),
    /// `node` was entered and its children (captured at enter time) are
    /// queued; about to leave.
    Leave(NodeId),
}

/// Walk `doc` from `root` in depth-first order, per spec §4.1:
///
/// ```text
/// visit(node):
///     enter(node) -> skip_children?
///     if not skip_children:
///         for c in node.children: visit(c)
///     leave(node)
/// ```
///
/// Children are visited in insertion order. Children appended during
/// `enter` are visited (they are snapshotted right after `enter` returns,
/// before any child is visited); newly inserted previous-siblings of
/// already-queued nodes are not re-visited.
pub fn walk<V: Visitor>(doc: &mut Document, root: NodeId, visitor: &mut V) -> Result<()> {
    let mut stack = vec![Frame::Enter(root)];
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(node) => {
                let action = visitor.enter(doc, node)?;
                stack.push(Frame::Leave(node));
                if action == EnterAction::Continue {
                    let children = doc.children(node);
                    for child in children.into_iter().rev() {
                        stack.push(Frame::Enter(child));
                    }
                }
            }
            Frame::Leave(node) => {
                visitor.leave(doc, node)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementName;

    struct OrderRecorder {
        entered: Vec<NodeId>,
        left: Vec<NodeId>,
    }

    impl Visitor for OrderRecorder {
        fn enter(&mut self, _doc: &mut Document, node: NodeId) -> Result<EnterAction> {
            self.entered.push(node);
            Ok(EnterAction::Continue)
        }

        fn leave(&mut self, _doc: &mut Document, node: NodeId) -> Result<()> {
            self.left.push(node);
            Ok(())
        }
    }

    #[test]
    fn visits_children_in_insertion_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let p1 = doc.append_element(speak, ElementName::P);
        let p2 = doc.append_element(speak, ElementName::P);

        let mut rec = OrderRecorder {
            entered: Vec::new(),
            left: Vec::new(),
        };
        walk(&mut doc, root, &mut rec).unwrap();

        assert_eq!(rec.entered, vec![root, speak, p1, p2]);
        assert_eq!(rec.left, vec![p1, p2, speak, root]);
    }

    struct Combined {
        skip: NodeId,
        entered: Vec<NodeId>,
        left: Vec<NodeId>,
    }

    impl Visitor for Combined {
        fn enter(&mut self, _doc: &mut Document, node: NodeId) -> Result<EnterAction> {
            self.entered.push(node);
            if node == self.skip {
                Ok(EnterAction::SkipChildren)
            } else {
                Ok(EnterAction::Continue)
            }
        }
        fn leave(&mut self, _doc: &mut Document, node: NodeId) -> Result<()> {
            self.left.push(node);
            Ok(())
        }
    }

    #[test]
    fn skip_children_still_fires_leave_but_not_descendants() {
        let mut doc = Document::new();
        let root = doc.root();
        let w = doc.append_element(root, ElementName::W);
        let _inner = doc.append_text(w, "text");

        let mut combined = Combined {
            skip: w,
            entered: Vec::new(),
            left: Vec::new(),
        };
        walk(&mut doc, root, &mut combined).unwrap();
        assert_eq!(combined.entered, vec![root, w]);
        assert_eq!(combined.left, vec![w, root]);
    }
}
