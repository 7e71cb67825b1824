//! DocStruct (spec §4.5): group flat content into `p` and `s` subtrees.
//!
//! Runs twice — once wrapping `speak`'s direct children into `p`, once
//! wrapping each `p`'s direct children into `s` — accumulating a pending
//! sibling run and closing it into a new fragment on any of three
//! conditions (mirroring `dsa_docstruct.cpp`'s `processNode`/
//! `postProcessNode`):
//!
//! 1. an already-formed fragment of the same kind is encountered (the
//!    pending left context must be flushed first);
//! 2. end-of-parent is reached with content still pending;
//! 3. a `say-as` terminator whose `format` matches the current fragment
//!    kind is seen (it closes the fragment it belongs to).

use tts_core::tree::NodeKind;
use tts_core::{Document, ElementName, NodeId, Result};

use crate::stage::Stage;

/// Whether a contiguous pending run is worth wrapping: at least one
/// non-text node, or at least one text node with non-whitespace content.
/// A run of pure whitespace is left unwrapped (spec §8.3: a whitespace-only
/// document emits no sentences).
fn pending_has_content(doc: &Document, pending: &[NodeId]) -> bool {
    pending.iter().any(|&n| match doc.kind(n) {
        NodeKind::Text { content } => !content.trim().is_empty(),
        _ => true,
    })
}

fn close_fragment(doc: &mut Document, parent: NodeId, pending: &mut Vec<NodeId>, wrap_name: ElementName) {
    if pending.is_empty() {
        return;
    }
    if !pending_has_content(doc, pending) {
        pending.clear();
        return;
    }
    let anchor = doc.next_sibling(*pending.last().unwrap());
    let wrap = doc.create_node(NodeKind::Element {
        name: wrap_name,
        attrs: Default::default(),
    });
    match anchor {
        Some(a) => doc.insert_before(a, wrap),
        None => doc.append_child(parent, wrap),
    }
    for node in pending.drain(..) {
        doc.unlink(node);
        doc.append_child(wrap, node);
    }
}

/// Group `parent`'s direct children into `wrap_name` fragments, a
/// terminator being any `say-as` whose `format` equals `terminator_format`.
fn group_fragments(doc: &mut Document, parent: NodeId, wrap_name: ElementName, terminator_format: &str) {
    let children = doc.children(parent);
    let mut pending: Vec<NodeId> = Vec::new();

    for child in children {
        if doc.element_name(child) == Some(wrap_name) {
            // Condition 1: an already-formed fragment — flush the left context.
            close_fragment(doc, parent, &mut pending, wrap_name);
            continue;
        }
        let is_terminator = doc.element_name(child) == Some(ElementName::SayAs)
            && doc.attr(child, "format") == Some(terminator_format);
        pending.push(child);
        if is_terminator {
            // Condition 3: a matching terminator closes the fragment.
            close_fragment(doc, parent, &mut pending, wrap_name);
        }
    }
    // Condition 2: end-of-parent with pending content.
    close_fragment(doc, parent, &mut pending, wrap_name);
}

/// The `DocStruct` stage.
pub struct DocStruct;

impl Stage for DocStruct {
    fn name(&self) -> &'static str {
        "DocStruct"
    }

    fn process(&mut self, doc: &mut Document) -> Result<()> {
        let root = doc.root();
        let speak = match doc
            .children(root)
            .into_iter()
            .find(|&n| doc.element_name(n) == Some(ElementName::Speak))
        {
            Some(s) => s,
            None => return Ok(()),
        };

        group_fragments(doc, speak, ElementName::P, "p");

        let paragraphs: Vec<NodeId> = doc
            .children(speak)
            .into_iter()
            .filter(|&n| doc.element_name(n) == Some(ElementName::P))
            .collect();
        for p in paragraphs {
            group_fragments(doc, p, ElementName::S, "s");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn say_as(doc: &mut Document, parent: NodeId, format: &str, text: &str) -> NodeId {
        let el = doc.append_element(parent, ElementName::SayAs);
        doc.set_attr(el, "interpret-as", "punctuation").unwrap();
        doc.set_attr(el, "format", format).unwrap();
        doc.append_text(el, text);
        el
    }

    #[test]
    fn scenario_sentence_termination_groups_two_sentences() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        doc.append_text(speak, "你好");
        say_as(&mut doc, speak, "s", "。");
        doc.append_text(speak, "再见");

        DocStruct.process(&mut doc).unwrap();

        let ps = doc.children(speak);
        assert_eq!(ps.len(), 1);
        let p = ps[0];
        let ss = doc.children(p);
        assert_eq!(ss.len(), 2);
        assert_eq!(doc.text_content(ss[0]), "你好。");
        assert_eq!(doc.text_content(ss[1]), "再见");
    }

    #[test]
    fn empty_document_is_a_noop() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        DocStruct.process(&mut doc).unwrap();
        assert!(doc.children(speak).is_empty());
    }

    #[test]
    fn whitespace_only_text_emits_no_sentences() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        doc.append_text(speak, "   \n\t");
        DocStruct.process(&mut doc).unwrap();
        assert!(doc
            .children(speak)
            .into_iter()
            .all(|n| doc.element_name(n) != Some(ElementName::P)));
    }

    #[test]
    fn w_and_break_are_opaque_and_carried_into_the_fragment() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let w = doc.append_element(speak, ElementName::W);
        doc.append_text(w, "你好");
        say_as(&mut doc, speak, "s", "。");

        DocStruct.process(&mut doc).unwrap();

        let p = doc.children(speak)[0];
        let s = doc.children(p)[0];
        let s_children = doc.children(s);
        assert_eq!(doc.element_name(s_children[0]), Some(ElementName::W));
    }
}
