//! ProsStructGen (spec §4.8): insert/normalize `break strength=…` between
//! words.
//!
//! The base implementation (this module) only ensures structure: every `w`
//! is followed by exactly one `break` (synthesizing one at `SYLLABLE` if
//! absent, coalescing duplicates into the strongest one present), and every
//! sentence opens with a synthetic `x-strong` break. It never touches the
//! `strength` of a `break` that was already present — which is exactly how
//! "only promote, never demote" (spec §3.3) holds for user-supplied breaks
//! without this stage needing to track a separate `fixed` flag: an existing
//! break's strength is simply never looked at, let alone weakened.
//! Language-specific subclasses plug in PWORD/PPHRASE decisions downstream.

use tts_core::tree::NodeKind;
use tts_core::{BoundaryStrength, Document, ElementName, EnterAction, NodeId, Result, Visitor};

use crate::stage::Stage;

fn create_break(doc: &mut Document, strength: BoundaryStrength) -> NodeId {
    let node = doc.create_node(NodeKind::Element {
        name: ElementName::Break,
        attrs: Default::default(),
    });
    let _ = doc.set_attr(node, "strength", strength.to_ssml());
    node
}

fn break_strength(doc: &Document, node: NodeId) -> BoundaryStrength {
    doc.attr(node, "strength")
        .and_then(|s| s.parse().ok())
        .unwrap_or(BoundaryStrength::Syllable)
}

/// The `ProsStructGen` stage.
pub struct ProsStructGen;

impl Stage for ProsStructGen {
    fn name(&self) -> &'static str {
        "ProsStructGen"
    }

    fn process(&mut self, doc: &mut Document) -> Result<()> {
        struct ProcessSentences;
        impl Visitor for ProcessSentences {
            fn enter(&mut self, doc: &mut Document, node: NodeId) -> Result<EnterAction> {
                if doc.element_name(node) == Some(ElementName::S) {
                    process_sentence(doc, node);
                    return Ok(EnterAction::SkipChildren);
                }
                Ok(EnterAction::Continue)
            }
            fn leave(&mut self, _doc: &mut Document, _node: NodeId) -> Result<()> {
                Ok(())
            }
        }
        let root = doc.root();
        tts_core::walk(doc, root, &mut ProcessSentences)
    }
}

fn process_sentence(doc: &mut Document, s: NodeId) {
    let children = doc.children(s);
    let Some(&first_w) = children.iter().find(|&&c| doc.element_name(c) == Some(ElementName::W)) else {
        return;
    };

    match doc.prev_sibling(first_w) {
        Some(prev) if doc.element_name(prev) == Some(ElementName::Break) => {
            // Already has a leading break; promote it to the sentence-initial
            // strength without weakening anything stronger.
            let cur = break_strength(doc, prev);
            let promoted = cur.promote(BoundaryStrength::XStrong);
            let _ = doc.set_attr(prev, "strength", promoted.to_ssml());
        }
        _ => {
            let b = create_break(doc, BoundaryStrength::XStrong);
            doc.insert_before(first_w, b);
        }
    }

    for w in children.iter().filter(|&&c| doc.element_name(c) == Some(ElementName::W)) {
        let w = *w;
        // Collect the run of `break` elements immediately following `w`.
        let mut run = Vec::new();
        let mut cur = doc.next_sibling(w);
        while let Some(n) = cur {
            if doc.element_name(n) == Some(ElementName::Break) {
                cur = doc.next_sibling(n);
                run.push(n);
            } else {
                break;
            }
        }

        if run.is_empty() {
            let b = create_break(doc, BoundaryStrength::Syllable);
            match doc.next_sibling(w) {
                Some(next) => doc.insert_before(next, b),
                None => doc.append_child(s, b),
            }
        } else if run.len() > 1 {
            let strongest = run
                .iter()
                .map(|&n| break_strength(doc, n))
                .max()
                .unwrap_or(BoundaryStrength::Syllable);
            let keep = run[0];
            let _ = doc.set_attr(keep, "strength", strongest.to_ssml());
            for extra in &run[1..] {
                doc.unlink(*extra);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_boundary_monotonicity_user_break_is_not_overwritten() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let p = doc.append_element(speak, ElementName::P);
        let s = doc.append_element(p, ElementName::S);
        let w1 = doc.append_element(s, ElementName::W);
        doc.append_text(w1, "今天");
        let b = doc.append_element(s, ElementName::Break);
        doc.set_attr(b, "strength", "weak").unwrap();
        let w2 = doc.append_element(s, ElementName::W);
        doc.append_text(w2, "天气");

        ProsStructGen.process(&mut doc).unwrap();

        assert_eq!(doc.attr(b, "strength"), Some("weak"));
    }

    #[test]
    fn sentence_initial_break_is_x_strong() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let p = doc.append_element(speak, ElementName::P);
        let s = doc.append_element(p, ElementName::S);
        let w = doc.append_element(s, ElementName::W);
        doc.append_text(w, "你好");

        ProsStructGen.process(&mut doc).unwrap();

        let first = doc.children(s)[0];
        assert_eq!(doc.element_name(first), Some(ElementName::Break));
        assert_eq!(doc.attr(first, "strength"), Some("x-strong"));
    }

    #[test]
    fn missing_break_after_word_is_synthesized_at_syllable() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let p = doc.append_element(speak, ElementName::P);
        let s = doc.append_element(p, ElementName::S);
        let w1 = doc.append_element(s, ElementName::W);
        doc.append_text(w1, "一");
        let w2 = doc.append_element(s, ElementName::W);
        doc.append_text(w2, "二");

        ProsStructGen.process(&mut doc).unwrap();

        let children = doc.children(s);
        // [x-strong break, w1, syllable break, w2, syllable break]
        assert_eq!(children.len(), 5);
        assert_eq!(doc.element_name(children[2]), Some(ElementName::Break));
        assert_eq!(doc.attr(children[2], "strength"), Some("syllable"));
    }

    #[test]
    fn duplicate_breaks_coalesce_to_the_strongest() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let p = doc.append_element(speak, ElementName::P);
        let s = doc.append_element(p, ElementName::S);
        let w = doc.append_element(s, ElementName::W);
        doc.append_text(w, "一");
        let b1 = doc.append_element(s, ElementName::Break);
        doc.set_attr(b1, "strength", "weak").unwrap();
        let b2 = doc.append_element(s, ElementName::Break);
        doc.set_attr(b2, "strength", "medium").unwrap();

        ProsStructGen.process(&mut doc).unwrap();

        let children = doc.children(s);
        let breaks: Vec<NodeId> = children
            .into_iter()
            .filter(|&n| doc.element_name(n) == Some(ElementName::Break))
            .collect();
        // one leading x-strong + one coalesced
        assert_eq!(breaks.len(), 2);
        assert_eq!(doc.attr(breaks[1], "strength"), Some("medium"));
    }
}
