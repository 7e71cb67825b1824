//! WordSegment (spec §4.7): lexicon-driven forward maximum matching over
//! every text/`sub`/`phoneme` piece inside a sentence that isn't already
//! inside a `w`.

use tts_core::tree::NodeKind;
use tts_core::{Document, ElementName, EnterAction, Lexicon, NodeId, Result, Visitor};

use crate::stage::Stage;

/// Greedily match `text` against `lexicon`, longest prefix first; single
/// characters with POS `"x"` when nothing matches (spec §4.7).
fn forward_max_match(lexicon: &dyn Lexicon, text: &str) -> Vec<(String, String)> {
    let chars: Vec<char> = text.chars().collect();
    let max_len = lexicon.word_max_len().max(1);
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let upper = (chars.len() - i).min(max_len);
        let mut matched = None;
        for len in (1..=upper).rev() {
            let candidate: String = chars[i..i + len].iter().collect();
            let entries = lexicon.lookup_word(&candidate);
            if let Some(first) = entries.into_iter().next() {
                matched = Some((candidate, first.pos));
                break;
            }
        }
        match matched {
            Some((surface, pos)) => {
                i += surface.chars().count();
                out.push((surface, pos));
            }
            None => {
                out.push((chars[i].to_string(), "x".to_string()));
                i += 1;
            }
        }
    }
    out
}

/// Surface text to segment for a piece: a text node's content, or a `sub`'s
/// `alias` attribute (falling back to its text content).
fn surface_of(doc: &Document, node: NodeId) -> Option<String> {
    match doc.kind(node) {
        NodeKind::Text { content } => Some(content.clone()),
        NodeKind::Element {
            name: ElementName::Sub,
            ..
        } => Some(
            doc.attr(node, "alias")
                .map(|s| s.to_string())
                .unwrap_or_else(|| doc.text_content(node)),
        ),
        _ => None,
    }
}

/// The `WordSegment` stage.
pub struct WordSegment<'a> {
    lexicon: &'a dyn Lexicon,
}

impl<'a> WordSegment<'a> {
    pub fn new(lexicon: &'a dyn Lexicon) -> Self {
        Self { lexicon }
    }
}

impl<'a> Stage for WordSegment<'a> {
    fn name(&self) -> &'static str {
        "WordSegment"
    }

    fn process(&mut self, doc: &mut Document) -> Result<()> {
        struct SegmentSentences<'a> {
            lexicon: &'a dyn Lexicon,
        }
        impl<'a> Visitor for SegmentSentences<'a> {
            fn enter(&mut self, doc: &mut Document, node: NodeId) -> Result<EnterAction> {
                if doc.element_name(node) == Some(ElementName::S) {
                    segment_sentence(doc, node, self.lexicon);
                    return Ok(EnterAction::SkipChildren);
                }
                Ok(EnterAction::Continue)
            }
            fn leave(&mut self, _doc: &mut Document, _node: NodeId) -> Result<()> {
                Ok(())
            }
        }
        let root = doc.root();
        tts_core::walk(doc, root, &mut SegmentSentences { lexicon: self.lexicon })
    }
}

fn segment_sentence(doc: &mut Document, s: NodeId, lexicon: &dyn Lexicon) {
    let children = doc.children(s);
    for child in children {
        match doc.element_name(child) {
            Some(ElementName::W) | Some(ElementName::Break) => continue,
            Some(ElementName::Phoneme) => {
                let w = doc.create_node(NodeKind::Element {
                    name: ElementName::W,
                    attrs: Default::default(),
                });
                doc.insert_before(child, w);
                let _ = doc.set_attr(w, "role", "x");
                doc.unlink(child);
                doc.append_child(w, child);
            }
            _ => {
                let Some(text) = surface_of(doc, child) else {
                    continue;
                };
                if text.is_empty() {
                    doc.unlink(child);
                    continue;
                }
                let words = forward_max_match(lexicon, &text);
                let mut char_cursor = 0usize;
                let chars: Vec<char> = text.chars().collect();
                for (surface, pos) in words {
                    let len = surface.chars().count();
                    let w = doc.create_node(NodeKind::Element {
                        name: ElementName::W,
                        attrs: Default::default(),
                    });
                    doc.insert_before(child, w);
                    let _ = doc.set_attr(w, "role", pos);
                    let piece: String = chars[char_cursor..char_cursor + len].iter().collect();
                    doc.append_text(w, piece);
                    char_cursor += len;
                }
                doc.unlink(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tts_core::InMemoryLexicon;

    #[test]
    fn scenario_forward_max_match_with_compound_word() {
        let mut lex = InMemoryLexicon::new();
        lex.insert("中国", "n", "zhong1 guo2", 10);
        lex.insert("人民", "n", "ren2 min2", 10);
        lex.insert("中国人民", "n", "zhong1 guo2 ren2 min2", 5);

        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let p = doc.append_element(speak, ElementName::P);
        let s = doc.append_element(p, ElementName::S);
        doc.append_text(s, "中国人民");

        WordSegment::new(&lex).process(&mut doc).unwrap();

        let ws = doc.children(s);
        assert_eq!(ws.len(), 1);
        assert_eq!(doc.text_content(ws[0]), "中国人民");
    }

    #[test]
    fn scenario_forward_max_match_splits_without_compound_entry() {
        let mut lex = InMemoryLexicon::new();
        lex.insert("中国", "n", "zhong1 guo2", 10);
        lex.insert("人民", "n", "ren2 min2", 10);

        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let p = doc.append_element(speak, ElementName::P);
        let s = doc.append_element(p, ElementName::S);
        doc.append_text(s, "中国人民");

        WordSegment::new(&lex).process(&mut doc).unwrap();

        let ws = doc.children(s);
        assert_eq!(ws.len(), 2);
        assert_eq!(doc.text_content(ws[0]), "中国");
        assert_eq!(doc.text_content(ws[1]), "人民");
    }

    #[test]
    fn lexicon_miss_falls_back_to_single_characters() {
        let lex = InMemoryLexicon::new();
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let p = doc.append_element(speak, ElementName::P);
        let s = doc.append_element(p, ElementName::S);
        doc.append_text(s, "未知");

        WordSegment::new(&lex).process(&mut doc).unwrap();

        let ws = doc.children(s);
        assert_eq!(ws.len(), 2);
        for w in ws {
            assert_eq!(doc.attr(w, "role"), Some("x"));
        }
    }

    #[test]
    fn pre_existing_w_keeps_its_pos() {
        let lex = InMemoryLexicon::new();
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let p = doc.append_element(speak, ElementName::P);
        let s = doc.append_element(p, ElementName::S);
        let w = doc.append_element(s, ElementName::W);
        doc.set_attr(w, "role", "v").unwrap();
        doc.append_text(w, "走");

        WordSegment::new(&lex).process(&mut doc).unwrap();

        assert_eq!(doc.attr(w, "role"), Some("v"));
    }
}
