//! TextSegment (spec §4.4): split text into plain-text pieces interleaved
//! with `say-as interpret-as="punctuation"` terminator markers.
//!
//! The punctuation classification and the "ambiguous punctuation" policy
//! (dot/comma/colon/quote between digits or letters) mirror
//! `dsa_symboldetect.cpp`'s `getCharType`/`judgePunctuation`. The original's
//! final-piece computation reuses a stale loop variable for the trailing
//! text after the last match (flagged as an open question in spec.md §9);
//! this implementation takes the literal remaining suffix instead.

use tts_core::tree::NodeKind;
use tts_core::{Document, ElementName, NodeId, Result};

use crate::stage::Stage;

const PARAGRAPH_TERMINATOR: char = '\u{19}';

fn is_sentence_terminator_char(c: char) -> bool {
    matches!(
        c,
        '。' | '．' | '，' | '：' | '？' | '！' | '.' | ',' | ':' | '?' | '!' | '\''
    )
}

/// Decide whether the character at `idx` is really a terminator, given its
/// neighbours, per spec §4.4's ambiguous-punctuation policy. Returns the
/// `format` attribute value (`"s"` or `"p"`) if so.
fn classify(chars: &[char], idx: usize) -> Option<&'static str> {
    let c = chars[idx];
    if c == PARAGRAPH_TERMINATOR {
        return Some("p");
    }
    if !is_sentence_terminator_char(c) {
        return None;
    }
    let prev = idx.checked_sub(1).and_then(|i| chars.get(i)).copied();
    let next = chars.get(idx + 1).copied();
    let is_digit = |c: Option<char>| c.map(|c| c.is_ascii_digit()).unwrap_or(false);
    let is_letter = |c: Option<char>| c.map(|c| c.is_ascii_alphabetic()).unwrap_or(false);

    match c {
        '.' | '．' => {
            if (is_digit(prev) && is_digit(next)) || (is_letter(prev) && is_letter(next)) {
                None
            } else {
                Some("s")
            }
        }
        ',' | '，' | ':' | '：' => {
            if is_digit(prev) && is_digit(next) {
                None
            } else {
                Some("s")
            }
        }
        '\'' => {
            if is_digit(prev) {
                None
            } else {
                Some("s")
            }
        }
        _ => Some("s"),
    }
}

enum Piece {
    Text(String),
    SayAs { text: String, format: &'static str },
}

/// Segment `text` into plain-text and terminator pieces.
fn segment(text: &str) -> Vec<Piece> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::new();
    let mut buf = String::new();
    let mut i = 0;
    while i < chars.len() {
        if let Some(format) = classify(&chars, i) {
            if !buf.is_empty() {
                pieces.push(Piece::Text(std::mem::take(&mut buf)));
            }
            pieces.push(Piece::SayAs {
                text: chars[i].to_string(),
                format,
            });
        } else {
            buf.push(chars[i]);
        }
        i += 1;
    }
    if !buf.is_empty() {
        pieces.push(Piece::Text(buf));
    }
    pieces
}

fn is_opaque(name: Option<ElementName>) -> bool {
    matches!(
        name,
        Some(ElementName::W)
            | Some(ElementName::Break)
            | Some(ElementName::SayAs)
            | Some(ElementName::Phoneme)
            | Some(ElementName::Sub)
    )
}

/// The `TextSegment` stage.
pub struct TextSegment;

impl Stage for TextSegment {
    fn name(&self) -> &'static str {
        "TextSegment"
    }

    fn process(&mut self, doc: &mut Document) -> Result<()> {
        fn walk(doc: &mut Document, node: NodeId) {
            if is_opaque(doc.element_name(node)) {
                return;
            }
            let children = doc.children(node);
            for child in children {
                match doc.kind(child) {
                    NodeKind::Text { content } => {
                        let content = content.clone();
                        let pieces = segment(&content);
                        if pieces.len() == 1 {
                            if let Piece::Text(_) = &pieces[0] {
                                continue;
                            }
                        }
                        for piece in pieces {
                            let new_node = match piece {
                                Piece::Text(t) => doc.create_node(NodeKind::Text { content: t }),
                                Piece::SayAs { text, format } => {
                                    let say_as = doc.create_node(NodeKind::Element {
                                        name: ElementName::SayAs,
                                        attrs: Default::default(),
                                    });
                                    doc.insert_before(child, say_as);
                                    let _ = doc.set_attr(say_as, "interpret-as", "punctuation");
                                    let _ = doc.set_attr(say_as, "format", format);
                                    let text_node = doc.append_text(say_as, text);
                                    let _ = text_node;
                                    continue;
                                }
                            };
                            doc.insert_before(child, new_node);
                        }
                        doc.unlink(child);
                    }
                    _ => walk(doc, child),
                }
            }
        }
        walk(doc, doc.root());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_sentence_termination() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        doc.append_text(speak, "你好。再见");
        TextSegment.process(&mut doc).unwrap();

        let children = doc.children(speak);
        assert_eq!(children.len(), 3);
        assert_eq!(doc.text_content(children[0]), "你好");
        assert_eq!(doc.element_name(children[1]), Some(ElementName::SayAs));
        assert_eq!(doc.attr(children[1], "interpret-as"), Some("punctuation"));
        assert_eq!(doc.attr(children[1], "format"), Some("s"));
        assert_eq!(doc.text_content(children[1]), "。");
        assert_eq!(doc.text_content(children[2]), "再见");
    }

    #[test]
    fn decimal_dot_is_not_a_terminator() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        doc.append_text(speak, "3.14");
        TextSegment.process(&mut doc).unwrap();
        let children = doc.children(speak);
        assert_eq!(children.len(), 1);
        assert_eq!(doc.text_content(speak), "3.14");
    }

    #[test]
    fn comma_between_digits_is_not_a_terminator() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        doc.append_text(speak, "1,000");
        TextSegment.process(&mut doc).unwrap();
        assert_eq!(doc.children(speak).len(), 1);
    }

    #[test]
    fn opaque_elements_are_not_re_entered() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let w = doc.append_element(speak, ElementName::W);
        doc.append_text(w, "你好。");
        TextSegment.process(&mut doc).unwrap();
        assert_eq!(doc.children(w).len(), 1);
        assert_eq!(doc.text_content(w), "你好。");
    }

    #[test]
    fn remaining_suffix_after_final_punctuation_is_literal() {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        doc.append_text(speak, "一。二，三");
        TextSegment.process(&mut doc).unwrap();
        let children = doc.children(speak);
        let last = *children.last().unwrap();
        assert_eq!(doc.text_content(last), "三");
    }
}
