//! UnitSegment (spec §4.10): split each `w`'s Pinyin string into
//! per-syllable `unit` elements, detecting Erhua.
//!
//! Mirrors `unitseg_unitsegment.cpp`'s two-pass tokenizer: pass 1 splits on
//! whitespace/`-`, pulling out whole `_`-prefixed symbol tokens; pass 2
//! peels `[A-Za-z]+[0-9]?` syllables off every remaining Pinyin token. That
//! regex alone splits an Erhua-marked syllable like `hua1r` into `hua1` and
//! a stray `r` (the tone digit breaks the run of letters); a follow-up pass
//! re-attaches a lone trailing `r` token to its predecessor, recovering the
//! original syllable before the surface-character alignment pass runs.

use once_cell::sync::Lazy;
use regex::Regex;

use tts_core::tree::NodeKind;
use tts_core::{Document, ElementName, EnterAction, NodeId, Result, Visitor};

use crate::stage::Stage;

static SYLLABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+[0-9]?").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Pinyin(String),
    Symbol(String),
}

fn pass1(ph: &str) -> Vec<Token> {
    ph.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|s| !s.is_empty())
        .map(|raw| {
            if raw.starts_with('_') {
                Token::Symbol(raw.to_string())
            } else {
                Token::Pinyin(raw.to_string())
            }
        })
        .collect()
}

fn pass2(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::new();
    for t in tokens {
        match t {
            Token::Symbol(s) => out.push(Token::Symbol(s)),
            Token::Pinyin(s) => {
                let mut rest = s.as_str();
                while !rest.is_empty() {
                    match SYLLABLE_RE.find(rest) {
                        Some(m) => {
                            out.push(Token::Pinyin(m.as_str().to_string()));
                            rest = &rest[m.end()..];
                        }
                        None => break,
                    }
                }
            }
        }
    }
    out
}

/// Re-attach a lone trailing `r`/`R` token (the Erhua marker, split off by
/// the tone digit) onto its preceding syllable.
fn merge_erhua_marker(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::new();
    for t in tokens {
        if let Token::Pinyin(s) = &t {
            if (s == "r" || s == "R") && matches!(out.last(), Some(Token::Pinyin(_))) {
                if let Some(Token::Pinyin(prev)) = out.last_mut() {
                    prev.push('r');
                }
                continue;
            }
        }
        out.push(t);
    }
    out
}

fn is_erhua_marker(pinyin: &str) -> bool {
    pinyin.len() > 1 && pinyin != "er" && pinyin.to_lowercase().ends_with('r')
}

/// Tokenize a word's `ph` string into ordered syllable/symbol tokens.
fn tokenize(ph: &str) -> Vec<Token> {
    merge_erhua_marker(pass2(pass1(ph)))
}

/// The `UnitSegment` stage.
pub struct UnitSegment;

impl Stage for UnitSegment {
    fn name(&self) -> &'static str {
        "UnitSegment"
    }

    fn process(&mut self, doc: &mut Document) -> Result<()> {
        struct SegmentWords;
        impl Visitor for SegmentWords {
            fn enter(&mut self, doc: &mut Document, node: NodeId) -> Result<EnterAction> {
                if doc.element_name(node) == Some(ElementName::W) {
                    segment_word(doc, node);
                    return Ok(EnterAction::SkipChildren);
                }
                Ok(EnterAction::Continue)
            }
            fn leave(&mut self, _doc: &mut Document, _node: NodeId) -> Result<()> {
                Ok(())
            }
        }
        let root = doc.root();
        tts_core::walk(doc, root, &mut SegmentWords)
    }
}

fn segment_word(doc: &mut Document, w: NodeId) {
    let children = doc.children(w);
    let phoneme = children
        .iter()
        .copied()
        .find(|&c| doc.element_name(c) == Some(ElementName::Phoneme));
    let Some(phoneme) = phoneme else {
        return;
    };
    if children
        .iter()
        .any(|&c| doc.element_name(c) == Some(ElementName::Unit))
    {
        return; // already segmented
    }

    let ph = doc.attr(phoneme, "ph").unwrap_or("").to_string();
    let surface_text = doc.text_content(phoneme);
    let tokens = tokenize(&ph);

    if tokens.is_empty() {
        return;
    }

    let chars: Vec<char> = surface_text.chars().collect();
    let mut idx = 0usize;
    let n = tokens.len();

    for (i, tok) in tokens.into_iter().enumerate() {
        let is_last = i + 1 == n;
        let (ph_str, is_symbol) = match tok {
            Token::Pinyin(s) => (s, false),
            Token::Symbol(s) => (s, true),
        };

        let mut text = String::new();
        if !is_symbol {
            if idx < chars.len() {
                text.push(chars[idx]);
                idx += 1;
            }
            if is_erhua_marker(&ph_str) && idx < chars.len() && chars[idx] == '儿' {
                text.push(chars[idx]);
                idx += 1;
            }
        }
        if is_last {
            while idx < chars.len() {
                text.push(chars[idx]);
                idx += 1;
            }
        }

        let unit = doc.create_node(NodeKind::Element {
            name: ElementName::Unit,
            attrs: Default::default(),
        });
        doc.append_child(w, unit);
        let _ = doc.set_attr(unit, "uid", format!("{ph_str}:{i}"));

        let prosody = doc.append_element(unit, ElementName::Prosody);
        let unit_phoneme = doc.append_element(prosody, ElementName::Phoneme);
        let _ = doc.set_attr(unit_phoneme, "alphabet", "pinyin");
        let _ = doc.set_attr(unit_phoneme, "ph", ph_str);
        doc.append_text(unit_phoneme, text);
    }

    doc.unlink(phoneme);
}
