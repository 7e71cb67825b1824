//! Grapheme2Phoneme (spec §4.9): assign `phoneme ph=…` (Pinyin) to each `w`
//! without one, consulting the lexicon for (surface, POS) → pronunciation.

use tts_core::tree::NodeKind;
use tts_core::{Document, ElementName, EnterAction, Lexicon, NodeId, Result, Visitor};

use crate::stage::Stage;

/// The `Grapheme2Phoneme` stage.
pub struct Grapheme2Phoneme<'a> {
    lexicon: &'a dyn Lexicon,
}

impl<'a> Grapheme2Phoneme<'a> {
    pub fn new(lexicon: &'a dyn Lexicon) -> Self {
        Self { lexicon }
    }
}

impl<'a> Stage for Grapheme2Phoneme<'a> {
    fn name(&self) -> &'static str {
        "Grapheme2Phoneme"
    }

    fn process(&mut self, doc: &mut Document) -> Result<()> {
        struct AnnotateWords<'a> {
            lexicon: &'a dyn Lexicon,
        }
        impl<'a> Visitor for AnnotateWords<'a> {
            fn enter(&mut self, doc: &mut Document, node: NodeId) -> Result<EnterAction> {
                if doc.element_name(node) == Some(ElementName::W) {
                    annotate_word(doc, node, self.lexicon);
                    return Ok(EnterAction::SkipChildren);
                }
                Ok(EnterAction::Continue)
            }
            fn leave(&mut self, _doc: &mut Document, _node: NodeId) -> Result<()> {
                Ok(())
            }
        }
        let root = doc.root();
        tts_core::walk(doc, root, &mut AnnotateWords { lexicon: self.lexicon })
    }
}

fn annotate_word(doc: &mut Document, w: NodeId, lexicon: &dyn Lexicon) {
    let children = doc.children(w);
    if children
        .iter()
        .any(|&c| doc.element_name(c) == Some(ElementName::Phoneme))
    {
        // Explicit phoneme already present; preserved verbatim (fixed).
        return;
    }

    let surface = doc.text_content(w);
    if surface.is_empty() {
        return;
    }
    let pos_hint = doc.attr(w, "role").map(|s| s.to_string());
    let ph = lexicon.get_phoneme(&surface, pos_hint.as_deref(), &surface);

    let phoneme = doc.create_node(NodeKind::Element {
        name: ElementName::Phoneme,
        attrs: Default::default(),
    });
    doc.append_child(w, phoneme);
    let _ = doc.set_attr(phoneme, "alphabet", lexicon.alphabet());
    let _ = doc.set_attr(phoneme, "ph", ph);

    for child in children {
        doc.unlink(child);
        doc.append_child(phoneme, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tts_core::InMemoryLexicon;

    #[test]
    fn assigns_phoneme_from_lexicon() {
        let mut lex = InMemoryLexicon::new();
        lex.insert("中国", "n", "zhong1 guo2", 10);

        let mut doc = Document::new();
        let root = doc.root();
        let w = doc.append_element(root, ElementName::W);
        doc.set_attr(w, "role", "n").unwrap();
        doc.append_text(w, "中国");

        Grapheme2Phoneme::new(&lex).process(&mut doc).unwrap();

        let phoneme = doc.children(w)[0];
        assert_eq!(doc.element_name(phoneme), Some(ElementName::Phoneme));
        assert_eq!(doc.attr(phoneme, "alphabet"), Some("pinyin"));
        assert_eq!(doc.attr(phoneme, "ph"), Some("zhong1 guo2"));
        assert_eq!(doc.text_content(phoneme), "中国");
    }

    #[test]
    fn existing_phoneme_is_preserved_verbatim() {
        let lex = InMemoryLexicon::new();
        let mut doc = Document::new();
        let root = doc.root();
        let w = doc.append_element(root, ElementName::W);
        let phoneme = doc.append_element(w, ElementName::Phoneme);
        doc.set_attr(phoneme, "alphabet", "pinyin").unwrap();
        doc.set_attr(phoneme, "ph", "shou3dong4").unwrap();
        doc.append_text(phoneme, "手动");

        Grapheme2Phoneme::new(&lex).process(&mut doc).unwrap();

        assert_eq!(doc.attr(phoneme, "ph"), Some("shou3dong4"));
    }

    #[test]
    fn lexicon_miss_falls_back_to_surface_text_as_phoneme() {
        let lex = InMemoryLexicon::new();
        let mut doc = Document::new();
        let root = doc.root();
        let w = doc.append_element(root, ElementName::W);
        doc.append_text(w, "未知");

        Grapheme2Phoneme::new(&lex).process(&mut doc).unwrap();

        let phoneme = doc.children(w)[0];
        assert_eq!(doc.attr(phoneme, "ph"), Some("未知"));
    }
}
