//! TextNormalize (spec §4.6): expand each `say-as` into a `sub alias=…`
//! carrying the spoken-form text and a POS hint for `WordSegment`.
//!
//! The base implementation is the identity expansion (alias ← original
//! text, POS ← `"x"`); specialized expanders (numbers, currency, dates)
//! plug in without changing the `say-as` → `sub` contract.

use tts_core::tree::NodeKind;
use tts_core::{Document, ElementName, NodeId, Result};

use crate::stage::Stage;

/// Expands a `say-as`'s text into a spoken form plus a POS tag. The default
/// `IdentityExpander` satisfies spec §4.6's base contract.
pub trait SayAsExpander {
    /// Returns `(spoken_form, pos)`.
    fn expand(&self, interpret_as: &str, format: &str, detail: Option<&str>, text: &str) -> (String, String);
}

pub struct IdentityExpander;

impl SayAsExpander for IdentityExpander {
    fn expand(&self, _interpret_as: &str, _format: &str, _detail: Option<&str>, text: &str) -> (String, String) {
        (text.to_string(), "x".to_string())
    }
}

/// The `TextNormalize` stage.
pub struct TextNormalize<E: SayAsExpander = IdentityExpander> {
    expander: E,
}

impl TextNormalize<IdentityExpander> {
    pub fn new() -> Self {
        Self {
            expander: IdentityExpander,
        }
    }
}

impl Default for TextNormalize<IdentityExpander> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SayAsExpander> TextNormalize<E> {
    pub fn with_expander(expander: E) -> Self {
        Self { expander }
    }
}

impl<E: SayAsExpander> Stage for TextNormalize<E> {
    fn name(&self) -> &'static str {
        "TextNormalize"
    }

    fn process(&mut self, doc: &mut Document) -> Result<()> {
        fn walk<E: SayAsExpander>(doc: &mut Document, node: NodeId, expander: &E) {
            let children = doc.children(node);
            for child in children {
                if doc.element_name(child) == Some(ElementName::SayAs) {
                    normalize_say_as(doc, child, expander);
                } else {
                    walk(doc, child, expander);
                }
            }
        }
        walk(doc, doc.root(), &self.expander);
        Ok(())
    }
}

fn normalize_say_as<E: SayAsExpander>(doc: &mut Document, say_as: NodeId, expander: &E) {
    let grandchildren = doc.children(say_as);
    let text_child = match grandchildren
        .iter()
        .find(|&&c| matches!(doc.kind(c), NodeKind::Text { .. }))
    {
        Some(&c) => c,
        None => return,
    };
    let text = doc.text_content(text_child);
    let interpret_as = doc.attr(say_as, "interpret-as").unwrap_or("").to_string();
    let format = doc.attr(say_as, "format").unwrap_or("").to_string();
    let detail = doc.attr(say_as, "detail").map(|s| s.to_string());

    let (alias, pos) = expander.expand(&interpret_as, &format, detail.as_deref(), &text);

    let sub = doc.create_node(NodeKind::Element {
        name: ElementName::Sub,
        attrs: Default::default(),
    });
    doc.insert_before(say_as, sub);
    let _ = doc.set_attr(sub, "alias", alias);
    let _ = doc.set_attr(sub, "role", pos);
    for gc in doc.children(say_as) {
        doc.unlink(gc);
        doc.append_child(sub, gc);
    }
    doc.unlink(say_as);
}
