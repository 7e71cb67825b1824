//! LangConvert (spec §4.3): character-by-character substitution, e.g.
//! Traditional→Simplified Chinese. Pure mapping, no state across calls.

use std::collections::HashMap;

use tracing::trace;

use tts_core::{Document, EnterAction, NodeId, NodeKind, Result, Visitor};

use crate::stage::Stage;

/// A character-substitution table. Characters absent from the table are
/// preserved verbatim.
#[derive(Debug, Clone, Default)]
pub struct CharTable {
    map: HashMap<char, char>,
}

impl CharTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from lines of the form `<from_char><tab><to_char>`,
    /// mirroring the flat external mapping files this stage reads in
    /// production.
    pub fn from_lines(text: &str) -> Self {
        let mut map = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut cols = line.split('\t');
            if let (Some(from), Some(to)) = (cols.next(), cols.next()) {
                if let (Some(f), Some(t)) = (from.chars().next(), to.chars().next()) {
                    map.insert(f, t);
                }
            }
        }
        Self { map }
    }

    fn convert(&self, text: &str) -> String {
        text.chars()
            .map(|c| *self.map.get(&c).unwrap_or(&c))
            .collect()
    }
}

/// The `LangConvert` stage: rewrites every text node through a `CharTable`.
pub struct LangConvert {
    table: CharTable,
}

impl LangConvert {
    pub fn new(table: CharTable) -> Self {
        Self { table }
    }
}

struct RewriteText<'a> {
    table: &'a CharTable,
}

impl<'a> Visitor for RewriteText<'a> {
    fn enter(&mut self, doc: &mut Document, node: NodeId) -> Result<EnterAction> {
        if let NodeKind::Text { content } = doc.kind(node).clone() {
            let rewritten = self.table.convert(&content);
            if rewritten != content {
                trace!(stage = "LangConvert", from = %content, to = %rewritten);
            }
            *doc.kind_mut(node) = NodeKind::Text { content: rewritten };
        }
        Ok(EnterAction::Continue)
    }

    fn leave(&mut self, _doc: &mut Document, _node: NodeId) -> Result<()> {
        Ok(())
    }
}

impl Stage for LangConvert {
    fn name(&self) -> &'static str {
        "LangConvert"
    }

    fn process(&mut self, doc: &mut Document) -> Result<()> {
        let root = doc.root();
        tts_core::walk(doc, root, &mut RewriteText { table: &self.table })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tts_core::ElementName;

    #[test]
    fn rewrites_mapped_characters_and_preserves_others() {
        let table = CharTable::from_lines("國\t国\n");
        let mut stage = LangConvert::new(table);
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        doc.append_text(speak, "中國你好");
        stage.process(&mut doc).unwrap();
        assert_eq!(doc.text_content(speak), "中国你好");
    }

    #[test]
    fn empty_table_is_identity() {
        let mut stage = LangConvert::new(CharTable::new());
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        doc.append_text(speak, "保持不变");
        stage.process(&mut doc).unwrap();
        assert_eq!(doc.text_content(speak), "保持不变");
    }
}
