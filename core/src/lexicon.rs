//! Lexicon interface (spec §6.2) — consumed by `WordSegment` and
//! `Grapheme2Phoneme`. The real lexicon (decision-tree/PDF model data) is an
//! external collaborator; this module specifies the lookup contract plus an
//! in-memory implementation suitable for tests and small deployments.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::trie::TrieNode;

/// One lexicon entry for a surface form: part-of-speech, pronunciation, and
/// a ranking frequency. The first entry returned by [`Lexicon::lookup_word`]
/// wins ties (spec §4.7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub pos: String,
    pub phoneme: String,
    pub freq: u32,
}

/// The lookup contract `WordSegment` and `Grapheme2Phoneme` consume.
pub trait Lexicon {
    /// Always `"pinyin"` for this engine (spec §6.2).
    fn alphabet(&self) -> &str;

    /// Longest surface-form length in the lexicon, in Unicode code points.
    fn word_max_len(&self) -> usize;

    /// Ordered (by descending preference), possibly-empty list of entries
    /// for `surface`.
    fn lookup_word(&self, surface: &str) -> Vec<LexiconEntry>;

    /// Resolve a pronunciation for `surface`, preferring an entry whose POS
    /// matches `pos_hint`; if none does, return `fallback`.
    fn get_phoneme(&self, surface: &str, pos_hint: Option<&str>, fallback: &str) -> String {
        let entries = self.lookup_word(surface);
        if let Some(hint) = pos_hint {
            if let Some(e) = entries.iter().find(|e| e.pos == hint) {
                return e.phoneme.clone();
            }
        }
        entries
            .first()
            .map(|e| e.phoneme.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// A simple in-memory `Lexicon`: a prefix trie over surface forms for
/// `WordSegment`'s forward maximum matching, plus a map from surface form to
/// its candidate entries.
#[derive(Debug, Default)]
pub struct InMemoryLexicon {
    trie: TrieNode,
    entries: HashMap<String, Vec<LexiconEntry>>,
    max_len: usize,
}

impl InMemoryLexicon {
    pub fn new() -> Self {
        Self {
            trie: TrieNode::new(),
            entries: HashMap::new(),
            max_len: 0,
        }
    }

    /// Register a surface form with one candidate entry. Calling this
    /// repeatedly for the same surface form with different entries appends
    /// to its candidate list, preserving insertion order (earlier
    /// insertions win ties, per spec §4.7).
    pub fn insert(&mut self, surface: &str, pos: impl Into<String>, phoneme: impl Into<String>, freq: u32) {
        self.trie.insert(surface);
        self.max_len = self.max_len.max(surface.chars().count());
        self.entries
            .entry(surface.to_string())
            .or_default()
            .push(LexiconEntry {
                pos: pos.into(),
                phoneme: phoneme.into(),
                freq,
            });
    }

    /// Find every lexicon entry whose surface form is a prefix of `input`
    /// starting at `start`, for `WordSegment`'s forward-maximum-match scan.
    pub fn walk_prefixes(&self, input: &[char], start: usize) -> Vec<(usize, String)> {
        self.trie.walk_prefixes(input, start)
    }

    /// Load a lexicon from lines of the form
    /// `<surface><tab><pos><tab><phoneme><tab><freq>`, mirroring
    /// [`crate`]'s other flat external data formats
    /// (`CharTable::from_lines`). Malformed lines are skipped.
    pub fn from_tsv(text: &str) -> Self {
        let mut lex = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut cols = line.split('\t');
            if let (Some(surface), Some(pos), Some(phoneme), Some(freq)) =
                (cols.next(), cols.next(), cols.next(), cols.next())
            {
                let freq = freq.trim().parse().unwrap_or(0);
                lex.insert(surface, pos, phoneme, freq);
            }
        }
        lex
    }
}

impl Lexicon for InMemoryLexicon {
    fn alphabet(&self) -> &str {
        "pinyin"
    }

    fn word_max_len(&self) -> usize {
        self.max_len.max(1)
    }

    fn lookup_word(&self, surface: &str) -> Vec<LexiconEntry> {
        self.entries.get(surface).cloned().unwrap_or_default()
    }
}
