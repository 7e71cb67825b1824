//! Prefix trie over lexicon surface forms, used by `WordSegment`'s forward
//! maximum matching (spec §4.7).
use std::collections::HashMap;

/// A simple Trie (prefix tree) for storing lexicon surface forms.
#[derive(Debug, Default)]
pub struct TrieNode {
    children: HashMap<char, Box<TrieNode>>,
    is_end: bool,
    /// When `is_end` is true, `word` contains the matched surface form.
    word: Option<String>,
}

impl TrieNode {
    /// Create a new empty trie root.
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            is_end: false,
            word: None,
        }
    }

    /// Insert a surface form into the trie.
    pub fn insert(&mut self, word: &str) {
        let mut node = self;
        for ch in word.chars() {
            node = node
                .children
                .entry(ch)
                .or_insert_with(|| Box::new(TrieNode::new()));
        }
        node.is_end = true;
        node.word = Some(word.to_string());
    }

    /// Check whether the trie contains exactly the given word.
    pub fn contains_word(&self, word: &str) -> bool {
        let mut node = self;
        for ch in word.chars() {
            if let Some(child) = node.children.get(&ch) {
                node = child;
            } else {
                return false;
            }
        }
        node.is_end
    }

    /// Walk the trie starting at a position in `input` and return every
    /// matched prefix, in order of increasing length.
    ///
    /// This is the core operation behind forward maximum matching: from a
    /// given start position, find every lexicon entry that begins there so
    /// the caller can pick the longest one.
    ///
    /// Returns `(end_index, matched_string)` pairs where `end_index` is the
    /// exclusive character index after the match.
    pub fn walk_prefixes(&self, input: &[char], start: usize) -> Vec<(usize, String)> {
        let mut res = Vec::new();
        let mut node = self;
        let mut idx = start;
        while idx < input.len() {
            let ch = input[idx];
            if let Some(child) = node.children.get(&ch) {
                node = child;
                idx += 1;
                if node.is_end {
                    if let Some(w) = &node.word {
                        res.push((idx, w.clone()));
                    }
                }
            } else {
                break;
            }
        }
        res
    }
}
