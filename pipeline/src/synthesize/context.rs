//! Position-context statistics for HTS label construction (spec §4.12.2).
//!
//! The spec describes this as a single forward sweep with buffers that get
//! "closed" (backward positions resolved) when a strong-enough boundary is
//! crossed. Grouping the syllable list into word/phrase/breath-group
//! *ranges* up front produces the identical final positions with far less
//! bookkeeping — a span's forward/backward position is just its offset
//! from the start/end of its range — so that's what this module does.
//!
//! Span boundaries follow the drop-through policy: every `w` closes a
//! PWord span; a break `>= Medium` (PPHRASE) also closes the enclosing
//! phrase span; a break `>= Strong` (IPHRASE) also closes the enclosing
//! breath-group span. The end of the sentence always closes every level,
//! regardless of the final break's recorded strength, since the `s`
//! element's own boundary is the outer edge of the hierarchy.

use tts_core::BoundaryStrength;

/// One syllable's inputs to the position sweep.
#[derive(Debug, Clone)]
pub struct SylInput {
    pub tone: u8,
    pub n_segs: usize,
    pub word_id: usize,
    /// Strength of the break immediately following this syllable's word.
    /// Only meaningful on a word's last syllable; `Syllable` elsewhere.
    pub right_break: BoundaryStrength,
}

/// Syllable/word/phrase/breath-group range groupings and the index maps
/// between them, built by [`build`].
pub struct Context {
    /// Word index owning each syllable.
    pub syl_word: Vec<usize>,
    /// Phrase index owning each word.
    pub word_phrase: Vec<usize>,
    /// Breath-group index owning each phrase.
    pub phrase_bg: Vec<usize>,
    /// `(syl_start, syl_end)` per word.
    pub words: Vec<(usize, usize)>,
    /// `(word_start, word_end)` per phrase.
    pub phrases: Vec<(usize, usize)>,
    /// `(phrase_start, phrase_end)` per breath group.
    pub bgs: Vec<(usize, usize)>,
}

pub fn build(syls: &[SylInput]) -> Context {
    let n = syls.len();
    let mut syl_word = vec![0usize; n];
    let mut words: Vec<(usize, usize)> = Vec::new();

    let mut i = 0;
    while i < n {
        let wid = syls[i].word_id;
        let mut j = i;
        while j < n && syls[j].word_id == wid {
            syl_word[j] = words.len();
            j += 1;
        }
        words.push((i, j));
        i = j;
    }

    let mut word_phrase = vec![0usize; words.len()];
    let mut phrases: Vec<(usize, usize)> = Vec::new();
    let mut phrase_start = 0usize;
    for (w_idx, &(_s, e)) in words.iter().enumerate() {
        word_phrase[w_idx] = phrases.len();
        let last_break = syls[e - 1].right_break;
        let is_last_word = w_idx + 1 == words.len();
        if last_break >= BoundaryStrength::Medium || is_last_word {
            phrases.push((phrase_start, w_idx + 1));
            phrase_start = w_idx + 1;
        }
    }

    let mut phrase_bg = vec![0usize; phrases.len()];
    let mut bgs: Vec<(usize, usize)> = Vec::new();
    let mut bg_start = 0usize;
    for (p_idx, &(_ws, we)) in phrases.iter().enumerate() {
        phrase_bg[p_idx] = bgs.len();
        let last_word_end = words[we - 1].1;
        let last_break = syls[last_word_end - 1].right_break;
        let is_last_phrase = p_idx + 1 == phrases.len();
        if last_break >= BoundaryStrength::Strong || is_last_phrase {
            bgs.push((bg_start, p_idx + 1));
            bg_start = p_idx + 1;
        }
    }

    Context {
        syl_word,
        word_phrase,
        phrase_bg,
        words,
        phrases,
        bgs,
    }
}

impl Context {
    pub fn word_of(&self, syl: usize) -> usize {
        self.syl_word[syl]
    }
    pub fn phrase_of(&self, word: usize) -> usize {
        self.word_phrase[word]
    }
    pub fn bg_of(&self, phrase: usize) -> usize {
        self.phrase_bg[phrase]
    }

    pub fn pos_in_word(&self, syl: usize) -> (usize, usize) {
        let (s, e) = self.words[self.word_of(syl)];
        (syl - s, e - 1 - syl)
    }
    pub fn n_syls_in_word(&self, word: usize) -> usize {
        let (s, e) = self.words[word];
        e - s
    }

    pub fn pos_word_in_phrase(&self, word: usize) -> (usize, usize) {
        let (ws, we) = self.phrases[self.phrase_of(word)];
        (word - ws, we - 1 - word)
    }
    pub fn n_words_in_phrase(&self, phrase: usize) -> usize {
        let (ws, we) = self.phrases[phrase];
        we - ws
    }
    pub fn n_syls_in_phrase(&self, phrase: usize) -> usize {
        let (ws, we) = self.phrases[phrase];
        self.words[we - 1].1 - self.words[ws].0
    }

    pub fn pos_phrase_in_bg(&self, phrase: usize) -> (usize, usize) {
        let (ps, pe) = self.bgs[self.bg_of(phrase)];
        (phrase - ps, pe - 1 - phrase)
    }
    pub fn n_phrases_in_bg(&self, bg: usize) -> usize {
        let (ps, pe) = self.bgs[bg];
        pe - ps
    }
    pub fn n_words_in_bg(&self, bg: usize) -> usize {
        let (ps, pe) = self.bgs[bg];
        self.phrases[pe - 1].1 - self.phrases[ps].0
    }

    /// Position of `word` within the word range spanned by its breath
    /// group (which may cover several phrases).
    pub fn pos_word_in_bg(&self, word: usize) -> (usize, usize) {
        let bg = self.bg_of(self.phrase_of(word));
        let (ps, pe) = self.bgs[bg];
        let word_start = self.phrases[ps].0;
        let word_end = self.phrases[pe - 1].1;
        (word - word_start, word_end - 1 - word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syl(word_id: usize, right_break: BoundaryStrength) -> SylInput {
        SylInput {
            tone: 1,
            n_segs: 1,
            word_id,
            right_break,
        }
    }

    #[test]
    fn single_syllable_single_word_sentence() {
        let syls = vec![syl(0, BoundaryStrength::XStrong)];
        let ctx = build(&syls);
        assert_eq!(ctx.words, vec![(0, 1)]);
        assert_eq!(ctx.phrases, vec![(0, 1)]);
        assert_eq!(ctx.bgs, vec![(0, 1)]);
        assert_eq!(ctx.pos_in_word(0), (0, 0));
        assert_eq!(ctx.pos_word_in_phrase(0), (0, 0));
        assert_eq!(ctx.pos_phrase_in_bg(0), (0, 0));
    }

    #[test]
    fn weak_breaks_keep_words_in_the_same_phrase() {
        // w0 w1(weak break) w2 w3(x-strong, sentence end)
        let syls = vec![
            syl(0, BoundaryStrength::Syllable),
            syl(1, BoundaryStrength::Weak),
            syl(2, BoundaryStrength::Syllable),
            syl(3, BoundaryStrength::XStrong),
        ];
        let ctx = build(&syls);
        assert_eq!(ctx.words.len(), 4);
        assert_eq!(ctx.phrases, vec![(0, 4)]);
        assert_eq!(ctx.n_words_in_phrase(0), 4);
    }

    #[test]
    fn medium_break_splits_a_new_phrase() {
        let syls = vec![
            syl(0, BoundaryStrength::Medium),
            syl(1, BoundaryStrength::XStrong),
        ];
        let ctx = build(&syls);
        assert_eq!(ctx.phrases, vec![(0, 1), (1, 2)]);
        assert_eq!(ctx.bgs, vec![(0, 2)]);
    }

    #[test]
    fn strong_break_splits_a_new_breath_group() {
        let syls = vec![
            syl(0, BoundaryStrength::Strong),
            syl(1, BoundaryStrength::XStrong),
        ];
        let ctx = build(&syls);
        assert_eq!(ctx.phrases, vec![(0, 1), (1, 2)]);
        assert_eq!(ctx.bgs, vec![(0, 1), (1, 2)]);
    }
}
