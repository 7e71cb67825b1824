//! Pinyin → phone decomposition for label construction (spec §4.12.3,
//! §4.12.7).

use once_cell::sync::Lazy;
use regex::Regex;

use tts_core::pinyin;

/// Tokens shaped like Pinyin: one or more ASCII letters plus an optional
/// single trailing tone digit. Anything else (embedded digits, bare
/// numbers, punctuation) is not attempted as Pinyin at all.
static PINYIN_SHAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+[0-9]?$").unwrap());

/// One syllable's phones plus the syllable-level facts the label renderer
/// needs (tone, segment count, main phone).
#[derive(Debug, Clone)]
pub struct SylPhones {
    pub phones: Vec<String>,
    pub tone: u8,
    /// The token rendered into the label's `|CsylFinal` field: `final+tone`
    /// for a Pinyin syllable, the whole token for a symbol/unknown token.
    /// Not simply `phones.last()` — for an Erhua syllable that would be the
    /// trailing `rr` phone, but `hts_ssml2lab.cpp:245-252` never promotes
    /// `retro` into `sylFinal`.
    pub main_phone: String,
}

impl SylPhones {
    pub fn n_segs(&self) -> usize {
        self.phones.len()
    }
}

/// Decompose one unit's `ph` token into phones (spec §4.12.3).
///
/// - `_`-prefixed tokens are whole symbols: one phone, tone 0.
/// - Tokens not shaped like Pinyin are an unknown phoneme token; treated
///   the same way as a symbol, whole unit (spec §4.12.7).
/// - Tokens shaped like Pinyin that still fail `pinyin::split` (spec §3.4)
///   emit no phones at all — the owning `unit` stays in the document
///   untouched (spec §4.12.7: "skip phone emission, keep unit").
pub fn decompose(token: &str) -> SylPhones {
    if token.starts_with('_') || !PINYIN_SHAPE_RE.is_match(token) {
        return SylPhones {
            phones: vec![token.to_string()],
            tone: 0,
            main_phone: token.to_string(),
        };
    }
    match pinyin::split(token) {
        Ok(syl) => SylPhones {
            phones: syl.phones(),
            tone: syl.tone,
            main_phone: syl.main_phone(),
        },
        Err(_) => SylPhones {
            phones: Vec::new(),
            tone: 0,
            main_phone: String::new(),
        },
    }
}
