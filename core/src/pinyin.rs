//! Pinyin decomposition (spec §3.4, §4.12.3).
//!
//! Mirrors the original engine's `CPinyin::split()`: strip the Erhua `r`
//! suffix and tone digit off the raw syllable, split the remainder into
//! initial/final, then apply the final-rewrite table in the order spec.md
//! fixes. The rewrite rules are mechanical table lookups, not a linguistic
//! model — faithfulness to the literal rule table (and hence to the HTS
//! label wire format) matters more here than phonetic accuracy.

use crate::error::{Error, Result};

/// The 23 Pinyin initials, longest first so `zh/ch/sh` are matched before
/// their single-letter prefixes.
const INITIALS: &[&str] = &[
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "z",
    "c", "s", "r",
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'v')
}

/// A decomposed Pinyin syllable: `initial? + final + retroflex? + tone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syllable {
    pub initial: Option<String>,
    pub fin: String,
    pub retroflex: bool,
    /// 1..5; neutral tone (absent or `0` in input) normalizes to 5.
    pub tone: u8,
}

impl Syllable {
    /// The main phone token rendered in HTS labels: `final + tone digit`
    /// (spec §4.12.3).
    pub fn main_phone(&self) -> String {
        format!("{}{}", self.fin, self.tone)
    }

    /// The ordered phone list emitted for this syllable (spec §4.12.3):
    /// `initial?`, `final+tone`, `rr` iff Erhua.
    pub fn phones(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(i) = &self.initial {
            out.push(i.clone());
        }
        out.push(self.main_phone());
        if self.retroflex {
            out.push("rr".to_string());
        }
        out
    }
}

/// Split a raw Pinyin syllable (spec §3.4). `raw` may carry a trailing
/// tone digit and, after that, a trailing Erhua `r` (e.g. `hua1r`).
///
/// Retroflex (Erhua) is recognized purely from the trailing `r` in the
/// Pinyin; whether the following surface character is actually `儿` is a
/// caller-side check (spec §4.10 folds both conditions together when
/// deciding whether to consume two characters into one unit — this
/// function only reports what the Pinyin string itself says).
pub fn split(raw: &str) -> Result<Syllable> {
    if raw.is_empty() {
        return Err(Error::InvalidInput("empty pinyin syllable".into()));
    }

    let mut work = raw.to_string();

    let retroflex = if work.ends_with('r') && work != "er" && work.len() > 1 {
        work.pop();
        true
    } else {
        false
    };

    let tone = match work.chars().last() {
        Some(c) if c.is_ascii_digit() => {
            let d = c.to_digit(10).unwrap() as u8;
            work.pop();
            if d == 0 {
                5
            } else {
                d
            }
        }
        _ => 5,
    };

    if work.is_empty() {
        return Err(Error::InvalidInput(format!(
            "pinyin syllable has no body: {raw}"
        )));
    }

    // Rule: standalone ng/n/m carry no initial; the whole body is the final.
    // The bare interjection "ng" collapses to "n", same as the `ng` finals
    // rule below (utl_pinyin.cpp:161: `if (wcscmp(final,L"ng")==0)`).
    if work == "ng" || work == "n" || work == "m" {
        let fin = if work == "ng" { "n".to_string() } else { work };
        return Ok(Syllable {
            initial: None,
            fin,
            retroflex,
            tone,
        });
    }

    let mut initial: Option<&str> = None;
    let mut final_raw = work.as_str();
    for cand in INITIALS {
        if work.starts_with(cand) && work.len() > cand.len() {
            initial = Some(cand);
            final_raw = &work[cand.len()..];
            break;
        }
    }

    let fin = rewrite_final(initial, final_raw);

    Ok(Syllable {
        initial: initial.map(|s| s.to_string()),
        fin,
        retroflex,
        tone,
    })
}

/// Apply the final-rewrite table of spec §4.12.3, in its fixed order.
fn rewrite_final(initial: Option<&str>, final_raw: &str) -> String {
    let mut f = final_raw.to_string();

    // y + vowel -> i (drop if redundant)
    if f.starts_with('y') && f.len() > 1 && is_vowel(f.chars().nth(1).unwrap()) {
        f = format!("i{}", &f[1..]);
        if f.starts_with("ii") {
            f.remove(0);
        }
    }

    // yu* -> treat u as v (checked against the original surface form, since
    // the y+vowel rule above already turned "yu" into "iu").
    if final_raw.starts_with("yu") {
        f = format!("v{}", &final_raw[2..]);
    }

    // w + vowel -> u (drop if redundant)
    if f.starts_with('w') && f.len() > 1 && is_vowel(f.chars().nth(1).unwrap()) {
        f = format!("u{}", &f[1..]);
        if f.starts_with("uu") {
            f.remove(0);
        }
    }

    // ju/qu/xu -> u as v
    if matches!(initial, Some("j") | Some("q") | Some("x")) && f.starts_with('u') {
        f = format!("v{}", &f[1..]);
    }

    // always-rewrites
    if f == "ui" {
        f = "uei".to_string();
    } else if f == "iu" {
        f = "iou".to_string();
    } else if f == "un" {
        f = "uen".to_string();
    }

    // zi/ci/si final i -> ix
    if matches!(initial, Some("z") | Some("c") | Some("s")) && f == "i" {
        f = "ix".to_string();
    }

    // zhi/chi/shi/ri final i -> iy
    if matches!(initial, Some("zh") | Some("ch") | Some("sh") | Some("r")) && f == "i" {
        f = "iy".to_string();
    }

    // historical E -> ev -> ei collapse
    if f == "ev" {
        f = "ei".to_string();
    }

    // final ng -> n collapse: only the bare interjection final "ng" itself
    // (utl_pinyin.cpp:161: `if (wcscmp(final,L"ng")==0)`), never a nasal
    // ending like -ang/-eng/-ing/-ong that merely ends with "ng".
    if f == "ng" {
        f = "n".to_string();
    }

    f
}
