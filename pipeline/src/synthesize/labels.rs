//! HTS context-label rendering (spec §4.12.4, §4.12.5) — the wire contract
//! with the HMM engine. Every field, separator, and fallback token below is
//! fixed by the label syntax table; nothing here is stylistic.

use tts_core::BoundaryStrength;

use super::context::{self, Context};
use super::phones::SylPhones;

/// One phone in the whole-utterance phone stream: either a real phone
/// belonging to a syllable, or a synthetic `sil` inserted at a PPHRASE+
/// break (spec §4.12.5).
#[derive(Debug, Clone)]
pub struct PhoneEntry {
    pub phone: String,
    pub syl: Option<usize>,
    pub seg_fw: usize,
    pub seg_bw: usize,
}

/// Flatten every syllable's phones (plus synthetic `sil` segments at
/// PPHRASE-or-stronger breaks) into one ordered stream.
pub fn build_phone_stream(
    syls: &[context::SylInput],
    phones: &[SylPhones],
) -> Vec<PhoneEntry> {
    let mut out = Vec::new();
    for (i, sp) in phones.iter().enumerate() {
        let n = sp.phones.len();
        for (k, ph) in sp.phones.iter().enumerate() {
            out.push(PhoneEntry {
                phone: ph.clone(),
                syl: Some(i),
                seg_fw: k,
                seg_bw: n - 1 - k,
            });
        }
        if syls[i].right_break >= BoundaryStrength::Medium {
            out.push(PhoneEntry {
                phone: "sil".to_string(),
                syl: None,
                seg_fw: 0,
                seg_bw: 0,
            });
        }
    }
    out
}

fn phone_at(entries: &[PhoneEntry], i: isize) -> String {
    if i < 0 || i as usize >= entries.len() {
        "X".to_string()
    } else {
        entries[i as usize].phone.clone()
    }
}

/// `{0=none, 1=PWORD, 5=PPHRASE/IPHRASE/SENTENCE}` (spec §4.12.4).
fn boundary_code(s: BoundaryStrength) -> u8 {
    match s {
        BoundaryStrength::Syllable | BoundaryStrength::XWeak => 0,
        BoundaryStrength::Weak => 1,
        BoundaryStrength::Medium | BoundaryStrength::Strong | BoundaryStrength::XStrong => 5,
    }
}

/// Render one label line (one phone segment). `left_break`/`right_break`
/// are the boundary strengths immediately before/after `syls[syl]` when
/// `entries[idx].syl` is `Some`.
#[allow(clippy::too_many_arguments)]
pub fn render_label(
    entries: &[PhoneEntry],
    idx: usize,
    syls: &[context::SylInput],
    phones: &[SylPhones],
    ctx: &Context,
    left_break: &[BoundaryStrength],
    beg_time_ticks: i64,
    end_time_ticks: i64,
) -> String {
    let entry = &entries[idx];
    let pp = phone_at(entries, idx as isize - 2);
    let p = phone_at(entries, idx as isize - 1);
    let c = entry.phone.clone();
    let n = phone_at(entries, idx as isize + 1);
    let nn = phone_at(entries, idx as isize + 2);

    let pos_in_syl_fw = entry.seg_fw + 1;
    let pos_in_syl_bw = entry.seg_bw + 1;

    // §4.12.4: "a label is one line of ASCII" -- the multi-row layout in
    // the field table is a display wrap of one logical line, not separate
    // lines; fields are space-joined here, never newline-joined.
    let head =
        format!("{beg_time_ticks}\t{end_time_ticks}\t{pp}^{p}-{c}+{n}={nn} @{pos_in_syl_fw}_{pos_in_syl_bw}");

    let Some(syl) = entry.syl else {
        // Synthetic `sil` segment: all syllable-and-above fields defaulted.
        return format!(
            "{head} /A:0_0_0 /B:0-0-0 @1-1 &1-1 #1-1 $0-0 !0-0 ;5-5 |sil /C:0+0+0 /D:X_0 /E:X+0 @1+1 &1+1 #0+0 /F:X_0 /G:0_0 /H:0=0 ^1=1 |X /I:0=0 /K:0 #0 !0 @0 /M:0+0-0^0 /N:0"
        );
    };

    let word = ctx.word_of(syl);
    let phrase = ctx.phrase_of(word);
    let bg = ctx.bg_of(phrase);

    let (pos_syl_in_word_fw, pos_syl_in_word_bw) = ctx.pos_in_word(syl);
    let (pos_word_in_phr_fw, pos_word_in_phr_bw) = ctx.pos_word_in_phrase(word);
    let (pos_word_in_bg_fw, pos_word_in_bg_bw) = ctx.pos_word_in_bg(word);
    let (pos_phr_in_bg_fw, pos_phr_in_bg_bw) = ctx.pos_phrase_in_bg(phrase);

    let left_tone = if syl > 0 { phones[syl - 1].tone } else { 0 };
    let left_n_segs = if syl > 0 { phones[syl - 1].n_segs() } else { 0 };
    let right_tone = if syl + 1 < phones.len() {
        phones[syl + 1].tone
    } else {
        0
    };
    let right_n_segs = if syl + 1 < phones.len() {
        phones[syl + 1].n_segs()
    } else {
        0
    };

    let l_boundary = boundary_code(left_break[syl]);
    let r_boundary = boundary_code(syls[syl].right_break);
    // The syllable's main phone (final+tone), never its trailing `rr` for
    // an Erhua syllable: `retro` is a separate phone segment but is never
    // promoted into `sylFinal` (hts_ssml2lab.cpp:245-252).
    let c_final = phones[syl].main_phone.clone();

    let l_word_n_syls = if word > 0 {
        ctx.n_syls_in_word(word - 1)
    } else {
        0
    };
    let r_word_n_syls = if word + 1 < ctx.words.len() {
        ctx.n_syls_in_word(word + 1)
    } else {
        0
    };

    let l_phr = if phrase > 0 {
        Some(phrase - 1)
    } else {
        None
    };
    let r_phr = if phrase + 1 < ctx.phrases.len() {
        Some(phrase + 1)
    } else {
        None
    };
    let (l_phr_n_syls, l_phr_n_words) = l_phr
        .map(|p| (ctx.n_syls_in_phrase(p), ctx.n_words_in_phrase(p)))
        .unwrap_or((0, 0));
    let (r_phr_n_syls, r_phr_n_words) = r_phr
        .map(|p| (ctx.n_syls_in_phrase(p), ctx.n_words_in_phrase(p)))
        .unwrap_or((0, 0));

    let bg_type = if bg + 1 == ctx.bgs.len() { 1 } else { 0 };

    format!(
        "{head} \
         /A:{left_tone}_0_{left_n_segs} \
         /B:{syl_tone}-0-{syl_n_segs} @{pos_syl_in_word_fw1}-{pos_syl_in_word_bw1} \
         &{pos_word_in_phr_fw1}-{pos_word_in_phr_bw1} \
         #{pos_word_in_bg_fw1}-{pos_word_in_bg_bw1} \
         $0-0 !0-0 \
         ;{l_boundary}-{r_boundary} \
         |{c_final} \
         /C:{right_tone}+0+{right_n_segs} \
         /D:X_{l_word_n_syls} \
         /E:X+{c_word_n_syls} @{pos_word_in_phr_fw1}+{pos_word_in_phr_bw1} \
         &{pos_word_in_bg_fw1}+{pos_word_in_bg_bw1} #0+0 \
         /F:X_{r_word_n_syls} \
         /G:{l_phr_n_syls}_{l_phr_n_words} \
         /H:{c_phr_n_syls}={c_phr_n_words} ^{pos_phr_in_bg_fw1}={pos_phr_in_bg_bw1} |X \
         /I:{r_phr_n_syls}={r_phr_n_words} \
         /K:{bg_n_words} #{bg_n_phrs} !0 @0 \
         /M:0+0-0^0 \
         /N:{bg_type}",
        syl_tone = phones[syl].tone,
        syl_n_segs = phones[syl].n_segs(),
        pos_syl_in_word_fw1 = pos_syl_in_word_fw + 1,
        pos_syl_in_word_bw1 = pos_syl_in_word_bw + 1,
        pos_word_in_phr_fw1 = pos_word_in_phr_fw + 1,
        pos_word_in_phr_bw1 = pos_word_in_phr_bw + 1,
        pos_word_in_bg_fw1 = pos_word_in_bg_fw + 1,
        pos_word_in_bg_bw1 = pos_word_in_bg_bw + 1,
        c_word_n_syls = ctx.n_syls_in_word(word),
        c_phr_n_syls = ctx.n_syls_in_phrase(phrase),
        c_phr_n_words = ctx.n_words_in_phrase(phrase),
        pos_phr_in_bg_fw1 = pos_phr_in_bg_fw + 1,
        pos_phr_in_bg_bw1 = pos_phr_in_bg_bw + 1,
        bg_n_words = ctx.n_words_in_bg(bg),
        bg_n_phrs = ctx.n_phrases_in_bg(bg),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesize::context::SylInput;
    use crate::synthesize::phones::decompose;

    #[test]
    fn scenario_hts_label_exactness_single_syllable_ma1() {
        let sp = decompose("ma1");
        let syls = vec![SylInput {
            tone: sp.tone,
            n_segs: sp.n_segs(),
            word_id: 0,
            right_break: BoundaryStrength::XStrong,
        }];
        let phones = vec![sp];
        let ctx = context::build(&syls);
        let left_break = vec![BoundaryStrength::XStrong];
        let entries = build_phone_stream(&syls, &phones);
        assert_eq!(entries.len(), 2); // "m", "a1" -- no sil (no Medium+ break).

        let line0 = render_label(&entries, 0, &syls, &phones, &ctx, &left_break, 0, 1_000_000);
        assert!(line0.contains("X^X-m+a1=X @1_2"));
        assert!(line0.contains("/B:1-0-2 @1-1"));
        assert!(line0.contains("&1-1"));
        assert!(line0.contains("#1-1"));
        assert!(line0.contains("|a1"));

        let line1 = render_label(&entries, 1, &syls, &phones, &ctx, &left_break, 1_000_000, 2_000_000);
        assert!(line1.contains("X^m-a1+X=X @2_1"));
    }

    #[test]
    fn scenario_erhua_sylfinal_is_the_main_phone_not_the_retroflex_marker() {
        let sp = decompose("hua1r");
        let syls = vec![SylInput {
            tone: sp.tone,
            n_segs: sp.n_segs(),
            word_id: 0,
            right_break: BoundaryStrength::XStrong,
        }];
        let phones = vec![sp];
        let ctx = context::build(&syls);
        let left_break = vec![BoundaryStrength::XStrong];
        let entries = build_phone_stream(&syls, &phones);
        assert_eq!(entries.len(), 3); // "h", "ua1", "rr"

        // Every phone position within this syllable renders the same
        // |CsylFinal: the syllable's main phone, never the trailing `rr`.
        for idx in 0..entries.len() {
            let line = render_label(&entries, idx, &syls, &phones, &ctx, &left_break, 0, 1_000_000);
            assert!(line.contains("|ua1"), "line {idx} missing |ua1: {line}");
            assert!(!line.contains("|rr"), "line {idx} wrongly rendered |rr: {line}");
        }
    }
}
