//! Synthesize — HTS context-label construction and HMM engine invocation
//! (spec §4.12). Not a `Stage`: like `PreProcess`, its contract carries
//! extra outputs (`audio`, `timings`, spec §6.1) beyond a document mutation,
//! so it's a standalone entry point the `Engine` calls after the stage
//! pipeline completes.

pub mod context;
pub mod labels;
pub mod phones;

use std::collections::HashMap;

use tts_core::{BoundaryStrength, Document, ElementName, Error, HmmEngine, NodeId, Result, SynthCfg};

/// A synthesized unit's timing, as handed back across the engine boundary
/// (spec §6.1: `(unit_ref, start_ms, end_ms)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTiming {
    pub unit_ref: String,
    pub start_ms: i64,
    pub end_ms: i64,
}

/// Drives one document through label construction and the HMM engine.
pub struct Synthesize<'a> {
    engine: &'a mut dyn HmmEngine,
}

impl<'a> Synthesize<'a> {
    pub fn new(engine: &'a mut dyn HmmEngine) -> Self {
        Self { engine }
    }

    /// Build labels for every `unit` in `doc`, invoke the HMM engine, and
    /// write per-unit durations back onto each `unit`'s `prosody` (spec
    /// §4.12.6). Returns the waveform and per-unit timings.
    pub fn run(&mut self, doc: &mut Document, cfg: SynthCfg) -> Result<(Vec<i16>, Vec<UnitTiming>)> {
        let mut units: Vec<NodeId> = Vec::new();
        let mut syls: Vec<context::SylInput> = Vec::new();
        let mut phones_list: Vec<phones::SylPhones> = Vec::new();
        let mut word_id = 0usize;

        collect(doc, doc.root(), &mut word_id, &mut units, &mut syls, &mut phones_list);

        if syls.is_empty() {
            // Spec §8.3: whitespace-only / unit-less document -> empty audio, no-op.
            return Ok((Vec::new(), Vec::new()));
        }

        let ctx = context::build(&syls);
        let left_break = compute_left_break(&syls, &ctx);
        let entries = labels::build_phone_stream(&syls, &phones_list);

        let mut buf = String::new();
        for idx in 0..entries.len() {
            let line = labels::render_label(&entries, idx, &syls, &phones_list, &ctx, &left_break, 0, 0);
            buf.push_str(&line);
            buf.push('\n');
        }

        let out = self.engine.synthesize(&buf, cfg)?;
        if out.wav_samples.is_empty() {
            return Err(Error::ReadFault(
                "HMM engine returned an empty waveform".into(),
            ));
        }

        let mut unit_duration_ticks: HashMap<usize, i64> = HashMap::new();
        let mut unit_beg_ticks: HashMap<usize, i64> = HashMap::new();
        let mut unit_end_ticks: HashMap<usize, i64> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            let Some(syl) = entry.syl else { continue };
            let beg = out.seg_beg_ticks.get(i).copied().unwrap_or(0);
            let end = out.seg_end_ticks.get(i).copied().unwrap_or(0);
            *unit_duration_ticks.entry(syl).or_insert(0) += end - beg;
            unit_beg_ticks
                .entry(syl)
                .and_modify(|b| *b = (*b).min(beg))
                .or_insert(beg);
            unit_end_ticks
                .entry(syl)
                .and_modify(|e| *e = (*e).max(end))
                .or_insert(end);
        }

        let mut timings = Vec::with_capacity(units.len());
        for (syl, &unit_node) in units.iter().enumerate() {
            let dur_ticks = unit_duration_ticks.get(&syl).copied().unwrap_or(0);
            if let Some(prosody) = prosody_child(doc, unit_node) {
                let _ = doc.set_attr(prosody, "duration", ticks_to_ms(dur_ticks).to_string());
            }
            let uid = doc.attr(unit_node, "uid").unwrap_or("").to_string();
            let beg = unit_beg_ticks.get(&syl).copied().unwrap_or(0);
            let end = unit_end_ticks.get(&syl).copied().unwrap_or(0);
            timings.push(UnitTiming {
                unit_ref: uid,
                start_ms: ticks_to_ms(beg),
                end_ms: ticks_to_ms(end),
            });
        }

        Ok((out.wav_samples.clone(), timings))
    }
}

fn ticks_to_ms(ticks: i64) -> i64 {
    ticks / 10_000 // 100-ns ticks -> ms
}

fn prosody_child(doc: &Document, unit: NodeId) -> Option<NodeId> {
    doc.children(unit)
        .into_iter()
        .find(|&c| doc.element_name(c) == Some(ElementName::Prosody))
}

fn unit_ph(doc: &Document, unit: NodeId) -> Option<String> {
    let prosody = prosody_child(doc, unit)?;
    let phoneme = doc
        .children(prosody)
        .into_iter()
        .find(|&c| doc.element_name(c) == Some(ElementName::Phoneme))?;
    doc.attr(phoneme, "ph").map(|s| s.to_string())
}

fn break_strength(doc: &Document, node: NodeId) -> Option<BoundaryStrength> {
    doc.attr(node, "strength").and_then(|s| s.parse().ok())
}

fn collect(
    doc: &Document,
    node: NodeId,
    word_id: &mut usize,
    units: &mut Vec<NodeId>,
    syls: &mut Vec<context::SylInput>,
    phones_list: &mut Vec<phones::SylPhones>,
) {
    if doc.element_name(node) == Some(ElementName::S) {
        collect_sentence(doc, node, word_id, units, syls, phones_list);
        return;
    }
    for child in doc.children(node) {
        collect(doc, child, word_id, units, syls, phones_list);
    }
}

fn collect_sentence(
    doc: &Document,
    s: NodeId,
    word_id: &mut usize,
    units: &mut Vec<NodeId>,
    syls: &mut Vec<context::SylInput>,
    phones_list: &mut Vec<phones::SylPhones>,
) {
    let mut last_syl_idx: Option<usize> = None;
    for child in doc.children(s) {
        match doc.element_name(child) {
            Some(ElementName::W) => {
                let wid = *word_id;
                *word_id += 1;
                for unit in doc.children(child) {
                    if doc.element_name(unit) != Some(ElementName::Unit) {
                        continue;
                    }
                    let ph = unit_ph(doc, unit).unwrap_or_default();
                    let sp = phones::decompose(&ph);
                    syls.push(context::SylInput {
                        tone: sp.tone,
                        n_segs: sp.n_segs(),
                        word_id: wid,
                        right_break: BoundaryStrength::Syllable,
                    });
                    phones_list.push(sp);
                    units.push(unit);
                    last_syl_idx = Some(syls.len() - 1);
                }
            }
            Some(ElementName::Break) => {
                if let (Some(strength), Some(idx)) = (break_strength(doc, child), last_syl_idx) {
                    syls[idx].right_break = syls[idx].right_break.promote(strength);
                }
            }
            _ => {}
        }
    }
    // The end of an `s` is always at least a sentence-level boundary,
    // whatever strength its trailing `break` happened to carry (spec
    // §4.12.4: "default 5 at utterance boundary").
    if let Some(idx) = last_syl_idx {
        syls[idx].right_break = syls[idx].right_break.promote(BoundaryStrength::XStrong);
    }
}

fn compute_left_break(syls: &[context::SylInput], ctx: &context::Context) -> Vec<BoundaryStrength> {
    let mut out = vec![BoundaryStrength::Syllable; syls.len()];
    for (word_idx, &(start, _end)) in ctx.words.iter().enumerate() {
        let left = if word_idx == 0 {
            BoundaryStrength::XStrong
        } else {
            let (_, prev_end) = ctx.words[word_idx - 1];
            syls[prev_end - 1].right_break
        };
        out[start] = left;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tts_core::MockHmmEngine;

    fn build_single_word_doc(text: &str, ph: &str) -> Document {
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let p = doc.append_element(speak, ElementName::P);
        let s = doc.append_element(p, ElementName::S);
        let w = doc.append_element(s, ElementName::W);
        let unit = doc.append_element(w, ElementName::Unit);
        doc.set_attr(unit, "uid", format!("{ph}:0")).unwrap();
        let prosody = doc.append_element(unit, ElementName::Prosody);
        let phoneme = doc.append_element(prosody, ElementName::Phoneme);
        doc.set_attr(phoneme, "alphabet", "pinyin").unwrap();
        doc.set_attr(phoneme, "ph", ph).unwrap();
        doc.append_text(phoneme, text);
        doc
    }

    #[test]
    fn scenario_single_syllable_produces_one_label_pair_and_durations() {
        let mut doc = build_single_word_doc("妈", "ma1");
        let mut engine = MockHmmEngine::new(16_000);
        engine.open("dir", "cfg").unwrap();
        let (wav, timings) = Synthesize::new(&mut engine)
            .run(&mut doc, SynthCfg::default())
            .unwrap();

        assert!(!wav.is_empty());
        assert_eq!(timings.len(), 1);
        assert_eq!(timings[0].unit_ref, "ma1:0");
        assert!(timings[0].end_ms > timings[0].start_ms);
    }

    #[test]
    fn empty_document_synthesizes_empty_audio() {
        let mut doc = Document::new();
        let mut engine = MockHmmEngine::new(16_000);
        engine.open("dir", "cfg").unwrap();
        let (wav, timings) = Synthesize::new(&mut engine)
            .run(&mut doc, SynthCfg::default())
            .unwrap();
        assert!(wav.is_empty());
        assert!(timings.is_empty());
    }

    #[test]
    fn pure_symbol_unit_renders_without_panicking() {
        let mut doc = build_single_word_doc("", "_pause");
        let mut engine = MockHmmEngine::new(16_000);
        engine.open("dir", "cfg").unwrap();
        let (wav, timings) = Synthesize::new(&mut engine)
            .run(&mut doc, SynthCfg::default())
            .unwrap();
        assert!(!wav.is_empty());
        assert_eq!(timings.len(), 1);
    }

    #[test]
    fn malformed_pinyin_skips_phone_emission_but_keeps_the_unit() {
        // Shaped like Pinyin but not a real syllable would still pass
        // `pinyin::split` under the current permissive grammar, so this
        // exercises the "no phones" path via an empty `ph` instead -- the
        // unit is kept and simply contributes no label lines.
        let mut doc = Document::new();
        let root = doc.root();
        let speak = doc.append_element(root, ElementName::Speak);
        let p = doc.append_element(speak, ElementName::P);
        let s = doc.append_element(p, ElementName::S);
        let w = doc.append_element(s, ElementName::W);
        let empty_unit = doc.append_element(w, ElementName::Unit);
        doc.set_attr(empty_unit, "uid", ":0").unwrap();
        doc.append_element(empty_unit, ElementName::Prosody);
        let real_unit = doc.append_element(w, ElementName::Unit);
        doc.set_attr(real_unit, "uid", "ma1:1").unwrap();
        let prosody = doc.append_element(real_unit, ElementName::Prosody);
        let phoneme = doc.append_element(prosody, ElementName::Phoneme);
        doc.set_attr(phoneme, "ph", "ma1").unwrap();
        doc.append_text(phoneme, "妈");

        let mut engine = MockHmmEngine::new(16_000);
        engine.open("dir", "cfg").unwrap();
        let (wav, timings) = Synthesize::new(&mut engine)
            .run(&mut doc, SynthCfg::default())
            .unwrap();
        assert!(!wav.is_empty());
        // The empty unit contributes zero phones/labels, but both units
        // still appear in the timings output (with a zero duration for
        // the phone-less one).
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[0].unit_ref, ":0");
        assert_eq!(timings[0].start_ms, 0);
        assert_eq!(timings[0].end_ms, 0);
    }
}
