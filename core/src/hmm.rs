//! HMM acoustic engine interface (spec §6.3) — consumed by the `Synthesize`
//! stage. The decision trees/PDFs and the actual parametric synthesis are
//! out of scope (spec §1); this module specifies the contract plus a mock
//! implementation for tests and for deployments without a real voice.

use crate::error::Result;

/// Synthesis knobs passed to [`HmmEngine::synthesize`] (spec §6.3, §4.12.6).
#[derive(Debug, Clone, Copy)]
pub struct SynthCfg {
    pub use_phone_alignment: bool,
    pub volume_rate: f32,
    pub speed_rate: f32,
    /// `12 * log2(pitch_ratio)`.
    pub half_tone: f32,
}

impl Default for SynthCfg {
    fn default() -> Self {
        Self {
            use_phone_alignment: false,
            volume_rate: 1.0,
            speed_rate: 1.0,
            half_tone: 0.0,
        }
    }
}

/// Raw synthesis output: PCM samples plus per-label segment timings in
/// 100-ns ticks (spec §6.3).
#[derive(Debug, Clone, Default)]
pub struct SynthOut {
    pub wav_samples: Vec<i16>,
    pub seg_beg_ticks: Vec<i64>,
    pub seg_end_ticks: Vec<i64>,
}

/// The HMM engine contract the `Synthesize` stage drives.
pub trait HmmEngine {
    fn open(&mut self, model_dir: &str, config_filename: &str) -> Result<()>;
    fn synthesize(&mut self, label_buffer: &str, cfg: SynthCfg) -> Result<SynthOut>;
    fn get_sample_rate(&self) -> u32;
    fn close(&mut self);
}

/// A deterministic mock `HmmEngine`: emits one 100ms (at the configured
/// sample rate) segment of silence per label line, so pipeline tests can
/// exercise the `Synthesize` stage without a real voice model.
#[derive(Debug)]
pub struct MockHmmEngine {
    sample_rate: u32,
    opened: bool,
}

impl MockHmmEngine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            opened: false,
        }
    }
}

impl Default for MockHmmEngine {
    fn default() -> Self {
        Self::new(16_000)
    }
}

const SEGMENT_TICKS: i64 = 1_000_000; // 100ms in 100-ns ticks

impl HmmEngine for MockHmmEngine {
    fn open(&mut self, _model_dir: &str, _config_filename: &str) -> Result<()> {
        self.opened = true;
        Ok(())
    }

    fn synthesize(&mut self, label_buffer: &str, _cfg: SynthCfg) -> Result<SynthOut> {
        let lines: Vec<&str> = label_buffer.lines().filter(|l| !l.is_empty()).collect();
        let samples_per_segment = (self.sample_rate as i64 * SEGMENT_TICKS / 10_000_000) as usize;
        let mut wav_samples = Vec::with_capacity(samples_per_segment * lines.len());
        let mut seg_beg_ticks = Vec::with_capacity(lines.len());
        let mut seg_end_ticks = Vec::with_capacity(lines.len());
        let mut cursor = 0i64;
        for _ in &lines {
            wav_samples.extend(std::iter::repeat(0i16).take(samples_per_segment));
            seg_beg_ticks.push(cursor);
            cursor += SEGMENT_TICKS;
            seg_end_ticks.push(cursor);
        }
        Ok(SynthOut {
            wav_samples,
            seg_beg_ticks,
            seg_end_ticks,
        })
    }

    fn get_sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn close(&mut self) {
        self.opened = false;
    }
}
