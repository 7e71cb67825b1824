//! `Engine` (spec §6.1): composes the twelve pipeline stages into the
//! `initialize` / `process` / `synthesize` / `terminate` lifecycle, and owns
//! the external collaborators (`Lexicon`, `HmmEngine`) and module config.

use tracing::info;

use tts_core::{Document, HmmEngine, InMemoryLexicon, ModuleConfig, Result, SynthCfg};

use crate::docstruct::DocStruct;
use crate::grapheme2phoneme::Grapheme2Phoneme;
use crate::langconvert::{CharTable, LangConvert};
use crate::preprocess::{pre_process, InputKind};
use crate::prosodypredict::ProsodyPredict;
use crate::prosstructgen::ProsStructGen;
use crate::stage::Stage;
use crate::synthesize::{Synthesize, UnitTiming};
use crate::textnormalize::TextNormalize;
use crate::textsegment::TextSegment;
use crate::unitsegment::UnitSegment;
use crate::wordsegment::WordSegment;

/// Global prosody knobs an `Engine::synthesize` caller can tune (spec
/// §4.12.6). `pitch_ratio` is converted to the HMM engine's half-tone scale
/// internally: `half_tone = 12 * log2(pitch_ratio)`.
#[derive(Debug, Clone, Copy)]
pub struct ProsodyKnobs {
    pub speed_rate: f32,
    pub volume_rate: f32,
    pub pitch_ratio: f32,
}

impl Default for ProsodyKnobs {
    fn default() -> Self {
        Self {
            speed_rate: 1.0,
            volume_rate: 1.0,
            pitch_ratio: 1.0,
        }
    }
}

impl From<ProsodyKnobs> for SynthCfg {
    fn from(k: ProsodyKnobs) -> Self {
        SynthCfg {
            use_phone_alignment: false,
            volume_rate: k.volume_rate,
            speed_rate: k.speed_rate,
            half_tone: 12.0 * k.pitch_ratio.log2(),
        }
    }
}

/// Everything `Engine::initialize` needs to stand up the pipeline (spec
/// §6.1, §6.4): the parsed module config plus the data it points at,
/// already loaded by the caller.
pub struct EngineConfig {
    pub module_config: ModuleConfig,
    pub lexicon: InMemoryLexicon,
    pub char_table: CharTable,
    pub hmm_model_dir: String,
    pub hmm_config_filename: String,
}

/// The composed engine: owns the lexicon/char-table data and an open HMM
/// engine, and runs the document through all twelve stages per spec §2/§5.
pub struct Engine {
    config: EngineConfig,
    hmm: Box<dyn HmmEngine>,
}

impl Engine {
    /// Stand up the engine: load the lexicon/char-table already captured in
    /// `config`, and open the HMM engine (spec §6.1 `initialize`).
    pub fn initialize(config: EngineConfig, mut hmm: Box<dyn HmmEngine>) -> Result<Self> {
        info!(lang = %config.module_config.lang, "initializing engine");
        hmm.open(&config.hmm_model_dir, &config.hmm_config_filename)?;
        Ok(Self { config, hmm })
    }

    /// Run stages 1-10 (`PreProcess` through `ProsodyPredict`) over `input`,
    /// producing an annotated document ready for `synthesize` (spec §6.1
    /// `process`).
    pub fn process(&self, input: &str, kind: InputKind) -> Result<Document> {
        let lang = Some(self.config.module_config.lang.as_str()).filter(|l| !l.is_empty());
        let mut doc = pre_process(input, kind, lang)?;

        let mut stages: Vec<Box<dyn Stage>> = vec![
            Box::new(LangConvert::new(self.config.char_table.clone())),
            Box::new(TextSegment),
            Box::new(DocStruct),
            Box::new(TextNormalize::new()),
        ];
        for stage in &mut stages {
            stage.process(&mut doc)?;
        }

        WordSegment::new(&self.config.lexicon).process(&mut doc)?;
        Grapheme2Phoneme::new(&self.config.lexicon).process(&mut doc)?;

        let mut tail: Vec<Box<dyn Stage>> = vec![Box::new(ProsStructGen), Box::new(UnitSegment), Box::new(ProsodyPredict)];
        for stage in &mut tail {
            stage.process(&mut doc)?;
        }

        Ok(doc)
    }

    /// Render `doc` to audio via the HMM engine (spec §6.1 `synthesize`,
    /// §4.12). Mutates `doc`'s unit prosody durations as a side effect.
    pub fn synthesize(&mut self, doc: &mut Document, knobs: ProsodyKnobs) -> Result<(Vec<i16>, Vec<UnitTiming>)> {
        Synthesize::new(self.hmm.as_mut()).run(doc, knobs.into())
    }

    /// Release the HMM engine (spec §6.1 `terminate`).
    pub fn terminate(mut self) -> Result<()> {
        self.hmm.close();
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("lang", &self.config.module_config.lang)
            .finish()
    }
}
