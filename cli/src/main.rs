//! Command-line driver for the Mandarin HTS text-to-speech engine: feeds
//! text through the full annotation pipeline (spec §6.1 `process`), then
//! renders it to a WAV file via the HMM engine (spec §6.1 `synthesize`).

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tts_core::{InMemoryLexicon, MockHmmEngine, ModuleConfig};
use tts_pipeline::engine::{Engine, EngineConfig, ProsodyKnobs};
use tts_pipeline::langconvert::CharTable;
use tts_pipeline::preprocess::InputKind;

/// Synthesize Mandarin speech from text.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The text to synthesize.
    text: String,

    /// Where to write the rendered waveform.
    #[arg(short, long, default_value = "out.wav")]
    out: PathBuf,

    /// Shape of `text`: "raw", "partial-ssml", or "full-ssml".
    #[arg(long, default_value = "raw")]
    input_kind: String,

    /// BCP-47 language tag; ignored when `--config` is given.
    #[arg(long, default_value = "zh-CN")]
    lang: String,

    /// Module config XML (spec §6.4). Overrides `--lang`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lexicon TSV: `surface<TAB>pos<TAB>phoneme<TAB>freq` per line.
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Character-substitution table for `LangConvert`.
    #[arg(long)]
    char_table: Option<PathBuf>,

    /// HMM voice model directory (spec §6.3). Defaults to a bundled mock
    /// voice that emits silence, since real model data is out of scope.
    #[arg(long, default_value = "voices/default")]
    model_dir: String,

    /// HMM voice config filename within `model_dir`.
    #[arg(long, default_value = "voice.cfg")]
    model_config: String,

    /// Output sample rate, in Hz.
    #[arg(long, default_value_t = 16_000)]
    sample_rate: u32,

    /// Speech rate multiplier.
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Output volume multiplier.
    #[arg(long, default_value_t = 1.0)]
    volume: f32,

    /// Pitch ratio (1.0 = unchanged).
    #[arg(long, default_value_t = 1.0)]
    pitch: f32,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_input_kind(s: &str) -> Result<InputKind, String> {
    match s {
        "raw" => Ok(InputKind::Raw),
        "partial-ssml" => Ok(InputKind::PartialSsml),
        "full-ssml" => Ok(InputKind::FullSsml),
        other => Err(format!(
            "unknown input kind {other:?}, expected raw|partial-ssml|full-ssml"
        )),
    }
}

fn setup_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_engine_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let module_config = match &cli.config {
        Some(path) => ModuleConfig::load(path)?,
        None => ModuleConfig {
            lang: cli.lang.clone(),
            ..Default::default()
        },
    };

    let lexicon = match &cli.lexicon {
        Some(path) => InMemoryLexicon::from_tsv(&std::fs::read_to_string(path)?),
        None => InMemoryLexicon::new(),
    };

    let char_table = match &cli.char_table {
        Some(path) => CharTable::from_lines(&std::fs::read_to_string(path)?),
        None => CharTable::new(),
    };

    let hmm_model_dir = module_config
        .voicedata
        .first()
        .map(|v| v.path.clone())
        .unwrap_or_else(|| cli.model_dir.clone());

    Ok(EngineConfig {
        module_config,
        lexicon,
        char_table,
        hmm_model_dir,
        hmm_config_filename: cli.model_config.clone(),
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let kind = parse_input_kind(&cli.input_kind).map_err(anyhow::Error::msg)?;
    let config = load_engine_config(&cli)?;

    let mut engine = Engine::initialize(config, Box::new(MockHmmEngine::new(cli.sample_rate)))?;
    let mut doc = engine.process(&cli.text, kind)?;
    let (wav_samples, timings) = engine.synthesize(
        &mut doc,
        ProsodyKnobs {
            speed_rate: cli.speed,
            volume_rate: cli.volume,
            pitch_ratio: cli.pitch,
        },
    )?;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: cli.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&cli.out, spec)?;
    for sample in &wav_samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;

    info!(
        out = %cli.out.display(),
        units = timings.len(),
        samples = wav_samples.len(),
        "synthesis complete"
    );

    engine.terminate()?;
    Ok(())
}
