//! Shared types for the Mandarin HTS text-to-speech pipeline: the annotated
//! document tree, the traversal harness every stage walks it with, the
//! error enum at the engine boundary, the module-config loader, Pinyin
//! decomposition, and the `Lexicon`/`HmmEngine` contracts the pipeline
//! consumes from external model/data providers.
//!
//! `tts-pipeline` builds the twelve pipeline stages on top of these types;
//! this crate owns no stage logic itself.

pub mod boundary;
pub mod config;
pub mod element;
pub mod error;
pub mod hmm;
pub mod lexicon;
pub mod pinyin;
pub mod traversal;
pub mod tree;
pub mod trie;

pub use boundary::BoundaryStrength;
pub use config::ModuleConfig;
pub use element::ElementName;
pub use error::{Error, Result};
pub use hmm::{HmmEngine, MockHmmEngine, SynthCfg, SynthOut};
pub use lexicon::{InMemoryLexicon, Lexicon, LexiconEntry};
pub use pinyin::Syllable as PinyinSyllable;
pub use traversal::{walk, EnterAction, Visitor};
pub use tree::{Document, NodeId, NodeKind};
