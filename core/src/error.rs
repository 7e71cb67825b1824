//! Crate-boundary error type (spec §7).

use thiserror::Error;

/// Errors surfaced across the engine boundary.
///
/// Recoverable stage-local conditions (lexicon miss, malformed Pinyin) are
/// handled inline by the stage and never reach this type; see each stage's
/// module docs for its documented fallback.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open module config: {0}")]
    ConfigOpenFailed(String),

    #[error("failed to load data file: {0}")]
    DataLoadFailed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("out of memory")]
    OutOfMemory,

    #[error("read fault: {0}")]
    ReadFault(String),

    #[error("engine not initialized")]
    NotInitialized,

    #[error("not implemented: {0}")]
    NotImplemented(String),
}

pub type Result<T> = std::result::Result<T, Error>;
