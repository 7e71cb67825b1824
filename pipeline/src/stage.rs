//! The stage abstraction every pipeline step implements (spec §9: "class
//! hierarchies collapse to stage traits").

use tts_core::{Document, Result};

/// A single pipeline stage: a pure transformation of the document tree.
/// No state is shared across stages other than what the tree itself
/// carries (spec §2).
pub trait Stage {
    /// A short name for logging.
    fn name(&self) -> &'static str;

    fn process(&mut self, doc: &mut Document) -> Result<()>;
}
