//! The twelve linguistic-annotation stages (spec §2) and the `Engine` that
//! composes them into one sequential pipeline (spec §5, §6.1).

pub mod docstruct;
pub mod engine;
pub mod grapheme2phoneme;
pub mod langconvert;
pub mod preprocess;
pub mod prosodypredict;
pub mod prosstructgen;
pub mod ssml;
pub mod stage;
pub mod synthesize;
pub mod textnormalize;
pub mod textsegment;
pub mod unitsegment;
pub mod wordsegment;

pub use engine::{Engine, EngineConfig};
pub use preprocess::{pre_process, InputKind};
pub use stage::Stage;
