//! Fixed element vocabulary and schema (spec §3.2).

use std::fmt;

/// The fixed vocabulary of element names the pipeline understands.
///
/// Anything outside this vocabulary arriving from the SSML parser becomes
/// [`crate::tree::NodeKind::Unknown`] rather than a variant here (spec §6.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementName {
    Speak,
    P,
    S,
    W,
    Phoneme,
    Sub,
    SayAs,
    Break,
    Prosody,
    Emphasis,
    Unit,
}

impl ElementName {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementName::Speak => "speak",
            ElementName::P => "p",
            ElementName::S => "s",
            ElementName::W => "w",
            ElementName::Phoneme => "phoneme",
            ElementName::Sub => "sub",
            ElementName::SayAs => "say-as",
            ElementName::Break => "break",
            ElementName::Prosody => "prosody",
            ElementName::Emphasis => "emphasis",
            ElementName::Unit => "unit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "speak" => ElementName::Speak,
            "p" => ElementName::P,
            "s" => ElementName::S,
            "w" => ElementName::W,
            "phoneme" => ElementName::Phoneme,
            "sub" => ElementName::Sub,
            "say-as" => ElementName::SayAs,
            "break" => ElementName::Break,
            "prosody" => ElementName::Prosody,
            "emphasis" => ElementName::Emphasis,
            "unit" => ElementName::Unit,
            _ => return None,
        })
    }

    /// Elements whose subtrees are opaque to `DocStruct` (spec §4.5): never
    /// re-entered when grouping `p`/`s` fragments.
    pub fn is_docstruct_opaque(self) -> bool {
        matches!(
            self,
            ElementName::W | ElementName::Break | ElementName::SayAs | ElementName::Phoneme | ElementName::Sub
        )
    }

    /// Whether `child` may legally appear as a direct child of `self`,
    /// per the schema table in spec §3.2. Conservative: elements with no
    /// entry in the table (e.g. `break`, `unit` leaves) allow no element
    /// children.
    pub fn can_contain(self, child: ElementName) -> bool {
        matches!(
            (self, child),
            (ElementName::Speak, ElementName::P)
                | (ElementName::P, ElementName::S)
                | (ElementName::S, ElementName::W)
                | (ElementName::S, ElementName::Break)
                | (ElementName::S, ElementName::SayAs)
                | (ElementName::W, ElementName::Phoneme)
                | (ElementName::W, ElementName::Unit)
                | (ElementName::Unit, ElementName::Prosody)
                | (ElementName::Prosody, ElementName::Phoneme)
        )
    }
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
