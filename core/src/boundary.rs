//! Boundary-strength enumeration (spec §3.3).

use std::fmt;
use std::str::FromStr;

/// Canonical break-strength ordering, ascending.
///
/// Every stage that assigns a boundary must respect "only promote, never
/// demote": a previously set strength may only be replaced by a `>` one
/// (spec §3.3, §8.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoundaryStrength {
    Syllable = 0,
    XWeak = 1,
    Weak = 2,
    Medium = 3,
    Strong = 4,
    XStrong = 5,
}

impl BoundaryStrength {
    /// Promote `self` to `other` if `other` is stronger; otherwise keep
    /// `self` unchanged.
    pub fn promote(self, other: BoundaryStrength) -> BoundaryStrength {
        if other > self {
            other
        } else {
            self
        }
    }

    pub fn to_ssml(self) -> &'static str {
        match self {
            BoundaryStrength::Syllable => "syllable",
            BoundaryStrength::XWeak => "x-weak",
            BoundaryStrength::Weak => "weak",
            BoundaryStrength::Medium => "medium",
            BoundaryStrength::Strong => "strong",
            BoundaryStrength::XStrong => "x-strong",
        }
    }
}

impl fmt::Display for BoundaryStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_ssml())
    }
}

impl FromStr for BoundaryStrength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "syllable" => BoundaryStrength::Syllable,
            "x-weak" | "none" => BoundaryStrength::XWeak,
            "weak" => BoundaryStrength::Weak,
            "medium" => BoundaryStrength::Medium,
            "strong" => BoundaryStrength::Strong,
            "x-strong" => BoundaryStrength::XStrong,
            other => return Err(format!("unknown break strength: {other}")),
        })
    }
}
