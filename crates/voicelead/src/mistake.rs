//! Voice-leading diagnostics attached to chords.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which rule a mistake breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MistakeKind {
    ParallelFifths,
    ParallelOctaves,
    ParallelUnisons,
    ImproperlyResolvedSeventh,
    IllegalInterval,
    TooMuchSpacing,
    ExceedsRange,
    VoiceCrossing,
    IncompleteChordTooManyDoublings,
    RoleShouldBeDoubled,
}

impl MistakeKind {
    /// Stable tag, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            MistakeKind::ParallelFifths => "ParallelFifths",
            MistakeKind::ParallelOctaves => "ParallelOctaves",
            MistakeKind::ParallelUnisons => "ParallelUnisons",
            MistakeKind::ImproperlyResolvedSeventh => "ImproperlyResolvedSeventh",
            MistakeKind::IllegalInterval => "IllegalInterval",
            MistakeKind::TooMuchSpacing => "TooMuchSpacing",
            MistakeKind::ExceedsRange => "ExceedsRange",
            MistakeKind::VoiceCrossing => "VoiceCrossing",
            MistakeKind::IncompleteChordTooManyDoublings => "IncompleteChordTooManyDoublings",
            MistakeKind::RoleShouldBeDoubled => "RoleShouldBeDoubled",
        }
    }

    /// Human-readable heading.
    pub fn title(&self) -> &'static str {
        match self {
            MistakeKind::ParallelFifths => "Parallel fifths",
            MistakeKind::ParallelOctaves => "Parallel octaves",
            MistakeKind::ParallelUnisons => "Parallel unisons",
            MistakeKind::ImproperlyResolvedSeventh => "Improperly resolved 7th",
            MistakeKind::IllegalInterval => "Illegal interval",
            MistakeKind::TooMuchSpacing => "Too much spacing",
            MistakeKind::ExceedsRange => "Exceeds range",
            MistakeKind::VoiceCrossing => "Voice crossing",
            MistakeKind::IncompleteChordTooManyDoublings => "Incomplete chord, too many doublings",
            MistakeKind::RoleShouldBeDoubled => "Wrong doubling",
        }
    }
}

impl fmt::Display for MistakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mistake {
    pub kind: MistakeKind,
    pub detail: String,
}

impl Mistake {
    pub fn new(kind: MistakeKind, detail: impl Into<String>) -> Self {
        Mistake {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Mistake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.title(), self.detail)
    }
}
