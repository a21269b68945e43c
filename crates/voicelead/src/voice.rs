//! Voice timelines: one part's notes and their re-expansion to a unit grid.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::Role;
use crate::pitch::{pitch_class, NoteName};

/// The four vocal parts, in nominal height order (lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Bass = 0,
    Tenor = 1,
    Alto = 2,
    Soprano = 3,
}

impl Part {
    /// Lowest to highest. Chord note arrays are indexed in this order.
    pub const ALL: [Part; 4] = [Part::Bass, Part::Tenor, Part::Alto, Part::Soprano];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Part::Bass => "bass",
            Part::Tenor => "tenor",
            Part::Alto => "alto",
            Part::Soprano => "soprano",
        }
    }

    /// Look a part up by its staff label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Part> {
        Part::ALL
            .into_iter()
            .find(|part| part.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A length in beats as an exact fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Beats {
    pub numerator: u32,
    pub denominator: u32,
}

impl Beats {
    pub const EIGHTH: Beats = Beats::new(1, 2);
    pub const QUARTER: Beats = Beats::new(1, 1);
    pub const HALF: Beats = Beats::new(2, 1);
    pub const WHOLE: Beats = Beats::new(4, 1);

    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Beats {
            numerator,
            denominator,
        }
    }

    /// How many whole `unit`s fit exactly into this length, if any.
    pub fn units_of(self, unit: Beats) -> Option<u32> {
        let num = u64::from(self.numerator) * u64::from(unit.denominator);
        let den = u64::from(self.denominator) * u64::from(unit.numerator);
        if den == 0 || num == 0 || num % den != 0 {
            return None;
        }
        u32::try_from(num / den).ok()
    }
}

impl fmt::Display for Beats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// A note that does not divide evenly into the alignment unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{part} note {index} lasts {beats} beats, which is not a whole number of {unit}-beat units")]
pub struct AlignmentError {
    pub part: Part,
    pub index: usize,
    pub beats: Beats,
    pub unit: Beats,
}

/// One note (or rest) of one part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub name: NoteName,
    pub beats: Beats,
    pub is_rest: bool,
    pub part: Part,
    role: Option<Role>,
}

impl Note {
    pub fn new(name: NoteName, beats: Beats, is_rest: bool, part: Part) -> Self {
        Note {
            name,
            beats,
            is_rest,
            part,
            role: None,
        }
    }

    pub fn pitch(&self) -> i32 {
        self.name.pitch()
    }

    pub fn pitch_class(&self) -> u8 {
        pitch_class(self.pitch())
    }

    pub fn is_sounding(&self) -> bool {
        !self.is_rest
    }

    /// Functional role inside its chord; `None` until the chord is classified.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Roles are written once, while the owning chord is being built.
    pub(crate) fn assign_role(&mut self, role: Role) {
        debug_assert!(self.role.is_none(), "role assigned twice");
        if self.role.is_none() {
            self.role = Some(role);
        }
    }

    fn with_beats(&self, beats: Beats) -> Note {
        Note::new(self.name, beats, self.is_rest, self.part)
    }
}

/// An ordered sequence of notes for one part plus its clef tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Voice {
    pub part: Part,
    pub clef: String,
    pub notes: Vec<Note>,
}

impl Voice {
    pub fn new(part: Part, clef: impl Into<String>, notes: Vec<Note>) -> Self {
        Voice {
            part,
            clef: clef.into(),
            notes,
        }
    }

    /// Replace every note of `d` beats by `d / unit` repeated notes of `unit` beats.
    ///
    /// Pitch and rest flag are preserved. Fails on the first note whose length
    /// is not a positive whole number of units.
    pub fn expand_to_unit(&self, unit: Beats) -> Result<Vec<Note>, AlignmentError> {
        let mut expanded = Vec::with_capacity(self.notes.len());
        for (index, note) in self.notes.iter().enumerate() {
            let count = note.beats.units_of(unit).ok_or(AlignmentError {
                part: self.part,
                index,
                beats: note.beats,
                unit,
            })?;
            expanded.extend((0..count).map(|_| note.with_beats(unit)));
        }
        Ok(expanded)
    }
}
