//! Chord identification and per-note functional roles.
//!
//! A chord's shape is reduced to its *interval loop*: the gaps between its
//! sorted, deduplicated pitch classes, closed back round to the first one.
//! The loop is looked up in a fixed table of every rotation of every known
//! shape. If the whole chord has no match, smaller and smaller subsets of it
//! are tried and the first hit wins; the notes left out are non-chord tones.
//!
//! Roles are then read off the matched type's role-interval table, and
//! non-chord tones are labelled by their distance from the root.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::pitch::pitch_class;
use crate::voice::{Note, Part};

/// Harmonic identity of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordType {
    MajorTriad,
    MinorTriad,
    DiminishedTriad,
    AugmentedTriad,
    Major7th,
    Dominant7th,
    Minor7th,
    Diminished7th,
    HalfDiminished7th,
    FrenchAugmented6th,
    PerfectFifth,
    PerfectOctave,
    UnknownChord,
}

impl ChordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChordType::MajorTriad => "major triad",
            ChordType::MinorTriad => "minor triad",
            ChordType::DiminishedTriad => "diminished triad",
            ChordType::AugmentedTriad => "augmented triad",
            ChordType::Major7th => "major 7th",
            ChordType::Dominant7th => "dominant 7th",
            ChordType::Minor7th => "minor 7th",
            ChordType::Diminished7th => "diminished 7th",
            ChordType::HalfDiminished7th => "half-diminished 7th",
            ChordType::FrenchAugmented6th => "french augmented 6th",
            ChordType::PerfectFifth => "perfect fifth",
            ChordType::PerfectOctave => "perfect octave",
            ChordType::UnknownChord => "unknown chord",
        }
    }

    /// How chord tones of this type get their roles.
    fn role_offsets(self) -> RoleOffsets {
        use ChordType::*;
        match self {
            MajorTriad => RoleOffsets::Table([Some(8), Some(4), Some(7), None]),
            MinorTriad => RoleOffsets::Table([Some(9), Some(3), Some(7), None]),
            DiminishedTriad => RoleOffsets::Diminished,
            Major7th => RoleOffsets::Table([Some(1), Some(9), Some(3), Some(11)]),
            Dominant7th => RoleOffsets::Table([Some(2), Some(4), Some(7), Some(10)]),
            Minor7th => RoleOffsets::Table([Some(2), Some(5), Some(4), Some(10)]),
            HalfDiminished7th => RoleOffsets::Table([Some(2), Some(5), Some(8), Some(10)]),
            PerfectFifth => RoleOffsets::Table([Some(5), None, Some(7), None]),
            PerfectOctave => RoleOffsets::Table([Some(0), None, None, None]),
            AugmentedTriad | Diminished7th | FrenchAugmented6th | UnknownChord => {
                RoleOffsets::NoUniqueRoot
            }
        }
    }
}

impl fmt::Display for ChordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interval of a non-chord tone above the chord's root. Descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degree {
    Root,
    Second,
    Third,
    Fourth,
    Tritone,
    Fifth,
    Sixth,
    Seventh,
}

impl Degree {
    /// Bucket a semitone distance above the root.
    pub fn from_semitones(semitones: i32) -> Degree {
        const DEGREES: [Degree; 12] = [
            Degree::Root,
            Degree::Second,
            Degree::Second,
            Degree::Third,
            Degree::Third,
            Degree::Fourth,
            Degree::Tritone,
            Degree::Fifth,
            Degree::Sixth,
            Degree::Sixth,
            Degree::Seventh,
            Degree::Seventh,
        ];
        DEGREES[pitch_class(semitones) as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Degree::Root => "root",
            Degree::Second => "second",
            Degree::Third => "third",
            Degree::Fourth => "fourth",
            Degree::Tritone => "tritone",
            Degree::Fifth => "fifth",
            Degree::Sixth => "sixth",
            Degree::Seventh => "seventh",
        }
    }
}

/// Function of one note within its chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Root,
    Third,
    Fifth,
    Seventh,
    /// Chord has no identifiable root, or the note is a rest.
    Unknown,
    /// A chord tone that fit none of its type's role intervals.
    Error,
    NonChordTone(Degree),
}

impl Role {
    /// Root, third, fifth or seventh.
    pub fn is_structural(&self) -> bool {
        matches!(self, Role::Root | Role::Third | Role::Fifth | Role::Seventh)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Root => f.write_str("root"),
            Role::Third => f.write_str("third"),
            Role::Fifth => f.write_str("fifth"),
            Role::Seventh => f.write_str("seventh"),
            Role::Unknown => f.write_str("unknown"),
            Role::Error => f.write_str("error"),
            Role::NonChordTone(degree) => write!(f, "non-chord {}", degree.as_str()),
        }
    }
}

enum RoleOffsets {
    /// Interval from a note to some other chord tone that marks it as
    /// root, third, fifth, seventh (checked in that order).
    Table([Option<u8>; 4]),
    /// Stacked minor thirds: decided by which of 3, 6, 9 is missing.
    Diminished,
    /// Symmetric shapes: every note is `Unknown`.
    NoUniqueRoot,
}

/// One rotation of a known chord shape.
pub struct LoopPattern {
    pub gaps: &'static [u8],
    pub chord_type: ChordType,
    /// False for shells (omitted fifth, bare third, unison) that only name a
    /// chord when they account for every sounding note.
    pub complete: bool,
}

impl LoopPattern {
    const fn full(gaps: &'static [u8], chord_type: ChordType) -> Self {
        LoopPattern {
            gaps,
            chord_type,
            complete: true,
        }
    }

    const fn shell(gaps: &'static [u8], chord_type: ChordType) -> Self {
        LoopPattern {
            gaps,
            chord_type,
            complete: false,
        }
    }
}

/// Every rotation of every recognised interval loop.
pub static LOOPS: &[LoopPattern] = &[
    LoopPattern::full(&[5, 4, 3], ChordType::MajorTriad),
    LoopPattern::full(&[4, 3, 5], ChordType::MajorTriad),
    LoopPattern::full(&[3, 5, 4], ChordType::MajorTriad),
    LoopPattern::shell(&[8, 4], ChordType::MajorTriad),
    LoopPattern::shell(&[4, 8], ChordType::MajorTriad),
    LoopPattern::full(&[3, 4, 5], ChordType::MinorTriad),
    LoopPattern::full(&[4, 5, 3], ChordType::MinorTriad),
    LoopPattern::full(&[5, 3, 4], ChordType::MinorTriad),
    LoopPattern::shell(&[9, 3], ChordType::MinorTriad),
    LoopPattern::shell(&[3, 9], ChordType::MinorTriad),
    LoopPattern::full(&[3, 3, 6], ChordType::DiminishedTriad),
    LoopPattern::full(&[3, 6, 3], ChordType::DiminishedTriad),
    LoopPattern::full(&[6, 3, 3], ChordType::DiminishedTriad),
    LoopPattern::full(&[4, 4, 4], ChordType::AugmentedTriad),
    LoopPattern::full(&[1, 4, 3, 4], ChordType::Major7th),
    LoopPattern::full(&[4, 3, 4, 1], ChordType::Major7th),
    LoopPattern::full(&[3, 4, 1, 4], ChordType::Major7th),
    LoopPattern::full(&[4, 1, 4, 3], ChordType::Major7th),
    LoopPattern::full(&[2, 4, 3, 3], ChordType::Dominant7th),
    LoopPattern::full(&[4, 3, 3, 2], ChordType::Dominant7th),
    LoopPattern::full(&[3, 3, 2, 4], ChordType::Dominant7th),
    LoopPattern::full(&[3, 2, 4, 3], ChordType::Dominant7th),
    LoopPattern::shell(&[2, 4, 6], ChordType::Dominant7th),
    LoopPattern::shell(&[4, 6, 2], ChordType::Dominant7th),
    LoopPattern::shell(&[6, 2, 4], ChordType::Dominant7th),
    LoopPattern::full(&[2, 3, 4, 3], ChordType::Minor7th),
    LoopPattern::full(&[3, 4, 3, 2], ChordType::Minor7th),
    LoopPattern::full(&[4, 3, 2, 3], ChordType::Minor7th),
    LoopPattern::full(&[3, 2, 3, 4], ChordType::Minor7th),
    LoopPattern::shell(&[3, 7, 2], ChordType::Minor7th),
    LoopPattern::shell(&[7, 2, 3], ChordType::Minor7th),
    LoopPattern::shell(&[2, 3, 7], ChordType::Minor7th),
    LoopPattern::full(&[3, 3, 3, 3], ChordType::Diminished7th),
    LoopPattern::full(&[2, 3, 3, 4], ChordType::HalfDiminished7th),
    LoopPattern::full(&[3, 3, 4, 2], ChordType::HalfDiminished7th),
    LoopPattern::full(&[3, 4, 2, 3], ChordType::HalfDiminished7th),
    LoopPattern::full(&[4, 2, 3, 3], ChordType::HalfDiminished7th),
    LoopPattern::full(&[4, 2, 4, 2], ChordType::FrenchAugmented6th),
    LoopPattern::full(&[2, 4, 2, 4], ChordType::FrenchAugmented6th),
    LoopPattern::full(&[7, 5], ChordType::PerfectFifth),
    LoopPattern::full(&[5, 7], ChordType::PerfectFifth),
    LoopPattern::shell(&[12], ChordType::PerfectOctave),
];

/// Gaps between the sorted, deduplicated pitch classes, wrapped to the first.
pub fn interval_loop(pitches: impl IntoIterator<Item = i32>) -> Vec<u8> {
    let mut classes: Vec<u8> = pitches.into_iter().map(pitch_class).collect();
    classes.sort_unstable();
    classes.dedup();

    let Some(&first) = classes.first() else {
        return Vec::new();
    };
    classes.push(first + 12);
    classes.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Match an interval loop against the table.
///
/// Shell patterns are only accepted when `allow_shells` is set.
pub fn lookup_loop(gaps: &[u8], allow_shells: bool) -> Option<ChordType> {
    LOOPS
        .iter()
        .find(|p| p.gaps == gaps && (p.complete || allow_shells))
        .map(|p| p.chord_type)
}

/// Outcome of classifying one time-slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub chord_type: ChordType,
    /// Parts whose notes are structural, in part order. Never empty.
    pub chord_tones: Vec<Part>,
    /// Role of each note, indexed by `Part::index()`.
    pub roles: [Role; 4],
}

/// Identify the chord formed by four simultaneous notes and label each note.
pub fn classify(notes: &[Note; 4]) -> Classification {
    let sounding: Vec<usize> = (0..4).filter(|&i| notes[i].is_sounding()).collect();
    if sounding.is_empty() {
        return Classification {
            chord_type: ChordType::UnknownChord,
            chord_tones: Part::ALL.to_vec(),
            roles: [Role::Unknown; 4],
        };
    }

    let (chord_type, tones) = find_chord_tones(notes, &sounding);
    let roles = assign_roles(notes, chord_type, &tones, &sounding);

    Classification {
        chord_type,
        chord_tones: tones.iter().map(|&i| Part::ALL[i]).collect(),
        roles,
    }
}

/// Largest matching subset of the sounding notes, first match in
/// lexicographic voice order. Falls back to a lone unknown note.
fn find_chord_tones(notes: &[Note; 4], sounding: &[usize]) -> (ChordType, Vec<usize>) {
    let gaps = interval_loop(sounding.iter().map(|&i| notes[i].pitch()));
    if let Some(chord_type) = lookup_loop(&gaps, true) {
        return (chord_type, sounding.to_vec());
    }

    for size in (2..sounding.len()).rev() {
        for subset in sounding.iter().copied().combinations(size) {
            let gaps = interval_loop(subset.iter().map(|&i| notes[i].pitch()));
            trace!(?subset, ?gaps, "trying subset");
            if let Some(chord_type) = lookup_loop(&gaps, false) {
                debug!(%chord_type, ?subset, "matched chord on a subset");
                return (chord_type, subset);
            }
        }
    }

    debug!(pitches = ?sounding.iter().map(|&i| notes[i].pitch()).collect::<Vec<_>>(), "no chord match");
    (ChordType::UnknownChord, vec![sounding[0]])
}

fn assign_roles(
    notes: &[Note; 4],
    chord_type: ChordType,
    tones: &[usize],
    sounding: &[usize],
) -> [Role; 4] {
    let mut roles = [Role::Unknown; 4];
    let offsets = chord_type.role_offsets();
    if matches!(offsets, RoleOffsets::NoUniqueRoot) {
        return roles;
    }

    for &i in tones {
        let intervals: Vec<u8> = tones
            .iter()
            .filter(|&&j| j != i)
            .map(|&j| pitch_class(notes[i].pitch() - notes[j].pitch()))
            .collect();
        roles[i] = chord_tone_role(&offsets, &intervals);
    }

    let root_pitch = tones
        .iter()
        .find(|&&i| roles[i] == Role::Root)
        .or_else(|| sounding.iter().min_by_key(|&&i| notes[i].pitch()))
        .map(|&i| notes[i].pitch());

    if let Some(root_pitch) = root_pitch {
        for &i in sounding.iter().filter(|i| !tones.contains(i)) {
            roles[i] = Role::NonChordTone(Degree::from_semitones(notes[i].pitch() - root_pitch));
        }
    }

    roles
}

fn chord_tone_role(offsets: &RoleOffsets, intervals: &[u8]) -> Role {
    const ORDER: [Role; 4] = [Role::Root, Role::Third, Role::Fifth, Role::Seventh];

    match offsets {
        RoleOffsets::NoUniqueRoot => Role::Unknown,
        _ if intervals.is_empty() => Role::Root,
        RoleOffsets::Diminished => {
            if !intervals.contains(&3) {
                Role::Root
            } else if !intervals.contains(&6) {
                Role::Third
            } else {
                Role::Fifth
            }
        }
        RoleOffsets::Table(table) => table
            .iter()
            .zip(ORDER)
            .find(|(offset, _)| offset.is_some_and(|o| intervals.contains(&o)))
            .map(|(_, role)| role)
            .unwrap_or(Role::Error),
    }
}
