//! Vertical slices of the four voices and the views rules read from them.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::classify::{classify, ChordType, Role};
use crate::mistake::Mistake;
use crate::pitch::NoteName;
use crate::voice::{AlignmentError, Beats, Note, Part, Voice};

/// Signed distance between two parts of a chord, `high - low` in semitones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoiceInterval {
    pub low: Part,
    pub high: Part,
    pub value: i32,
}

/// Which chord member is in the bass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Inversion {
    RootPosition,
    FirstInversion,
    SecondInversion,
    ThirdInversion,
    Unknown,
}

impl Inversion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Inversion::RootPosition => "root position",
            Inversion::FirstInversion => "first inversion",
            Inversion::SecondInversion => "second inversion",
            Inversion::ThirdInversion => "third inversion",
            Inversion::Unknown => "unknown inversion",
        }
    }
}

impl fmt::Display for Inversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four simultaneous notes, one per part, with their classification.
///
/// Everything except `mistakes` is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chord {
    notes: [Note; 4],
    pitches: [i32; 4],
    pitch_class_set: Vec<u8>,
    intervals: Vec<VoiceInterval>,
    chord_type: ChordType,
    chord_tones: Vec<Part>,
    mistakes: Vec<Mistake>,
}

impl Chord {
    /// Build and classify a chord from notes in `Part::ALL` order.
    pub fn new(mut notes: [Note; 4]) -> Self {
        let classification = classify(&notes);
        for (note, role) in notes.iter_mut().zip(classification.roles) {
            note.assign_role(role);
        }

        let pitches = notes.each_ref().map(Note::pitch);

        let mut pitch_class_set: Vec<u8> = notes
            .iter()
            .filter(|n| n.is_sounding())
            .map(Note::pitch_class)
            .collect();
        pitch_class_set.sort_unstable();
        pitch_class_set.dedup();

        let mut intervals = Vec::with_capacity(6);
        for (i, low) in Part::ALL.into_iter().enumerate() {
            for high in Part::ALL.into_iter().skip(i + 1) {
                intervals.push(VoiceInterval {
                    low,
                    high,
                    value: pitches[high.index()] - pitches[low.index()],
                });
            }
        }

        Chord {
            notes,
            pitches,
            pitch_class_set,
            intervals,
            chord_type: classification.chord_type,
            chord_tones: classification.chord_tones,
            mistakes: Vec::new(),
        }
    }

    /// Chord of quarter notes from bare pitches, bass first.
    pub fn from_pitches(pitches: [i32; 4]) -> Self {
        Chord::new(Part::ALL.map(|part| {
            Note::new(
                NoteName::from_pitch(pitches[part.index()]),
                Beats::QUARTER,
                false,
                part,
            )
        }))
    }

    pub fn notes(&self) -> &[Note; 4] {
        &self.notes
    }

    pub fn note(&self, part: Part) -> &Note {
        &self.notes[part.index()]
    }

    /// Sounding notes only, in part order.
    pub fn sounding(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|n| n.is_sounding())
    }

    pub fn pitches(&self) -> [i32; 4] {
        self.pitches
    }

    pub fn pitch(&self, part: Part) -> i32 {
        self.pitches[part.index()]
    }

    /// Sorted, deduplicated pitch classes of the sounding notes.
    pub fn pitch_class_set(&self) -> &[u8] {
        &self.pitch_class_set
    }

    /// All six part pairs, lower part first.
    pub fn intervals(&self) -> &[VoiceInterval] {
        &self.intervals
    }

    pub fn chord_type(&self) -> ChordType {
        self.chord_type
    }

    pub fn chord_tones(&self) -> &[Part] {
        &self.chord_tones
    }

    pub fn role(&self, part: Part) -> Role {
        self.note(part).role().unwrap_or(Role::Unknown)
    }

    pub fn mistakes(&self) -> &[Mistake] {
        &self.mistakes
    }

    pub(crate) fn add_mistakes(&mut self, mistakes: impl IntoIterator<Item = Mistake>) {
        self.mistakes.extend(mistakes);
    }

    pub fn low_note(&self) -> Option<&Note> {
        self.sounding().min_by_key(|n| n.pitch())
    }

    pub fn high_note(&self) -> Option<&Note> {
        self.sounding().max_by_key(|n| n.pitch())
    }

    /// The note playing the root, else the lowest sounding note.
    pub fn root(&self) -> Option<&Note> {
        self.notes
            .iter()
            .find(|n| n.role() == Some(Role::Root))
            .or_else(|| self.low_note())
    }

    pub fn inversion(&self) -> Inversion {
        match self.low_note().and_then(Note::role) {
            Some(Role::Root) => Inversion::RootPosition,
            Some(Role::Third) => Inversion::FirstInversion,
            Some(Role::Fifth) => Inversion::SecondInversion,
            Some(Role::Seventh) => Inversion::ThirdInversion,
            _ => Inversion::Unknown,
        }
    }

    /// Roles of superfluous notes: one entry per extra note on a shared pitch class.
    pub fn doublings(&self) -> Vec<Role> {
        let mut doubled = Vec::new();
        let mut seen: Vec<u8> = Vec::new();
        for note in self.sounding() {
            let pc = note.pitch_class();
            if seen.contains(&pc) {
                continue;
            }
            seen.push(pc);
            let extra = self.sounding().filter(|n| n.pitch_class() == pc).count() - 1;
            let role = note.role().unwrap_or(Role::Unknown);
            doubled.extend(std::iter::repeat(role).take(extra));
        }
        doubled
    }

    /// Root spelling plus chord type, e.g. `"G dominant 7th"`.
    pub fn name(&self) -> String {
        match self.root() {
            Some(root) => format!("{} {}", root.name.spelling(), self.chord_type),
            None => self.chord_type.to_string(),
        }
    }
}

/// Two consecutive chords.
#[derive(Debug, Clone, Copy)]
pub struct ChordPair<'a> {
    pub prev: &'a Chord,
    pub next: &'a Chord,
}

/// Zip the four voices, expanded to `unit`, into one chord per time-slice.
///
/// Voices are given in `Part::ALL` order. Trailing notes past the shortest
/// voice are dropped.
pub fn build_chords(voices: &[Voice; 4], unit: Beats) -> Result<Vec<Chord>, AlignmentError> {
    let [bass, tenor, alto, soprano] = voices;
    let bass = bass.expand_to_unit(unit)?;
    let tenor = tenor.expand_to_unit(unit)?;
    let alto = alto.expand_to_unit(unit)?;
    let soprano = soprano.expand_to_unit(unit)?;

    debug!(
        bass = bass.len(),
        tenor = tenor.len(),
        alto = alto.len(),
        soprano = soprano.len(),
        "expanded voices"
    );

    Ok(bass
        .into_iter()
        .zip(tenor)
        .zip(alto)
        .zip(soprano)
        .map(|(((b, t), a), s)| Chord::new([b, t, a, s]))
        .collect())
}

/// Every adjacent `(chords[i], chords[i + 1])`.
pub fn chord_pairs(chords: &[Chord]) -> Vec<ChordPair<'_>> {
    chords
        .windows(2)
        .map(|w| ChordPair {
            prev: &w[0],
            next: &w[1],
        })
        .collect()
}
