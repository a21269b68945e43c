//! A whole score turned into voices and classified chords.

use serde::Serialize;
use tracing::debug;

use crate::chord::{build_chords, chord_pairs, Chord, ChordPair};
use crate::mistake::Mistake;
use crate::pitch::parse;
use crate::rules::{self, RuleSet};
use crate::score::{Score, Staff};
use crate::voice::{Beats, Note, Part, Voice};
use crate::{Error, Result};

/// The analysed score: four voices plus the chord sequence built from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Music {
    pub key: String,
    pub time_sig: String,
    pub tempo: u32,
    voices: [Voice; 4],
    chords: Vec<Chord>,
}

impl Music {
    /// Route staves to parts by their `voice` label, parse every note and
    /// align the voices on quarter-note beats.
    pub fn from_score(score: &Score) -> Result<Self> {
        let mut staves: [Option<&Staff>; 4] = [None; 4];
        for staff in &score.staves {
            let part = Part::from_label(&staff.voice)
                .ok_or_else(|| Error::UnknownPart(staff.voice.clone()))?;
            if staves[part.index()].replace(staff).is_some() {
                return Err(Error::DuplicatePart(part));
            }
        }

        let [bass, tenor, alto, soprano] = Part::ALL.map(|part| {
            let staff = staves[part.index()].ok_or(Error::MissingPart(part))?;
            voice_from_staff(part, staff)
        });
        let voices = [bass?, tenor?, alto?, soprano?];

        let chords = build_chords(&voices, Beats::QUARTER)?;
        debug!(chords = chords.len(), key = %score.key, "built music");

        Ok(Music {
            key: score.key.clone(),
            time_sig: score.time_sig.clone(),
            tempo: score.tempo,
            voices,
            chords,
        })
    }

    /// Run the selected rules, attaching mistakes to the chords.
    pub fn check(&mut self, rules: &RuleSet) {
        rules::check(&mut self.chords, rules);
    }

    pub fn voice(&self, part: Part) -> &Voice {
        &self.voices[part.index()]
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn chord_pairs(&self) -> Vec<ChordPair<'_>> {
        chord_pairs(&self.chords)
    }

    /// Every mistake with the index of the chord it is attached to.
    pub fn mistakes(&self) -> impl Iterator<Item = (usize, &Mistake)> {
        self.chords
            .iter()
            .enumerate()
            .flat_map(|(i, chord)| chord.mistakes().iter().map(move |m| (i, m)))
    }
}

fn voice_from_staff(part: Part, staff: &Staff) -> Result<Voice> {
    let notes = staff
        .notes
        .iter()
        .map(|data| -> Result<Note> {
            let name = parse(&data.name)?;
            Ok(Note::new(name, data.note_type.beats(), data.rest, part))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Voice::new(part, staff.clef.clone(), notes))
}
