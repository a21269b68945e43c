//! Score input as produced by the editor layer.
//!
//! ```json
//! { "key": "C", "timeSig": "4/4", "tempo": 90,
//!   "staves": [{ "voice": "soprano", "clef": "treble",
//!                "notes": [{ "name": "E5", "type": "half", "rest": false }] }] }
//! ```

use serde::{Deserialize, Serialize};

use crate::voice::Beats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "timeSig", default)]
    pub time_sig: String,
    #[serde(default)]
    pub tempo: u32,
    #[serde(default)]
    pub staves: Vec<Staff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    /// Which part this staff carries: soprano, alto, tenor or bass.
    pub voice: String,
    #[serde(default)]
    pub clef: String,
    #[serde(default)]
    pub notes: Vec<NoteData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteData {
    pub name: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    #[serde(default)]
    pub rest: bool,
    #[serde(default)]
    pub exp: Expressions,
    #[serde(default)]
    pub chromatic: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Eighth,
    Quarter,
    Half,
    Whole,
}

impl NoteType {
    pub fn beats(self) -> Beats {
        match self {
            NoteType::Eighth => Beats::EIGHTH,
            NoteType::Quarter => Beats::QUARTER,
            NoteType::Half => Beats::HALF,
            NoteType::Whole => Beats::WHOLE,
        }
    }
}

/// Articulation marks (staccato, tenuto, ...). Editors send either a
/// comma-joined string or a list; both are kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expressions {
    Joined(String),
    List(Vec<String>),
}

impl Expressions {
    /// Individual marks, with empty entries dropped.
    pub fn marks(&self) -> Vec<&str> {
        match self {
            Expressions::Joined(s) => s
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .collect(),
            Expressions::List(list) => list
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }
}

impl Default for Expressions {
    fn default() -> Self {
        Expressions::Joined(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_score() {
        let json = r#"{
            "key": "G",
            "timeSig": "3/4",
            "tempo": 72,
            "staves": [{
                "voice": "alto",
                "clef": "treble",
                "notes": [
                    {"name": "D4", "type": "half", "rest": false, "exp": "staccato,tenuto", "chromatic": 0},
                    {"name": "B3", "type": "eighth"}
                ]
            }]
        }"#;
        let score: Score = serde_json::from_str(json).unwrap();

        assert_eq!(score.time_sig, "3/4");
        assert_eq!(score.staves.len(), 1);
        let notes = &score.staves[0].notes;
        assert_eq!(notes[0].note_type.beats(), Beats::HALF);
        assert_eq!(notes[0].exp.marks(), vec!["staccato", "tenuto"]);
        assert_eq!(notes[1].note_type, NoteType::Eighth);
        assert!(!notes[1].rest);
        assert!(notes[1].exp.marks().is_empty());
    }

    #[test]
    fn test_expressions_as_list() {
        let note: NoteData =
            serde_json::from_str(r#"{"name": "C4", "type": "whole", "exp": ["fermata"]}"#).unwrap();
        assert_eq!(note.exp, Expressions::List(vec!["fermata".to_string()]));
        assert_eq!(note.exp.marks(), vec!["fermata"]);
    }

    #[test]
    fn test_unknown_note_type_is_rejected() {
        let result: Result<NoteData, _> =
            serde_json::from_str(r#"{"name": "C4", "type": "sixteenth"}"#);
        assert!(result.is_err());
    }
}
