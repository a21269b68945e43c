//! Four-part harmony analysis and voice-leading diagnostics.
//!
//! A score of four staves (soprano, alto, tenor, bass) is aligned on
//! quarter-note beats into a sequence of chords. Each chord is classified
//! (triad, seventh chord, shell, or unknown) and every note gets a functional
//! role. The selected rules then attach mistakes to the chords.
//!
//! # Example
//!
//! ```
//! use voicelead::{analyze, RuleSet, Score};
//!
//! let json = r#"{
//!     "key": "C", "timeSig": "4/4", "tempo": 80,
//!     "staves": [
//!         {"voice": "soprano", "clef": "treble", "notes": [{"name": "G4", "type": "quarter"}, {"name": "C5", "type": "quarter"}]},
//!         {"voice": "alto",    "clef": "treble", "notes": [{"name": "D4", "type": "quarter"}, {"name": "G4", "type": "quarter"}]},
//!         {"voice": "tenor",   "clef": "bass",   "notes": [{"name": "B3", "type": "quarter"}, {"name": "E4", "type": "quarter"}]},
//!         {"voice": "bass",    "clef": "bass",   "notes": [{"name": "G3", "type": "quarter"}, {"name": "C4", "type": "quarter"}]}
//!     ]
//! }"#;
//!
//! let score: Score = serde_json::from_str(json).unwrap();
//! let music = analyze(&score, &RuleSet::all()).unwrap();
//!
//! assert_eq!(music.chords().len(), 2);
//! for (index, mistake) in music.mistakes() {
//!     println!("chord {index}: {mistake}");
//! }
//! ```

pub mod chord;
pub mod classify;
pub mod mistake;
pub mod music;
pub mod pitch;
pub mod rules;
pub mod score;
pub mod voice;

pub use chord::{build_chords, chord_pairs, Chord, ChordPair, Inversion, VoiceInterval};
pub use classify::{classify, ChordType, Classification, Degree, Role};
pub use mistake::{Mistake, MistakeKind};
pub use music::Music;
pub use pitch::{parse, pitch_class, Accidental, Letter, NoteName, ParseError};
pub use rules::{Rule, RuleSet};
pub use score::{Expressions, NoteData, NoteType, Score, Staff};
pub use voice::{AlignmentError, Beats, Note, Part, Voice};

/// Errors that stop a score from being analysed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error("score has no {0} staff")]
    MissingPart(Part),

    #[error("score has more than one {0} staff")]
    DuplicatePart(Part),

    #[error("unknown voice {0:?}, expected soprano, alto, tenor or bass")]
    UnknownPart(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Build the chord sequence for `score` and run `rules` over it.
pub fn analyze(score: &Score, rules: &RuleSet) -> Result<Music> {
    let mut music = Music::from_score(score)?;
    music.check(rules);
    Ok(music)
}
