//! Note-name parsing and pitch arithmetic using winnow combinators.
//!
//! Pitches are plain semitone counts with C of octave 1 as the origin, so
//! `C4` is 36 and `A4` is 45. Negative pitches are legal (octave 0).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

type PResult<T> = winnow::ModalResult<T>;

/// Note letter without accidental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// Semitone offset from C (0-11)
    pub fn to_semitone(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

/// Accidental attached to a note letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    #[default]
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    pub fn offset(self) -> i32 {
        match self {
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }

    /// Symbol as written in note names (`x` is the double sharp).
    pub fn symbol(self) -> &'static str {
        match self {
            Accidental::DoubleFlat => "bb",
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::DoubleSharp => "x",
        }
    }
}

/// A fully spelled note: letter, accidental and octave.
///
/// The pitch is always derived from these three fields and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteName {
    pub letter: Letter,
    pub accidental: Accidental,
    pub octave: i32,
}

/// Sharp spellings for each pitch class, used when only a pitch is known.
const SHARP_SPELLINGS: [(Letter, Accidental); 12] = [
    (Letter::C, Accidental::Natural),
    (Letter::C, Accidental::Sharp),
    (Letter::D, Accidental::Natural),
    (Letter::D, Accidental::Sharp),
    (Letter::E, Accidental::Natural),
    (Letter::F, Accidental::Natural),
    (Letter::F, Accidental::Sharp),
    (Letter::G, Accidental::Natural),
    (Letter::G, Accidental::Sharp),
    (Letter::A, Accidental::Natural),
    (Letter::A, Accidental::Sharp),
    (Letter::B, Accidental::Natural),
];

impl NoteName {
    pub fn new(letter: Letter, accidental: Accidental, octave: i32) -> Self {
        NoteName {
            letter,
            accidental,
            octave,
        }
    }

    /// Semitones from C of octave 1.
    pub fn pitch(&self) -> i32 {
        12 * (self.octave - 1) + self.letter.to_semitone() + self.accidental.offset()
    }

    pub fn pitch_class(&self) -> u8 {
        pitch_class(self.pitch())
    }

    /// Spell a bare pitch with sharps. `from_pitch(p).pitch() == p` for every `p`.
    pub fn from_pitch(pitch: i32) -> Self {
        let (letter, accidental) = SHARP_SPELLINGS[pitch_class(pitch) as usize];
        NoteName {
            letter,
            accidental,
            octave: pitch.div_euclid(12) + 1,
        }
    }

    /// Letter and accidental without the octave, e.g. `"Bb"`.
    pub fn spelling(&self) -> String {
        format!("{}{}", self.letter.as_char(), self.accidental.symbol())
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.spelling(), self.octave)
    }
}

impl FromStr for NoteName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// A note name that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid note name {name:?}: {reason}")]
pub struct ParseError {
    pub name: String,
    pub reason: String,
}

/// Reduce a pitch to its pitch class (0-11).
pub fn pitch_class(pitch: i32) -> u8 {
    pitch.rem_euclid(12) as u8
}

/// Parse a note name such as `C4`, `bb3`, `F#5` or `Gx2`.
///
/// The letter is case-insensitive; the octave is an integer in `0..=MAX_OCTAVE`.
pub fn parse(name: &str) -> Result<NoteName, ParseError> {
    parse_note_name
        .parse(name.trim())
        .map_err(|e| ParseError {
            name: name.to_string(),
            reason: format!("unexpected input at offset {}", e.offset()),
        })
}

fn parse_note_name(input: &mut &str) -> PResult<NoteName> {
    let letter = parse_letter(input)?;
    let accidental = opt(parse_accidental).parse_next(input)?;
    let octave = parse_octave(input)?;

    Ok(NoteName {
        letter,
        accidental: accidental.unwrap_or_default(),
        octave,
    })
}

fn parse_letter(input: &mut &str) -> PResult<Letter> {
    let c = one_of(['C', 'D', 'E', 'F', 'G', 'A', 'B', 'c', 'd', 'e', 'f', 'g', 'a', 'b'])
        .parse_next(input)?;
    match c.to_ascii_uppercase() {
        'C' => Ok(Letter::C),
        'D' => Ok(Letter::D),
        'E' => Ok(Letter::E),
        'F' => Ok(Letter::F),
        'G' => Ok(Letter::G),
        'A' => Ok(Letter::A),
        _ => Ok(Letter::B),
    }
}

fn parse_accidental(input: &mut &str) -> PResult<Accidental> {
    alt((
        "bb".map(|_| Accidental::DoubleFlat),
        "b".map(|_| Accidental::Flat),
        "#".map(|_| Accidental::Sharp),
        "x".map(|_| Accidental::DoubleSharp),
    ))
    .parse_next(input)
}

/// Highest octave a note name may carry.
pub const MAX_OCTAVE: i32 = 99;

fn parse_octave(input: &mut &str) -> PResult<i32> {
    take_while(1.., |c: char| c.is_ascii_digit())
        .try_map(|digits: &str| digits.parse::<i32>())
        .verify(|octave: &i32| (0..=MAX_OCTAVE).contains(octave))
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_naturals() {
        assert_eq!(parse("C1").unwrap().pitch(), 0);
        assert_eq!(parse("C4").unwrap().pitch(), 36);
        assert_eq!(parse("A4").unwrap().pitch(), 45);
        assert_eq!(parse("B3").unwrap().pitch(), 35);
    }

    #[test]
    fn test_parse_accidentals() {
        assert_eq!(parse("F#4").unwrap().pitch(), 42);
        assert_eq!(parse("Eb4").unwrap().pitch(), 39);
        assert_eq!(parse("Cx2").unwrap().pitch(), 14);
        assert_eq!(parse("Dbb1").unwrap().pitch(), 0);

        let name = parse("Gx2").unwrap();
        assert_eq!(name.accidental, Accidental::DoubleSharp);
        assert_eq!(name.letter, Letter::G);
    }

    #[test]
    fn test_lowercase_letter_then_flat() {
        let name = parse("bb3").unwrap();
        assert_eq!(name.letter, Letter::B);
        assert_eq!(name.accidental, Accidental::Flat);
        assert_eq!(name.pitch(), 34);
    }

    #[test]
    fn test_octave_zero_is_negative() {
        assert_eq!(parse("C0").unwrap().pitch(), -12);
        assert_eq!(parse("B0").unwrap().pitch_class(), 11);
    }

    #[test]
    fn test_multi_digit_octave() {
        assert_eq!(parse("C10").unwrap().octave, 10);
    }

    #[test]
    fn test_octave_out_of_range() {
        assert_eq!(parse("C99").unwrap().pitch(), 12 * 98);
        for bad in ["C100", "C999999999", "C99999999999"] {
            let err = parse(bad).unwrap_err();
            assert_eq!(err.name, bad);
        }
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(parse(" D5 ").unwrap().pitch(), 50);
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "H4", "C", "#4", "C#", "C4x", "4C", "C-1"] {
            let err = parse(bad).unwrap_err();
            assert_eq!(err.name, bad, "wrong name recorded for {:?}", bad);
        }
    }

    #[test]
    fn test_from_pitch_round_trips_pitch() {
        for pitch in [-13, -1, 0, 1, 11, 12, 36, 45, 1001] {
            assert_eq!(NoteName::from_pitch(pitch).pitch(), pitch);
        }
        assert_eq!(NoteName::from_pitch(42).to_string(), "F#4");
    }

    #[test]
    fn test_from_str() {
        let name: NoteName = "Ab3".parse().unwrap();
        assert_eq!(name.spelling(), "Ab");
        assert_eq!(name.to_string(), "Ab3");
    }
}
