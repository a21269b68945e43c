//! Voice-leading rules.
//!
//! Pair rules look at two consecutive chords and report against the first;
//! single-chord rules look at one chord at a time. Every rule skips a part
//! that is resting in any chord it inspects.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chord::{chord_pairs, Chord, ChordPair};
use crate::classify::Role;
use crate::mistake::{Mistake, MistakeKind};
use crate::voice::{Note, Part};

/// A named, individually selectable rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    ParallelFifths,
    ParallelOctaves,
    ParallelUnisons,
    Sevenths,
    Intervals,
    Spacing,
    Range,
    Crossing,
    Doubling,
}

impl Rule {
    pub const ALL: [Rule; 9] = [
        Rule::ParallelFifths,
        Rule::ParallelOctaves,
        Rule::ParallelUnisons,
        Rule::Sevenths,
        Rule::Intervals,
        Rule::Spacing,
        Rule::Range,
        Rule::Crossing,
        Rule::Doubling,
    ];

    /// Identifier used for rule selection.
    pub fn id(&self) -> &'static str {
        match self {
            Rule::ParallelFifths => "p_fifths",
            Rule::ParallelOctaves => "p_octaves",
            Rule::ParallelUnisons => "p_unisons",
            Rule::Sevenths => "sevenths",
            Rule::Intervals => "intervals",
            Rule::Spacing => "spacing",
            Rule::Range => "range",
            Rule::Crossing => "crossing",
            Rule::Doubling => "doubling",
        }
    }

    pub fn from_id(id: &str) -> Option<Rule> {
        Rule::ALL.into_iter().find(|rule| rule.id() == id.trim())
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rule::ParallelFifths => "two parts move in parallel perfect fifths",
            Rule::ParallelOctaves => "two parts move in parallel octaves",
            Rule::ParallelUnisons => "two parts move in parallel unisons",
            Rule::Sevenths => "a chord seventh must fall by step to a chord tone",
            Rule::Intervals => "no melodic leap larger than an octave or equal to a tritone",
            Rule::Spacing => "adjacent upper parts stay within an octave",
            Rule::Range => "each part stays inside its singable range",
            Rule::Crossing => "no part sounds above the part nominally above it",
            Rule::Doubling => "enough distinct pitch classes, and the right member doubled",
        }
    }

    /// Whether the rule looks at consecutive chords rather than one chord.
    pub fn is_pair_rule(&self) -> bool {
        matches!(
            self,
            Rule::ParallelFifths
                | Rule::ParallelOctaves
                | Rule::ParallelUnisons
                | Rule::Sevenths
                | Rule::Intervals
        )
    }

    /// Apply a pair rule. Single-chord rules report nothing here.
    pub fn check_pair(&self, pair: ChordPair<'_>) -> Vec<Mistake> {
        match self {
            Rule::ParallelFifths => parallel(pair, ParallelInterval::Fifths),
            Rule::ParallelOctaves => parallel(pair, ParallelInterval::Octaves),
            Rule::ParallelUnisons => parallel(pair, ParallelInterval::Unisons),
            Rule::Sevenths => sevenths(pair),
            Rule::Intervals => intervals(pair),
            Rule::Spacing | Rule::Range | Rule::Crossing | Rule::Doubling => Vec::new(),
        }
    }

    /// Apply a single-chord rule. Pair rules report nothing here.
    pub fn check_chord(&self, chord: &Chord) -> Vec<Mistake> {
        match self {
            Rule::Spacing => spacing(chord),
            Rule::Range => range(chord),
            Rule::Crossing => crossing(chord),
            Rule::Doubling => doubling(chord),
            Rule::ParallelFifths
            | Rule::ParallelOctaves
            | Rule::ParallelUnisons
            | Rule::Sevenths
            | Rule::Intervals => Vec::new(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The rules selected for one analysis, in `Rule::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn all() -> Self {
        RuleSet {
            rules: Rule::ALL.to_vec(),
        }
    }

    /// Select rules by identifier. No identifiers (blank ones do not count)
    /// means every rule; unrecognised identifiers are skipped.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: Vec<S> = ids
            .into_iter()
            .filter(|id| !id.as_ref().trim().is_empty())
            .collect();
        if ids.is_empty() {
            return RuleSet::all();
        }

        let mut rules = Vec::new();
        for id in &ids {
            match Rule::from_id(id.as_ref()) {
                Some(rule) => rules.push(rule),
                None => debug!(id = id.as_ref(), "ignoring unknown rule"),
            }
        }
        rules.sort_unstable();
        rules.dedup();
        RuleSet { rules }
    }

    pub fn iter(&self) -> impl Iterator<Item = Rule> + '_ {
        self.rules.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::all()
    }
}

/// Run the selected rules over a chord sequence, attaching what they find.
pub fn check(chords: &mut [Chord], rules: &RuleSet) {
    let pair_rules: Vec<Rule> = rules.iter().filter(Rule::is_pair_rule).collect();
    let chord_rules: Vec<Rule> = rules.iter().filter(|r| !r.is_pair_rule()).collect();

    let found: Vec<Vec<Mistake>> = chord_pairs(chords)
        .into_iter()
        .map(|pair| pair_rules.iter().flat_map(|r| r.check_pair(pair)).collect())
        .collect();
    for (chord, mistakes) in chords.iter_mut().zip(found) {
        chord.add_mistakes(mistakes);
    }

    for chord in chords.iter_mut() {
        let mistakes: Vec<Mistake> = chord_rules.iter().flat_map(|r| r.check_chord(chord)).collect();
        chord.add_mistakes(mistakes);
    }
}

/// Interval classes the parallel-motion rule can look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelInterval {
    /// Any compound of 7 semitones.
    Fifths,
    /// Any non-zero multiple of 12 semitones.
    Octaves,
    /// Exactly 0 semitones.
    Unisons,
}

impl ParallelInterval {
    fn matches(self, value: i32) -> bool {
        match self {
            ParallelInterval::Fifths => value != 0 && value.rem_euclid(12) == 7,
            ParallelInterval::Octaves => value != 0 && value.rem_euclid(12) == 0,
            ParallelInterval::Unisons => value == 0,
        }
    }

    fn kind(self) -> MistakeKind {
        match self {
            ParallelInterval::Fifths => MistakeKind::ParallelFifths,
            ParallelInterval::Octaves => MistakeKind::ParallelOctaves,
            ParallelInterval::Unisons => MistakeKind::ParallelUnisons,
        }
    }
}

fn both_sounding(pair: ChordPair<'_>, part: Part) -> bool {
    pair.prev.note(part).is_sounding() && pair.next.note(part).is_sounding()
}

/// Part pairs holding the same qualifying interval across both chords while
/// actually moving.
pub fn parallel(pair: ChordPair<'_>, class: ParallelInterval) -> Vec<Mistake> {
    pair.prev
        .intervals()
        .iter()
        .zip(pair.next.intervals())
        .filter(|(a, _)| class.matches(a.value))
        .filter(|(a, b)| a.value == b.value)
        .filter(|(a, _)| both_sounding(pair, a.low) && both_sounding(pair, a.high))
        .filter(|(a, _)| pair.prev.pitch(a.low) != pair.next.pitch(a.low))
        .map(|(a, _)| {
            Mistake::new(
                class.kind(),
                format!("between the {} and {}", a.low, a.high),
            )
        })
        .collect()
}

/// A seventh must fall by one or two semitones onto a root, third or fifth.
pub fn sevenths(pair: ChordPair<'_>) -> Vec<Mistake> {
    Part::ALL
        .into_iter()
        .filter(|&part| pair.prev.role(part) == Role::Seventh && both_sounding(pair, part))
        .filter(|&part| !matches!(pair.next.role(part), Role::Unknown | Role::Error))
        .filter(|&part| {
            let fall = pair.prev.pitch(part) - pair.next.pitch(part);
            let lands_on = pair.next.role(part);
            !((1..=2).contains(&fall)
                && matches!(lands_on, Role::Root | Role::Third | Role::Fifth))
        })
        .map(|part| Mistake::new(MistakeKind::ImproperlyResolvedSeventh, format!("in the {}", part)))
        .collect()
}

/// No melodic move wider than an octave, and no tritone leap.
pub fn intervals(pair: ChordPair<'_>) -> Vec<Mistake> {
    Part::ALL
        .into_iter()
        .filter(|&part| both_sounding(pair, part))
        .filter(|&part| {
            let leap = (pair.prev.pitch(part) - pair.next.pitch(part)).abs();
            leap > 12 || leap == 6
        })
        .map(|part| Mistake::new(MistakeKind::IllegalInterval, format!("in the {}", part)))
        .collect()
}

/// Adjacent upper parts, ordered by pitch, must be within an octave.
pub fn spacing(chord: &Chord) -> Vec<Mistake> {
    let mut upper: Vec<&Note> = chord
        .sounding()
        .filter(|n| n.part != Part::Bass)
        .collect();
    upper.sort_by_key(|n| n.pitch());

    upper
        .windows(2)
        .filter(|w| w[1].pitch() - w[0].pitch() > 12)
        .map(|w| {
            Mistake::new(
                MistakeKind::TooMuchSpacing,
                format!("between the {} and {}", w[0].part, w[1].part),
            )
        })
        .collect()
}

/// Inclusive pitch range each part is expected to stay in.
pub fn voice_range(part: Part) -> RangeInclusive<i32> {
    match part {
        Part::Soprano => 36..=55, // C4-G5
        Part::Alto => 31..=48,    // G3-C5
        Part::Tenor => 24..=43,   // C3-G4
        Part::Bass => 16..=36,    // E2-C4
    }
}

pub fn range(chord: &Chord) -> Vec<Mistake> {
    chord
        .sounding()
        .filter(|n| !voice_range(n.part).contains(&n.pitch()))
        .map(|n| Mistake::new(MistakeKind::ExceedsRange, format!("in the {}", n.part)))
        .collect()
}

/// A lower part sounding strictly above a higher one.
pub fn crossing(chord: &Chord) -> Vec<Mistake> {
    chord
        .intervals()
        .iter()
        .filter(|i| chord.note(i.low).is_sounding() && chord.note(i.high).is_sounding())
        .filter(|i| i.value < 0)
        .map(|i| {
            Mistake::new(
                MistakeKind::VoiceCrossing,
                format!("between the {} and {}", i.low, i.high),
            )
        })
        .collect()
}

/// What the bass's role says should be doubled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preference {
    Role(Role),
    /// Whatever the top note is.
    HighestNote,
}

fn doubling_preference(bass_role: Role) -> Option<Preference> {
    match bass_role {
        Role::Root => Some(Preference::Role(Role::Root)),
        Role::Third => Some(Preference::HighestNote),
        Role::Fifth => Some(Preference::Role(Role::Fifth)),
        Role::Seventh => Some(Preference::Role(Role::Root)),
        Role::Unknown | Role::Error | Role::NonChordTone(_) => None,
    }
}

fn preferred_doubling(chord: &Chord) -> Option<Role> {
    let bass_role = chord.low_note().and_then(Note::role)?;
    let preferred = match doubling_preference(bass_role)? {
        Preference::Role(role) => role,
        Preference::HighestNote => chord.high_note().and_then(Note::role)?,
    };
    preferred.is_structural().then_some(preferred)
}

pub fn doubling(chord: &Chord) -> Vec<Mistake> {
    let mut mistakes = Vec::new();

    let sounding = chord.sounding().count();
    let distinct = chord.pitch_class_set().len();
    if sounding == 4 && distinct < 3 {
        mistakes.push(Mistake::new(
            MistakeKind::IncompleteChordTooManyDoublings,
            format!("only {} distinct pitch classes", distinct),
        ));
    }

    let doubled = chord.doublings();
    if let Some(preferred) = preferred_doubling(chord) {
        if !doubled.is_empty() && !doubled.contains(&preferred) {
            mistakes.push(Mistake::new(
                MistakeKind::RoleShouldBeDoubled,
                format!("the {} should be doubled", preferred),
            ));
        }
    }

    mistakes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::NoteName;
    use crate::voice::Beats;
    use pretty_assertions::assert_eq;

    fn pair<'a>(prev: &'a Chord, next: &'a Chord) -> ChordPair<'a> {
        ChordPair { prev, next }
    }

    fn kinds(mistakes: &[Mistake]) -> Vec<MistakeKind> {
        mistakes.iter().map(|m| m.kind).collect()
    }

    fn with_rest(pitches: [i32; 4], resting: Part) -> Chord {
        Chord::new(Part::ALL.map(|part| {
            Note::new(
                NoteName::from_pitch(pitches[part.index()]),
                Beats::QUARTER,
                part == resting,
                part,
            )
        }))
    }

    #[test]
    fn test_rule_ids_round_trip() {
        for rule in Rule::ALL {
            assert_eq!(Rule::from_id(rule.id()), Some(rule));
        }
        assert_eq!(Rule::from_id("p_sixths"), None);
    }

    #[test]
    fn test_rule_set_selection() {
        assert_eq!(RuleSet::from_ids(Vec::<String>::new()), RuleSet::all());

        let set = RuleSet::from_ids(["range", "bogus", "p_fifths", "range"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Rule::ParallelFifths, Rule::Range]);

        assert!(RuleSet::from_ids(["bogus"]).is_empty());
    }

    #[test]
    fn test_blank_ids_select_every_rule() {
        assert_eq!(RuleSet::from_ids([""]), RuleSet::all());
        assert_eq!(RuleSet::from_ids(["", "  "]), RuleSet::all());
        assert_eq!(
            RuleSet::from_ids(["", "range"]).iter().collect::<Vec<_>>(),
            vec![Rule::Range]
        );
    }

    #[test]
    fn test_seventh_into_augmented_triad_is_not_judged() {
        let g = Chord::from_pitches([7, 11, 14, 17]);
        // soprano falls onto an augmented triad, where every role is unknown
        let aug = Chord::from_pitches([0, 4, 8, 16]);
        assert_eq!(aug.role(Part::Soprano), Role::Unknown);
        assert!(sevenths(pair(&g, &aug)).is_empty());

        // the same step down onto a C major triad still resolves
        let c = Chord::from_pitches([0, 4, 7, 16]);
        assert!(sevenths(pair(&g, &c)).is_empty());
    }

    #[test]
    fn test_static_chords_are_not_parallel() {
        let c = Chord::from_pitches([0, 7, 12, 19]);
        let again = Chord::from_pitches([0, 7, 12, 19]);

        assert!(parallel(pair(&c, &again), ParallelInterval::Fifths).is_empty());
        assert!(parallel(pair(&c, &again), ParallelInterval::Octaves).is_empty());
    }

    #[test]
    fn test_compound_fifths_count() {
        let a = Chord::from_pitches([0, 16, 19, 24]);
        let b = Chord::from_pitches([2, 17, 21, 26]);
        // bass-alto: 19 then 19
        let found = parallel(pair(&a, &b), ParallelInterval::Fifths);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].detail, "between the bass and alto");
    }

    #[test]
    fn test_parallels_skip_rests() {
        let g = with_rest([7, 11, 14, 19], Part::Soprano);
        let c = Chord::from_pitches([0, 4, 7, 12]);
        assert!(parallel(pair(&g, &c), ParallelInterval::Octaves).is_empty());
    }

    #[test]
    fn test_illegal_intervals() {
        let a = Chord::from_pitches([0, 16, 19, 24]);
        let b = Chord::from_pitches([14, 10, 19, 24]);
        let found = intervals(pair(&a, &b));

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].detail, "in the bass");
        assert_eq!(found[1].detail, "in the tenor");
    }

    #[test]
    fn test_octave_leap_is_legal() {
        let a = Chord::from_pitches([12, 16, 19, 24]);
        let b = Chord::from_pitches([24, 16, 19, 24]);
        assert!(intervals(pair(&a, &b)).is_empty());
    }

    #[test]
    fn test_spacing() {
        // tenor C3, alto E4, soprano G4
        let wide = Chord::from_pitches([12, 24, 40, 43]);
        let found = spacing(&wide);
        assert_eq!(kinds(&found), vec![MistakeKind::TooMuchSpacing]);
        assert_eq!(found[0].detail, "between the tenor and alto");

        // bass far below the tenor is allowed
        assert!(spacing(&Chord::from_pitches([0, 28, 31, 36])).is_empty());
    }

    #[test]
    fn test_range() {
        let chord = Chord::from_pitches([12, 28, 36, 60]);
        let found = range(&chord);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].detail, "in the bass");
        assert_eq!(found[1].detail, "in the soprano");
    }

    #[test]
    fn test_crossing() {
        let chord = Chord::from_pitches([24, 40, 36, 43]);
        let found = crossing(&chord);
        assert_eq!(kinds(&found), vec![MistakeKind::VoiceCrossing]);
        assert_eq!(found[0].detail, "between the tenor and alto");

        // a unison is not a crossing
        assert!(crossing(&Chord::from_pitches([24, 36, 36, 43])).is_empty());
    }

    #[test]
    fn test_too_many_doublings() {
        let chord = Chord::from_pitches([24, 36, 40, 48]);
        let found = doubling(&chord);
        assert!(kinds(&found).contains(&MistakeKind::IncompleteChordTooManyDoublings));
    }

    #[test]
    fn test_root_position_wants_doubled_root() {
        // C E G G: fifth doubled over a root in the bass
        let chord = Chord::from_pitches([24, 31, 40, 43]);
        let found = doubling(&chord);
        assert_eq!(kinds(&found), vec![MistakeKind::RoleShouldBeDoubled]);
        assert_eq!(found[0].detail, "the root should be doubled");

        assert!(doubling(&Chord::from_pitches([24, 31, 40, 48])).is_empty());
    }

    #[test]
    fn test_first_inversion_doubles_the_top_note() {
        // E C G C: top note is a root, root doubled
        assert!(doubling(&Chord::from_pitches([16, 24, 31, 36])).is_empty());

        // E C G G: top note is the fifth, fifth doubled
        assert!(doubling(&Chord::from_pitches([16, 24, 31, 43])).is_empty());

        // E C G E: top note is the third, root not doubled
        assert!(doubling(&Chord::from_pitches([16, 24, 31, 40])).is_empty());

        // E E G C: top note is the root, third doubled
        let found = doubling(&Chord::from_pitches([16, 28, 31, 36]));
        assert_eq!(kinds(&found), vec![MistakeKind::RoleShouldBeDoubled]);
        assert_eq!(found[0].detail, "the root should be doubled");
    }

    #[test]
    fn test_unknown_bass_role_has_no_preference() {
        // augmented triad with a doubling
        assert!(doubling(&Chord::from_pitches([24, 28, 32, 36])).is_empty());
    }

    #[test]
    fn test_complete_seventh_chord_has_no_doubling_complaint() {
        assert!(doubling(&Chord::from_pitches([7, 11, 14, 17])).is_empty());
    }

    #[test]
    fn test_check_attaches_pair_mistakes_to_first_chord() {
        let mut chords = vec![
            Chord::from_pitches([7, 11, 14, 19]),
            Chord::from_pitches([0, 4, 7, 12]),
        ];
        let rules = RuleSet::from_ids(["p_octaves"]);
        check(&mut chords, &rules);

        assert_eq!(kinds(chords[0].mistakes()), vec![MistakeKind::ParallelOctaves]);
        assert!(chords[1].mistakes().is_empty());
    }

    #[test]
    fn test_check_empty_sequence() {
        let mut chords: Vec<Chord> = Vec::new();
        check(&mut chords, &RuleSet::all());
        assert!(chords.is_empty());
    }
}
