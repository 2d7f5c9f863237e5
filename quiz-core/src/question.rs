//! Questions, prompts and answer representations.
//!
//! A [`Question`] is immutable once generated. All answer comparisons go
//! through [`Answer::normalized`], so a chord given as `G C E` matches one
//! given as `C E G`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{ChordDefinition, IntervalDefinition, chord_pitch_classes};
use crate::pitch::{Note, PitchClass};
use crate::playback::Playback;

/// Octave used when a prompt only knows pitch classes.
pub const PROMPT_OCTAVE: i8 = 4;

/// The four quiz flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizKind {
    /// Name the interval between a root and a second note
    Interval,
    /// Pick the notes of a named chord
    ChordByNotes,
    /// Name the chord that was played
    ChordByName,
    /// Name a single sounding note
    NoteIdentification,
}

impl QuizKind {
    pub const ALL: [QuizKind; 4] = [
        QuizKind::Interval,
        QuizKind::ChordByNotes,
        QuizKind::ChordByName,
        QuizKind::NoteIdentification,
    ];

    /// Name under which results are recorded in the statistics log.
    pub fn quiz_name(self) -> &'static str {
        match self {
            QuizKind::Interval => "interval",
            QuizKind::ChordByNotes => "chord",
            QuizKind::ChordByName => "chord-identification",
            QuizKind::NoteIdentification => "note-identification",
        }
    }
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.quiz_name())
    }
}

/// A chord named by root and type, e.g. "A minor".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChordLabel {
    pub root: PitchClass,
    pub type_name: String,
}

impl fmt::Display for ChordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.type_name)
    }
}

/// One answer candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Answer {
    Interval(IntervalDefinition),
    /// Chord tones as pitch classes
    PitchSet(Vec<PitchClass>),
    Chord(ChordLabel),
    Note(Note),
}

impl Answer {
    /// Canonical form used for every equality check: pitch sets are sorted
    /// by value and deduplicated.
    pub fn normalized(&self) -> Answer {
        match self {
            Answer::PitchSet(pcs) => {
                let mut pcs = pcs.clone();
                pcs.sort();
                pcs.dedup();
                Answer::PitchSet(pcs)
            }
            other => other.clone(),
        }
    }

    pub fn matches(&self, other: &Answer) -> bool {
        self.normalized() == other.normalized()
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Interval(interval) => f.write_str(&interval.display_name),
            Answer::PitchSet(pcs) => {
                let names: Vec<&str> = pcs.iter().map(|pc| pc.name()).collect();
                f.write_str(&names.join(", "))
            }
            Answer::Chord(label) => write!(f, "{}", label),
            Answer::Note(note) => write!(f, "{}", note),
        }
    }
}

/// What the user is asked about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Interval {
        root: PitchClass,
        interval: IntervalDefinition,
    },
    ChordByNotes {
        root: PitchClass,
        chord: ChordDefinition,
    },
    ChordByName {
        root: PitchClass,
        chord: ChordDefinition,
    },
    Note(Note),
}

/// The two notes of an interval, the second one above the root.
pub fn interval_notes(root: PitchClass, semitones: u8) -> (Note, Note) {
    let low = Note::new(root, PROMPT_OCTAVE);
    let high = Note::from_midi(low.midi() + semitones as i32);
    (low, high)
}

fn at_prompt_octave(pcs: &[PitchClass]) -> Vec<Note> {
    pcs.iter().map(|&pc| Note::new(pc, PROMPT_OCTAVE)).collect()
}

/// A generated question: a prompt, four distinct options, one correct.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    kind: QuizKind,
    prompt: Prompt,
    options: Vec<Answer>,
    correct_index: usize,
}

impl Question {
    pub(crate) fn new(kind: QuizKind, prompt: Prompt, options: Vec<Answer>, correct_index: usize) -> Self {
        Question {
            kind,
            prompt,
            options,
            correct_index,
        }
    }

    pub fn kind(&self) -> QuizKind {
        self.kind
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub fn options(&self) -> &[Answer] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn correct_answer(&self) -> &Answer {
        &self.options[self.correct_index]
    }

    pub fn is_correct(&self, candidate: &Answer) -> bool {
        candidate.matches(self.correct_answer())
    }

    /// Second note of an interval prompt.
    pub fn second_note(&self) -> Option<PitchClass> {
        match &self.prompt {
            Prompt::Interval { root, interval } => {
                Some(root.transpose(interval.semitone_distance as i32))
            }
            _ => None,
        }
    }

    /// Message shown after the last failed attempt.
    pub fn reveal_message(&self) -> String {
        match &self.prompt {
            Prompt::Interval { interval, .. } => format!(
                "Incorrect. The correct interval was {}.",
                interval.display_name
            ),
            Prompt::ChordByNotes { root, chord } => format!(
                "Incorrect. The correct notes for {} {} were: {}.",
                root,
                chord.type_name,
                self.correct_answer()
            ),
            Prompt::ChordByName { root, chord } => format!(
                "Incorrect. The correct chord was {} {}.",
                root, chord.type_name
            ),
            Prompt::Note(note) => format!("Incorrect. The correct note was {}.", note),
        }
    }

    /// Audio played right after the question appears, if the kind has any.
    pub fn prompt_audio(&self) -> Option<Playback> {
        match &self.prompt {
            Prompt::ChordByName { root, chord } => Some(Playback::new(
                at_prompt_octave(&chord_pitch_classes(*root, chord)),
                0.8,
            )),
            Prompt::Note(note) => Some(Playback::new(vec![note.clone()], 0.7)),
            Prompt::Interval { .. } | Prompt::ChordByNotes { .. } => None,
        }
    }

    /// Audio played when the user selects a candidate.
    pub fn preview_audio(&self, candidate: &Answer) -> Option<Playback> {
        match (&self.prompt, candidate) {
            (Prompt::Interval { root, .. }, Answer::Interval(interval)) => {
                let (low, high) = interval_notes(*root, interval.semitone_distance);
                Some(Playback::new(vec![low, high], 0.5))
            }
            (Prompt::ChordByNotes { .. }, Answer::PitchSet(pcs)) => {
                Some(Playback::new(at_prompt_octave(pcs), 0.5))
            }
            (Prompt::Note(_), Answer::Note(note)) => Some(Playback::new(vec![note.clone()], 0.7)),
            _ => None,
        }
    }

    /// Pitch classes a fretboard hint should highlight.
    pub fn hint_pitch_classes(&self) -> Vec<PitchClass> {
        match &self.prompt {
            Prompt::Interval { root, interval } => {
                let mut pcs = vec![*root, root.transpose(interval.semitone_distance as i32)];
                pcs.sort();
                pcs
            }
            Prompt::ChordByNotes { root, chord } | Prompt::ChordByName { root, chord } => {
                chord_pitch_classes(*root, chord)
            }
            Prompt::Note(note) => vec![note.pitch_class()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use pretty_assertions::assert_eq;

    fn pcs(names: &[&str]) -> Vec<PitchClass> {
        names
            .iter()
            .map(|n| crate::pitch::pitch_class_of(n).unwrap())
            .collect()
    }

    #[test]
    fn pitch_sets_match_regardless_of_order() {
        let a = Answer::PitchSet(pcs(&["G", "C", "E"]));
        let b = Answer::PitchSet(pcs(&["C", "E", "G"]));
        assert!(a.matches(&b));
        assert_eq!(a.to_string(), "G, C, E");
        assert_eq!(a.normalized().to_string(), "C, E, G");
    }

    #[test]
    fn interval_second_note_above_root() {
        let (low, high) = interval_notes(PitchClass::C, 7);
        assert_eq!(low.full_name(), "C4");
        assert_eq!(high.full_name(), "G4");
        let (_, wrapped) = interval_notes(PitchClass::A, 5);
        assert_eq!(wrapped.full_name(), "D5");
    }

    #[test]
    fn interval_question_derives_second_note() {
        let catalog = Catalog::standard();
        let fifth = catalog.interval_with_distance(7).unwrap().clone();
        let options = vec![
            Answer::Interval(fifth.clone()),
            Answer::Interval(catalog.interval_with_distance(5).unwrap().clone()),
        ];
        let question = Question::new(
            QuizKind::Interval,
            Prompt::Interval {
                root: PitchClass::C,
                interval: fifth,
            },
            options,
            0,
        );
        assert_eq!(question.second_note(), Some(PitchClass::G));
        assert_eq!(question.hint_pitch_classes(), vec![PitchClass::C, PitchClass::G]);
        assert_eq!(
            question.reveal_message(),
            "Incorrect. The correct interval was perfect fifth."
        );
        assert_eq!(question.prompt_audio(), None);
        let preview = question.preview_audio(&question.options()[1]).unwrap();
        let names: Vec<&str> = preview.notes.iter().map(|n| n.full_name()).collect();
        assert_eq!(names, vec!["C4", "F4"]);
    }

    #[test]
    fn chord_by_name_plays_the_chord() {
        let catalog = Catalog::standard();
        let minor = catalog.chord_named("minor").unwrap().clone();
        let label = Answer::Chord(ChordLabel {
            root: PitchClass::A,
            type_name: "minor".to_string(),
        });
        let question = Question::new(
            QuizKind::ChordByName,
            Prompt::ChordByName {
                root: PitchClass::A,
                chord: minor,
            },
            vec![label],
            0,
        );
        let audio = question.prompt_audio().unwrap();
        let names: Vec<&str> = audio.notes.iter().map(|n| n.full_name()).collect();
        assert_eq!(names, vec!["C4", "E4", "A4"]);
        assert_eq!(audio.duration_seconds, 0.8);
        assert_eq!(
            question.reveal_message(),
            "Incorrect. The correct chord was A minor."
        );
    }

    #[test]
    fn quiz_names_are_stable() {
        let names: Vec<&str> = QuizKind::ALL.iter().map(|k| k.quiz_name()).collect();
        assert_eq!(
            names,
            vec!["interval", "chord", "chord-identification", "note-identification"]
        );
    }
}
