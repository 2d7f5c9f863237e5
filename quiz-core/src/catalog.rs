//! # Catalog Module
//!
//! Immutable interval and chord definitions plus the range of sounding notes
//! used by the note-identification quiz. A catalog is plain data: it is
//! validated once when built and then passed explicitly to whoever needs it.
//!
//! ## Features
//! - The 11 simple intervals and the major/minor triads by default
//! - Guitar range E2 to E4 for note identification
//! - JSON loading with invariant checks
//! - Chord spelling from a root and a chord definition

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};
use crate::pitch::{Note, PitchClass, notes_between};
use crate::random::RandomSource;

/// An interval quiz entry, e.g. "perfect fifth" = 7 semitones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntervalDefinition {
    pub display_name: String,
    pub semitone_distance: u8,
}

/// A chord type given as semitone offsets from its root, root first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChordDefinition {
    pub type_name: String,
    pub semitone_offsets: Vec<u8>,
}

impl IntervalDefinition {
    pub fn new(display_name: &str, semitone_distance: u8) -> Self {
        IntervalDefinition {
            display_name: display_name.to_string(),
            semitone_distance,
        }
    }
}

impl ChordDefinition {
    pub fn new(type_name: &str, semitone_offsets: &[u8]) -> Self {
        ChordDefinition {
            type_name: type_name.to_string(),
            semitone_offsets: semitone_offsets.to_vec(),
        }
    }
}

/// The full set of quiz material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct Catalog {
    intervals: Vec<IntervalDefinition>,
    chords: Vec<ChordDefinition>,
    notes: Vec<Note>,
}

/// Unvalidated shape accepted from JSON.
#[derive(Deserialize)]
struct RawCatalog {
    intervals: Vec<IntervalDefinition>,
    chords: Vec<ChordDefinition>,
    notes: Vec<Note>,
}

impl TryFrom<RawCatalog> for Catalog {
    type Error = QuizError;

    fn try_from(raw: RawCatalog) -> Result<Self> {
        Catalog::new(raw.intervals, raw.chords, raw.notes)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::standard()
    }
}

impl Catalog {
    /// Builds a catalog, checking every definition.
    ///
    /// # Errors
    /// * [`QuizError::InvalidCatalog`] if a collection is empty, an interval
    ///   distance lies outside 1..=11, a chord does not start at 0, or two
    ///   chord offsets coincide modulo 12.
    pub fn new(
        intervals: Vec<IntervalDefinition>,
        chords: Vec<ChordDefinition>,
        mut notes: Vec<Note>,
    ) -> Result<Self> {
        if intervals.is_empty() || chords.is_empty() || notes.is_empty() {
            return Err(QuizError::InvalidCatalog(
                "intervals, chords and notes must all be non-empty".to_string(),
            ));
        }
        for interval in &intervals {
            if !(1..=11).contains(&interval.semitone_distance) {
                return Err(QuizError::InvalidCatalog(format!(
                    "interval '{}' has distance {}",
                    interval.display_name, interval.semitone_distance
                )));
            }
        }
        for chord in &chords {
            if chord.semitone_offsets.first() != Some(&0) {
                return Err(QuizError::InvalidCatalog(format!(
                    "chord '{}' must start at offset 0",
                    chord.type_name
                )));
            }
            let mut seen = [false; 12];
            for &offset in &chord.semitone_offsets {
                let pc = (offset % 12) as usize;
                if seen[pc] {
                    return Err(QuizError::InvalidCatalog(format!(
                        "chord '{}' repeats offset {} modulo 12",
                        chord.type_name, offset
                    )));
                }
                seen[pc] = true;
            }
        }
        notes.sort();
        notes.dedup();
        Ok(Catalog {
            intervals,
            chords,
            notes,
        })
    }

    /// The default material: 11 intervals, major and minor triads, E2..=E4.
    pub fn standard() -> Self {
        let intervals = [
            ("minor second", 1),
            ("major second", 2),
            ("minor third", 3),
            ("major third", 4),
            ("perfect fourth", 5),
            ("tritone", 6),
            ("perfect fifth", 7),
            ("minor sixth", 8),
            ("major sixth", 9),
            ("minor seventh", 10),
            ("major seventh", 11),
        ]
        .iter()
        .map(|&(name, distance)| IntervalDefinition::new(name, distance))
        .collect();

        let chords = vec![
            ChordDefinition::new("major", &[0, 4, 7]),
            ChordDefinition::new("minor", &[0, 3, 7]),
        ];

        // E2 = MIDI 40, E4 = MIDI 64
        let notes = notes_between(&Note::from_midi(40), &Note::from_midi(64));

        Catalog {
            intervals,
            chords,
            notes,
        }
    }

    /// Parses and validates a catalog from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| QuizError::InvalidCatalog(e.to_string()))
    }

    pub fn intervals(&self) -> &[IntervalDefinition] {
        &self.intervals
    }

    pub fn chords(&self) -> &[ChordDefinition] {
        &self.chords
    }

    /// Sounding notes available to note identification, ascending.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn interval_with_distance(&self, semitones: u8) -> Option<&IntervalDefinition> {
        self.intervals
            .iter()
            .find(|i| i.semitone_distance == semitones)
    }

    pub fn chord_named(&self, type_name: &str) -> Option<&ChordDefinition> {
        self.chords.iter().find(|c| c.type_name == type_name)
    }

    pub fn random_interval(&self, rng: &mut dyn RandomSource) -> &IntervalDefinition {
        &self.intervals[rng.index(self.intervals.len())]
    }

    pub fn random_chord_definition(&self, rng: &mut dyn RandomSource) -> &ChordDefinition {
        &self.chords[rng.index(self.chords.len())]
    }

    pub fn random_pitch_class(&self, rng: &mut dyn RandomSource) -> PitchClass {
        PitchClass::new(rng.index(12) as i32)
    }
}

/// Spells a chord: the root transposed by each offset, sorted by value and
/// free of duplicates.
pub fn chord_pitch_classes(root: PitchClass, chord: &ChordDefinition) -> Vec<PitchClass> {
    let mut pcs: Vec<PitchClass> = chord
        .semitone_offsets
        .iter()
        .map(|&offset| root.transpose(offset as i32))
        .collect();
    pcs.sort();
    pcs.dedup();
    pcs
}
