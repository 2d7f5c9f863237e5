//! # Pitch Class Module
//!
//! This module provides the equal-tempered pitch model used by every quiz:
//! the 12 pitch classes, modulo-12 arithmetic between them, and sounding
//! notes that carry an octave.
//!
//! ## Features
//! - Canonical sharp spellings ("C", "C#", ... "B"), one name per pitch class
//! - Transposition by any signed number of semitones
//! - Name to pitch class lookups that reject non-canonical spellings
//! - Sounding notes with octave, MIDI numbering and full names ("C#3")

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{QuizError, Result};

/// Canonical names, indexed by pitch class value.
pub const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Static map for name to pitch class lookups.
static NAME_MAP: Lazy<BTreeMap<&'static str, u8>> = Lazy::new(|| {
    PITCH_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, i as u8))
        .collect()
});

/// One of the 12 equal-tempered pitch classes, independent of octave.
///
/// The wrapped value is always in `0..12`. Serialized as its canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);
    pub const D: PitchClass = PitchClass(2);
    pub const E: PitchClass = PitchClass(4);
    pub const G: PitchClass = PitchClass(7);
    pub const A: PitchClass = PitchClass(9);
    pub const B: PitchClass = PitchClass(11);

    /// Builds a pitch class from any integer, reducing it modulo 12.
    pub fn new(value: i32) -> Self {
        PitchClass(value.rem_euclid(12) as u8)
    }

    /// All 12 pitch classes in ascending order.
    pub fn all() -> impl Iterator<Item = PitchClass> {
        (0..12).map(PitchClass)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        PITCH_NAMES[self.0 as usize]
    }

    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass::new(self.0 as i32 + semitones)
    }

    /// Upward distance in semitones from `self` to `other`, in `0..12`.
    pub fn semitones_to(self, other: PitchClass) -> u8 {
        (other.0 + 12 - self.0) % 12
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for PitchClass {
    type Error = QuizError;

    fn try_from(name: String) -> Result<Self> {
        pitch_class_of(&name)
    }
}

impl From<PitchClass> for String {
    fn from(pc: PitchClass) -> String {
        pc.name().to_string()
    }
}

/// Returns `(base + semitones) mod 12`.
pub fn transpose(base: PitchClass, semitones: i32) -> PitchClass {
    base.transpose(semitones)
}

/// Returns the canonical name of a pitch class.
pub fn name_of(pc: PitchClass) -> &'static str {
    pc.name()
}

/// Looks up a pitch class by its canonical name.
///
/// Only the 12 sharp spellings are accepted; flats ("Bb") and lowercase
/// names fail with [`QuizError::UnknownPitchName`].
pub fn pitch_class_of(name: &str) -> Result<PitchClass> {
    NAME_MAP
        .get(name)
        .map(|&v| PitchClass(v))
        .ok_or_else(|| QuizError::UnknownPitchName(name.to_string()))
}

/// A sounding pitch: a pitch class in a specific octave.
///
/// Middle C is `C4` (MIDI 60). Serialized as its full name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Note {
    pitch_class: PitchClass,
    octave: i8,
    full_name: String,
}

impl Note {
    pub fn new(pitch_class: PitchClass, octave: i8) -> Self {
        Note {
            pitch_class,
            octave,
            full_name: format!("{}{}", pitch_class.name(), octave),
        }
    }

    /// Builds a note from a MIDI note number.
    pub fn from_midi(midi: i32) -> Self {
        Note::new(PitchClass::new(midi), (midi.div_euclid(12) - 1) as i8)
    }

    /// Parses a full note name such as "E2" or "C#4".
    pub fn parse(full_name: &str) -> Result<Self> {
        let split = full_name
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(|| QuizError::UnknownPitchName(full_name.to_string()))?;
        let (name, octave) = full_name.split_at(split);
        let pitch_class = pitch_class_of(name)
            .map_err(|_| QuizError::UnknownPitchName(full_name.to_string()))?;
        let octave = octave
            .parse::<i8>()
            .map_err(|_| QuizError::UnknownPitchName(full_name.to_string()))?;
        Ok(Note::new(pitch_class, octave))
    }

    pub fn pitch_class(&self) -> PitchClass {
        self.pitch_class
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn midi(&self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.pitch_class.value() as i32
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.midi().cmp(&other.midi())
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

impl TryFrom<String> for Note {
    type Error = QuizError;

    fn try_from(full_name: String) -> Result<Self> {
        Note::parse(&full_name)
    }
}

impl From<Note> for String {
    fn from(note: Note) -> String {
        note.full_name
    }
}

/// Every note from `low` to `high`, both inclusive, in ascending order.
pub fn notes_between(low: &Note, high: &Note) -> Vec<Note> {
    (low.midi()..=high.midi()).map(Note::from_midi).collect()
}
