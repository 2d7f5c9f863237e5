//! Note-quiz preferences: which base notes the note-identification quiz
//! draws from.
//!
//! Stored under two keys of the injected [`KeyValueStore`]. Anything that
//! fails to decode falls back to the `advanced` mode with all 12 notes.

use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::{QuizError, Result};
use crate::pitch::{Note, PitchClass, pitch_class_of};
use crate::storage::KeyValueStore;

pub const MODE_KEY: &str = "noteQuiz_mode";
pub const BASE_NOTES_KEY: &str = "noteQuiz_baseNotes";

/// Fewest base notes a user may keep selected.
pub const MIN_BASE_NOTES: usize = 5;

/// A, C, D, E, G
pub const MINIMAL_SET: [PitchClass; 5] = [
    PitchClass::A,
    PitchClass::C,
    PitchClass::D,
    PitchClass::E,
    PitchClass::G,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteQuizMode {
    Minimal,
    Advanced,
    Custom,
}

impl NoteQuizMode {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteQuizMode::Minimal => "minimal",
            NoteQuizMode::Advanced => "advanced",
            NoteQuizMode::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "minimal" => Ok(NoteQuizMode::Minimal),
            "advanced" => Ok(NoteQuizMode::Advanced),
            "custom" => Ok(NoteQuizMode::Custom),
            other => Err(QuizError::MalformedPersistedPreferences(format!(
                "unknown mode '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteQuizPreferences {
    mode: NoteQuizMode,
    base_notes: Vec<PitchClass>,
}

impl Default for NoteQuizPreferences {
    fn default() -> Self {
        NoteQuizPreferences {
            mode: NoteQuizMode::Advanced,
            base_notes: PitchClass::all().collect(),
        }
    }
}

impl NoteQuizPreferences {
    pub fn mode(&self) -> NoteQuizMode {
        self.mode
    }

    pub fn base_notes(&self) -> &[PitchClass] {
        &self.base_notes
    }

    pub fn is_selected(&self, pc: PitchClass) -> bool {
        self.base_notes.contains(&pc)
    }

    /// Switches mode. `minimal` and `advanced` replace the selection,
    /// `custom` keeps it.
    pub fn set_mode(&mut self, mode: NoteQuizMode) {
        self.mode = mode;
        match mode {
            NoteQuizMode::Minimal => self.base_notes = MINIMAL_SET.to_vec(),
            NoteQuizMode::Advanced => self.base_notes = PitchClass::all().collect(),
            NoteQuizMode::Custom => {}
        }
    }

    /// Adds or removes a base note and switches to `custom`.
    ///
    /// Returns `false`, changing nothing, when removing the note would leave
    /// fewer than [`MIN_BASE_NOTES`].
    pub fn toggle_base_note(&mut self, pc: PitchClass) -> bool {
        if let Some(index) = self.base_notes.iter().position(|&n| n == pc) {
            if self.base_notes.len() <= MIN_BASE_NOTES {
                debug!(note = %pc, "refusing to drop below {} base notes", MIN_BASE_NOTES);
                return false;
            }
            self.base_notes.remove(index);
        } else {
            self.base_notes.push(pc);
        }
        self.mode = NoteQuizMode::Custom;
        true
    }

    /// Catalog notes whose pitch class is selected.
    pub fn selected_notes(&self, catalog: &Catalog) -> Vec<Note> {
        catalog
            .notes()
            .iter()
            .filter(|n| self.is_selected(n.pitch_class()))
            .cloned()
            .collect()
    }

    pub fn save(&self, store: &mut impl KeyValueStore) {
        store.set(MODE_KEY, self.mode.as_str().to_string());
        let names: Vec<&str> = self.base_notes.iter().map(|pc| pc.name()).collect();
        match serde_json::to_string(&names) {
            Ok(json) => store.set(BASE_NOTES_KEY, json),
            Err(e) => warn!(error = %e, "failed to encode base notes"),
        }
    }

    /// Loads stored preferences, repairing them when needed.
    ///
    /// Unknown note names are dropped. A corrupt entry, or fewer than
    /// [`MIN_BASE_NOTES`] usable notes, resets to `advanced` and writes the
    /// reset back.
    pub fn load(store: &mut impl KeyValueStore) -> Self {
        let mut prefs = NoteQuizPreferences {
            mode: NoteQuizMode::Advanced,
            base_notes: Vec::new(),
        };

        if let Some(mode) = store.get(MODE_KEY) {
            match NoteQuizMode::parse(&mode) {
                Ok(mode) => prefs.mode = mode,
                Err(e) => warn!(error = %e, "ignoring stored note quiz mode"),
            }
        }
        if let Some(json) = store.get(BASE_NOTES_KEY) {
            match parse_base_notes(&json) {
                Ok(notes) => prefs.base_notes = notes,
                Err(e) => warn!(error = %e, "ignoring stored base notes"),
            }
        }

        if prefs.base_notes.len() < MIN_BASE_NOTES {
            debug!(
                found = prefs.base_notes.len(),
                "too few base notes stored, resetting to advanced"
            );
            prefs.set_mode(NoteQuizMode::Advanced);
            prefs.save(store);
        }
        prefs
    }
}

/// Decodes a JSON array of note names, keeping the canonical ones.
fn parse_base_notes(json: &str) -> Result<Vec<PitchClass>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| QuizError::MalformedPersistedPreferences(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(QuizError::MalformedPersistedPreferences(
            "base notes are not an array".to_string(),
        ));
    };
    let mut notes = Vec::new();
    for pc in items
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|name| pitch_class_of(name).ok())
    {
        if !notes.contains(&pc) {
            notes.push(pc);
        }
    }
    Ok(notes)
}
