//! Session configuration.
//!
//! Every field has a per-kind default, so a config file only names what it
//! changes:
//!
//! ```json
//! { "note-identification": { "max_attempts": 3 } }
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::question::QuizKind;

/// How long feedback stays on screen before the next question.
pub const DEFAULT_FEEDBACK_DELAY_MS: u64 = 1500;

/// Per-session policy knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Wrong submissions allowed before the answer is revealed
    pub max_attempts: u32,
    pub feedback_delay_ms: u64,
    /// Validate as soon as an option is selected
    pub submit_on_select: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_attempts: 1,
            feedback_delay_ms: DEFAULT_FEEDBACK_DELAY_MS,
            submit_on_select: false,
        }
    }
}

impl SessionConfig {
    /// Defaults for a quiz kind: note identification validates on selection
    /// and allows a second try.
    pub fn for_kind(kind: QuizKind) -> Self {
        match kind {
            QuizKind::NoteIdentification => SessionConfig {
                max_attempts: 2,
                submit_on_select: true,
                ..SessionConfig::default()
            },
            QuizKind::Interval | QuizKind::ChordByNotes | QuizKind::ChordByName => {
                SessionConfig::default()
            }
        }
    }

    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }
}

/// Fields a config file may override for one quiz kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionOverrides {
    pub max_attempts: Option<u32>,
    pub feedback_delay_ms: Option<u64>,
    pub submit_on_select: Option<bool>,
}

impl SessionOverrides {
    fn apply(&self, mut config: SessionConfig) -> SessionConfig {
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(delay) = self.feedback_delay_ms {
            config.feedback_delay_ms = delay;
        }
        if let Some(submit_on_select) = self.submit_on_select {
            config.submit_on_select = submit_on_select;
        }
        config
    }
}

/// Session settings for every quiz kind, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuizConfig {
    pub interval: SessionOverrides,
    #[serde(rename = "chord")]
    pub chord_by_notes: SessionOverrides,
    #[serde(rename = "chord-identification")]
    pub chord_by_name: SessionOverrides,
    #[serde(rename = "note-identification")]
    pub note_identification: SessionOverrides,
}

impl QuizConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Kind defaults with this config's overrides applied.
    pub fn session(&self, kind: QuizKind) -> SessionConfig {
        let overrides = match kind {
            QuizKind::Interval => &self.interval,
            QuizKind::ChordByNotes => &self.chord_by_notes,
            QuizKind::ChordByName => &self.chord_by_name,
            QuizKind::NoteIdentification => &self.note_identification,
        };
        overrides.apply(SessionConfig::for_kind(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_defaults() {
        assert_eq!(SessionConfig::for_kind(QuizKind::Interval).max_attempts, 1);
        let note = SessionConfig::for_kind(QuizKind::NoteIdentification);
        assert_eq!(note.max_attempts, 2);
        assert!(note.submit_on_select);
        assert_eq!(note.feedback_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn partial_json_keeps_kind_defaults() {
        let config =
            QuizConfig::from_json(r#"{ "note-identification": { "max_attempts": 3 } }"#).unwrap();
        let note = config.session(QuizKind::NoteIdentification);
        assert_eq!(note.max_attempts, 3);
        assert!(note.submit_on_select);
        assert_eq!(config.session(QuizKind::Interval), SessionConfig::default());
        assert_eq!(
            config.session(QuizKind::ChordByName).feedback_delay_ms,
            DEFAULT_FEEDBACK_DELAY_MS
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(QuizConfig::from_json(r#"{ "rhythm": {} }"#).is_err());
        assert!(QuizConfig::from_json(r#"{ "interval": { "retries": 2 } }"#).is_err());
    }

    #[test]
    fn empty_json_is_default() {
        let config = QuizConfig::from_json("{}").unwrap();
        for kind in QuizKind::ALL {
            assert_eq!(config.session(kind), SessionConfig::for_kind(kind));
        }
    }
}
