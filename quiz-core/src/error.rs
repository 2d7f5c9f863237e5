//! Error types for the quiz core

use thiserror::Error;

/// Result type for quiz core operations
pub type Result<T> = std::result::Result<T, QuizError>;

/// Faults raised inside the quiz core.
///
/// None of these are shown to the user directly. Callers either recover
/// locally (corrupt storage falls back to defaults, small pools are widened)
/// or treat them as programmer errors in the injected catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuizError {
    /// A note name outside the 12 canonical sharp spellings
    #[error("Unknown pitch name: {0}")]
    UnknownPitchName(String),

    /// Catalog data that violates its invariants
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Stored note-quiz preferences could not be decoded
    #[error("Malformed persisted preferences: {0}")]
    MalformedPersistedPreferences(String),

    /// Stored statistics log could not be decoded
    #[error("Malformed statistics log: {0}")]
    MalformedStatistics(String),

    /// Fewer distinct answers exist than a question needs, even after widening
    #[error("Insufficient distractor pool for {kind}: {available} distinct answers, {required} required")]
    InsufficientDistractorPool {
        kind: &'static str,
        available: usize,
        required: usize,
    },
}
