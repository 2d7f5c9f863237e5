//! # Statistics Module
//!
//! Append-only log of finished quiz sessions, kept as a JSON array under a
//! single key of the injected [`KeyValueStore`].
//!
//! ## Features
//! - Append, list, filter by quiz name, clear
//! - Newest-first view ordered by timestamp
//! - Per-quiz summaries (sessions, best and average score, total time)
//! - Unreadable entries are skipped on read and left in place on append
//! - Non-finite durations are stored as zero

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{QuizError, Result};
use crate::storage::KeyValueStore;

/// Storage key holding the JSON-encoded log.
pub const STATISTICS_KEY: &str = "quiz-statistics";

/// Where an undecodable log is moved before a fresh one is started.
pub const STATISTICS_BACKUP_KEY: &str = "quiz-statistics.corrupt";

/// One finished session. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStatisticRecord {
    pub quiz_name: String,
    pub score: u32,
    pub time_taken_in_seconds: f64,
    /// ISO-8601 / RFC 3339
    pub timestamp: String,
}

impl QuizStatisticRecord {
    pub fn new(quiz_name: &str, score: u32, time_taken_in_seconds: f64, at: DateTime<Utc>) -> Self {
        QuizStatisticRecord {
            quiz_name: quiz_name.to_string(),
            score,
            time_taken_in_seconds: finite_seconds(time_taken_in_seconds),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// The timestamp as a date, `None` if it does not parse.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Zero for NaN, infinite or negative durations, which JSON cannot carry.
fn finite_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() { seconds.max(0.0) } else { 0.0 }
}

/// Aggregate over every record of one quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSummary {
    pub quiz_name: String,
    pub sessions: usize,
    pub total_score: u64,
    pub best_score: Option<u32>,
    pub average_score: f64,
    pub total_time_in_seconds: f64,
}

/// The statistics log on top of a key-value store.
#[derive(Debug)]
pub struct StatisticsStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StatisticsStore<S> {
    pub fn new(store: S) -> Self {
        StatisticsStore { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// The stored log as raw JSON entries.
    fn entries(&self) -> Result<Vec<Value>> {
        match self.store.get(STATISTICS_KEY) {
            None => Ok(Vec::new()),
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| QuizError::MalformedStatistics(e.to_string())),
        }
    }

    /// Decodes the log, reporting corruption.
    ///
    /// # Errors
    /// * [`QuizError::MalformedStatistics`] if the stored value is not a JSON
    ///   array, or any entry is not a record
    pub fn try_all_records(&self) -> Result<Vec<QuizStatisticRecord>> {
        self.entries()?
            .into_iter()
            .map(|entry| {
                serde_json::from_value(entry)
                    .map_err(|e| QuizError::MalformedStatistics(e.to_string()))
            })
            .collect()
    }

    /// Every readable record in insertion order. Entries that do not decode
    /// are skipped; a log that is not an array reads as empty.
    pub fn all_records(&self) -> Vec<QuizStatisticRecord> {
        let entries = self.entries().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable statistics log");
            Vec::new()
        });
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, error = %e, "skipping unreadable statistics entry");
                    None
                }
            })
            .collect()
    }

    /// Appends a record.
    ///
    /// Existing entries are kept as stored, readable or not. A log that is
    /// not a JSON array is moved to [`STATISTICS_BACKUP_KEY`] and a new log
    /// is started.
    pub fn append(&mut self, mut record: QuizStatisticRecord) {
        record.time_taken_in_seconds = finite_seconds(record.time_taken_in_seconds);
        let mut entries = match self.entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    error = %e,
                    backup = STATISTICS_BACKUP_KEY,
                    "moving unreadable statistics log aside"
                );
                if let Some(raw) = self.store.get(STATISTICS_KEY) {
                    self.store.set(STATISTICS_BACKUP_KEY, raw);
                }
                Vec::new()
            }
        };
        info!(
            quiz = %record.quiz_name,
            score = record.score,
            seconds = record.time_taken_in_seconds,
            "recording quiz result"
        );
        let encoded = serde_json::to_value(&record).and_then(|entry| {
            entries.push(entry);
            serde_json::to_string(&entries)
        });
        match encoded {
            Ok(json) => self.store.set(STATISTICS_KEY, json),
            Err(e) => warn!(error = %e, "failed to encode statistics log"),
        }
    }

    pub fn records_for_quiz(&self, quiz_name: &str) -> Vec<QuizStatisticRecord> {
        self.all_records()
            .into_iter()
            .filter(|r| r.quiz_name == quiz_name)
            .collect()
    }

    /// Records sorted by timestamp, newest first. Records whose timestamp
    /// does not parse go last, in insertion order.
    pub fn records_newest_first(&self) -> Vec<QuizStatisticRecord> {
        let mut records = self.all_records();
        records.sort_by(|a, b| b.recorded_at().cmp(&a.recorded_at()));
        records
    }

    pub fn summary_for_quiz(&self, quiz_name: &str) -> QuizSummary {
        let records = self.records_for_quiz(quiz_name);
        let total_score: u64 = records.iter().map(|r| r.score as u64).sum();
        let average_score = if records.is_empty() {
            0.0
        } else {
            total_score as f64 / records.len() as f64
        };
        QuizSummary {
            quiz_name: quiz_name.to_string(),
            sessions: records.len(),
            total_score,
            best_score: records.iter().map(|r| r.score).max(),
            average_score,
            total_time_in_seconds: records.iter().map(|r| r.time_taken_in_seconds).sum(),
        }
    }

    /// Removes every record. Irreversible.
    pub fn clear(&mut self) {
        info!("clearing quiz statistics");
        self.store.remove(STATISTICS_KEY);
        self.store.remove(STATISTICS_BACKUP_KEY);
    }
}
