// quiz-core/src/lib.rs

//! The core logic for the guitar ear-training trainer.
//! This crate is responsible for the pitch model, question generation,
//! the quiz session state machine and the statistics log. It is completely
//! headless and contains no GUI code; sound and storage are injected.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fretboard;
pub mod generator;
pub mod pitch;
pub mod playback;
pub mod preferences;
pub mod question;
pub mod random;
pub mod session;
pub mod statistics;
pub mod storage;

pub use catalog::{Catalog, ChordDefinition, IntervalDefinition};
pub use config::{QuizConfig, SessionConfig};
pub use error::{QuizError, Result};
pub use generator::QuestionGenerator;
pub use pitch::{Note, PitchClass};
pub use playback::{ChannelToneGenerator, Playback, SilentToneGenerator, ToneGenerator};
pub use question::{Answer, ChordLabel, Prompt, Question, QuizKind};
pub use random::RandomSource;
pub use session::{PendingAdvance, QuizSession, SessionPhase, SessionState, SubmitOutcome};
pub use statistics::{QuizStatisticRecord, StatisticsStore};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
