//! # Question Generator Module
//!
//! Builds one [`Question`] per round for any [`QuizKind`]. Every kind follows
//! the same pattern:
//!
//! 1. Draw the ground truth from the pool
//! 2. Seed the options with the correct answer
//! 3. Add distractors, each one either a perturbation of the correct answer
//!    or a fresh random draw, skipping anything already present
//! 4. Shuffle and remember where the correct answer landed
//!
//! Random draws are capped at [`MAX_CANDIDATE_DRAWS`]. Past the cap the
//! generator enumerates the whole catalog answer space instead, so a small
//! pool can never loop forever.

use tracing::{debug, warn};

use crate::catalog::{Catalog, ChordDefinition, chord_pitch_classes};
use crate::error::{QuizError, Result};
use crate::pitch::{Note, PitchClass};
use crate::question::{Answer, ChordLabel, Prompt, Question, QuizKind};
use crate::random::{RandomSource, choose, shuffle, shuffle_tracking};

/// Options shown per question, correct one included.
pub const OPTION_COUNT: usize = 4;

/// Smallest custom note pool the note quiz accepts. Smaller pools fall back
/// to every catalog note.
///
/// The preferences screen asks for "at least 5 notes" and the fallback
/// triggers below 5, so a pool of exactly 5 is used as is. Kept as observed;
/// may be an off-by-one in the product rule.
pub const MIN_NOTE_POOL: usize = 5;

/// Random candidate draws before switching to enumeration.
pub const MAX_CANDIDATE_DRAWS: usize = 64;

/// Produces questions of one kind from an injected catalog.
#[derive(Debug, Clone)]
pub struct QuestionGenerator {
    kind: QuizKind,
    catalog: Catalog,
    note_pool: Vec<Note>,
}

impl QuestionGenerator {
    pub fn new(kind: QuizKind, catalog: Catalog) -> Self {
        QuestionGenerator {
            kind,
            catalog,
            note_pool: Vec::new(),
        }
    }

    /// Restricts note identification to `notes`.
    pub fn with_note_pool(mut self, notes: Vec<Note>) -> Self {
        self.set_note_pool(notes);
        self
    }

    pub fn set_note_pool(&mut self, notes: Vec<Note>) {
        self.note_pool = notes;
    }

    pub fn kind(&self) -> QuizKind {
        self.kind
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The notes note identification actually draws from.
    pub fn note_pool(&self) -> &[Note] {
        if self.note_pool.len() >= MIN_NOTE_POOL {
            &self.note_pool
        } else {
            self.catalog.notes()
        }
    }

    /// Generates a question with [`OPTION_COUNT`] distinct options.
    ///
    /// # Errors
    /// * [`QuizError::InsufficientDistractorPool`] if even the full catalog
    ///   holds fewer distinct answers than [`OPTION_COUNT`]
    pub fn generate(&self, rng: &mut dyn RandomSource) -> Result<Question> {
        if self.kind == QuizKind::NoteIdentification
            && !self.note_pool.is_empty()
            && self.note_pool.len() < MIN_NOTE_POOL
        {
            debug!(
                configured = self.note_pool.len(),
                "note pool too small, using every catalog note"
            );
        }

        let (prompt, correct) = self.draw_ground_truth(rng);
        let mut options = vec![correct.normalized()];
        options.extend(
            self.other_qualities(&correct, rng)
                .into_iter()
                .take(OPTION_COUNT - 1),
        );

        let mut draws = 0;
        while options.len() < OPTION_COUNT && draws < MAX_CANDIDATE_DRAWS {
            draws += 1;
            let candidate = if rng.chance() {
                self.perturb(&correct, rng)
                    .unwrap_or_else(|| self.fresh(rng))
            } else {
                self.fresh(rng)
            };
            let candidate = candidate.normalized();
            if !options.contains(&candidate) {
                options.push(candidate);
            }
        }

        if options.len() < OPTION_COUNT {
            warn!(
                kind = %self.kind,
                found = options.len(),
                "distractor draws exhausted, widening to the full catalog"
            );
            self.widen(&mut options, rng);
        }
        if options.len() < OPTION_COUNT {
            return Err(QuizError::InsufficientDistractorPool {
                kind: self.kind.quiz_name(),
                available: options.len(),
                required: OPTION_COUNT,
            });
        }

        let correct_index = shuffle_tracking(rng, &mut options, 0);
        debug!(kind = %self.kind, draws, correct = %correct, "generated question");
        Ok(Question::new(self.kind, prompt, options, correct_index))
    }

    fn draw_ground_truth(&self, rng: &mut dyn RandomSource) -> (Prompt, Answer) {
        match self.kind {
            QuizKind::Interval => {
                let interval = self.catalog.random_interval(rng).clone();
                let root = self.catalog.random_pitch_class(rng);
                let answer = Answer::Interval(interval.clone());
                (Prompt::Interval { root, interval }, answer)
            }
            QuizKind::ChordByNotes => {
                let root = self.catalog.random_pitch_class(rng);
                let chord = self.catalog.random_chord_definition(rng).clone();
                let answer = Answer::PitchSet(chord_pitch_classes(root, &chord));
                (Prompt::ChordByNotes { root, chord }, answer)
            }
            QuizKind::ChordByName => {
                let chord = self.catalog.random_chord_definition(rng).clone();
                let root = self.catalog.random_pitch_class(rng);
                let answer = Answer::Chord(label(root, &chord));
                (Prompt::ChordByName { root, chord }, answer)
            }
            QuizKind::NoteIdentification => {
                let pool = self.note_pool();
                let note = pool[rng.index(pool.len())].clone();
                (Prompt::Note(note.clone()), Answer::Note(note))
            }
        }
    }

    /// An unrelated random answer from the pool.
    fn fresh(&self, rng: &mut dyn RandomSource) -> Answer {
        match self.kind {
            QuizKind::Interval => Answer::Interval(self.catalog.random_interval(rng).clone()),
            QuizKind::ChordByNotes => {
                let root = self.catalog.random_pitch_class(rng);
                let chord = self.catalog.random_chord_definition(rng);
                Answer::PitchSet(chord_pitch_classes(root, chord))
            }
            QuizKind::ChordByName => {
                let root = self.catalog.random_pitch_class(rng);
                let chord = self.catalog.random_chord_definition(rng);
                Answer::Chord(label(root, chord))
            }
            QuizKind::NoteIdentification => {
                let pool = self.note_pool();
                Answer::Note(pool[rng.index(pool.len())].clone())
            }
        }
    }

    /// The other chord types on the root of a chord label, in random order.
    /// Empty for every other kind of answer.
    fn other_qualities(&self, correct: &Answer, rng: &mut dyn RandomSource) -> Vec<Answer> {
        let Answer::Chord(current) = correct else {
            return Vec::new();
        };
        let mut others: Vec<Answer> = self
            .catalog
            .chords()
            .iter()
            .filter(|c| c.type_name != current.type_name)
            .map(|c| Answer::Chord(label(current.root, c)))
            .collect();
        shuffle(rng, &mut others);
        others
    }

    /// The correct answer with one component changed, or `None` when no
    /// such neighbour exists.
    fn perturb(&self, correct: &Answer, rng: &mut dyn RandomSource) -> Option<Answer> {
        match correct {
            Answer::Interval(interval) => {
                let distance = if rng.chance() {
                    interval.semitone_distance.saturating_sub(1)
                } else {
                    interval.semitone_distance + 1
                };
                self.catalog
                    .interval_with_distance(distance)
                    .cloned()
                    .map(Answer::Interval)
            }
            Answer::PitchSet(pcs) => {
                if pcs.is_empty() {
                    return None;
                }
                let mut pcs = pcs.clone();
                let replaced = rng.index(pcs.len());
                let free: Vec<PitchClass> = PitchClass::all().filter(|pc| !pcs.contains(pc)).collect();
                pcs[replaced] = *choose(rng, &free)?;
                Some(Answer::PitchSet(pcs))
            }
            Answer::Chord(current) => {
                if rng.chance() {
                    let others: Vec<&ChordDefinition> = self
                        .catalog
                        .chords()
                        .iter()
                        .filter(|c| c.type_name != current.type_name)
                        .collect();
                    let other = choose(rng, &others)?;
                    Some(Answer::Chord(label(current.root, other)))
                } else {
                    let root = current.root.transpose(1 + rng.index(11) as i32);
                    Some(Answer::Chord(ChordLabel {
                        root,
                        type_name: current.type_name.clone(),
                    }))
                }
            }
            Answer::Note(note) => {
                let neighbours: Vec<&Note> = self
                    .note_pool()
                    .iter()
                    .filter(|n| {
                        *n != note
                            && (n.pitch_class() == note.pitch_class() || n.octave() == note.octave())
                    })
                    .collect();
                choose(rng, &neighbours).map(|n| Answer::Note((*n).clone()))
            }
        }
    }

    /// Every answer the full catalog can express for this kind.
    fn full_answer_space(&self) -> Vec<Answer> {
        match self.kind {
            QuizKind::Interval => self
                .catalog
                .intervals()
                .iter()
                .cloned()
                .map(Answer::Interval)
                .collect(),
            QuizKind::ChordByNotes => PitchClass::all()
                .flat_map(|root| {
                    self.catalog
                        .chords()
                        .iter()
                        .map(move |chord| Answer::PitchSet(chord_pitch_classes(root, chord)))
                })
                .collect(),
            QuizKind::ChordByName => PitchClass::all()
                .flat_map(|root| {
                    self.catalog
                        .chords()
                        .iter()
                        .map(move |chord| Answer::Chord(label(root, chord)))
                })
                .collect(),
            QuizKind::NoteIdentification => self
                .catalog
                .notes()
                .iter()
                .cloned()
                .map(Answer::Note)
                .collect(),
        }
    }

    /// Fills `options` from the remaining catalog answers in random order.
    fn widen(&self, options: &mut Vec<Answer>, rng: &mut dyn RandomSource) {
        let mut remaining: Vec<Answer> = Vec::new();
        for candidate in self.full_answer_space() {
            let candidate = candidate.normalized();
            if !options.contains(&candidate) && !remaining.contains(&candidate) {
                remaining.push(candidate);
            }
        }
        while options.len() < OPTION_COUNT && !remaining.is_empty() {
            let picked = rng.index(remaining.len());
            options.push(remaining.swap_remove(picked));
        }
    }
}

fn label(root: PitchClass, chord: &ChordDefinition) -> ChordLabel {
    ChordLabel {
        root,
        type_name: chord.type_name.clone(),
    }
}
