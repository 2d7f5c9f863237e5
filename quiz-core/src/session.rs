//! # Quiz Session Module
//!
//! The state machine behind one quiz run. It pulls questions from a
//! [`QuestionGenerator`], validates selections, keeps score and decides when
//! to move on.
//!
//! ## Phases
//! - `AwaitingAnswer`: the user may select and submit
//! - `Feedback`: the verdict is on screen and an advance is pending
//! - `Ended`: terminal, entered only through [`QuizSession::end`]
//!
//! ## Delayed advance
//! After a verdict the session hands out a [`PendingAdvance`] ticket. The host
//! waits `delay` and calls [`QuizSession::advance`] with the ticket's
//! generation. Every new question bumps the generation, so a ticket from an
//! earlier question is ignored instead of skipping a question.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::generator::QuestionGenerator;
use crate::playback::{Playback, ToneGenerator};
use crate::question::{Answer, Question, QuizKind};
use crate::random::RandomSource;
use crate::statistics::{QuizStatisticRecord, StatisticsStore};
use crate::storage::KeyValueStore;

pub const CORRECT_MESSAGE: &str = "Correct!";
pub const TRY_AGAIN_MESSAGE: &str = "Try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingAnswer,
    Feedback { correct: bool },
    Ended,
}

/// Everything the UI needs to render the current round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub score: u32,
    pub current_question: Option<Question>,
    pub attempts_on_current_question: u32,
    pub fails_total: u32,
    pub selected_answer: Option<Answer>,
    pub feedback_message: String,
}

/// A one-shot request to show the next question after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAdvance {
    pub generation: u64,
    pub delay: Duration,
}

/// Result of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to submit, or not accepting answers
    Ignored,
    Correct(PendingAdvance),
    /// Wrong, but the same question stays up
    TryAgain { attempts_left: u32 },
    /// Wrong with no attempts left; the answer was revealed
    Revealed(PendingAdvance),
}

pub struct QuizSession {
    generator: QuestionGenerator,
    config: SessionConfig,
    rng: Box<dyn RandomSource>,
    tone: Box<dyn ToneGenerator>,
    state: SessionState,
    phase: SessionPhase,
    generation: u64,
    pending: Option<PendingAdvance>,
    started_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Creates a session. Call [`QuizSession::start`] to show the first
    /// question.
    pub fn new(
        generator: QuestionGenerator,
        config: SessionConfig,
        rng: Box<dyn RandomSource>,
        tone: Box<dyn ToneGenerator>,
    ) -> Self {
        QuizSession {
            generator,
            config,
            rng,
            tone,
            state: SessionState::default(),
            phase: SessionPhase::AwaitingAnswer,
            generation: 0,
            pending: None,
            started_at: None,
        }
    }

    pub fn kind(&self) -> QuizKind {
        self.generator.kind()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.state.current_question.as_ref()
    }

    /// Identifies the question on screen.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_advance(&self) -> Option<PendingAdvance> {
        self.pending
    }

    /// When the first question was shown, `None` before the first
    /// successful [`QuizSession::start`].
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Access to the generator, e.g. to apply a new note pool. Takes effect
    /// from the next question.
    pub fn generator_mut(&mut self) -> &mut QuestionGenerator {
        &mut self.generator
    }

    /// Shows a new question and cancels any pending advance.
    ///
    /// # Errors
    /// * Propagates generator failures; the session state is left untouched
    pub fn start(&mut self) -> Result<()> {
        if self.phase == SessionPhase::Ended {
            debug!("session ended, not starting a question");
            return Ok(());
        }
        let question = self.generator.generate(self.rng.as_mut())?;

        self.generation += 1;
        self.started_at.get_or_insert_with(Utc::now);
        self.pending = None;
        self.phase = SessionPhase::AwaitingAnswer;
        self.state.attempts_on_current_question = 0;
        self.state.selected_answer = None;
        self.state.feedback_message.clear();

        if let Some(audio) = question.prompt_audio() {
            self.play(&audio);
        }
        debug!(generation = self.generation, kind = %self.kind(), "question started");
        self.state.current_question = Some(question);
        Ok(())
    }

    /// Records a selection and previews it.
    ///
    /// Kinds configured with `submit_on_select` validate immediately and
    /// return the outcome; otherwise returns `None`. Ignored outside
    /// `AwaitingAnswer`.
    pub fn select_answer(&mut self, candidate: Answer) -> Option<SubmitOutcome> {
        if self.phase != SessionPhase::AwaitingAnswer {
            debug!(phase = ?self.phase, "ignoring selection");
            return None;
        }
        let Some(question) = &self.state.current_question else {
            debug!("ignoring selection before the first question");
            return None;
        };
        if let Some(audio) = question.preview_audio(&candidate) {
            self.play(&audio);
        }
        self.state.selected_answer = Some(candidate);

        if self.config.submit_on_select {
            Some(self.submit_answer())
        } else {
            None
        }
    }

    /// Selects the option at `index` of the current question.
    pub fn select_option(&mut self, index: usize) -> Option<SubmitOutcome> {
        let candidate = self.current_question()?.options().get(index)?.clone();
        self.select_answer(candidate)
    }

    /// Validates the selection against the current question.
    ///
    /// Without a selection this is a no-op returning
    /// [`SubmitOutcome::Ignored`].
    pub fn submit_answer(&mut self) -> SubmitOutcome {
        if self.phase != SessionPhase::AwaitingAnswer {
            return SubmitOutcome::Ignored;
        }
        let correct = match (&self.state.current_question, &self.state.selected_answer) {
            (Some(question), Some(selected)) => question.is_correct(selected),
            _ => return SubmitOutcome::Ignored,
        };

        if correct {
            self.state.score += 1;
            self.state.feedback_message = CORRECT_MESSAGE.to_string();
            self.phase = SessionPhase::Feedback { correct: true };
            return SubmitOutcome::Correct(self.schedule_advance());
        }

        self.state.attempts_on_current_question += 1;
        self.state.fails_total += 1;
        let attempts = self.state.attempts_on_current_question;
        if attempts < self.config.max_attempts {
            self.state.feedback_message = TRY_AGAIN_MESSAGE.to_string();
            self.state.selected_answer = None;
            return SubmitOutcome::TryAgain {
                attempts_left: self.config.max_attempts - attempts,
            };
        }

        self.state.feedback_message = self
            .state
            .current_question
            .as_ref()
            .map(Question::reveal_message)
            .unwrap_or_default();
        self.phase = SessionPhase::Feedback { correct: false };
        SubmitOutcome::Revealed(self.schedule_advance())
    }

    /// Fires a pending advance. Returns `false` for a stale or unknown
    /// ticket, which is then ignored.
    pub fn advance(&mut self, generation: u64) -> Result<bool> {
        let due = matches!(
            (self.pending, self.phase),
            (Some(p), SessionPhase::Feedback { .. }) if p.generation == generation
        );
        if !due {
            debug!(
                ticket = generation,
                current = self.generation,
                "ignoring stale advance"
            );
            return Ok(false);
        }
        self.start()?;
        Ok(true)
    }

    /// Plays the current prompt again.
    pub fn replay_prompt(&mut self) {
        if let Some(audio) = self.current_question().and_then(Question::prompt_audio) {
            self.play(&audio);
        }
    }

    pub fn play_reference_tone(&mut self) {
        self.play(&Playback::reference_tone());
    }

    /// Ends the session now and records the result.
    pub fn end<S: KeyValueStore>(
        &mut self,
        stats: &mut StatisticsStore<S>,
    ) -> Option<QuizStatisticRecord> {
        self.end_at(Utc::now(), stats)
    }

    /// Ends the session as of `now`. Returns `None` if it had already ended.
    /// A session that never showed a question records zero seconds.
    pub fn end_at<S: KeyValueStore>(
        &mut self,
        now: DateTime<Utc>,
        stats: &mut StatisticsStore<S>,
    ) -> Option<QuizStatisticRecord> {
        if self.phase == SessionPhase::Ended {
            return None;
        }
        self.phase = SessionPhase::Ended;
        self.pending = None;
        self.generation += 1;

        let elapsed = self.started_at.map_or(0.0, |started| {
            (now - started).num_milliseconds().max(0) as f64 / 1000.0
        });
        let record =
            QuizStatisticRecord::new(self.kind().quiz_name(), self.state.score, elapsed, now);
        info!(
            quiz = %record.quiz_name,
            score = record.score,
            fails = self.state.fails_total,
            "session ended"
        );
        stats.append(record.clone());
        Some(record)
    }

    fn schedule_advance(&mut self) -> PendingAdvance {
        let advance = PendingAdvance {
            generation: self.generation,
            delay: self.config.feedback_delay(),
        };
        self.pending = Some(advance);
        advance
    }

    fn play(&mut self, audio: &Playback) {
        self.tone.play(&audio.notes, audio.duration_seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::playback::{ChannelToneGenerator, SilentToneGenerator};
    use crate::storage::MemoryStore;
    use crossbeam_channel::Receiver;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn session(kind: QuizKind, seed: u64) -> QuizSession {
        QuizSession::new(
            QuestionGenerator::new(kind, Catalog::standard()),
            SessionConfig::for_kind(kind),
            Box::new(Pcg32::seed_from_u64(seed)),
            Box::new(SilentToneGenerator),
        )
    }

    fn listening_session(kind: QuizKind) -> (QuizSession, Receiver<Playback>) {
        let (tone, receiver) = ChannelToneGenerator::new();
        let session = QuizSession::new(
            QuestionGenerator::new(kind, Catalog::standard()),
            SessionConfig::for_kind(kind),
            Box::new(Pcg32::seed_from_u64(5)),
            Box::new(tone),
        );
        (session, receiver)
    }

    fn wrong_indices(session: &QuizSession) -> Vec<usize> {
        let question = session.current_question().unwrap();
        (0..question.options().len())
            .filter(|&i| i != question.correct_index())
            .collect()
    }

    #[test]
    fn correct_answer_scores_and_schedules() {
        let mut session = session(QuizKind::Interval, 1);
        session.start().unwrap();
        let correct = session.current_question().unwrap().correct_index();
        assert_eq!(session.select_option(correct), None);

        let outcome = session.submit_answer();
        let expected = PendingAdvance {
            generation: session.generation(),
            delay: Duration::from_millis(1500),
        };
        assert_eq!(outcome, SubmitOutcome::Correct(expected));
        assert_eq!(session.state().score, 1);
        assert_eq!(session.state().feedback_message, "Correct!");
        assert_eq!(session.phase(), SessionPhase::Feedback { correct: true });
        assert_eq!(session.pending_advance(), Some(expected));
    }

    #[test]
    fn advance_moves_on_once() {
        let mut session = session(QuizKind::ChordByName, 2);
        session.start().unwrap();
        let correct = session.current_question().unwrap().correct_index();
        session.select_option(correct);
        let SubmitOutcome::Correct(ticket) = session.submit_answer() else {
            panic!("expected a correct verdict");
        };

        assert!(session.advance(ticket.generation).unwrap());
        assert_eq!(session.phase(), SessionPhase::AwaitingAnswer);
        assert_eq!(session.generation(), ticket.generation + 1);
        assert_eq!(session.state().selected_answer, None);
        assert_eq!(session.state().feedback_message, "");
        assert_eq!(session.pending_advance(), None);

        // The same timer firing twice does nothing.
        assert!(!session.advance(ticket.generation).unwrap());
        assert_eq!(session.generation(), ticket.generation + 1);
    }

    #[test]
    fn restarting_cancels_a_pending_advance() {
        let mut session = session(QuizKind::Interval, 3);
        session.start().unwrap();
        let wrong = wrong_indices(&session)[0];
        session.select_option(wrong);
        let SubmitOutcome::Revealed(ticket) = session.submit_answer() else {
            panic!("interval quiz allows one attempt");
        };
        session.start().unwrap();
        assert!(!session.advance(ticket.generation).unwrap());
        assert_eq!(session.phase(), SessionPhase::AwaitingAnswer);
    }

    #[test]
    fn wrong_answer_reveals_after_single_attempt() {
        let mut session = session(QuizKind::Interval, 4);
        session.start().unwrap();
        let question = session.current_question().unwrap().clone();
        let wrong = wrong_indices(&session)[1];
        session.select_option(wrong);
        assert!(matches!(session.submit_answer(), SubmitOutcome::Revealed(_)));
        assert_eq!(session.state().feedback_message, question.reveal_message());
        assert_eq!(session.state().fails_total, 1);
        assert_eq!(session.state().score, 0);
        assert_eq!(session.phase(), SessionPhase::Feedback { correct: false });
    }

    #[test]
    fn note_quiz_allows_a_second_try() {
        let mut session = session(QuizKind::NoteIdentification, 6);
        session.start().unwrap();
        let question = session.current_question().unwrap().clone();
        let wrong = wrong_indices(&session);

        let first = session.select_option(wrong[0]);
        assert_eq!(first, Some(SubmitOutcome::TryAgain { attempts_left: 1 }));
        assert_eq!(session.state().feedback_message, "Try again");
        assert_eq!(session.state().selected_answer, None);
        assert_eq!(session.current_question(), Some(&question));
        assert_eq!(session.phase(), SessionPhase::AwaitingAnswer);
        assert_eq!(session.pending_advance(), None);

        let second = session.select_option(wrong[1]);
        assert!(matches!(second, Some(SubmitOutcome::Revealed(_))));
        let correct = question.correct_answer().to_string();
        assert_eq!(
            session.state().feedback_message,
            format!("Incorrect. The correct note was {correct}.")
        );
        assert_eq!(session.state().fails_total, 2);
        assert!(session.pending_advance().is_some());
    }

    #[test]
    fn empty_submit_is_ignored() {
        let mut session = session(QuizKind::ChordByNotes, 7);
        assert_eq!(session.submit_answer(), SubmitOutcome::Ignored);
        session.start().unwrap();
        let before = session.state().clone();
        assert_eq!(session.submit_answer(), SubmitOutcome::Ignored);
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn selection_ignored_during_feedback() {
        let mut session = session(QuizKind::ChordByNotes, 8);
        session.start().unwrap();
        let correct = session.current_question().unwrap().correct_index();
        session.select_option(correct);
        session.submit_answer();
        let selected = session.state().selected_answer.clone();
        let wrong = wrong_indices(&session)[0];
        assert_eq!(session.select_option(wrong), None);
        assert_eq!(session.state().selected_answer, selected);
        assert_eq!(session.submit_answer(), SubmitOutcome::Ignored);
        assert_eq!(session.state().score, 1);
    }

    #[test]
    fn chord_notes_match_in_any_order() {
        let mut session = session(QuizKind::ChordByNotes, 9);
        session.start().unwrap();
        let Answer::PitchSet(mut pcs) = session.current_question().unwrap().correct_answer().clone()
        else {
            panic!("chord quiz answers are pitch sets");
        };
        pcs.reverse();
        session.select_answer(Answer::PitchSet(pcs));
        assert!(matches!(session.submit_answer(), SubmitOutcome::Correct(_)));
    }

    #[test]
    fn note_quiz_plays_prompt_and_preview() {
        let (mut session, receiver) = listening_session(QuizKind::NoteIdentification);
        session.start().unwrap();
        let question = session.current_question().unwrap().clone();
        let prompt = receiver.try_recv().unwrap();
        assert_eq!(prompt, question.prompt_audio().unwrap());
        assert_eq!(prompt.duration_seconds, 0.7);

        session.select_option(question.correct_index());
        let preview = receiver.try_recv().unwrap();
        assert_eq!(preview.notes, vec![match question.correct_answer() {
            Answer::Note(note) => note.clone(),
            other => panic!("unexpected answer {other:?}"),
        }]);

        session.play_reference_tone();
        assert_eq!(receiver.try_recv().unwrap(), Playback::reference_tone());
    }

    #[test]
    fn interval_quiz_is_silent_until_selection() {
        let (mut session, receiver) = listening_session(QuizKind::Interval);
        session.start().unwrap();
        assert!(receiver.try_recv().is_err());
        session.replay_prompt();
        assert!(receiver.try_recv().is_err());
        session.select_option(0);
        assert_eq!(receiver.try_recv().unwrap().notes.len(), 2);
    }

    #[test]
    fn ending_records_statistics_once() {
        let mut stats = StatisticsStore::new(MemoryStore::new());
        let mut session = session(QuizKind::ChordByName, 10);
        session.start().unwrap();
        let correct = session.current_question().unwrap().correct_index();
        session.select_option(correct);
        let SubmitOutcome::Correct(ticket) = session.submit_answer() else {
            panic!("expected a correct verdict");
        };

        let now = session.started_at().unwrap() + chrono::Duration::seconds(42);
        let record = session.end_at(now, &mut stats).unwrap();
        assert_eq!(record.quiz_name, "chord-identification");
        assert_eq!(record.score, 1);
        assert_eq!(record.time_taken_in_seconds, 42.0);
        assert_eq!(stats.all_records(), vec![record]);

        assert_eq!(session.phase(), SessionPhase::Ended);
        assert!(!session.advance(ticket.generation).unwrap());
        assert_eq!(session.select_option(0), None);
        session.start().unwrap();
        assert_eq!(session.phase(), SessionPhase::Ended);
        assert_eq!(session.end_at(now, &mut stats), None);
        assert_eq!(stats.all_records().len(), 1);
    }

    #[test]
    fn clock_starts_with_the_first_question() {
        let mut stats = StatisticsStore::new(MemoryStore::new());
        let mut session = session(QuizKind::Interval, 12);
        assert_eq!(session.started_at(), None);

        let before = Utc::now();
        session.start().unwrap();
        let started = session.started_at().unwrap();
        assert!(started >= before);

        session.select_option(0);
        let ticket = session.submit_answer();
        let generation = match ticket {
            SubmitOutcome::Correct(t) | SubmitOutcome::Revealed(t) => t.generation,
            other => panic!("unexpected outcome {other:?}"),
        };
        session.advance(generation).unwrap();
        assert_eq!(session.started_at(), Some(started));

        let record = session
            .end_at(started + chrono::Duration::seconds(5), &mut stats)
            .unwrap();
        assert_eq!(record.time_taken_in_seconds, 5.0);
    }

    #[test]
    fn ending_before_any_question_records_zero_seconds() {
        let mut stats = StatisticsStore::new(MemoryStore::new());
        let mut session = session(QuizKind::NoteIdentification, 13);
        let record = session.end(&mut stats).unwrap();
        assert_eq!(record.time_taken_in_seconds, 0.0);
        assert_eq!(record.score, 0);
    }
}
