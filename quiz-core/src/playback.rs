//! # Playback Module
//!
//! The quiz core never synthesizes sound. It hands notes to a
//! [`ToneGenerator`] and moves on: playback is fire-and-forget and any
//! failure on the audio side is ignored.
//!
//! ## Features
//! - [`Playback`] requests: a set of notes and a duration in seconds
//! - [`ChannelToneGenerator`] for streaming requests to an audio thread
//! - [`SilentToneGenerator`] for headless sessions

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, trace};

use crate::pitch::{Note, PitchClass};

/// Default capacity of the request channel.
///
/// Requests beyond this are dropped rather than queued.
pub const REQUEST_QUEUE_SIZE: usize = 16;

/// Notes to sound together for a fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    pub notes: Vec<Note>,
    pub duration_seconds: f32,
}

impl Playback {
    pub fn new(notes: Vec<Note>, duration_seconds: f32) -> Self {
        Playback {
            notes,
            duration_seconds,
        }
    }

    /// The E4 reference tone offered by the note-identification quiz.
    pub fn reference_tone() -> Self {
        Playback::new(vec![Note::new(PitchClass::E, 4)], 0.7)
    }
}

/// The external sound source.
pub trait ToneGenerator {
    /// Starts sounding `notes` for `duration_seconds`. Must not block.
    fn play(&mut self, notes: &[Note], duration_seconds: f32);
}

/// Forwards play requests over a bounded channel.
///
/// The receiving end typically lives on an audio thread. A full or
/// disconnected channel drops the request silently.
pub struct ChannelToneGenerator {
    sender: Sender<Playback>,
}

impl ChannelToneGenerator {
    /// Creates a generator and the receiver the audio thread should drain.
    pub fn new() -> (Self, Receiver<Playback>) {
        Self::with_capacity(REQUEST_QUEUE_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> (Self, Receiver<Playback>) {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        (ChannelToneGenerator { sender }, receiver)
    }
}

impl ToneGenerator for ChannelToneGenerator {
    fn play(&mut self, notes: &[Note], duration_seconds: f32) {
        let request = Playback::new(notes.to_vec(), duration_seconds);
        match self.sender.try_send(request) {
            Ok(()) => trace!(count = notes.len(), duration_seconds, "queued playback"),
            Err(TrySendError::Full(_)) => debug!("playback queue full, dropping request"),
            Err(TrySendError::Disconnected(_)) => debug!("audio thread gone, dropping request"),
        }
    }
}

/// Discards every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentToneGenerator;

impl ToneGenerator for SilentToneGenerator {
    fn play(&mut self, _notes: &[Note], _duration_seconds: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn channel_forwards_requests() {
        let (mut tone, receiver) = ChannelToneGenerator::new();
        tone.play(&[Note::new(PitchClass::C, 4)], 0.5);
        let request = receiver.try_recv().unwrap();
        assert_eq!(request.notes[0].full_name(), "C4");
        assert_eq!(request.duration_seconds, 0.5);
    }

    #[test]
    fn full_or_closed_channel_is_ignored() {
        let (mut tone, receiver) = ChannelToneGenerator::with_capacity(1);
        tone.play(&[Note::new(PitchClass::C, 4)], 0.5);
        tone.play(&[Note::new(PitchClass::G, 4)], 0.5);
        assert_eq!(receiver.len(), 1);
        drop(receiver);
        tone.play(&[Note::new(PitchClass::A, 4)], 0.5);
    }

    #[test]
    fn reference_tone_is_e4() {
        let tone = Playback::reference_tone();
        assert_eq!(tone.notes, vec![Note::parse("E4").unwrap()]);
        assert_eq!(tone.duration_seconds, 0.7);
    }
}
