//! Speech sessions and the boundary to the external audio collaborator.
//!
//! Audio decoding and output live outside this crate. The engine only needs
//! to know *when the clip ends*, so the collaborator gets the sending half
//! of a one-shot channel and the session polls the receiving half each
//! tick. Timeline-only demo playback completes after a fixed duration
//! instead.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

use crate::timeline::RawSegment;

/// Events delivered by the audio collaborator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AudioEvent {
    /// Playback reached the end of the clip.
    Completed,
}

/// Collaborator-side endpoint. Consumed on use; it resolves exactly once.
#[derive(Debug)]
pub struct AudioNotifier {
    sender: Sender<AudioEvent>,
}

impl AudioNotifier {
    /// Signals that playback finished. Dropping the notifier without
    /// calling this has the same effect on the session.
    pub fn completed(self) {
        let _ = self.sender.send(AudioEvent::Completed);
    }
}

/// Engine-side endpoint for audio playback notifications.
#[derive(Debug)]
pub struct AudioHandle {
    events: Receiver<AudioEvent>,
}

/// Creates the notifier/handle pair for one playback.
pub fn audio_channel() -> (AudioNotifier, AudioHandle) {
    let (sender, events) = bounded(1);
    (AudioNotifier { sender }, AudioHandle { events })
}

#[derive(Debug)]
enum SpeechDriver {
    /// Real playback; completion arrives over the channel.
    Audio(AudioHandle),
    /// Timeline-only playback; completes after `duration` seconds.
    Demo { duration: f64 },
}

/// One utterance in flight: the audio-start reference plus the completion
/// source. Starting a new session replaces the old one wholesale.
#[derive(Debug)]
pub struct SpeechSession {
    driver: SpeechDriver,
    started_at: Option<f64>,
}

impl SpeechSession {
    pub fn live(handle: AudioHandle) -> Self {
        Self {
            driver: SpeechDriver::Audio(handle),
            started_at: None,
        }
    }

    pub fn demo(duration: f64) -> Self {
        Self {
            driver: SpeechDriver::Demo { duration },
            started_at: None,
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self.driver, SpeechDriver::Demo { .. })
    }

    /// Stamps the audio-start reference on the first speaking tick.
    pub(crate) fn ensure_started(&mut self, now: f64) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Audio-clock-relative time, clamped to 0 before the start stamp.
    pub fn time(&self, now: f64) -> f64 {
        match self.started_at {
            Some(started) => (now - started).max(0.0),
            None => 0.0,
        }
    }

    /// Whether the driving audio reports completion at engine time `now`.
    pub(crate) fn finished(&mut self, now: f64) -> bool {
        match &self.driver {
            SpeechDriver::Audio(handle) => match handle.events.try_recv() {
                Ok(AudioEvent::Completed) => true,
                // A dropped notifier means the collaborator went away;
                // treat the clip as over rather than speaking forever.
                Err(TryRecvError::Disconnected) => true,
                Err(TryRecvError::Empty) => false,
            },
            SpeechDriver::Demo { duration } => self.time(now) >= *duration,
        }
    }
}

/// The built-in demo utterance: a 1.5 s mouth exercise over the stock
/// viseme set, playable without any audio.
pub fn demo_timeline() -> Vec<RawSegment> {
    [
        (0.00, 0.15, "MBP"),
        (0.15, 0.35, "AA"),
        (0.35, 0.55, "E"),
        (0.55, 0.75, "O"),
        (0.75, 0.95, "U"),
        (0.95, 1.20, "AA"),
        (1.20, 1.50, "REST"),
    ]
    .into_iter()
    .map(|(start, end, viseme)| RawSegment {
        start,
        end,
        viseme: viseme.to_string(),
    })
    .collect()
}

/// Duration of [`demo_timeline`].
pub const DEMO_DURATION: f64 = 1.5;
