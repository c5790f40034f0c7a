//! # Avatar State
//!
//! The shared state record every layer reads and the handlers mutate.
//!
//! ## Responsibilities
//! - **Mode machine**: `Idle → Listening → Thinking → Speaking → Idle`;
//!   only the last transition is automatic (driven by the compositor when
//!   audio completes).
//! - **Speech tracks**: the wire payload a TTS response carries, and its
//!   application to the state under a request-generation guard.
//!
//! ## Key Types
//! - `AvatarState`: explicit state-context object, passed by `&mut` into
//!   the per-frame tick. Lives for the whole session.
//! - `SpeechTrack`: timeline + optional `emotion`/`tone`/audio payload.
//! - `RequestToken`: generation token that keeps a stale in-flight response
//!   from clobbering a newer one.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::speech::SpeechSession;
use crate::timeline::{RawSegment, VisemeTimeline};

/// What the avatar is currently doing. Drives which layers contribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AvatarMode {
    Idle,
    Listening,
    Thinking,
    Speaking,
}

/// Emotion presets known to the expression layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Angry,
    Surprised,
}

impl Emotion {
    /// Parses a wire symbol; unknown symbols degrade to neutral.
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol.trim().to_ascii_lowercase().as_str() {
            "neutral" => Emotion::Neutral,
            "happy" => Emotion::Happy,
            "sad" => Emotion::Sad,
            "angry" => Emotion::Angry,
            "surprised" => Emotion::Surprised,
            other => {
                debug!(symbol = other, "unknown emotion symbol, using neutral");
                Emotion::Neutral
            }
        }
    }
}

/// Maps a TTS `tone` field to the speech-intensity scalar.
pub fn tone_intensity(tone: Option<&str>) -> f32 {
    match tone.map(str::trim) {
        Some(t) if t.eq_ignore_ascii_case("excited") => 1.25,
        Some(t) if t.eq_ignore_ascii_case("calm") => 0.8,
        _ => 1.0,
    }
}

/// A speech-track payload, as delivered by the TTS collaborator.
///
/// The audio fields are carried through untouched; decoding and playback
/// belong to the audio collaborator, which reports back only completion.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpeechTrack {
    #[serde(default)]
    pub timeline: Vec<RawSegment>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub audio_base64: Option<String>,
    #[serde(default)]
    pub audio_mime_type: Option<String>,
}

impl SpeechTrack {
    pub fn from_json(json: &str) -> Result<Self, TrackError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The speech-intensity scalar this track asks for.
    pub fn intensity(&self) -> f32 {
        tone_intensity(self.tone.as_deref())
    }
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("malformed speech track payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Generation token returned by [`AvatarState::begin_request`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RequestToken(u64);

/// The process-wide avatar record. Created once at startup, mutated by the
/// frame loop and by response handlers, never destroyed.
#[derive(Debug)]
pub struct AvatarState {
    pub mode: AvatarMode,
    pub emotion: Emotion,
    /// Speech-intensity scalar, ≥ 0, practically around 0.5–1.5.
    pub intensity: f32,
    timeline: VisemeTimeline,
    session: Option<SpeechSession>,
    issued: u64,
}

impl AvatarState {
    pub fn new() -> Self {
        Self {
            mode: AvatarMode::Idle,
            emotion: Emotion::Neutral,
            intensity: 1.0,
            timeline: VisemeTimeline::empty(),
            session: None,
            issued: 0,
        }
    }

    pub fn timeline(&self) -> &VisemeTimeline {
        &self.timeline
    }

    pub fn session(&self) -> Option<&SpeechSession> {
        self.session.as_ref()
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut SpeechSession> {
        self.session.as_mut()
    }

    /// Issues a generation token before a chat/TTS request goes out. The
    /// newest token wins: responses applied with an older one are ignored.
    pub fn begin_request(&mut self) -> RequestToken {
        self.issued += 1;
        RequestToken(self.issued)
    }

    /// Applies a TTS response: timeline, emotion, intensity, session, and
    /// the switch to `Speaking`. Returns `false` (and changes nothing) when
    /// `token` is stale, i.e. a newer request has been issued since.
    pub fn apply_track(
        &mut self,
        token: RequestToken,
        track: &SpeechTrack,
        session: SpeechSession,
    ) -> bool {
        if token.0 != self.issued {
            warn!(
                got = token.0,
                newest = self.issued,
                "dropping stale speech track"
            );
            return false;
        }

        if let Some(symbol) = track.emotion.as_deref() {
            self.emotion = Emotion::from_symbol(symbol);
        }
        self.intensity = track.intensity();
        self.timeline = VisemeTimeline::from_raw(&track.timeline);
        self.session = Some(session);
        self.mode = AvatarMode::Speaking;
        true
    }

    /// Convenience for callers that have no overlapping requests in flight.
    pub fn speak(&mut self, track: &SpeechTrack, session: SpeechSession) {
        let token = self.begin_request();
        self.apply_track(token, track, session);
    }

    /// Called by the compositor when the driving audio reports completion.
    pub(crate) fn finish_speech(&mut self) {
        self.mode = AvatarMode::Idle;
        self.session = None;
    }
}

impl Default for AvatarState {
    fn default() -> Self {
        Self::new()
    }
}
