//! # avatar-engine
//!
//! A viseme-driven facial animation engine for 3D talking-head avatars.
//!
//! The engine turns a sparse, time-stamped viseme timeline plus an audio
//! clock into smooth, coarticulated blend-shape influences, layered with
//! always-on idle motion (blink + micro-noise) and emotion-driven
//! expression. It owns no rendering, no assets and no networking: the host
//! registers the loaded model's morph targets, feeds TTS speech tracks in,
//! and calls [`Compositor::tick`] once per rendered frame with that frame's
//! delta; the engine's sole output is influence writes through an
//! [`InfluenceSink`].
//!
//! ```
//! use avatar_engine::{
//!     AvatarState, Compositor, EngineConfig, InfluenceSink, MeshId, SpeechSession, SpeechTrack,
//! };
//!
//! struct Meshes(Vec<Vec<f32>>);
//!
//! impl InfluenceSink for Meshes {
//!     fn set_influence(&mut self, mesh: MeshId, slot: usize, value: f32) {
//!         self.0[mesh][slot] = value;
//!     }
//! }
//!
//! let mut compositor = Compositor::new(EngineConfig::default());
//! compositor.registry_mut().register("V_Open", 0, 0);
//! compositor.registry_mut().register("Jaw_Open", 0, 1);
//!
//! let mut state = AvatarState::new();
//! let track = SpeechTrack::from_json(
//!     r#"{"timeline": [{"start": 0.0, "end": 0.4, "viseme": "AA"}]}"#,
//! )
//! .unwrap();
//! state.speak(&track, SpeechSession::demo(0.4));
//!
//! let mut meshes = Meshes(vec![vec![0.0; 2]]);
//! for _ in 0..30 {
//!     compositor.tick(1.0 / 60.0, &mut state, &mut meshes);
//! }
//! assert!(meshes.0[0][0] > 0.0, "the mouth opened");
//! ```

pub mod animation;
pub mod coarticulation;
pub mod compositor;
pub mod config;
pub mod layers;
pub mod registry;
pub mod shapes;
pub mod speech;
pub mod state;
pub mod timeline;
pub mod viseme;

pub use animation::EasingType;
pub use coarticulation::{blend_weights, VisemeMix};
pub use compositor::Compositor;
pub use config::{CoarticulationWeights, EngineConfig};
pub use layers::{EmotionTable, ExpressionLayer, IdleMotion};
pub use registry::{InfluenceSink, MeshId, MorphBinding, MorphRegistry};
pub use shapes::{build_targets, VisemeShapeTable};
pub use speech::{audio_channel, demo_timeline, AudioEvent, AudioHandle, AudioNotifier, SpeechSession, DEMO_DURATION};
pub use state::{tone_intensity, AvatarMode, AvatarState, Emotion, RequestToken, SpeechTrack, TrackError};
pub use timeline::{RawSegment, VisemeSegment, VisemeTimeline};
pub use viseme::Viseme;
