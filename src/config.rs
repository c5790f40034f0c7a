use serde::{Deserialize, Serialize};

use crate::animation::EasingType;

/// Coarticulation weights for the previous/current/next timeline segments.
///
/// Missing neighbors at a timeline boundary are dropped and the remaining
/// weights renormalized, so these only need to be proportions.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CoarticulationWeights {
    pub prev: f32,
    pub current: f32,
    pub next: f32,
}

impl Default for CoarticulationWeights {
    fn default() -> Self {
        Self {
            prev: 0.2,
            current: 0.6,
            next: 0.2,
        }
    }
}

/// All tunable constants of the engine.
///
/// Loadable from JSON so a deployment can retune mouth dynamics without a
/// rebuild; `Default` matches the values the stock CC4 rig was dialed in
/// with.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub coarticulation: CoarticulationWeights,

    /// Ceiling applied to every accumulated lip target. Keeps a shape from
    /// hitting a visually extreme fully-open pose when weights compound.
    pub max_influence: f32,

    /// Name of the jaw-opening shape that gets extra damping.
    pub jaw_shape: String,
    /// Damping factor applied to the jaw shape after clamping.
    pub jaw_damping: f32,

    /// Per-frame lerp factor for the influence buffer during live playback.
    pub lip_smoothing_live: f32,
    /// Per-frame lerp factor during timeline-only demo playback.
    pub lip_smoothing_demo: f32,

    /// Exponential rate `k` of the expression layer's `1 - e^(-delta * k)`
    /// smoothing.
    pub expression_rate: f32,
    /// Extra attenuation of the expression target while the emotion is
    /// neutral.
    pub neutral_expression_scale: f32,

    /// Master switch for the idle layer (blink + micro-noise).
    pub idle_motion: bool,
    /// Blink scheduling interval, seconds; the next blink is drawn
    /// uniformly from `[min, max)`.
    pub blink_interval_min: f32,
    pub blink_interval_max: f32,
    /// Phase advance of an in-flight blink, in phase units per second.
    pub blink_rate: f32,
    /// Envelope shaping of the blink rise/fall ramp.
    pub blink_easing: EasingType,

    /// Micro-noise amplitude multiplier while the avatar is speaking.
    pub noise_speaking_scale: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            coarticulation: CoarticulationWeights::default(),
            max_influence: 0.9,
            jaw_shape: "Jaw_Open".to_string(),
            jaw_damping: 0.95,
            lip_smoothing_live: 0.25,
            lip_smoothing_demo: 0.3,
            expression_rate: 4.0,
            neutral_expression_scale: 0.35,
            idle_motion: true,
            blink_interval_min: 2.0,
            blink_interval_max: 6.0,
            blink_rate: 8.0,
            blink_easing: EasingType::Linear,
            noise_speaking_scale: 0.3,
        }
    }
}
