use keyframe::EasingFunction;
use serde::{Deserialize, Serialize};

/// Easing curves for envelope shaping, stored uniformly as an enum.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl EasingFunction for EasingType {
    fn y(&self, x: f64) -> f64 {
        match self {
            EasingType::Linear => keyframe::functions::Linear.y(x),
            EasingType::EaseIn => keyframe::functions::EaseIn.y(x),
            EasingType::EaseOut => keyframe::functions::EaseOut.y(x),
            EasingType::EaseInOut => keyframe::functions::EaseInOut.y(x),
        }
    }
}

impl EasingType {
    pub fn eval(&self, x: f32) -> f32 {
        self.y(x.clamp(0.0, 1.0) as f64) as f32
    }
}

/// Linear interpolation between two influences.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Frame-rate-independent exponential smoothing factor `1 - e^(-delta * rate)`.
///
/// Applying `lerp(current, target, smoothing_factor(dt, k))` every frame
/// converges on `target` at the same wall-clock speed regardless of how the
/// elapsed time is sliced into frames.
pub fn smoothing_factor(delta: f32, rate: f32) -> f32 {
    1.0 - (-delta * rate).exp()
}
