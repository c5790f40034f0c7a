//! Emotional expression: preset shape weights driven by a smoothed scalar.

use std::collections::HashMap;

use crate::animation::{lerp, smoothing_factor};
use crate::config::EngineConfig;
use crate::state::Emotion;

/// Emotion → base shape weights. `Neutral` is always present and is the
/// fallback for unmapped emotions; its entry may be empty.
#[derive(Clone, Debug)]
pub struct EmotionTable {
    entries: HashMap<Emotion, Vec<(String, f32)>>,
}

impl EmotionTable {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(Emotion::Neutral, Vec::new());
        Self { entries }
    }

    /// The presets for the stock CC4 rig.
    pub fn cc4() -> Self {
        let mut table = Self::new();

        table.set(
            Emotion::Happy,
            &[
                ("Mouth_Smile_L", 0.6),
                ("Mouth_Smile_R", 0.6),
                ("Cheek_Raise_L", 0.3),
                ("Cheek_Raise_R", 0.3),
            ],
        );
        table.set(
            Emotion::Sad,
            &[
                ("Mouth_Frown_L", 0.5),
                ("Mouth_Frown_R", 0.5),
                ("Brow_Raise_Inner_L", 0.4),
                ("Brow_Raise_Inner_R", 0.4),
            ],
        );
        table.set(
            Emotion::Angry,
            &[
                ("Brow_Drop_L", 0.6),
                ("Brow_Drop_R", 0.6),
                ("Eye_Squint_L", 0.3),
                ("Eye_Squint_R", 0.3),
            ],
        );
        table.set(
            Emotion::Surprised,
            &[
                ("Brow_Raise_L", 0.7),
                ("Brow_Raise_R", 0.7),
                ("Eye_Wide_L", 0.5),
                ("Eye_Wide_R", 0.5),
                ("Jaw_Open", 0.15),
            ],
        );

        table
    }

    pub fn set(&mut self, emotion: Emotion, shapes: &[(&str, f32)]) {
        self.entries.insert(
            emotion,
            shapes
                .iter()
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect(),
        );
    }

    pub fn entry(&self, emotion: Emotion) -> &[(String, f32)] {
        self.entries
            .get(&emotion)
            .or_else(|| self.entries.get(&Emotion::Neutral))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for EmotionTable {
    fn default() -> Self {
        Self::cc4()
    }
}

/// Smoothed expression intensity applied to the active emotion preset.
#[derive(Debug, Default)]
pub struct ExpressionLayer {
    weight: f32,
}

impl ExpressionLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current smoothed expression weight, exposed for diagnostics.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Moves the expression weight toward its target with frame-rate
    /// independent smoothing and returns the scaled preset weights.
    ///
    /// The target is the user intensity, attenuated further while the
    /// emotion is neutral so the resting face stays subtle.
    pub fn update(
        &mut self,
        delta: f32,
        emotion: Emotion,
        intensity: f32,
        table: &EmotionTable,
        config: &EngineConfig,
    ) -> HashMap<String, f32> {
        let target = intensity.max(0.0)
            * if emotion == Emotion::Neutral {
                config.neutral_expression_scale
            } else {
                1.0
            };

        let factor = smoothing_factor(delta, config.expression_rate);
        self.weight = lerp(self.weight, target, factor);

        table
            .entry(emotion)
            .iter()
            .map(|(shape, base)| (shape.clone(), base * self.weight))
            .collect()
    }
}
