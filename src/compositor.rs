//! # Layered Compositor
//!
//! The once-per-frame merge of all animation layers into smoothed morph
//! influences.
//!
//! ## Responsibilities
//! - **Lip chain**: timeline lookup → coarticulation blend → shape targets,
//!   sampled at audio-clock-relative time, only while `Speaking`.
//! - **Layer merge**: lip, idle and expression target maps sum per shape,
//!   clamped to full influence.
//! - **Smoothing & write-out**: every shape's stored influence is lerped
//!   toward its merged target and written through the registry.
//! - **Auto transition**: `Speaking → Idle` fires here when the driving
//!   audio reports completion (or the demo clock runs out).
//!
//! ## Key Types
//! - `Compositor`: owns the layers, the influence buffer and the registry.

use std::collections::HashMap;

use tracing::debug;

use crate::animation::lerp;
use crate::coarticulation::blend_weights;
use crate::config::EngineConfig;
use crate::layers::{EmotionTable, ExpressionLayer, IdleMotion};
use crate::registry::{InfluenceSink, MorphRegistry};
use crate::shapes::{build_targets, VisemeShapeTable};
use crate::state::{AvatarMode, AvatarState};

/// Sums `from` into `into`; shapes driven by several layers accumulate.
fn merge(into: &mut HashMap<String, f32>, from: HashMap<String, f32>) {
    for (name, value) in from {
        *into.entry(name).or_insert(0.0) += value;
    }
}

/// The per-frame compositor. Call [`Compositor::tick`] exactly once per
/// rendered frame; each call runs strictly after the previous one under
/// the single-threaded tick model.
pub struct Compositor {
    config: EngineConfig,
    registry: MorphRegistry,
    shape_table: VisemeShapeTable,
    emotions: EmotionTable,
    idle: IdleMotion,
    expression: ExpressionLayer,
    /// Per-shape smoothed influence. Lazily grown, never reset; values
    /// decay toward 0 whenever no layer drives them.
    influences: HashMap<String, f32>,
    elapsed: f64,
}

impl Compositor {
    pub fn new(config: EngineConfig) -> Self {
        let idle = IdleMotion::new(&config);
        Self::with_idle(config, idle)
    }

    /// Deterministic blink scheduling, for tests and captures.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        let idle = IdleMotion::with_seed(&config, seed);
        Self::with_idle(config, idle)
    }

    fn with_idle(config: EngineConfig, idle: IdleMotion) -> Self {
        Self {
            config,
            registry: MorphRegistry::new(),
            shape_table: VisemeShapeTable::cc4(),
            emotions: EmotionTable::cc4(),
            idle,
            expression: ExpressionLayer::new(),
            influences: HashMap::new(),
            elapsed: 0.0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &MorphRegistry {
        &self.registry
    }

    /// Mutable access for post-load registry population.
    pub fn registry_mut(&mut self) -> &mut MorphRegistry {
        &mut self.registry
    }

    /// Swaps in a custom viseme shape table (rig retargeting).
    pub fn set_shape_table(&mut self, table: VisemeShapeTable) {
        self.shape_table = table;
    }

    /// Swaps in a custom emotion preset table.
    pub fn set_emotion_table(&mut self, table: EmotionTable) {
        self.emotions = table;
    }

    /// Engine time in seconds, advanced by the ticks seen so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The stored smoothed influence for a shape, if any frame drove it.
    pub fn influence(&self, name: &str) -> Option<f32> {
        self.influences.get(name).copied()
    }

    /// Advances the engine by `delta` seconds: resolves speech completion,
    /// evaluates the layers, merges, smooths and writes the result into
    /// `sink` through the registry.
    pub fn tick(&mut self, delta: f32, state: &mut AvatarState, sink: &mut dyn InfluenceSink) {
        self.elapsed += delta as f64;
        let now = self.elapsed;

        // Resolve completion before sampling the lip layer so the frame a
        // clip ends on already decays toward rest.
        if state.mode == AvatarMode::Speaking {
            match state.session_mut() {
                Some(session) => {
                    session.ensure_started(now);
                    if session.finished(now) {
                        debug!("speech complete, returning to idle");
                        state.finish_speech();
                    }
                }
                // Speaking with nothing driving the clock: nothing to say.
                None => state.finish_speech(),
            }
        }

        let mut targets: HashMap<String, f32> = HashMap::new();
        let mut demo_context = false;

        if state.mode == AvatarMode::Speaking {
            if let Some(session) = state.session() {
                demo_context = session.is_demo();
                let t = session.time(now);
                let mix = blend_weights(state.timeline(), t, &self.config.coarticulation);
                let lip = build_targets(&mix, state.intensity, &self.shape_table, &self.config);
                merge(&mut targets, lip);
            }
        }

        merge(
            &mut targets,
            self.idle.update(delta, now, state.mode, &self.config),
        );
        merge(
            &mut targets,
            self.expression.update(
                delta,
                state.emotion,
                state.intensity,
                &self.emotions,
                &self.config,
            ),
        );

        // Shapes driven by several layers cap at full influence.
        for value in targets.values_mut() {
            *value = value.clamp(0.0, 1.0);
        }

        let smoothing = if demo_context {
            self.config.lip_smoothing_demo
        } else {
            self.config.lip_smoothing_live
        };

        // Every shape seen so far participates: shapes without a target
        // this frame decay toward 0 instead of sticking.
        for name in targets.keys() {
            if !self.influences.contains_key(name) {
                self.influences.insert(name.clone(), 0.0);
            }
        }
        for (name, current) in self.influences.iter_mut() {
            let target = targets.get(name).copied().unwrap_or(0.0);
            *current = lerp(*current, target, smoothing);
            self.registry.apply(name, *current, sink);
        }
    }
}
