//! Coarticulation blending.
//!
//! Real speech does not snap between mouth shapes at phoneme boundaries;
//! neighboring shapes overlap. The blender approximates that by mixing the
//! active segment's viseme with its immediate neighbors instead of emitting
//! a single hard symbol.

use std::collections::BTreeMap;

use crate::config::CoarticulationWeights;
use crate::timeline::VisemeTimeline;
use crate::viseme::Viseme;

/// A normalized mixture of visemes. Weights always sum to 1 (within float
/// tolerance); the no-speech case is the singleton `{Rest: 1}`.
#[derive(Clone, Debug, PartialEq)]
pub struct VisemeMix {
    weights: BTreeMap<Viseme, f32>,
}

impl VisemeMix {
    /// The fallback mixture: rest pose at full weight.
    pub fn rest() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(Viseme::Rest, 1.0);
        Self { weights }
    }

    pub fn weight(&self, viseme: Viseme) -> f32 {
        self.weights.get(&viseme).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Viseme, f32)> + '_ {
        self.weights.iter().map(|(v, w)| (*v, *w))
    }

    pub fn total(&self) -> f32 {
        self.weights.values().sum()
    }
}

/// Computes the viseme mixture at time `t`.
///
/// The active segment contributes `weights.current`, the immediately
/// preceding segment `weights.prev` when it exists, the immediately
/// following segment `weights.next` when it exists. Contributions to the
/// same viseme add. Missing neighbors at a timeline boundary are dropped
/// and the remaining weights renormalized to sum to 1: with defaults and
/// no previous segment, current 0.6 and next 0.2 become 0.75 and 0.25.
///
/// Returns `{Rest: 1}` when no segment is active at `t` or when the
/// configured weights sum to zero.
pub fn blend_weights(
    timeline: &VisemeTimeline,
    t: f64,
    weights: &CoarticulationWeights,
) -> VisemeMix {
    let Some(index) = timeline.active_index(t) else {
        return VisemeMix::rest();
    };

    let segments = timeline.segments();
    let mut mix: BTreeMap<Viseme, f32> = BTreeMap::new();

    mix.insert(segments[index].viseme, weights.current);
    if index > 0 {
        *mix.entry(segments[index - 1].viseme).or_insert(0.0) += weights.prev;
    }
    if index + 1 < segments.len() {
        *mix.entry(segments[index + 1].viseme).or_insert(0.0) += weights.next;
    }

    let total: f32 = mix.values().sum();
    if total <= f32::EPSILON {
        return VisemeMix::rest();
    }

    for weight in mix.values_mut() {
        *weight /= total;
    }

    VisemeMix { weights: mix }
}
