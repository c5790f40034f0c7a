//! # Viseme-to-Shape Mapping
//!
//! Expands a viseme mixture into absolute morph-target weights.
//!
//! ## Responsibilities
//! - **Shape tables**: per-viseme base weights for named blend shapes.
//! - **Target building**: weighted accumulation, intensity scaling, the
//!   global influence ceiling, jaw damping.
//!
//! ## Key Types
//! - `VisemeShapeTable`: viseme → `[(shape name, base weight)]`, with a
//!   guaranteed rest entry.
//! - `build_targets`: the 4.3 mapper operation.

use std::collections::HashMap;

use crate::coarticulation::VisemeMix;
use crate::config::EngineConfig;
use crate::viseme::Viseme;

/// Static mapping from a viseme to the blend shapes that realize it.
///
/// Tables may reference shapes the loaded mesh lacks; those entries are
/// silently ignored when the registry applies them.
#[derive(Clone, Debug)]
pub struct VisemeShapeTable {
    entries: HashMap<Viseme, Vec<(String, f32)>>,
}

impl VisemeShapeTable {
    /// An empty table. The rest entry always exists, even here.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(Viseme::Rest, Vec::new());
        Self { entries }
    }

    /// The shape table for the stock CC4 rig.
    pub fn cc4() -> Self {
        let mut table = Self::new();

        table.set(Viseme::Aa, &[("V_Open", 1.0), ("Jaw_Open", 0.4)]);
        table.set(Viseme::E, &[("V_Wide", 0.9), ("Jaw_Open", 0.15)]);
        table.set(Viseme::I, &[("V_Wide", 0.7), ("V_Tight", 0.2)]);
        table.set(Viseme::O, &[("V_Tight_O", 1.0), ("Jaw_Open", 0.25)]);
        table.set(Viseme::U, &[("V_Tight", 0.9), ("V_Lip_Open", 0.2)]);
        table.set(Viseme::Mbp, &[("Mouth_Close", 1.0)]);
        table.set(Viseme::Fv, &[("V_Dental_Lip", 0.9)]);
        table.set(Viseme::Ch, &[("V_Affricate", 0.85), ("V_Wide", 0.2)]);
        table.set(Viseme::W, &[("V_Lip_Open", 0.8), ("V_Tight", 0.3)]);
        table.set(Viseme::Exp, &[("V_Explosive", 0.9), ("Jaw_Open", 0.2)]);

        table
    }

    /// Replaces the entry for one viseme.
    pub fn set(&mut self, viseme: Viseme, shapes: &[(&str, f32)]) {
        self.entries.insert(
            viseme,
            shapes
                .iter()
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect(),
        );
    }

    /// The shapes for a viseme, falling back to the rest entry. Never
    /// fails; an unmapped viseme degrades to the rest pose.
    pub fn entry(&self, viseme: Viseme) -> &[(String, f32)] {
        self.entries
            .get(&viseme)
            .or_else(|| self.entries.get(&Viseme::Rest))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every shape name any entry references.
    pub fn shape_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .values()
            .flatten()
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl Default for VisemeShapeTable {
    fn default() -> Self {
        Self::cc4()
    }
}

/// Expands a viseme mixture into absolute target weights.
///
/// For every `(viseme, weight)` pair the viseme's table entry contributes
/// `base * weight * intensity` per shape; contributions to the same shape
/// accumulate. Accumulated values are clamped to `[0, max_influence]`, and
/// the jaw shape is damped afterwards so a compound open-mouth pose does
/// not overshoot.
pub fn build_targets(
    mix: &VisemeMix,
    intensity: f32,
    table: &VisemeShapeTable,
    config: &EngineConfig,
) -> HashMap<String, f32> {
    let mut targets: HashMap<String, f32> = HashMap::new();

    for (viseme, weight) in mix.iter() {
        for (shape, base) in table.entry(viseme) {
            *targets.entry(shape.clone()).or_insert(0.0) += base * weight * intensity;
        }
    }

    for (shape, value) in targets.iter_mut() {
        *value = value.clamp(0.0, config.max_influence);
        if *shape == config.jaw_shape {
            *value *= config.jaw_damping;
        }
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coarticulation::blend_weights;
    use crate::config::CoarticulationWeights;
    use crate::timeline::{VisemeSegment, VisemeTimeline};

    fn full_aa_mix() -> VisemeMix {
        let timeline = VisemeTimeline::new(vec![VisemeSegment {
            start: 0.0,
            end: 1.0,
            viseme: Viseme::Aa,
        }]);
        blend_weights(&timeline, 0.5, &CoarticulationWeights::default())
    }

    #[test]
    fn rest_mix_yields_rest_table() {
        let table = VisemeShapeTable::cc4();
        let targets = build_targets(
            &VisemeMix::rest(),
            1.0,
            &table,
            &EngineConfig::default(),
        );
        assert!(targets.is_empty(), "rest entry of the CC4 table is empty");
    }

    #[test]
    fn intensity_scales_targets() {
        let table = VisemeShapeTable::cc4();
        let config = EngineConfig::default();

        let calm = build_targets(&full_aa_mix(), 0.8, &table, &config);
        let excited = build_targets(&full_aa_mix(), 1.25, &table, &config);

        let calm_open = calm["V_Open"];
        let excited_open = excited["V_Open"];
        assert!((calm_open - 0.8).abs() < 1e-6);
        // 1.25 exceeds the 0.9 ceiling and clamps.
        assert!((excited_open - config.max_influence).abs() < 1e-6);
    }

    #[test]
    fn jaw_shape_is_damped_after_clamping() {
        let table = VisemeShapeTable::cc4();
        let config = EngineConfig::default();

        let targets = build_targets(&full_aa_mix(), 1.0, &table, &config);
        let expected = (0.4f32).clamp(0.0, config.max_influence) * config.jaw_damping;
        assert!((targets["Jaw_Open"] - expected).abs() < 1e-6);
    }

    #[test]
    fn negative_accumulations_clamp_to_zero() {
        let mut table = VisemeShapeTable::new();
        table.set(Viseme::Aa, &[("V_Open", -0.5)]);

        let targets = build_targets(
            &full_aa_mix(),
            1.0,
            &table,
            &EngineConfig::default(),
        );
        assert_eq!(targets["V_Open"], 0.0);
    }

    #[test]
    fn unmapped_viseme_falls_back_to_rest_entry() {
        let mut table = VisemeShapeTable::new();
        table.set(Viseme::Rest, &[("Mouth_Close", 0.1)]);
        // No Aa entry: the Aa mixture reads the rest shapes instead.
        let targets = build_targets(
            &full_aa_mix(),
            1.0,
            &table,
            &EngineConfig::default(),
        );
        assert!((targets["Mouth_Close"] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn cc4_table_weights_are_unit_range() {
        let table = VisemeShapeTable::cc4();
        for viseme in [
            Viseme::Rest,
            Viseme::Aa,
            Viseme::E,
            Viseme::I,
            Viseme::O,
            Viseme::U,
            Viseme::Mbp,
            Viseme::Fv,
            Viseme::Ch,
            Viseme::W,
            Viseme::Exp,
        ] {
            for (shape, base) in table.entry(viseme) {
                assert!(
                    (0.0..=1.0).contains(base),
                    "{:?}/{} base weight {} out of range",
                    viseme,
                    shape,
                    base
                );
            }
        }
    }
}
