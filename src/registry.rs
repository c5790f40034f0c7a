//! # Morph Registry
//!
//! Maps blend-shape names to the mesh slots that realize them.
//!
//! ## Responsibilities
//! - **Registration**: populated once after asset load from
//!   (name, mesh, slot) triples discovered on the loaded model.
//! - **Application**: fans a smoothed influence out to every slot bound to
//!   a name. Unknown names are a silent no-op; shape tables may reference
//!   shapes the current mesh simply lacks.
//!
//! ## Key Types
//! - `MorphRegistry`: the name → bindings map.
//! - `InfluenceSink`: the seam to whatever owns the actual mesh influence
//!   arrays (renderer, test double).

use std::collections::HashMap;

/// Index of a mesh discovered on the loaded model.
pub type MeshId = usize;

/// One (mesh, morph-slot) target for a named blend shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MorphBinding {
    pub mesh: MeshId,
    pub slot: usize,
}

/// Receiver of per-frame influence writes. Implemented by the rendering
/// side over its morph-target influence arrays.
pub trait InfluenceSink {
    fn set_influence(&mut self, mesh: MeshId, slot: usize, value: f32);
}

/// The registry of every blend shape the loaded model exposes.
///
/// An empty registry is valid: all applications become no-ops, which is
/// what keeps the engine safe while assets are still loading.
#[derive(Clone, Debug, Default)]
pub struct MorphRegistry {
    bindings: HashMap<String, Vec<MorphBinding>>,
}

impl MorphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one (name, mesh, slot) triple. A shape present on several
    /// meshes accumulates several bindings under the same name.
    pub fn register(&mut self, name: &str, mesh: MeshId, slot: usize) {
        self.bindings
            .entry(name.to_string())
            .or_default()
            .push(MorphBinding { mesh, slot });
    }

    pub fn bindings(&self, name: &str) -> Option<&[MorphBinding]> {
        self.bindings.get(name).map(Vec::as_slice)
    }

    /// All registered shape names, sorted for stable iteration.
    pub fn shape_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Writes `value` into every slot bound to `name`. Unregistered names
    /// are ignored.
    pub fn apply(&self, name: &str, value: f32, sink: &mut dyn InfluenceSink) {
        if let Some(bindings) = self.bindings.get(name) {
            for binding in bindings {
                sink.set_influence(binding.mesh, binding.slot, value);
            }
        }
    }
}
