//! # Viseme Timeline
//!
//! Time-sorted viseme segments and the per-frame lookup over them.
//!
//! ## Responsibilities
//! - **Wire form**: `RawSegment` as delivered by the TTS collaborator.
//! - **Storage**: a defensive, `start`-sorted copy, immutable once set.
//! - **Lookup**: `active_index(t)` over half-open `[start, end)` intervals.

use serde::{Deserialize, Serialize};

use crate::viseme::{SymbolResolver, Viseme};

/// A timeline segment as it arrives on the wire, viseme still symbolic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    pub viseme: String,
}

/// A resolved timeline segment. The interval is half-open: a query at
/// `t == end` falls outside, a query at `t == start` falls inside.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VisemeSegment {
    pub start: f64,
    pub end: f64,
    pub viseme: Viseme,
}

impl VisemeSegment {
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// The active speech timeline. Replaced wholesale per utterance, never
/// patched in place.
#[derive(Clone, Debug, Default)]
pub struct VisemeTimeline {
    segments: Vec<VisemeSegment>,
}

impl VisemeTimeline {
    /// An empty, effectively-silent timeline.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a timeline from already-resolved segments, sorting a
    /// defensive copy by `start` ascending.
    pub fn new(mut segments: Vec<VisemeSegment>) -> Self {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { segments }
    }

    /// Builds a timeline from wire segments. Unknown viseme symbols degrade
    /// to rest and are warned once per distinct symbol.
    pub fn from_raw(raw: &[RawSegment]) -> Self {
        let mut resolver = SymbolResolver::new();
        let segments = raw
            .iter()
            .map(|segment| VisemeSegment {
                start: segment.start,
                end: segment.end,
                viseme: resolver.resolve(&segment.viseme),
            })
            .collect();
        Self::new(segments)
    }

    pub fn segments(&self) -> &[VisemeSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End of the last segment, or 0 for an empty timeline.
    pub fn duration(&self) -> f64 {
        self.segments
            .iter()
            .map(|segment| segment.end)
            .fold(0.0, f64::max)
    }

    /// Index of the first segment whose `[start, end)` contains `t`.
    ///
    /// Gaps between words and times beyond the last segment both return
    /// `None`, which callers resolve to the rest pose. Segments are expected
    /// non-overlapping; should they overlap anyway, the first match wins.
    pub fn active_index(&self, t: f64) -> Option<usize> {
        self.segments.iter().position(|segment| segment.contains(t))
    }
}
