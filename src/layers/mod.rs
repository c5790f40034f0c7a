//! Always-on animation layers composited alongside lip sync.

pub mod expression;
pub mod idle;

pub use expression::{EmotionTable, ExpressionLayer};
pub use idle::IdleMotion;
