//! Simulated asset price updates.
//!
//! Layered leaf-first:
//! - `noise` — Box–Muller gaussian draws over an injectable uniform source.
//! - `model` — one stochastic price step with trend bias, clamping and rolling history.
//! - `walker` — finds leaf assets in an arbitrary JSON document and applies the model.
//! - `batch` — walks every stored document and persists the results.
pub mod batch;
pub mod model;
pub mod noise;
pub mod walker;

pub use batch::BatchUpdater;
pub use noise::{SeededSource, SequenceSource, ThreadRngSource, UniformSource};
pub use walker::{TreeWalker, WalkStats};
