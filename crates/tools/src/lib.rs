//! Developer tooling: field inspector and summaries.
//!
//! # Invariants
//! - Inspection is read-only.

mod inspector;

pub use inspector::{FieldInspector, FieldSummary, ParticleInfo};

pub fn crate_info() -> &'static str {
    "vortex-tools v0.1.0"
}
