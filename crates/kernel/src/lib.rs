//! Field kernel: particle records, the active/retired arena, update rules and
//! the per-tick `advance` step.
//!
//! # Invariants
//! - A particle is live iff `age < life_time`.
//! - Every allocated slot is either active or retired, never both.
//! - A particle is retired exactly once, before any other update in that tick.
//! - `advance` never mutates `life_time` or `direction`.

mod advance;
mod error;
mod field;
mod particle;
mod pool;
pub mod rule;

pub use advance::{AdvanceReport, StepInput, advance};
pub use error::FieldError;
pub use field::{FieldConfig, ParticleField};
pub use particle::Particle;
pub use pool::{MAX_CAPACITY, ParticlePool};
pub use rule::{AttractSwirl, Drift, RuleConfig, UpdateRule};

pub fn crate_info() -> &'static str {
    "vortex-kernel v0.1.0"
}
