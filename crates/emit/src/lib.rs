//! Emission: spawns particles into the field at a configurable rate.
//!
//! # Invariants
//! - Emission never exceeds the pool capacity; surplus requests are dropped.
//! - Retired slots are reused before new slots are allocated.
//! - Fractional emission carries over between frames.

mod emitter;

pub use emitter::{EmitError, EmitReport, Emitter, EmitterConfig, EmitterShape};

pub fn crate_info() -> &'static str {
    "vortex-emit v0.1.0"
}
