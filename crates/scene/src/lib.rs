//! Scene: wires the field, the emitter and the render read-back into a frame
//! loop driven by wall-clock frame time.
//!
//! # Invariants
//! - Every frame steps existing particles before emitting new ones.
//! - `scaled_update_speed = update_speed * frame_ms * 60 / 1000`.
//! - Configs are validated before a scene is built.

mod clock;
mod config;
mod scene;

pub use clock::{FrameTimer, animation_ratio};
pub use config::{ConfigError, Orbit, RenderConfig, RunConfig, SceneConfig};
pub use scene::{FrameStats, Scene};

pub fn crate_info() -> &'static str {
    "vortex-scene v0.1.0"
}
