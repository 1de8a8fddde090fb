//! Rendering adapter: renderer-agnostic read-back of the particle field.
//!
//! # Invariants
//! - Renderers never mutate the field.
//! - Render output derives only from field state and the view.
//!
//! Drawing itself belongs to the host engine. This crate turns active
//! particles into billboard instances the host can upload as-is, plus a
//! debug text renderer for the CLI and tests.

mod filter;
mod renderer;

pub use filter::{PostFilter, ThresholdFilter};
pub use renderer::{
    BillboardInstance, BillboardRenderer, DebugTextRenderer, RenderView, Renderer, SizeOverLife,
};

pub fn crate_info() -> &'static str {
    "vortex-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
