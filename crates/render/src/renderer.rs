use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use vortex_common::SlotId;
use vortex_kernel::{Particle, ParticleField};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    pub clear_color: Vec4,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 5.0, -10.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
            // teal
            clear_color: Vec4::new(0.0, 1.0, 1.0, 1.0),
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the field and a view configuration, then produces
/// output. It never mutates the field.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given field state and view.
    fn render(&self, field: &ParticleField, view: &RenderView) -> Self::Output;
}

/// Linear billboard size between spawn and retirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeOverLife {
    pub start: f32,
    pub end: f32,
}

impl Default for SizeOverLife {
    fn default() -> Self {
        Self {
            start: 0.1,
            end: 0.1,
        }
    }
}

impl SizeOverLife {
    pub fn size_at(&self, particle: &Particle) -> f32 {
        let t = particle.normalized_age();
        self.start + (self.end - self.start) * t
    }
}

/// Per-particle draw data handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillboardInstance {
    pub slot: SlotId,
    pub position: Vec3,
    pub color: Vec4,
    pub angle: f32,
    pub size: f32,
}

/// Extracts one billboard per active particle, in update order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BillboardRenderer {
    pub size: SizeOverLife,
}

impl BillboardRenderer {
    pub fn new(size: SizeOverLife) -> Self {
        Self { size }
    }
}

impl Renderer for BillboardRenderer {
    type Output = Vec<BillboardInstance>;

    fn render(&self, field: &ParticleField, _view: &RenderView) -> Vec<BillboardInstance> {
        let instances: Vec<BillboardInstance> = field
            .particles()
            .map(|(slot, p)| BillboardInstance {
                slot,
                position: p.position,
                // Colors drift past their bounds when the step overshoots.
                color: p.color.clamp(Vec4::ZERO, Vec4::ONE),
                angle: p.angle,
                size: self.size.size_at(p),
            })
            .collect();
        tracing::trace!(instances = instances.len(), "billboards extracted");
        instances
    }
}

/// Plain-text frame: a header with tick, seed and counts, then one line per
/// active particle in update order.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Maximum particle lines to print; `None` prints all of them.
    pub max_lines: Option<usize>,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_lines(max_lines: usize) -> Self {
        Self {
            max_lines: Some(max_lines),
        }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, field: &ParticleField, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Field State (tick={}, seed={}) ===\n",
            field.tick(),
            field.seed()
        ));
        out.push_str(&format!(
            "Particles: {} active, {} retired, capacity {}\n",
            field.active_count(),
            field.retired_count(),
            field.capacity()
        ));
        let a = field.attractor();
        out.push_str(&format!("Attractor: ({:.2}, {:.2}, {:.2})\n", a.x, a.y, a.z));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        let limit = self.max_lines.unwrap_or(usize::MAX);
        for (slot, p) in field.particles().take(limit) {
            out.push_str(&format!(
                "  [{slot}] pos=({:.2}, {:.2}, {:.2}) age={:.2}/{:.2} rgba=({:.2}, {:.2}, {:.2}, {:.2})\n",
                p.position.x,
                p.position.y,
                p.position.z,
                p.age,
                p.life_time,
                p.color.x,
                p.color.y,
                p.color.z,
                p.color.w
            ));
        }
        if field.active_count() > limit {
            out.push_str(&format!("  ... {} more\n", field.active_count() - limit));
        }

        out
    }
}
