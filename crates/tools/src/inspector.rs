use serde::Serialize;
use vortex_common::SlotId;
use vortex_kernel::ParticleField;

/// Field inspector for developer tooling.
///
/// Provides read-only queries against the field for debugging, profiling,
/// and CLI output.
pub struct FieldInspector;

impl FieldInspector {
    /// Produce a summary of the field state.
    pub fn summary(field: &ParticleField) -> FieldSummary {
        let attractor = field.attractor();
        let mut count = 0usize;
        let mut total = 0.0f64;
        let mut min = f32::INFINITY;
        let mut max = 0.0f32;
        for (_, p) in field.particles() {
            let d = p.position.distance(attractor);
            count += 1;
            total += d as f64;
            min = min.min(d);
            max = max.max(d);
        }
        let (mean_distance, min_distance, max_distance) = if count == 0 {
            (0.0, 0.0, 0.0)
        } else {
            ((total / count as f64) as f32, min, max)
        };

        FieldSummary {
            tick: field.tick(),
            seed: field.seed(),
            active: field.active_count(),
            retired: field.retired_count(),
            capacity: field.capacity(),
            rule: field.rule().name(),
            mean_distance,
            min_distance,
            max_distance,
        }
    }

    /// Details of the particle in `slot`, active or retired.
    pub fn inspect(field: &ParticleField, slot: SlotId) -> Option<ParticleInfo> {
        field.get(slot).map(|p| ParticleInfo {
            slot,
            active: field.pool().is_active(slot),
            age: p.age,
            life_time: p.life_time,
            position: p.position.to_array(),
            color: p.color.to_array(),
            angle: p.angle,
            distance: p.position.distance(field.attractor()),
        })
    }

    /// List active slots in update order.
    pub fn list_active(field: &ParticleField) -> Vec<SlotId> {
        field.pool().active().to_vec()
    }
}

/// Summary of field state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub tick: u64,
    pub seed: u64,
    pub active: usize,
    pub retired: usize,
    pub capacity: usize,
    pub rule: &'static str,
    /// Distances of active particles to the attractor.
    pub mean_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl std::fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Field: tick={} seed={} rule={} active={} retired={} capacity={} dist(mean={:.3} min={:.3} max={:.3})",
            self.tick,
            self.seed,
            self.rule,
            self.active,
            self.retired,
            self.capacity,
            self.mean_distance,
            self.min_distance,
            self.max_distance,
        )
    }
}

/// Detailed info about a single particle.
#[derive(Debug, Clone, Serialize)]
pub struct ParticleInfo {
    pub slot: SlotId,
    pub active: bool,
    pub age: f32,
    pub life_time: f32,
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub angle: f32,
    pub distance: f32,
}

impl std::fmt::Display for ParticleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Particle [{}] {} pos=({:.2}, {:.2}, {:.2}) age={:.2}/{:.2} dist={:.3}",
            self.slot,
            if self.active { "active" } else { "retired" },
            self.position[0],
            self.position[1],
            self.position[2],
            self.age,
            self.life_time,
            self.distance,
        )
    }
}
