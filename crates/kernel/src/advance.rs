use glam::Vec3;
use rand::RngCore;

use crate::{ParticlePool, UpdateRule};

/// Inputs shared by every particle in one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInput {
    /// Current attractor position, supplied by the host each tick.
    pub attractor: Vec3,
    /// Time-step multiplier normalizing simulation rate to frame rate.
    pub scaled_update_speed: f32,
}

/// Bookkeeping from one `advance` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Active particles at entry; each was visited exactly once.
    pub visited: usize,
    /// Particles moved to the retired list this call.
    pub retired: usize,
}

impl AdvanceReport {
    pub fn survived(&self) -> usize {
        self.visited - self.retired
    }
}

/// Advance every active particle by one tick.
///
/// Each particle ages by `scaled_update_speed` first. A particle whose age
/// reaches its lifetime is retired on the spot and keeps its last live
/// position and color; survivors go through `rule`.
///
/// Retirement swap-removes from the active list, so the index only moves
/// forward after a survivor. The particle swapped into a vacated index has not
/// been visited yet and is processed next.
pub fn advance(
    pool: &mut ParticlePool,
    step: &StepInput,
    rule: &dyn UpdateRule,
    rng: &mut dyn RngCore,
) -> AdvanceReport {
    let visited = pool.active_len();
    let mut retired = 0;
    let mut index = 0;

    while index < pool.active_len() {
        let slot = pool.active_slot(index);
        let particle = pool.particle_mut(slot);
        particle.age += step.scaled_update_speed;

        if particle.age >= particle.life_time {
            pool.retire_at(index);
            retired += 1;
            continue;
        }

        rule.update(particle, step, rng);
        index += 1;
    }

    AdvanceReport { visited, retired }
}
