use glam::{Vec3, Vec4};
use rand::Rng;
use serde::{Deserialize, Serialize};
use vortex_common::Span;
use vortex_kernel::{Particle, ParticleField};

/// Errors from emitter configuration.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("invalid range for {name}: min={min} max={max}")]
    InvalidSpan { name: &'static str, min: f32, max: f32 },
    #[error("life time must be positive, got min={0}")]
    NonPositiveLifeTime(f32),
    #[error("emit rate must be finite and non-negative, got {0}")]
    InvalidRate(f32),
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    #[error("emit box is inverted: min={min:?} max={max:?}")]
    InvalidBox { min: Vec3, max: Vec3 },
}

/// Where new particles appear, relative to the emitter origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmitterShape {
    /// Every particle starts at the origin.
    Point,
    /// Uniformly inside an axis-aligned box offset from the origin.
    Box { min: Vec3, max: Vec3 },
}

impl Default for EmitterShape {
    fn default() -> Self {
        Self::Box {
            min: Vec3::splat(-0.5),
            max: Vec3::splat(0.5),
        }
    }
}

/// Emission parameters. Ranges are sampled uniformly per particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Particles per unit of scaled update speed.
    pub emit_rate: f32,
    /// Emit this many particles once and disable rate emission.
    pub manual_emit_count: Option<u32>,
    pub life_time: Span,
    /// Multiplier on the sampled direction.
    pub emit_power: Span,
    pub angular_speed: Span,
    pub initial_rotation: Span,
    pub color1: Vec4,
    pub color2: Vec4,
    /// Color a particle fades to at the end of its life.
    pub color_dead: Vec4,
    pub direction1: Vec3,
    pub direction2: Vec3,
    pub shape: EmitterShape,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            emit_rate: 10.0,
            manual_emit_count: None,
            life_time: Span::fixed(1.0),
            emit_power: Span::fixed(1.0),
            angular_speed: Span::fixed(0.0),
            initial_rotation: Span::fixed(0.0),
            color1: Vec4::ONE,
            color2: Vec4::ONE,
            color_dead: Vec4::new(0.0, 0.0, 0.0, 1.0),
            direction1: Vec3::Y,
            direction2: Vec3::Y,
            shape: EmitterShape::default(),
        }
    }
}

impl EmitterConfig {
    pub fn validate(&self) -> Result<(), EmitError> {
        if !self.emit_rate.is_finite() || self.emit_rate < 0.0 {
            return Err(EmitError::InvalidRate(self.emit_rate));
        }
        let spans = [
            ("life_time", self.life_time),
            ("emit_power", self.emit_power),
            ("angular_speed", self.angular_speed),
            ("initial_rotation", self.initial_rotation),
        ];
        for (name, span) in spans {
            if !span.is_valid() {
                return Err(EmitError::InvalidSpan {
                    name,
                    min: span.min,
                    max: span.max,
                });
            }
        }
        if self.life_time.min <= 0.0 {
            return Err(EmitError::NonPositiveLifeTime(self.life_time.min));
        }
        let colors = [
            ("color1", self.color1),
            ("color2", self.color2),
            ("color_dead", self.color_dead),
        ];
        if let Some((name, _)) = colors.iter().find(|(_, c)| !c.is_finite()) {
            return Err(EmitError::NonFinite(*name));
        }
        let directions = [("direction1", self.direction1), ("direction2", self.direction2)];
        if let Some((name, _)) = directions.iter().find(|(_, d)| !d.is_finite()) {
            return Err(EmitError::NonFinite(*name));
        }
        if let EmitterShape::Box { min, max } = self.shape {
            if !(min.is_finite() && max.is_finite()) {
                return Err(EmitError::NonFinite("shape bounds"));
            }
            if min.cmpgt(max).any() {
                return Err(EmitError::InvalidBox { min, max });
            }
        }
        Ok(())
    }
}

/// Result of one `emit` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub requested: usize,
    pub spawned: usize,
}

impl EmitReport {
    /// Requests that found no free slot.
    pub fn dropped(&self) -> usize {
        self.requested - self.spawned
    }
}

/// Rate-based emitter.
///
/// Each call accumulates `emit_rate * scaled_update_speed`; the whole part is
/// emitted and the fraction carries over to the next call.
#[derive(Debug, Clone)]
pub struct Emitter {
    config: EmitterConfig,
    excess: f32,
    pending_burst: Option<u32>,
    total_emitted: u64,
}

impl Emitter {
    pub fn new(config: EmitterConfig) -> Result<Self, EmitError> {
        config.validate()?;
        Ok(Self {
            config,
            excess: 0.0,
            pending_burst: config.manual_emit_count,
            total_emitted: 0,
        })
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn total_emitted(&self) -> u64 {
        self.total_emitted
    }

    /// Queue a one-shot burst for the next `emit` call.
    pub fn trigger_burst(&mut self, count: u32) {
        self.pending_burst = Some(count);
    }

    /// Number of particles due this call.
    fn due(&mut self, scaled_update_speed: f32) -> usize {
        if let Some(count) = self.pending_burst.take() {
            self.excess = 0.0;
            return count as usize;
        }
        if self.config.manual_emit_count.is_some() {
            return 0;
        }
        self.excess += self.config.emit_rate * scaled_update_speed.max(0.0);
        let whole = self.excess.floor();
        self.excess -= whole;
        whole as usize
    }

    /// Spawn the particles due this frame at `origin`.
    pub fn emit<R: Rng>(
        &mut self,
        field: &mut ParticleField,
        origin: Vec3,
        scaled_update_speed: f32,
        rng: &mut R,
    ) -> EmitReport {
        let requested = self.due(scaled_update_speed);
        let mut spawned = 0;
        for _ in 0..requested {
            let particle = self.make_particle(origin, rng);
            if field.spawn(particle).is_none() {
                tracing::debug!(
                    dropped = requested - spawned,
                    capacity = field.capacity(),
                    "pool full, emission dropped"
                );
                break;
            }
            spawned += 1;
        }
        self.total_emitted += spawned as u64;
        if spawned > 0 {
            tracing::trace!(spawned, active = field.active_count(), "particles emitted");
        }
        EmitReport { requested, spawned }
    }

    /// Sample a fresh particle at `origin`.
    pub fn make_particle<R: Rng>(&self, origin: Vec3, rng: &mut R) -> Particle {
        let c = &self.config;
        let life_time = c.life_time.lerp(rng.random());

        let offset = match c.shape {
            EmitterShape::Point => Vec3::ZERO,
            EmitterShape::Box { min, max } => min + random_vec3(rng) * (max - min),
        };

        let direction = c.direction1 + random_vec3(rng) * (c.direction2 - c.direction1);
        let power = c.emit_power.lerp(rng.random());

        let color = c.color1.lerp(c.color2, rng.random());
        let color_step = (c.color_dead - color) / life_time;

        Particle::new(origin + offset, life_time)
            .with_direction(direction * power)
            .with_color(color, color_step)
            .with_rotation(
                c.initial_rotation.lerp(rng.random()),
                c.angular_speed.lerp(rng.random()),
            )
    }
}

/// Independent uniform `[0, 1)` per component.
fn random_vec3<R: Rng>(rng: &mut R) -> Vec3 {
    Vec3::new(rng.random(), rng.random(), rng.random())
}
