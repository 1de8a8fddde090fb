use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use vortex_common::SlotId;

use crate::rule::{RuleConfig, UpdateRule};
use crate::{AdvanceReport, FieldError, MAX_CAPACITY, Particle, ParticlePool, StepInput, advance};

/// Field construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Maximum number of particle slots.
    pub capacity: usize,
    /// RNG seed for the swirl term. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    /// Initial attractor position.
    pub attractor: Vec3,
    pub rule: RuleConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            capacity: 2000,
            seed: None,
            attractor: Vec3::ZERO,
            rule: RuleConfig::default(),
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(FieldError::InvalidCapacity {
                got: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        if !self.attractor.is_finite() {
            return Err(FieldError::NonFiniteAttractor);
        }
        self.rule.validate()
    }
}

/// The particle field: pool, attractor, update rule and swirl RNG.
///
/// The host calls [`ParticleField::step`] once per frame, moves the attractor
/// with [`ParticleField::set_attractor`] as its scene animates, and reads
/// particles back with [`ParticleField::particles`] for drawing.
///
/// The RNG is seeded, so given the same seed and sequence of operations two
/// fields produce identical states.
#[derive(Debug)]
pub struct ParticleField {
    pool: ParticlePool,
    attractor: Vec3,
    rule: Box<dyn UpdateRule>,
    rng: StdRng,
    seed: u64,
    tick: u64,
    last_report: AdvanceReport,
}

impl ParticleField {
    /// Build a field from `config`. Out-of-range capacities are clamped and
    /// invalid rule parameters fall back to their defaults; call
    /// [`FieldConfig::validate`] first to reject them instead.
    pub fn new(config: FieldConfig) -> Self {
        let rule = config.rule.build();
        Self::with_rule(config, rule)
    }

    /// Build a field with a custom update rule, ignoring `config.rule`.
    pub fn with_rule(config: FieldConfig, rule: Box<dyn UpdateRule>) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        if config.capacity > MAX_CAPACITY {
            tracing::warn!(
                capacity = config.capacity,
                max = MAX_CAPACITY,
                "capacity clamped"
            );
        }
        tracing::debug!(
            capacity = config.capacity,
            seed,
            rule = rule.name(),
            "particle field created"
        );
        Self {
            pool: ParticlePool::new(config.capacity),
            attractor: config.attractor,
            rule,
            rng: StdRng::seed_from_u64(seed),
            seed,
            tick: 0,
            last_report: AdvanceReport::default(),
        }
    }

    /// Number of `step` calls so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Seed the swirl RNG started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn attractor(&self) -> Vec3 {
        self.attractor
    }

    pub fn set_attractor(&mut self, attractor: Vec3) {
        self.attractor = attractor;
    }

    pub fn rule(&self) -> &dyn UpdateRule {
        self.rule.as_ref()
    }

    /// Swap the update rule. Takes effect on the next step.
    pub fn set_rule(&mut self, rule: Box<dyn UpdateRule>) {
        tracing::debug!(from = self.rule.name(), to = rule.name(), "update rule replaced");
        self.rule = rule;
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_len()
    }

    pub fn retired_count(&self) -> usize {
        self.pool.retired_len()
    }

    pub fn is_full(&self) -> bool {
        self.pool.is_full()
    }

    /// Report from the most recent step.
    pub fn last_report(&self) -> AdvanceReport {
        self.last_report
    }

    /// Insert a particle, reusing a retired slot when one is available.
    pub fn spawn(&mut self, particle: Particle) -> Option<SlotId> {
        self.pool.spawn(particle)
    }

    pub fn get(&self, slot: SlotId) -> Option<&Particle> {
        self.pool.get(slot)
    }

    /// Active particles in update order.
    pub fn particles(&self) -> impl Iterator<Item = (SlotId, &Particle)> + '_ {
        self.pool.iter_active()
    }

    /// Retire every active particle.
    pub fn clear(&mut self) {
        self.pool.clear();
    }

    /// Advance the field by one tick.
    ///
    /// Negative or non-finite speeds are treated as zero so ages never run
    /// backwards.
    pub fn step(&mut self, scaled_update_speed: f32) -> AdvanceReport {
        let _span = tracing::debug_span!("field_step", tick = self.tick + 1).entered();

        let scaled_update_speed = if scaled_update_speed.is_finite() && scaled_update_speed >= 0.0
        {
            scaled_update_speed
        } else {
            tracing::warn!(scaled_update_speed, "invalid update speed, using 0");
            0.0
        };

        let input = StepInput {
            attractor: self.attractor,
            scaled_update_speed,
        };
        let report = advance(&mut self.pool, &input, self.rule.as_ref(), &mut self.rng);
        self.tick += 1;
        self.last_report = report;

        if report.retired > 0 {
            tracing::debug!(
                retired = report.retired,
                active = self.pool.active_len(),
                "particles retired"
            );
        }
        tracing::trace!(
            visited = report.visited,
            retired_total = self.pool.retired_len(),
            "field step complete"
        );

        report
    }

    /// Deterministic hash of the tick and the active particles, in update
    /// order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        for (slot, p) in self.pool.iter_active() {
            mix(&mut h, &slot.0.to_le_bytes());
            mix(&mut h, &p.age.to_le_bytes());
            for v in p.position.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            for v in p.color.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            mix(&mut h, &p.angle.to_le_bytes());
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Drift;

    fn seeded(seed: u64) -> ParticleField {
        ParticleField::new(FieldConfig {
            capacity: 64,
            seed: Some(seed),
            ..FieldConfig::default()
        })
    }

    fn populate(field: &mut ParticleField) {
        for i in 0..32 {
            let angle = i as f32 * 0.2;
            field.spawn(Particle::new(
                Vec3::new(angle.cos() * 3.0, 0.5, angle.sin() * 3.0),
                5.0 + i as f32 * 0.25,
            ));
        }
    }

    #[test]
    fn field_starts_empty() {
        let field = seeded(1);
        assert_eq!(field.tick(), 0);
        assert_eq!(field.active_count(), 0);
        assert_eq!(field.retired_count(), 0);
        assert_eq!(field.capacity(), 64);
        assert_eq!(field.rule().name(), "attract_swirl");
    }

    #[test]
    fn step_increments_tick() {
        let mut field = seeded(1);
        field.step(1.0);
        field.step(1.0);
        assert_eq!(field.tick(), 2);
    }

    #[test]
    fn same_seed_same_state() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        populate(&mut a);
        populate(&mut b);
        for _ in 0..20 {
            a.step(0.5);
            b.step(0.5);
        }
        assert_eq!(a.state_hash(), b.state_hash());
        assert_eq!(a.active_count(), b.active_count());
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = seeded(1);
        let mut b = seeded(2);
        populate(&mut a);
        populate(&mut b);
        a.step(1.0);
        b.step(1.0);
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn unseeded_field_records_its_seed() {
        let a = ParticleField::new(FieldConfig::default());
        let b = seeded(a.seed());
        assert_eq!(a.seed(), b.seed());
    }

    #[test]
    fn particles_drain_into_retired_pool() {
        let mut field = seeded(3);
        populate(&mut field);
        let mut retired = 0;
        for _ in 0..20 {
            retired += field.step(1.0).retired;
        }
        assert_eq!(retired, 32);
        assert_eq!(field.active_count(), 0);
        assert_eq!(field.retired_count(), 32);
        assert_eq!(field.last_report().visited, 0);
    }

    #[test]
    fn invalid_speed_is_clamped() {
        let mut field = seeded(4);
        field.spawn(Particle::new(Vec3::X, 1.0).with_age(0.5));
        let report = field.step(-3.0);
        assert_eq!(report.retired, 0);
        let report = field.step(f32::NAN);
        assert_eq!(report.retired, 0);
        let (_, p) = field.particles().next().unwrap();
        assert_eq!(p.age, 0.5);
    }

    #[test]
    fn set_rule_changes_motion() {
        let mut field = seeded(5);
        let slot = field
            .spawn(Particle::new(Vec3::ZERO, 10.0).with_direction(Vec3::Y))
            .unwrap();
        field.set_rule(Box::new(Drift));
        field.step(2.0);
        assert_eq!(field.get(slot).unwrap().position, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn attractor_can_move_between_steps() {
        let mut field = seeded(6);
        let slot = field.spawn(Particle::new(Vec3::new(0.0, 0.0, 0.0), 10.0)).unwrap();
        field.set_attractor(Vec3::new(0.0, 1.0, 0.0));
        field.step(1.0);
        let y1 = field.get(slot).unwrap().position.y;
        assert!(y1 > 0.0);

        field.set_attractor(Vec3::new(0.0, -5.0, 0.0));
        field.step(1.0);
        assert!(field.get(slot).unwrap().position.y < y1);
    }

    #[test]
    fn spawn_respects_capacity() {
        let mut field = ParticleField::new(FieldConfig {
            capacity: 2,
            seed: Some(0),
            ..FieldConfig::default()
        });
        assert!(field.spawn(Particle::default()).is_some());
        assert!(field.spawn(Particle::default()).is_some());
        assert!(field.is_full());
        assert!(field.spawn(Particle::default()).is_none());
        field.clear();
        assert!(field.spawn(Particle::default()).is_some());
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: FieldConfig = serde_json::from_str(r#"{"capacity":10}"#).unwrap();
        assert_eq!(cfg.capacity, 10);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.rule, RuleConfig::default());
    }

    #[test]
    fn config_validation() {
        assert_eq!(FieldConfig::default().validate(), Ok(()));

        for capacity in [0, usize::MAX] {
            let cfg = FieldConfig {
                capacity,
                ..FieldConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(FieldError::InvalidCapacity { .. })
            ));
        }

        let cfg = FieldConfig {
            attractor: Vec3::new(f32::NAN, 0.0, 0.0),
            ..FieldConfig::default()
        };
        assert_eq!(cfg.validate(), Err(FieldError::NonFiniteAttractor));

        let cfg: FieldConfig = serde_json::from_str(
            r#"{"rule":{"kind":"attract_swirl","min_distance_sq":0.0}}"#,
        )
        .unwrap();
        assert!(matches!(
            cfg.validate(),
            Err(FieldError::InvalidRuleParameter { name: "min_distance_sq", .. })
        ));
    }

    #[test]
    fn bad_rule_parameters_are_sanitized_on_build() {
        let mut field = ParticleField::new(FieldConfig {
            capacity: 8,
            seed: Some(7),
            rule: RuleConfig::AttractSwirl(crate::AttractSwirl {
                swirl_max: f32::INFINITY,
                min_distance_sq: 0.0,
                ..crate::AttractSwirl::default()
            }),
            ..FieldConfig::default()
        });
        let slot = field.spawn(Particle::new(Vec3::ZERO, 10.0)).unwrap();
        for _ in 0..3 {
            field.step(1.0);
        }
        assert!(field.get(slot).unwrap().position.is_finite());
    }

    #[test]
    fn oversized_capacity_is_clamped() {
        let field = ParticleField::new(FieldConfig {
            capacity: usize::MAX,
            seed: Some(8),
            ..FieldConfig::default()
        });
        assert_eq!(field.capacity(), MAX_CAPACITY);
    }
}
