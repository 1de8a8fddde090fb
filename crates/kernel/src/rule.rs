//! Update rules applied to live particles.
//!
//! The kernel handles aging and retirement itself; a rule only sees particles
//! that survived this tick's age check. Rules are stateless: everything they
//! read comes in through [`StepInput`] and the random source.

use glam::Vec3;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use vortex_common::UP;

use crate::{FieldError, Particle, StepInput};

/// Gain of the inverse-square pull toward the attractor.
pub const ATTRACTION_GAIN: f32 = 0.005;
/// Upper bound (exclusive) of the per-particle swirl power.
pub const SWIRL_MAX: f32 = 0.02;
/// Floor for the squared distance to the attractor.
pub const MIN_DISTANCE_SQ: f32 = 1e-6;

/// Per-tick update of a live particle.
pub trait UpdateRule: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn update(&self, particle: &mut Particle, step: &StepInput, rng: &mut dyn RngCore);
}

/// Color and rotation advance shared by every rule.
fn advance_appearance(particle: &mut Particle, speed: f32) {
    particle.color += particle.color_step * speed;
    particle.angle += particle.angular_speed * speed;
}

/// Inverse-square attraction toward the attractor plus a random swirl around
/// the up axis. Ignores `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttractSwirl {
    pub gain: f32,
    pub swirl_max: f32,
    /// Squared distances below this are clamped up to it.
    pub min_distance_sq: f32,
}

impl Default for AttractSwirl {
    fn default() -> Self {
        Self {
            gain: ATTRACTION_GAIN,
            swirl_max: SWIRL_MAX,
            min_distance_sq: MIN_DISTANCE_SQ,
        }
    }
}

impl AttractSwirl {
    /// Pull on a particle at `position`: `(attractor - position) * gain / d²`.
    pub fn attraction(&self, position: Vec3, attractor: Vec3) -> Vec3 {
        let to_attractor = attractor - position;
        let d2 = to_attractor.length_squared().max(self.min_distance_sq);
        to_attractor * (self.gain / d2)
    }

    /// Tangential push `(position × up) * power`.
    pub fn swirl(&self, position: Vec3, power: f32) -> Vec3 {
        position.cross(UP) * power
    }

    /// Reject parameters that would panic the sampler or switch off the
    /// distance floor.
    pub fn validate(&self) -> Result<(), FieldError> {
        if !self.gain.is_finite() {
            return Err(FieldError::InvalidRuleParameter {
                name: "gain",
                value: self.gain,
                expected: "finite",
            });
        }
        if !(self.swirl_max.is_finite() && self.swirl_max >= 0.0) {
            return Err(FieldError::InvalidRuleParameter {
                name: "swirl_max",
                value: self.swirl_max,
                expected: "finite and non-negative",
            });
        }
        if !(self.min_distance_sq.is_finite() && self.min_distance_sq > 0.0) {
            return Err(FieldError::InvalidRuleParameter {
                name: "min_distance_sq",
                value: self.min_distance_sq,
                expected: "finite and positive",
            });
        }
        Ok(())
    }

    /// Copy with every invalid parameter replaced by its default.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            gain: if self.gain.is_finite() {
                self.gain
            } else {
                defaults.gain
            },
            swirl_max: if self.swirl_max.is_finite() && self.swirl_max >= 0.0 {
                self.swirl_max
            } else {
                defaults.swirl_max
            },
            min_distance_sq: if self.min_distance_sq.is_finite() && self.min_distance_sq > 0.0 {
                self.min_distance_sq
            } else {
                defaults.min_distance_sq
            },
        }
    }

    fn swirl_power(&self, rng: &mut dyn RngCore) -> f32 {
        if self.swirl_max.is_finite() && self.swirl_max > 0.0 {
            rng.random_range(0.0..self.swirl_max)
        } else {
            0.0
        }
    }
}

impl UpdateRule for AttractSwirl {
    fn name(&self) -> &'static str {
        "attract_swirl"
    }

    fn update(&self, particle: &mut Particle, step: &StepInput, rng: &mut dyn RngCore) {
        let speed = step.scaled_update_speed;
        advance_appearance(particle, speed);

        let attraction = self.attraction(particle.position, step.attractor);
        let swirl = self.swirl(particle.position, self.swirl_power(rng));
        particle.position += (swirl + attraction) * speed;
    }
}

/// Straight-line motion along `direction`, the engine's stock behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Drift;

impl UpdateRule for Drift {
    fn name(&self) -> &'static str {
        "drift"
    }

    fn update(&self, particle: &mut Particle, step: &StepInput, _rng: &mut dyn RngCore) {
        let speed = step.scaled_update_speed;
        advance_appearance(particle, speed);
        particle.position += particle.direction * speed;
    }
}

/// Serializable rule selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleConfig {
    AttractSwirl(AttractSwirl),
    Drift,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::AttractSwirl(AttractSwirl::default())
    }
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), FieldError> {
        match self {
            RuleConfig::AttractSwirl(rule) => rule.validate(),
            RuleConfig::Drift => Ok(()),
        }
    }

    /// Instantiate the rule. Invalid parameters fall back to their defaults.
    pub fn build(&self) -> Box<dyn UpdateRule> {
        match self {
            RuleConfig::AttractSwirl(rule) => {
                if let Err(err) = rule.validate() {
                    tracing::warn!(%err, "invalid attract_swirl parameters, using defaults");
                }
                Box::new(rule.sanitized())
            }
            RuleConfig::Drift => Box::new(Drift),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn step(attractor: Vec3, speed: f32) -> StepInput {
        StepInput {
            attractor,
            scaled_update_speed: speed,
        }
    }

    #[test]
    fn attraction_unit_distance() {
        let rule = AttractSwirl::default();
        let force = rule.attraction(Vec3::X, Vec3::ZERO);
        assert_eq!(force, Vec3::new(-0.005, 0.0, 0.0));
    }

    #[test]
    fn attraction_falls_off_with_square() {
        let rule = AttractSwirl::default();
        let near = rule.attraction(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO).length();
        let far = rule.attraction(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO).length();
        // |to| * gain / |to|² = gain / |to|
        assert!((near - 0.005).abs() < 1e-7);
        assert!((far - 0.0025).abs() < 1e-7);
    }

    #[test]
    fn attraction_at_attractor_is_finite() {
        let rule = AttractSwirl::default();
        let force = rule.attraction(Vec3::ONE, Vec3::ONE);
        assert!(force.is_finite());
        assert_eq!(force, Vec3::ZERO);

        let close = rule.attraction(Vec3::new(1e-6, 0.0, 0.0), Vec3::ZERO);
        assert!(close.is_finite());
    }

    #[test]
    fn swirl_is_tangential_to_up() {
        let rule = AttractSwirl::default();
        let swirl = rule.swirl(Vec3::X, 1.0);
        assert_eq!(swirl, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(swirl.dot(UP), 0.0);
        assert_eq!(rule.swirl(UP * 3.0, 0.01), Vec3::ZERO);
    }

    #[test]
    fn swirl_power_stays_in_range() {
        let rule = AttractSwirl::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let power = rule.swirl_power(&mut rng);
            assert!((0.0..SWIRL_MAX).contains(&power));
        }
    }

    #[test]
    fn zero_swirl_max_disables_swirl() {
        let rule = AttractSwirl {
            swirl_max: 0.0,
            ..AttractSwirl::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = Particle::new(Vec3::X, 10.0);
        rule.update(&mut p, &step(Vec3::ZERO, 1.0), &mut rng);
        assert!((p.position - Vec3::new(0.995, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn attract_swirl_ignores_direction() {
        let rule = AttractSwirl {
            swirl_max: 0.0,
            ..AttractSwirl::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut with_dir = Particle::new(Vec3::X, 10.0).with_direction(Vec3::splat(5.0));
        let mut without = Particle::new(Vec3::X, 10.0);
        rule.update(&mut with_dir, &step(Vec3::ZERO, 1.0), &mut rng);
        rule.update(&mut without, &step(Vec3::ZERO, 1.0), &mut rng);
        assert_eq!(with_dir.position, without.position);
        assert_eq!(with_dir.direction, Vec3::splat(5.0));
    }

    #[test]
    fn drift_moves_along_direction() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = Particle::new(Vec3::ZERO, 10.0)
            .with_direction(Vec3::new(0.0, 2.0, 0.0))
            .with_color(Vec4::ONE, Vec4::splat(-0.25))
            .with_rotation(0.0, 1.0);
        Drift.update(&mut p, &step(Vec3::ZERO, 0.5), &mut rng);
        assert_eq!(p.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(p.color, Vec4::splat(0.875));
        assert_eq!(p.angle, 0.5);
    }

    #[test]
    fn rule_config_builds_named_rules() {
        assert_eq!(RuleConfig::default().build().name(), "attract_swirl");
        assert_eq!(RuleConfig::Drift.build().name(), "drift");
    }

    #[test]
    fn rule_config_tagged_serde() {
        let json = r#"{"kind":"attract_swirl","gain":0.01}"#;
        let cfg: RuleConfig = serde_json::from_str(json).unwrap();
        match cfg {
            RuleConfig::AttractSwirl(rule) => {
                assert_eq!(rule.gain, 0.01);
                assert_eq!(rule.swirl_max, SWIRL_MAX);
            }
            RuleConfig::Drift => panic!("expected attract_swirl"),
        }
        let drift: RuleConfig = serde_json::from_str(r#"{"kind":"drift"}"#).unwrap();
        assert_eq!(drift, RuleConfig::Drift);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let bad = [
            AttractSwirl {
                swirl_max: f32::INFINITY,
                ..AttractSwirl::default()
            },
            AttractSwirl {
                swirl_max: -0.1,
                ..AttractSwirl::default()
            },
            AttractSwirl {
                min_distance_sq: 0.0,
                ..AttractSwirl::default()
            },
            AttractSwirl {
                min_distance_sq: -1.0,
                ..AttractSwirl::default()
            },
            AttractSwirl {
                min_distance_sq: f32::NAN,
                ..AttractSwirl::default()
            },
            AttractSwirl {
                gain: f32::INFINITY,
                ..AttractSwirl::default()
            },
        ];
        for rule in bad {
            assert!(
                matches!(
                    RuleConfig::AttractSwirl(rule).validate(),
                    Err(FieldError::InvalidRuleParameter { .. })
                ),
                "{rule:?} should be rejected"
            );
            assert_eq!(rule.sanitized().validate(), Ok(()));
        }
        assert_eq!(RuleConfig::default().validate(), Ok(()));
        assert_eq!(RuleConfig::Drift.validate(), Ok(()));
    }

    #[test]
    fn built_rule_survives_infinite_swirl() {
        let rule = RuleConfig::AttractSwirl(AttractSwirl {
            swirl_max: f32::INFINITY,
            ..AttractSwirl::default()
        })
        .build();
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = Particle::new(Vec3::new(2.0, 0.0, 1.0), 10.0);
        for _ in 0..10 {
            rule.update(&mut p, &step(Vec3::ZERO, 1.0), &mut rng);
        }
        assert!(p.position.is_finite());
    }

    #[test]
    fn built_rule_keeps_distance_floor() {
        for floor in [0.0, -1.0, f32::NAN] {
            let rule = RuleConfig::AttractSwirl(AttractSwirl {
                min_distance_sq: floor,
                ..AttractSwirl::default()
            })
            .build();
            let mut rng = StdRng::seed_from_u64(4);
            let mut p = Particle::new(Vec3::ZERO, 10.0);
            rule.update(&mut p, &step(Vec3::ZERO, 1.0), &mut rng);
            assert!(p.position.is_finite(), "floor {floor} produced {:?}", p.position);
        }
    }
}
