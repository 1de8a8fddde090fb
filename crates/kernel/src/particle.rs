use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// A single particle in the field.
///
/// The emitter fills every field at spawn time. Afterwards the kernel only
/// touches `age`, `position`, `angle` and `color`; `life_time` and
/// `direction` stay as spawned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Elapsed lifetime in simulation time units.
    pub age: f32,
    /// Age at which the particle retires.
    pub life_time: f32,
    pub position: Vec3,
    /// Per-step displacement basis. Only the drift rule moves along it.
    pub direction: Vec3,
    /// Rotation in radians.
    pub angle: f32,
    pub angular_speed: f32,
    /// RGBA color.
    pub color: Vec4,
    /// Per-step color increment toward the dead color.
    pub color_step: Vec4,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            age: 0.0,
            life_time: 1.0,
            position: Vec3::ZERO,
            direction: Vec3::ZERO,
            angle: 0.0,
            angular_speed: 0.0,
            color: Vec4::ONE,
            color_step: Vec4::ZERO,
        }
    }
}

impl Particle {
    /// Create a fresh particle at `position` that lives for `life_time`.
    pub fn new(position: Vec3, life_time: f32) -> Self {
        Self {
            position,
            life_time,
            ..Default::default()
        }
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_color(mut self, color: Vec4, color_step: Vec4) -> Self {
        self.color = color;
        self.color_step = color_step;
        self
    }

    pub fn with_rotation(mut self, angle: f32, angular_speed: f32) -> Self {
        self.angle = angle;
        self.angular_speed = angular_speed;
        self
    }

    pub fn with_age(mut self, age: f32) -> Self {
        self.age = age;
        self
    }

    pub fn is_live(&self) -> bool {
        self.age < self.life_time
    }

    /// Age as a fraction of lifetime: 0 at spawn, 1 at retirement.
    pub fn normalized_age(&self) -> f32 {
        if self.life_time <= 0.0 {
            return 1.0;
        }
        (self.age / self.life_time).clamp(0.0, 1.0)
    }
}
