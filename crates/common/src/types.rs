use glam::Vec3;
use serde::{Deserialize, Serialize};

/// World up axis. The swirl force circulates around it.
pub const UP: Vec3 = Vec3::Y;

/// Index of a particle slot in the field's arena.
///
/// Slots are stable for the lifetime of the arena: a retired slot keeps its
/// id and is handed out again when the emitter reuses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl SlotId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed scalar range used for randomized spawn parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A span that always yields `value`.
    pub const fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Linear interpolation inside the span, `t` in `[0, 1]`.
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }

    /// Both bounds finite and ordered.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::fixed(0.0)
    }
}

/// Splitmix64 step. Used to derive independent, reproducible seeds from a
/// single scene seed.
pub fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_id_orders_by_index() {
        let a = SlotId(3);
        let b = SlotId(7);
        assert!(a < b);
        assert_eq!(b.index(), 7);
        assert_eq!(a.to_string(), "#3");
    }

    #[test]
    fn span_lerp_hits_bounds() {
        let s = Span::new(2.0, 6.0);
        assert_eq!(s.lerp(0.0), 2.0);
        assert_eq!(s.lerp(1.0), 6.0);
        assert_eq!(s.lerp(0.5), 4.0);
    }

    #[test]
    fn span_validity() {
        assert!(Span::new(1.0, 1.0).is_valid());
        assert!(!Span::new(2.0, 1.0).is_valid());
        assert!(!Span::new(f32::NAN, 1.0).is_valid());
        assert_eq!(Span::default(), Span::fixed(0.0));
    }

    #[test]
    fn splitmix_is_deterministic_and_mixes() {
        assert_eq!(splitmix64(42), splitmix64(42));
        assert_ne!(splitmix64(1), splitmix64(2));
        assert_ne!(splitmix64(0), 0);
    }

    #[test]
    fn up_is_y() {
        assert_eq!(UP, Vec3::new(0.0, 1.0, 0.0));
    }
}
