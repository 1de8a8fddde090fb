use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::BillboardInstance;

/// Color pass applied to billboards before they are handed to the host.
pub trait PostFilter {
    fn apply(&self, instances: &mut [BillboardInstance]);
}

/// Red-channel cut: colors with `r >= threshold` become transparent black,
/// everything darker passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdFilter {
    pub threshold: f32,
}

impl Default for ThresholdFilter {
    fn default() -> Self {
        Self { threshold: 0.3 }
    }
}

impl ThresholdFilter {
    pub fn filter_color(&self, color: Vec4) -> Vec4 {
        if color.x < self.threshold {
            color
        } else {
            Vec4::ZERO
        }
    }
}

impl PostFilter for ThresholdFilter {
    fn apply(&self, instances: &mut [BillboardInstance]) {
        let mut cut = 0usize;
        for instance in instances.iter_mut() {
            let filtered = self.filter_color(instance.color);
            if filtered != instance.color {
                cut += 1;
            }
            instance.color = filtered;
        }
        tracing::trace!(cut, threshold = self.threshold, "threshold filter applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use vortex_common::SlotId;

    fn instance(red: f32) -> BillboardInstance {
        BillboardInstance {
            slot: SlotId(0),
            position: Vec3::ZERO,
            color: Vec4::new(red, 0.4, 0.6, 1.0),
            angle: 0.0,
            size: 1.0,
        }
    }

    #[test]
    fn dark_red_passes() {
        let f = ThresholdFilter::default();
        let c = Vec4::new(0.29, 0.9, 0.9, 1.0);
        assert_eq!(f.filter_color(c), c);
    }

    #[test]
    fn threshold_itself_is_cut() {
        let f = ThresholdFilter { threshold: 0.5 };
        assert_eq!(f.filter_color(Vec4::new(0.5, 0.0, 0.0, 1.0)), Vec4::ZERO);
        assert_eq!(f.filter_color(Vec4::ONE), Vec4::ZERO);
    }

    #[test]
    fn apply_filters_every_instance() {
        let mut instances = vec![instance(0.1), instance(0.8), instance(0.3)];
        ThresholdFilter::default().apply(&mut instances);
        assert_eq!(instances[0].color, Vec4::new(0.1, 0.4, 0.6, 1.0));
        assert_eq!(instances[1].color, Vec4::ZERO);
        assert_eq!(instances[2].color, Vec4::ZERO);
        assert_eq!(instances[1].size, 1.0);
    }
}
