use std::collections::VecDeque;
use std::time::Duration;

/// Frame duration relative to a 60 Hz frame: 1.0 at 16.67 ms, 2.0 at 33.3 ms.
pub fn animation_ratio(delta: Duration) -> f32 {
    delta.as_secs_f32() * 60.0
}

/// Rolling window of recent frame costs.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    history: VecDeque<Duration>,
    capacity: usize,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a frame, evicting the oldest one once the window is full.
    pub fn record(&mut self, dt: Duration) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(dt);
    }

    pub fn count(&self) -> usize {
        self.history.len()
    }

    pub fn total(&self) -> Duration {
        self.history.iter().sum()
    }

    pub fn average(&self) -> Duration {
        if self.history.is_empty() {
            return Duration::ZERO;
        }
        self.total() / self.history.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.history.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.history.iter().copied().min().unwrap_or(Duration::ZERO)
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}
