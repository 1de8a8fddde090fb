use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use vortex_common::splitmix64;
use vortex_emit::Emitter;
use vortex_kernel::ParticleField;
use vortex_render::{
    BillboardInstance, BillboardRenderer, DebugTextRenderer, PostFilter, Renderer,
};

use crate::clock::{FrameTimer, animation_ratio};
use crate::config::{ConfigError, SceneConfig};

/// What happened during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub scaled_update_speed: f32,
    pub emitted: usize,
    /// Emission requests lost to a full pool.
    pub dropped: usize,
    pub retired: usize,
    pub active: usize,
    /// Wall-clock time spent inside `frame`.
    pub cost: Duration,
}

/// Host-side frame loop around a particle field.
///
/// Each frame moves the attractor (if it orbits), steps the field, then
/// emits new particles at the attractor, the way the engine's particle
/// system animates before it spawns.
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    field: ParticleField,
    emitter: Emitter,
    emit_rng: StdRng,
    billboards: BillboardRenderer,
    timer: FrameTimer,
    elapsed: Duration,
    frames: u64,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let field = ParticleField::new(config.field);
        let emitter = Emitter::new(config.emitter)?;
        // Emission draws from its own stream so the swirl sequence does not
        // depend on how many particles were emitted.
        let emit_rng = StdRng::seed_from_u64(splitmix64(field.seed()));
        tracing::info!(
            seed = field.seed(),
            capacity = field.capacity(),
            rule = field.rule().name(),
            "scene created"
        );
        Ok(Self {
            config,
            field,
            emitter,
            emit_rng,
            billboards: BillboardRenderer::new(config.render.size),
            timer: FrameTimer::default(),
            elapsed: Duration::ZERO,
            frames: 0,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// Simulated wall-clock time so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Step size for a frame that took `delta`.
    pub fn scaled_update_speed(&self, delta: Duration) -> f32 {
        self.config.run.update_speed * animation_ratio(delta)
    }

    /// Run one frame of `delta` wall-clock time.
    pub fn frame(&mut self, delta: Duration) -> FrameStats {
        let _span = tracing::debug_span!("scene_frame", frame = self.frames + 1).entered();
        let start = Instant::now();

        self.elapsed += delta;
        if let Some(orbit) = self.config.orbit {
            self.field
                .set_attractor(orbit.position_at(self.elapsed.as_secs_f32()));
        }

        let speed = self.scaled_update_speed(delta);
        let advance = self.field.step(speed);
        let origin = self.field.attractor();
        let emit = self
            .emitter
            .emit(&mut self.field, origin, speed, &mut self.emit_rng);

        self.frames += 1;
        let cost = start.elapsed();
        self.timer.record(cost);

        let stats = FrameStats {
            frame: self.frames,
            scaled_update_speed: speed,
            emitted: emit.spawned,
            dropped: emit.dropped(),
            retired: advance.retired,
            active: self.field.active_count(),
            cost,
        };
        tracing::trace!(
            emitted = stats.emitted,
            retired = stats.retired,
            active = stats.active,
            "frame complete"
        );
        stats
    }

    /// Run `count` frames of equal length.
    pub fn run(&mut self, count: u64, delta: Duration) -> Vec<FrameStats> {
        (0..count).map(|_| self.frame(delta)).collect()
    }

    /// Billboards for the current state, post filter applied.
    pub fn billboards(&self) -> Vec<BillboardInstance> {
        let mut instances = self.billboards.render(&self.field, &self.config.render.view);
        if let Some(filter) = &self.config.render.threshold {
            filter.apply(&mut instances);
        }
        instances
    }

    /// Text dump of the current state, at most `max_lines` particles.
    pub fn debug_text(&self, max_lines: usize) -> String {
        DebugTextRenderer::with_max_lines(max_lines).render(&self.field, &self.config.render.view)
    }
}
