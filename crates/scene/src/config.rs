use std::path::{Path, PathBuf};
use std::time::Duration;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use vortex_common::Span;
use vortex_emit::{EmitError, EmitterConfig, EmitterShape};
use vortex_kernel::{FieldConfig, FieldError};
use vortex_render::{RenderView, SizeOverLife, ThresholdFilter};

/// Errors from loading or validating a scene config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {} (expected .yaml, .yml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("invalid field: {0}")]
    Field(#[from] FieldError),
    #[error("invalid emitter: {0}")]
    Emitter(#[from] EmitError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Circular motion of the attractor around `center` in the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    pub center: Vec3,
    pub radius: f32,
    /// Radians per second.
    pub angular_speed: f32,
}

impl Orbit {
    pub fn position_at(&self, seconds: f32) -> Vec3 {
        let theta = self.angular_speed * seconds;
        self.center + Vec3::new(theta.cos(), 0.0, theta.sin()) * self.radius
    }
}

/// Frame loop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Simulation time per 60 Hz frame.
    pub update_speed: f32,
    /// Fixed frame duration used by the CLI loop.
    pub frame_ms: f32,
    pub frames: u64,
}

impl RunConfig {
    /// `frame_ms` as a `Duration`; fails when it is not positive or too long
    /// to represent.
    pub fn frame_duration(&self) -> Result<Duration, ConfigError> {
        match Duration::try_from_secs_f32(self.frame_ms / 1000.0) {
            Ok(d) if !d.is_zero() => Ok(d),
            _ => Err(ConfigError::Invalid(format!(
                "run.frame_ms must be positive and representable, got {}",
                self.frame_ms
            ))),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            update_speed: 0.01,
            frame_ms: 1000.0 / 60.0,
            frames: 600,
        }
    }
}

/// Read-back settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub view: RenderView,
    pub size: SizeOverLife,
    /// Red-threshold post filter; off when absent.
    pub threshold: Option<ThresholdFilter>,
}

/// Everything needed to build a [`crate::Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub field: FieldConfig,
    pub emitter: EmitterConfig,
    pub render: RenderConfig,
    pub run: RunConfig,
    /// Attractor animation; the attractor stays at `field.attractor` when absent.
    pub orbit: Option<Orbit>,
}

impl Default for SceneConfig {
    /// The demo scene: a swirl of short-lived sparks drawn into a sphere
    /// resting one unit above the ground.
    fn default() -> Self {
        Self {
            field: FieldConfig {
                attractor: Vec3::new(0.0, 1.0, 0.0),
                ..FieldConfig::default()
            },
            emitter: EmitterConfig {
                emit_rate: 1500.0,
                life_time: Span::new(0.3, 1.5),
                emit_power: Span::new(1.0, 3.0),
                angular_speed: Span::new(0.0, std::f32::consts::PI),
                color1: Vec4::new(0.7, 0.8, 1.0, 1.0),
                color2: Vec4::new(0.2, 0.5, 1.0, 1.0),
                color_dead: Vec4::new(0.0, 0.0, 0.2, 0.0),
                direction1: Vec3::new(-7.0, 8.0, 3.0),
                direction2: Vec3::new(7.0, 8.0, -3.0),
                shape: EmitterShape::Box {
                    min: Vec3::new(-1.0, 0.0, 0.0),
                    max: Vec3::new(1.0, 0.0, 0.0),
                },
                ..EmitterConfig::default()
            },
            render: RenderConfig {
                size: SizeOverLife {
                    start: 0.1,
                    end: 0.5,
                },
                ..RenderConfig::default()
            },
            run: RunConfig::default(),
            orbit: None,
        }
    }
}

impl SceneConfig {
    /// Load a config file, picking the format from the extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = match extension(path).as_deref() {
            Some("yaml" | "yml") => Self::from_yaml(&text)?,
            Some("json") => Self::from_json(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        tracing::debug!(path = %path.display(), "scene config loaded");
        Ok(config)
    }

    /// Write the config, picking the format from the extension.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = match extension(path).as_deref() {
            Some("yaml" | "yml") => self.to_yaml()?,
            Some("json") => serde_json::to_string_pretty(self)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;
        self.emitter.validate()?;
        if !self.run.update_speed.is_finite() || self.run.update_speed < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "run.update_speed must be finite and non-negative, got {}",
                self.run.update_speed
            )));
        }
        self.run.frame_duration()?;
        if let Some(orbit) = &self.orbit
            && !(orbit.center.is_finite()
                && orbit.radius.is_finite()
                && orbit.angular_speed.is_finite())
        {
            return Err(ConfigError::Invalid("orbit values must be finite".into()));
        }
        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
