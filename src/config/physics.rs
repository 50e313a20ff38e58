use crate::physics::resolver::{BoxTieBreak, DEFAULT_RESTITUTION};
use crate::physics::{MAX_ACCUMULATED_TIME, PHYSICS_DT};
use crate::utils::error::{ConfigError, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Earth gravity, metres per second squared.
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: Vec3,
    pub fixed_step: f32,
    pub max_accumulator: f32,
    pub restitution: f32,
    pub box_tie_break: BoxTieBreak,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            fixed_step: PHYSICS_DT,
            max_accumulator: MAX_ACCUMULATED_TIME,
            restitution: DEFAULT_RESTITUTION,
            box_tie_break: BoxTieBreak::default(),
        }
    }
}

impl PhysicsConfig {
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Largest number of fixed steps a single update can run.
    ///
    /// The small slack covers steps such as 1/60 that f32 rounds slightly up,
    /// where repeated subtraction still fits one more step than the rounded
    /// quotient suggests.
    pub fn max_steps_per_update(&self) -> usize {
        let ratio = f64::from(self.max_accumulator) / f64::from(self.fixed_step);
        (ratio + 1e-6).floor() as usize
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would stall or break the fixed-step loop.
    pub fn validate(&self) -> Result<()> {
        if !self.fixed_step.is_finite() || self.fixed_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fixed_step must be a positive number of seconds, got {}",
                self.fixed_step
            )));
        }
        if !self.max_accumulator.is_finite() || self.max_accumulator < self.fixed_step {
            return Err(ConfigError::Invalid(format!(
                "max_accumulator ({}) must be at least one fixed_step ({})",
                self.max_accumulator, self.fixed_step
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::Invalid(format!(
                "restitution must be within [0, 1], got {}",
                self.restitution
            )));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        Ok(())
    }
}
