use crate::config::physics::PhysicsConfig;
use crate::physics::{BodyHandle, Collider, PhysicsWorld, RigidBody, Shape};
use crate::physics::body::DEFAULT_COLOUR;
use crate::utils::error::{ConfigError, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeConfig {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

impl From<ShapeConfig> for Shape {
    fn from(shape: ShapeConfig) -> Self {
        match shape {
            ShapeConfig::Sphere { radius } => Shape::Sphere { radius },
            ShapeConfig::Box { half_extents } => Shape::Box { half_extents },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub position: Vec3,
    #[serde(default)]
    pub velocity: Vec3,
    #[serde(default)]
    pub mass: f32,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default = "default_colour")]
    pub colour: [f32; 3],
    pub shape: ShapeConfig,
}

fn default_colour() -> [f32; 3] {
    DEFAULT_COLOUR
}

impl BodyConfig {
    fn validate(&self) -> Result<()> {
        let ok = match self.shape {
            ShapeConfig::Sphere { radius } => radius.is_finite() && radius > 0.0,
            ShapeConfig::Box { half_extents } => {
                half_extents.is_finite() && half_extents.cmpgt(Vec3::ZERO).all()
            }
        };
        if !ok {
            return Err(ConfigError::Invalid(format!(
                "body {} has a non-positive shape size: {:?}",
                self.name.as_deref().unwrap_or("unnamed"),
                self.shape
            )));
        }
        if !self.position.is_finite() || !self.velocity.is_finite() || !self.mass.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "body {} has non-finite state",
                self.name.as_deref().unwrap_or("unnamed")
            )));
        }
        Ok(())
    }

    pub fn to_body(&self) -> (RigidBody, Collider) {
        let body = RigidBody::new(self.position, self.mass, self.is_static)
            .with_velocity(self.velocity)
            .with_colour(self.colour);
        let mut collider = Collider::new(self.shape.into());
        if let Some(name) = &self.name {
            collider = collider.with_name(name.clone());
        }
        (body, collider)
    }
}

/// World constants plus the bodies to spawn, in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

impl SceneConfig {
    /// Ground slab, a falling ball and the host-driven walker box.
    pub fn demo() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            bodies: vec![
                BodyConfig {
                    name: Some("Ground".to_string()),
                    position: Vec3::new(0.0, -3.0, 0.0),
                    velocity: Vec3::ZERO,
                    mass: 0.0,
                    is_static: true,
                    colour: [0.5, 0.5, 0.5],
                    shape: ShapeConfig::Box {
                        half_extents: Vec3::new(50.0, 1.0, 50.0),
                    },
                },
                BodyConfig {
                    name: Some("Ball".to_string()),
                    position: Vec3::new(0.0, 5.0, 0.0),
                    velocity: Vec3::ZERO,
                    mass: 1.0,
                    is_static: false,
                    colour: [0.0, 1.0, 0.0],
                    shape: ShapeConfig::Sphere { radius: 0.5 },
                },
                BodyConfig {
                    name: Some("Walker".to_string()),
                    position: Vec3::new(-10.0, -1.0, 4.0),
                    velocity: Vec3::ZERO,
                    mass: 1.0,
                    is_static: false,
                    colour: [1.0, 0.0, 1.0],
                    shape: ShapeConfig::Box {
                        half_extents: Vec3::ONE,
                    },
                },
            ],
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scene: Self = toml::from_str(content)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.physics.validate()?;
        self.bodies.iter().try_for_each(BodyConfig::validate)
    }

    /// Builds a world and returns the handles in the same order as `bodies`.
    pub fn build_world(&self) -> Result<(PhysicsWorld, Vec<BodyHandle>)> {
        self.validate()?;
        let mut world = PhysicsWorld::with_config(self.physics.clone());
        let handles: Vec<BodyHandle> = self
            .bodies
            .iter()
            .map(|entry| {
                let (body, collider) = entry.to_body();
                world.add_body(body, collider)
            })
            .collect();
        log::info!("Built scene with {} bodies", world.len());
        Ok((world, handles))
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.bodies
            .iter()
            .position(|body| body.name.as_deref() == Some(name))
    }
}
