pub mod physics;
pub mod scene;

pub use physics::PhysicsConfig;
pub use scene::{BodyConfig, SceneConfig, ShapeConfig};
