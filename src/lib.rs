pub mod config;
pub mod physics;
pub mod utils;

// Re-export commonly used types
pub use config::physics::PhysicsConfig;
pub use config::scene::SceneConfig;
pub use physics::body::RigidBody;
pub use physics::collider::{Collider, Shape};
pub use physics::resolver::{CollisionResolver, Contact};
pub use physics::world::{BodyHandle, CollisionEvent, PhysicsWorld};
pub use utils::error::ConfigError;
pub use utils::math::Aabb;
