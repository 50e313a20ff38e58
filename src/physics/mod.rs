//! Physics systems
pub mod body;
pub mod collider;
pub mod resolver;
pub mod world;

// Core types
pub use body::RigidBody;
pub use collider::{Collider, PlacedCollider, Shape};
pub use resolver::{BoxTieBreak, CollisionResolver, Contact};
pub use world::{BodyHandle, CollisionEvent, PhysicsWorld};

/// Physics timestep (60Hz)
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// Upper bound on unsimulated time carried between frames, in seconds.
pub const MAX_ACCUMULATED_TIME: f32 = 0.25;
