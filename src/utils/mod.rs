pub mod error;
pub mod math;

pub use error::ConfigError;
pub use math::Aabb;
