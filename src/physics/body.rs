use glam::Vec3;

/// Default render colour handed back to the host for bodies that never set one.
pub const DEFAULT_COLOUR: [f32; 3] = [0.5, 0.5, 0.5];

/// Simulation state of a single object.
///
/// A body with `mass <= 0` is always static, whatever flag it was created with.
/// Static bodies have infinite effective mass: forces and collisions never
/// move them, though the host may still reposition them directly.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub position: Vec3,
    pub velocity: Vec3,
    accumulated_force: Vec3,
    mass: f32,
    is_static: bool,
    colour: [f32; 3],
}

impl RigidBody {
    pub fn new(position: Vec3, mass: f32, is_static: bool) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            accumulated_force: Vec3::ZERO,
            mass,
            is_static: is_static || mass <= 0.0,
            colour: DEFAULT_COLOUR,
        }
    }

    pub fn dynamic(position: Vec3, mass: f32) -> Self {
        Self::new(position, mass, false)
    }

    pub fn fixed(position: Vec3) -> Self {
        Self::new(position, 0.0, true)
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_colour(mut self, colour: [f32; 3]) -> Self {
        self.colour = colour;
        self
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Zero for static bodies.
    pub fn inverse_mass(&self) -> f32 {
        if self.is_static {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    pub fn accumulated_force(&self) -> Vec3 {
        self.accumulated_force
    }

    pub fn colour(&self) -> [f32; 3] {
        self.colour
    }

    pub fn set_colour(&mut self, r: f32, g: f32, b: f32) {
        self.colour = [r, g, b];
    }

    pub fn kinetic_energy(&self) -> f32 {
        if self.is_static {
            0.0
        } else {
            0.5 * self.mass * self.velocity.length_squared()
        }
    }

    pub fn apply_force(&mut self, force: Vec3) {
        if self.is_static {
            return;
        }
        self.accumulated_force += force;
    }

    /// Semi-implicit Euler: velocity is updated first and the new velocity
    /// moves the position. The force accumulator is empty afterwards.
    pub fn integrate(&mut self, dt: f32) {
        if self.is_static {
            self.accumulated_force = Vec3::ZERO;
            return;
        }

        let acceleration = self.accumulated_force / self.mass;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;

        self.accumulated_force = Vec3::ZERO;
    }

    /// Moves the body unless it is static.
    pub(crate) fn translate(&mut self, offset: Vec3) {
        if !self.is_static {
            self.position += offset;
        }
    }
}
