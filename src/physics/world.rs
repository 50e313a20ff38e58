use crate::config::physics::PhysicsConfig;
use crate::physics::body::RigidBody;
use crate::physics::collider::Collider;
use crate::physics::resolver::{CollisionResolver, Contact};
use std::time::Duration;

/// Index of a body (and its collider) inside a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(usize);

impl BodyHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A contact resolved during the last [`PhysicsWorld::update`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub first: BodyHandle,
    pub second: BodyHandle,
    pub contact: Contact,
}

/// Fixed-step simulation of bodies paired with colliders.
///
/// Bodies and colliders are stored side by side and only ever pushed
/// together, so the collider at index `i` always belongs to body `i`.
/// Colliders are placed at their body's position each time they are tested.
///
/// Contacts are resolved one pair at a time in index order. A body touching
/// several others in one step gets sequential corrections, with no iteration
/// towards a global solution.
pub struct PhysicsWorld {
    bodies: Vec<RigidBody>,
    colliders: Vec<Collider>,
    config: PhysicsConfig,
    resolver: CollisionResolver,
    accumulator: f32,
    steps: u64,
    events: Vec<CollisionEvent>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    pub fn with_config(config: PhysicsConfig) -> Self {
        log::debug!(
            "Creating physics world: gravity {}, step {:.5}s, restitution {}",
            config.gravity,
            config.fixed_step,
            config.restitution
        );
        if let Err(e) = config.validate() {
            log::warn!("Physics world created with an unusable config: {}", e);
        }
        let resolver = CollisionResolver::new(config.restitution).with_tie_break(config.box_tie_break);
        Self {
            bodies: Vec::new(),
            colliders: Vec::new(),
            config,
            resolver,
            accumulator: 0.0,
            steps: 0,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn add_body(&mut self, body: RigidBody, collider: Collider) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len());
        log::debug!(
            "Adding body {} ({}) at {}, mass {}, static {}",
            handle.0,
            collider.name().unwrap_or("unnamed"),
            body.position,
            body.mass(),
            body.is_static()
        );
        self.bodies.push(body);
        self.colliders.push(collider);
        handle
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.0)
    }

    pub fn collider(&self, handle: BodyHandle) -> Option<&Collider> {
        self.colliders.get(handle.0)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody, &Collider)> + '_ {
        self.bodies
            .iter()
            .zip(&self.colliders)
            .enumerate()
            .map(|(i, (body, collider))| (BodyHandle(i), body, collider))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Time carried over to the next update, always below one fixed step
    /// after an update returns.
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Contacts resolved during the most recent update, in resolution order.
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub fn total_kinetic_energy(&self) -> f32 {
        self.bodies.iter().map(RigidBody::kinetic_energy).sum()
    }

    /// Advances the simulation by a frame's worth of time and returns the
    /// number of fixed steps taken. Non-positive frame times are ignored, and
    /// so is every frame when the fixed step itself is not positive.
    pub fn update(&mut self, frame_dt: f32) -> usize {
        self.events.clear();
        if frame_dt.is_nan() || frame_dt <= 0.0 {
            return 0;
        }
        let fixed_step = self.config.fixed_step;
        if fixed_step.is_nan() || fixed_step <= 0.0 {
            return 0;
        }

        self.accumulator += frame_dt;
        if self.accumulator > self.config.max_accumulator {
            log::debug!(
                "Frame time backlog {:.3}s clamped to {:.3}s",
                self.accumulator,
                self.config.max_accumulator
            );
            self.accumulator = self.config.max_accumulator;
        }

        let mut taken = 0;
        while self.accumulator >= fixed_step {
            self.step(fixed_step);
            self.accumulator -= fixed_step;
            taken += 1;
        }
        taken
    }

    pub fn advance(&mut self, delta_time: Duration) -> usize {
        self.update(delta_time.as_secs_f32())
    }

    fn step(&mut self, dt: f32) {
        // 1) gravity and integration
        let gravity = self.config.gravity;
        for body in &mut self.bodies {
            if !body.is_static() {
                body.apply_force(gravity * body.mass());
            }
            body.integrate(dt);
        }

        // 2) + 3) place colliders at their bodies and resolve, naive O(n^2).
        // Placement is read per pair so earlier corrections are seen by later pairs.
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let col_a = &self.colliders[i];
                let col_b = &self.colliders[j];
                let hit = col_a
                    .at(self.bodies[i].position)
                    .intersects(&col_b.at(self.bodies[j].position));
                if !hit {
                    continue;
                }

                let (a, b) = pair_mut(&mut self.bodies, i, j);
                if let Some(contact) = self.resolver.resolve(a, col_a, b, col_b) {
                    log::trace!(
                        "Contact {}-{}: normal {}, depth {:.4}, closing {:.3}",
                        i,
                        j,
                        contact.normal,
                        contact.depth,
                        contact.closing_speed
                    );
                    self.events.push(CollisionEvent {
                        first: BodyHandle(i),
                        second: BodyHandle(j),
                        contact,
                    });
                }
            }
        }

        self.steps += 1;
    }
}

/// Two distinct mutable elements, `i < j`.
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert!(i < j);
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn position_of(world: &PhysicsWorld, handle: BodyHandle) -> Option<Vec3> {
        world.body(handle).map(|body| body.position)
    }

    fn ball_over_ground(restitution: f32) -> (PhysicsWorld, BodyHandle, BodyHandle) {
        let config = PhysicsConfig::default().with_restitution(restitution);
        let mut world = PhysicsWorld::with_config(config);
        let ground = world.add_body(
            RigidBody::fixed(Vec3::new(0.0, -3.0, 0.0)),
            Collider::cuboid(Vec3::new(50.0, 1.0, 50.0)).with_name("Ground"),
        );
        let ball = world.add_body(
            RigidBody::dynamic(Vec3::new(0.0, 5.0, 0.0), 1.0),
            Collider::sphere(0.5).with_name("Ball"),
        );
        (world, ground, ball)
    }

    /// Runs whole fixed steps covering `seconds` of simulated time.
    fn simulate(world: &mut PhysicsWorld, seconds: f32) {
        let steps = (seconds / world.config().fixed_step).round() as usize;
        for _ in 0..steps {
            world.update(world.config().fixed_step);
        }
    }

    #[test]
    fn test_add_body_pairs_handles() {
        let (world, ground, ball) = ball_over_ground(0.8);
        assert_eq!(world.len(), 2);
        assert_eq!(ground.index(), 0);
        assert_eq!(ball.index(), 1);
        assert_eq!(world.collider(ball).and_then(Collider::name), Some("Ball"));
        assert_eq!(position_of(&world, ball), Some(Vec3::new(0.0, 5.0, 0.0)));

        let names: Vec<_> = world.bodies().filter_map(|(_, _, c)| c.name()).collect();
        assert_eq!(names, ["Ground", "Ball"]);
    }

    #[test]
    fn test_non_positive_frame_time_is_ignored() {
        let (mut world, _, ball) = ball_over_ground(0.8);
        assert_eq!(world.update(0.0), 0);
        assert_eq!(world.update(-1.0), 0);
        assert_eq!(world.update(f32::NAN), 0);
        assert_eq!(world.accumulator(), 0.0);
        assert_eq!(world.step_count(), 0);
        assert_eq!(position_of(&world, ball), Some(Vec3::new(0.0, 5.0, 0.0)));
    }

    #[test]
    fn test_leftover_time_carries_over() {
        let (mut world, _, _) = ball_over_ground(0.8);
        let step = world.config().fixed_step;

        assert_eq!(world.update(step * 0.5), 0);
        assert!(world.accumulator() > 0.0);
        assert_eq!(world.update(step * 0.75), 1);
        assert!((world.accumulator() - step * 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_accumulator_clamp_bounds_steps() {
        let (mut world, _, _) = ball_over_ground(0.8);
        let max_steps = world.config().max_steps_per_update();

        let taken = world.update(10.0);

        assert!(taken <= max_steps, "took {taken} steps, cap is {max_steps}");
        assert!(taken > 0);
        assert!(world.accumulator() < world.config().fixed_step);
        assert_eq!(world.step_count(), taken as u64);
    }

    #[test]
    fn test_non_positive_fixed_step_never_steps() {
        for fixed_step in [0.0, -1.0 / 60.0, f32::NAN] {
            let config = PhysicsConfig {
                fixed_step,
                ..PhysicsConfig::default()
            };
            let mut world = PhysicsWorld::with_config(config);
            let ball = world.add_body(RigidBody::dynamic(Vec3::ZERO, 1.0), Collider::sphere(0.5));

            assert_eq!(world.update(0.1), 0);
            assert_eq!(world.update(10.0), 0);
            assert_eq!(world.step_count(), 0);
            assert_eq!(position_of(&world, ball), Some(Vec3::ZERO));
        }
    }

    #[test]
    fn test_gravity_integration() {
        let mut world = PhysicsWorld::new();
        let ball = world.add_body(RigidBody::dynamic(Vec3::ZERO, 2.0), Collider::sphere(0.5));
        let dt = world.config().fixed_step;

        world.update(dt);

        let body = world.body(ball).unwrap();
        // Gravity as a force scales with mass, so acceleration does not
        assert!((body.velocity.y - (-9.81 * dt)).abs() < 1e-6);
        assert!((body.position.y - (-9.81 * dt * dt)).abs() < 1e-6);
        assert_eq!(body.accumulated_force(), Vec3::ZERO);
    }

    #[test]
    fn test_static_bodies_never_move() {
        let mut world = PhysicsWorld::new();
        let floor = world.add_body(RigidBody::fixed(Vec3::ZERO), Collider::cuboid(Vec3::new(5.0, 0.5, 5.0)));
        let post = world.add_body(
            RigidBody::new(Vec3::new(0.0, 1.0, 0.0), 3.0, true),
            Collider::sphere(0.6),
        );
        world.add_body(RigidBody::dynamic(Vec3::new(0.0, 3.0, 0.0), 1.0), Collider::sphere(0.5));
        world.add_body(RigidBody::dynamic(Vec3::new(0.2, 0.9, 0.0), 5.0), Collider::cuboid(Vec3::splat(0.5)));

        for _ in 0..120 {
            world.update(1.0 / 30.0);
        }

        let floor = world.body(floor).unwrap();
        assert_eq!(floor.position, Vec3::ZERO);
        assert_eq!(floor.velocity, Vec3::ZERO);
        let post = world.body(post).unwrap();
        assert_eq!(post.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(post.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_ball_settles_on_ground_without_restitution() {
        let (mut world, _, ball) = ball_over_ground(0.0);
        let surface = -3.0 + 1.0 + 0.5;

        simulate(&mut world, 3.0);

        let body = world.body(ball).unwrap();
        assert!((body.position.y - surface).abs() < 1e-3, "ball at {}", body.position.y);
        assert!(body.velocity.y.abs() < 1e-3, "ball moving at {}", body.velocity.y);
        assert_eq!(body.position.x, 0.0);
        assert_eq!(body.position.z, 0.0);

        // Stays put once settled
        simulate(&mut world, 1.0);
        let body = world.body(ball).unwrap();
        assert!((body.position.y - surface).abs() < 1e-3);
    }

    #[test]
    fn test_bouncing_ball_never_sinks_through() {
        let (mut world, _, ball) = ball_over_ground(0.8);
        let surface = -1.5;
        let mut bounces = 0;
        let mut peak_after_bounce = f32::MIN;

        for _ in 0..(3 * 60) {
            world.update(world.config().fixed_step);
            if !world.events().is_empty() {
                bounces += 1;
            }
            let body = world.body(ball).unwrap();
            assert!(body.position.y >= surface - 1e-4, "sank to {}", body.position.y);
            if bounces > 0 {
                peak_after_bounce = peak_after_bounce.max(body.position.y);
            }
        }

        assert!(bounces > 0);
        // Restitution below one loses height on the rebound
        assert!(peak_after_bounce < 5.0);
        assert!(peak_after_bounce > surface);
    }

    #[test]
    fn test_events_report_pairs_in_index_order() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::default().with_gravity(Vec3::ZERO));
        let left = world.add_body(
            RigidBody::dynamic(Vec3::new(-0.45, 0.0, 0.0), 1.0).with_velocity(Vec3::X),
            Collider::sphere(0.5),
        );
        let right = world.add_body(
            RigidBody::dynamic(Vec3::new(0.45, 0.0, 0.0), 1.0).with_velocity(-Vec3::X),
            Collider::sphere(0.5),
        );
        world.add_body(RigidBody::fixed(Vec3::new(0.0, 10.0, 0.0)), Collider::sphere(0.5));

        assert_eq!(world.update(world.config().fixed_step), 1);

        let events = world.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].first, left);
        assert_eq!(events[0].second, right);
        assert_eq!(events[0].contact.normal, Vec3::X);
        assert!(world.body(left).unwrap().velocity.x < 0.0);
        assert!(world.body(right).unwrap().velocity.x > 0.0);

        // Cleared by the next update even when no step runs
        world.update(world.config().fixed_step * 0.1);
        assert!(world.events().is_empty());
    }

    #[test]
    fn test_later_pairs_see_earlier_corrections() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::default().with_gravity(Vec3::ZERO));
        let middle = world.add_body(RigidBody::dynamic(Vec3::ZERO, 1.0), Collider::sphere(0.5));
        let right = world.add_body(RigidBody::dynamic(Vec3::new(0.9, 0.0, 0.0), 1.0), Collider::sphere(0.5));
        let left = world.add_body(RigidBody::dynamic(Vec3::new(-0.9, 0.0, 0.0), 1.0), Collider::sphere(0.5));

        assert_eq!(world.update(world.config().fixed_step), 1);

        // (0, 1) pushes the middle ball left by 0.05, so (0, 2) starts from
        // 0.85 apart and removes 0.15 rather than 0.1. (1, 2) no longer touch.
        let events = world.events();
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].first, events[0].second), (middle, right));
        assert_eq!((events[1].first, events[1].second), (middle, left));
        assert!((events[0].contact.depth - 0.1).abs() < 1e-5);
        assert!((events[1].contact.depth - 0.15).abs() < 1e-5);
        assert_eq!(events[1].contact.normal, Vec3::NEG_X);

        let x = |handle| world.body(handle).unwrap().position.x;
        assert!((x(middle) - 0.025).abs() < 1e-5, "middle at {}", x(middle));
        assert!((x(right) - 0.95).abs() < 1e-5);
        assert!((x(left) - -0.975).abs() < 1e-5);
        // At rest along every normal, so no impulses
        assert!(world.bodies().all(|(_, body, _)| body.velocity == Vec3::ZERO));
    }

    #[test]
    fn test_overlapping_static_scenery_reports_nothing() {
        let mut world = PhysicsWorld::new();
        world.add_body(RigidBody::fixed(Vec3::ZERO), Collider::cuboid(Vec3::ONE));
        world.add_body(RigidBody::fixed(Vec3::new(0.5, 0.0, 0.0)), Collider::cuboid(Vec3::ONE));
        world.add_body(RigidBody::fixed(Vec3::new(0.0, 0.5, 0.0)), Collider::sphere(1.0));

        for _ in 0..10 {
            assert!(world.update(world.config().fixed_step) > 0);
            assert!(world.events().is_empty());
        }
    }

    #[test]
    fn test_elastic_exchange_conserves_energy_in_world() {
        let config = PhysicsConfig::default()
            .with_gravity(Vec3::ZERO)
            .with_restitution(1.0);
        let mut world = PhysicsWorld::with_config(config);
        world.add_body(
            RigidBody::dynamic(Vec3::new(-2.0, 0.0, 0.0), 1.0).with_velocity(Vec3::new(2.0, 0.0, 0.0)),
            Collider::sphere(0.5),
        );
        world.add_body(
            RigidBody::dynamic(Vec3::new(2.0, 0.0, 0.0), 1.0).with_velocity(Vec3::new(-2.0, 0.0, 0.0)),
            Collider::sphere(0.5),
        );
        let before = world.total_kinetic_energy();

        simulate(&mut world, 2.0);

        let after = world.total_kinetic_energy();
        assert!((before - after).abs() < 1e-3, "{before} -> {after}");
        let velocities: Vec<f32> = world.bodies().map(|(_, b, _)| b.velocity.x).collect();
        assert!(velocities[0] < 0.0 && velocities[1] > 0.0);
    }

    #[test]
    fn test_box_rests_on_box() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::default().with_restitution(0.0));
        world.add_body(
            RigidBody::fixed(Vec3::new(0.0, -3.0, 0.0)),
            Collider::cuboid(Vec3::new(50.0, 1.0, 50.0)),
        );
        let crate_body = world.add_body(RigidBody::dynamic(Vec3::new(0.0, 2.0, 0.0), 1.0), Collider::cuboid(Vec3::ONE));

        simulate(&mut world, 3.0);

        let body = world.body(crate_body).unwrap();
        assert!((body.position.y - -1.0).abs() < 1e-3, "crate at {}", body.position.y);
        assert!(body.velocity.y.abs() < 1e-3);
    }

    #[test]
    fn test_advance_takes_duration() {
        let (mut world, _, ball) = ball_over_ground(0.8);
        let taken = world.advance(Duration::from_millis(100));
        assert!(taken == 5 || taken == 6);
        assert!(world.body(ball).unwrap().position.y < 5.0);
    }
}
