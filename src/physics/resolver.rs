//! Pairwise penetration correction and velocity response.
//!
//! Every routine returns `None` without touching either body when the shapes
//! do not actually overlap or when both bodies are static.
use crate::physics::body::RigidBody;
use crate::physics::collider::{Collider, Shape};
use crate::utils::math::{signed_axis, Aabb};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Restitution used by a world unless configured otherwise.
pub const DEFAULT_RESTITUTION: f32 = 0.8;

/// How box-box resolution picks an axis when two penetration depths are equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxTieBreak {
    /// x wins only if strictly shallower than y and z, then y only if strictly
    /// shallower than z; otherwise z. Equal depths go to the later axis.
    #[default]
    PreferLaterAxis,
    /// Equal depths go to the earlier axis (x, then y, then z).
    PreferEarlierAxis,
}

/// Outcome of a resolved collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first body towards the second. For
    /// sphere-box contacts it points out of the box towards the sphere.
    pub normal: Vec3,
    /// Penetration depth removed by the positional correction.
    pub depth: f32,
    /// Speed at which the bodies were approaching along `normal` before the
    /// velocity response. Zero if they were already at rest or separating.
    pub closing_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResolver {
    pub restitution: f32,
    pub tie_break: BoxTieBreak,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_RESTITUTION)
    }
}

impl CollisionResolver {
    pub fn new(restitution: f32) -> Self {
        Self {
            restitution,
            tie_break: BoxTieBreak::default(),
        }
    }

    pub fn with_tie_break(mut self, tie_break: BoxTieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Separates the pair and updates their velocities, dispatching on the
    /// collider shapes. Box-sphere pairs are handled as sphere-box.
    pub fn resolve(
        &self,
        a: &mut RigidBody,
        col_a: &Collider,
        b: &mut RigidBody,
        col_b: &Collider,
    ) -> Option<Contact> {
        match (col_a.shape(), col_b.shape()) {
            (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
                self.resolve_sphere_sphere(a, *ra, b, *rb)
            }
            (Shape::Box { half_extents: ha }, Shape::Box { half_extents: hb }) => {
                self.resolve_box_box(a, *ha, b, *hb)
            }
            (Shape::Sphere { radius }, Shape::Box { half_extents }) => {
                self.resolve_sphere_box(a, *radius, b, *half_extents)
            }
            (Shape::Box { half_extents }, Shape::Sphere { radius }) => {
                self.resolve_sphere_box(b, *radius, a, *half_extents)
            }
        }
    }

    pub fn resolve_sphere_sphere(
        &self,
        a: &mut RigidBody,
        radius_a: f32,
        b: &mut RigidBody,
        radius_b: f32,
    ) -> Option<Contact> {
        if a.is_static() && b.is_static() {
            return None;
        }
        let delta = b.position - a.position;
        let distance = delta.length();
        if distance == 0.0 {
            return None;
        }

        let overlap = (radius_a + radius_b) - distance;
        if overlap <= 0.0 {
            return None;
        }

        let normal = delta / distance;
        let correction = normal * (overlap * 0.5);
        a.translate(-correction);
        b.translate(correction);

        let closing_speed = self.apply_impulse(a, b, normal);
        Some(Contact {
            normal,
            depth: overlap,
            closing_speed,
        })
    }

    pub fn resolve_box_box(
        &self,
        a: &mut RigidBody,
        half_a: Vec3,
        b: &mut RigidBody,
        half_b: Vec3,
    ) -> Option<Contact> {
        if a.is_static() && b.is_static() {
            return None;
        }
        let delta = b.position - a.position;
        let penetration = (half_a + half_b) - delta.abs();
        if penetration.x <= 0.0 || penetration.y <= 0.0 || penetration.z <= 0.0 {
            return None;
        }

        let axis = self.separation_axis(penetration);
        let depth = penetration[axis];
        let normal = signed_axis(axis, delta[axis]);

        // The dynamic side takes the whole correction when the other is static.
        let share = if a.is_static() || b.is_static() {
            depth
        } else {
            depth * 0.5
        };
        a.translate(-normal * share);
        b.translate(normal * share);

        let closing_speed = self.apply_impulse(a, b, normal);
        Some(Contact {
            normal,
            depth,
            closing_speed,
        })
    }

    /// Pushes the sphere out of the box and reflects its velocity. The box is
    /// never moved or accelerated by sphere contacts.
    pub fn resolve_sphere_box(
        &self,
        sphere: &mut RigidBody,
        radius: f32,
        cuboid: &RigidBody,
        half_extents: Vec3,
    ) -> Option<Contact> {
        if sphere.is_static() && cuboid.is_static() {
            return None;
        }
        let closest = Aabb::from_center(cuboid.position, half_extents).closest_point(sphere.position);
        let delta = sphere.position - closest;
        let distance = delta.length();
        if distance >= radius {
            return None;
        }

        // Centre on or inside the box: no direction to push along, use box up.
        let normal = if distance > 0.0 { delta / distance } else { Vec3::Y };
        let depth = radius - distance;

        if sphere.is_static() {
            return Some(Contact {
                normal,
                depth,
                closing_speed: 0.0,
            });
        }

        sphere.position += normal * depth;

        let normal_speed = sphere.velocity.dot(normal);
        if normal_speed < 0.0 {
            sphere.velocity -= normal * ((1.0 + self.restitution) * normal_speed);
        }

        Some(Contact {
            normal,
            depth,
            closing_speed: (-normal_speed).max(0.0),
        })
    }

    fn separation_axis(&self, penetration: Vec3) -> usize {
        let (px, py, pz) = (penetration.x, penetration.y, penetration.z);
        match self.tie_break {
            BoxTieBreak::PreferLaterAxis => {
                if px < py && px < pz {
                    0
                } else if py < pz {
                    1
                } else {
                    2
                }
            }
            BoxTieBreak::PreferEarlierAxis => {
                if px <= py && px <= pz {
                    0
                } else if py <= pz {
                    1
                } else {
                    2
                }
            }
        }
    }

    /// Applies equal and opposite impulses along `normal` (pointing from `a`
    /// to `b`) and returns the closing speed before the impulse.
    fn apply_impulse(&self, a: &mut RigidBody, b: &mut RigidBody, normal: Vec3) -> f32 {
        let inv_a = a.inverse_mass();
        let inv_b = b.inverse_mass();
        let total_inverse_mass = inv_a + inv_b;
        if total_inverse_mass <= 0.0 {
            return 0.0;
        }

        let separating_velocity = (b.velocity - a.velocity).dot(normal);
        if separating_velocity >= 0.0 {
            return 0.0;
        }

        let impulse = -(1.0 + self.restitution) * separating_velocity / total_inverse_mass;
        a.velocity -= normal * (impulse * inv_a);
        b.velocity += normal * (impulse * inv_b);

        -separating_velocity
    }
}
