use crate::utils::math::Aabb;
use glam::Vec3;

/// Geometry of a collider. Fixed once the collider is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

/// Shape attached to a body. It carries no position of its own; the world
/// places it at its body's position whenever it is tested.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    shape: Shape,
    name: Option<String>,
}

impl Collider {
    pub fn new(shape: Shape) -> Self {
        Self { shape, name: None }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::new(Shape::Sphere { radius })
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::new(Shape::Box { half_extents })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn at(&self, position: Vec3) -> PlacedCollider<'_> {
        PlacedCollider {
            collider: self,
            position,
        }
    }
}

/// A collider positioned in the world for one test.
#[derive(Debug, Clone, Copy)]
pub struct PlacedCollider<'a> {
    pub collider: &'a Collider,
    pub position: Vec3,
}

impl PlacedCollider<'_> {
    pub fn shape(&self) -> &Shape {
        self.collider.shape()
    }

    pub fn intersects(&self, other: &PlacedCollider<'_>) -> bool {
        match (self.shape(), other.shape()) {
            (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
                sphere_vs_sphere(self.position, *ra, other.position, *rb)
            }
            (Shape::Box { half_extents: ha }, Shape::Box { half_extents: hb }) => {
                box_vs_box(self.position, *ha, other.position, *hb)
            }
            (Shape::Sphere { radius }, Shape::Box { half_extents }) => {
                sphere_vs_box(self.position, *radius, other.position, *half_extents)
            }
            (Shape::Box { half_extents }, Shape::Sphere { radius }) => {
                sphere_vs_box(other.position, *radius, self.position, *half_extents)
            }
        }
    }
}

fn sphere_vs_sphere(a: Vec3, ra: f32, b: Vec3, rb: f32) -> bool {
    let radius_sum = ra + rb;
    a.distance_squared(b) <= radius_sum * radius_sum
}

fn box_vs_box(a: Vec3, ha: Vec3, b: Vec3, hb: Vec3) -> bool {
    Aabb::from_center(a, ha).intersects(&Aabb::from_center(b, hb))
}

fn sphere_vs_box(center: Vec3, radius: f32, box_center: Vec3, half_extents: Vec3) -> bool {
    let closest = Aabb::from_center(box_center, half_extents).closest_point(center);
    center.distance_squared(closest) <= radius * radius
}
