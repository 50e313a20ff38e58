//! Axis-aligned boxes and axis helpers shared by the narrow phase and the resolver.
use glam::Vec3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Point inside or on the box nearest to `point`, found by clamping
    /// each coordinate into the box's extent on that axis.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.max(self.min.x).min(self.max.x),
            point.y.max(self.min.y).min(self.max.y),
            point.z.max(self.min.z).min(self.max.z),
        )
    }
}

/// Unit vector along `axis` (0 = x, 1 = y, 2 = z) pointing the same way as `sign`.
///
/// A `sign` of exactly zero counts as positive.
pub fn signed_axis(axis: usize, sign: f32) -> Vec3 {
    let mut normal = Vec3::ZERO;
    normal[axis] = if sign < 0.0 { -1.0 } else { 1.0 };
    normal
}
