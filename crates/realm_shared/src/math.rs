//! Position types shared between the core and its collaborators.
//!
//! Storage and network layers convert to and from these; region and zone
//! logic works on the ground-plane projection.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// World position: `x`/`z` on the ground, `y` is height.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component (ground plane)
    pub x: f32,
    /// Y component (height)
    pub y: f32,
    /// Z component (ground plane)
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Creates a point on the ground plane (`y = 0`).
    #[must_use]
    pub const fn ground(x: f32, z: f32) -> Self {
        Self::new(x, 0.0, z)
    }

    /// Projection onto the ground plane.
    #[must_use]
    pub const fn xz(self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }
}

/// A point on the ground plane, stored as `(x, z)`.
///
/// The second component is named `z` so ground-plane code reads the same
/// as the 3D code it was projected from.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Z component
    pub z: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Lifts the point back into 3D at the given height.
    #[must_use]
    pub const fn with_height(self, y: f32) -> Vec3 {
        Vec3::new(self.x, y, self.z)
    }

    /// 2D cross product of `(a - self)` and `(b - self)`.
    ///
    /// Positive when `self -> a -> b` turns counter-clockwise.
    #[must_use]
    pub fn cross(self, a: Self, b: Self) -> f32 {
        (a.x - self.x) * (b.z - self.z) - (a.z - self.z) * (b.x - self.x)
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(arr: [f32; 2]) -> Self {
        Self::new(arr[0], arr[1])
    }
}

impl From<Vec3> for Vec2 {
    fn from(v: Vec3) -> Self {
        v.xz()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_projection_drops_height() {
        let p = Vec3::new(10.0, 55.0, -4.0);
        assert_eq!(p.xz(), Vec2::new(10.0, -4.0));
        assert_eq!(Vec2::from(p).with_height(0.0), Vec3::ground(10.0, -4.0));
        assert_eq!(Vec2::from([1.5, 2.5]), Vec2::new(1.5, 2.5));
    }

    #[test]
    fn test_cross_orientation() {
        let o = Vec2::new(0.0, 0.0);
        assert!(o.cross(Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)) > 0.0);
        assert!(o.cross(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)) < 0.0);
        assert_eq!(o.cross(Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)), 0.0);
    }

    #[test]
    fn test_pod_layout() {
        let points = [Vec3::new(1.0, 2.0, 3.0), Vec3::ground(4.0, 5.0)];
        let floats: &[f32] = bytemuck::cast_slice(&points);
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 0.0, 5.0]);
        assert_eq!(bytemuck::cast::<Vec2, [f32; 2]>(Vec2::new(6.0, 7.0)), [6.0, 7.0]);
    }
}
