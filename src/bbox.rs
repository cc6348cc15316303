use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// Axis-aligned 3D bounding box, min/max corner per axis
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox3 {
    pub x0: f32,
    pub x1: f32,
    pub y0: f32,
    pub y1: f32,
    pub z0: f32,
    pub z1: f32,
}

impl BoundingBox3 {
    #[inline]
    pub fn new(x0: f32, x1: f32, y0: f32, y1: f32, z0: f32, z1: f32) -> Self {
        Self {
            x0,
            x1,
            y0,
            y1,
            z0,
            z1,
        }
    }

    /// Box with every component set to NaN, the "could not estimate" sentinel.
    #[inline]
    pub fn invalid() -> Self {
        Self::new(f32::NAN, f32::NAN, f32::NAN, f32::NAN, f32::NAN, f32::NAN)
    }

    #[inline]
    pub fn xy_is_nan(&self) -> bool {
        self.x0.is_nan() && self.x1.is_nan() && self.y0.is_nan() && self.y1.is_nan()
    }

    #[inline]
    pub fn z_is_nan(&self) -> bool {
        self.z0.is_nan() && self.z1.is_nan()
    }

    #[inline]
    pub fn center(&self) -> na::Point3<f32> {
        na::Point3::new(
            (self.x0 + self.x1) / 2.0,
            (self.y0 + self.y1) / 2.0,
            (self.z0 + self.z1) / 2.0,
        )
    }

    /// Closed-interval AABB overlap test: boxes that merely touch collide.
    #[inline]
    pub fn collides_with(&self, other: &BoundingBox3) -> bool {
        self.x0 <= other.x1
            && self.x1 >= other.x0
            && self.y0 <= other.y1
            && self.y1 >= other.y0
            && self.z0 <= other.z1
            && self.z1 >= other.z0
    }

    /// Euclidean distance between the box centers.
    pub fn distance_to(&self, other: &BoundingBox3) -> f64 {
        let a = self.center();
        let b = other.center();
        let distance = na::distance(&a.cast::<f64>(), &b.cast::<f64>());

        debug_assert!(distance >= 0.0);
        distance
    }
}
