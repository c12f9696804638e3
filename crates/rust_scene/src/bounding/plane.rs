//! Planes and side classification

use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};

/// Which side of a plane a point or volume lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Entirely behind the plane (opposite the normal)
    Negative,
    /// Entirely in front of the plane (along the normal)
    Positive,
    /// Crossing the plane
    Straddling,
}

/// Plane defined by normal and distance from origin
///
/// Points satisfy `normal · p + distance = 0`; the signed pseudo distance of
/// any other point is positive on the side the normal faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Normal vector (normalized by the constructors)
    pub normal: Vec3,
    /// Distance term of the plane equation
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self {
            normal: normal.normalize(),
            distance,
        }
    }

    /// Create the plane through `point` facing `normal`
    pub fn from_point_normal(point: &Vec3, normal: &Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: -normal.dot(point),
        }
    }

    /// Build from raw equation coefficients `(a, b, c, d)`, normalizing so the
    /// pseudo distance is a true distance.
    ///
    /// Returns `None` when `(a, b, c)` has no length.
    pub fn from_coefficients(a: f32, b: f32, c: f32, d: f32) -> Option<Self> {
        let normal = Vec3::new(a, b, c);
        let length = normal.magnitude();
        if length <= f32::EPSILON {
            return None;
        }
        Some(Self {
            normal: normal / length,
            distance: d / length,
        })
    }

    /// Signed distance from the plane to `point`
    pub fn pseudo_distance(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// Classify a single point; points on the plane are `Straddling`
    pub fn which_side(&self, point: &Vec3) -> Side {
        let distance = self.pseudo_distance(point);
        if distance < 0.0 {
            Side::Negative
        } else if distance > 0.0 {
            Side::Positive
        } else {
            Side::Straddling
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pseudo_distance_sign() {
        let plane = Plane::from_point_normal(&Vec3::new(0.0, 2.0, 0.0), &Vec3::new(0.0, 5.0, 0.0));

        assert_relative_eq!(plane.pseudo_distance(&Vec3::new(3.0, 5.0, 1.0)), 3.0);
        assert_relative_eq!(plane.pseudo_distance(&Vec3::new(0.0, 0.0, 0.0)), -2.0);
        assert_eq!(plane.which_side(&Vec3::new(7.0, 2.0, -4.0)), Side::Straddling);
    }

    #[test]
    fn test_from_coefficients_normalizes() {
        let plane = Plane::from_coefficients(0.0, 0.0, 2.0, 4.0).unwrap();
        assert_relative_eq!(plane.normal, Vec3::z());
        assert_relative_eq!(plane.distance, 2.0);

        assert!(Plane::from_coefficients(0.0, 0.0, 0.0, 1.0).is_none());
    }
}
