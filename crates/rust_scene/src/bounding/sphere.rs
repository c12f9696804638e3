//! Bounding spheres

use super::plane::{Plane, Side};
use crate::foundation::math::{constants, Quat, Vec3};
use crate::intersection::Ray;
use serde::{Deserialize, Serialize};

/// How a sphere is fitted around a point set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpherePolicy {
    /// Center at the midpoint of the points' AABB, radius to its corner.
    /// Conservative rather than minimal.
    #[default]
    ContainAabb,
    /// Center at the centroid, radius to the farthest point
    AveragePoints,
}

/// A bounding sphere
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingSphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere, never negative
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    /// Refit around `points` using [`SpherePolicy::ContainAabb`].
    /// Empty input leaves the sphere untouched.
    pub fn compute_from_points(&mut self, points: &[Vec3]) {
        self.compute_from_points_with(points, SpherePolicy::ContainAabb);
    }

    /// Refit around `points` with an explicit policy
    pub fn compute_from_points_with(&mut self, points: &[Vec3], policy: SpherePolicy) {
        match policy {
            SpherePolicy::ContainAabb => self.contain_aabb(points),
            SpherePolicy::AveragePoints => self.average_points(points),
        }
    }

    /// Center on the AABB midpoint, radius = half the AABB diagonal
    pub fn contain_aabb(&mut self, points: &[Vec3]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };

        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));

        self.center = (min + max) * 0.5;
        self.radius = (max - self.center).magnitude();
    }

    /// Center on the centroid, radius = farthest point from it
    pub fn average_points(&mut self, points: &[Vec3]) {
        if points.is_empty() {
            return;
        }

        #[allow(clippy::cast_precision_loss)]
        let count = points.len() as f32;
        let centroid = points.iter().fold(Vec3::zeros(), |acc, p| acc + p) / count;

        let max_squared = points
            .iter()
            .map(|p| (p - centroid).magnitude_squared())
            .fold(0.0_f32, f32::max);

        self.center = centroid;
        self.radius = max_squared.sqrt();
    }

    /// Map the sphere through rotation, per-axis scale and translation.
    ///
    /// The radius grows by the largest scale component so the result still
    /// encloses the scaled shape.
    pub fn transform(&self, rotation: &Quat, translation: &Vec3, scale: &Vec3) -> Self {
        Self {
            center: (rotation * self.center).component_mul(scale) + translation,
            radius: self.radius * scale.amax(),
        }
    }

    /// Classify against a plane using the center's signed distance
    pub fn which_side(&self, plane: &Plane) -> Side {
        let distance = plane.pseudo_distance(&self.center);

        if distance <= -self.radius {
            Side::Negative
        } else if distance >= self.radius {
            Side::Positive
        } else {
            Side::Straddling
        }
    }

    /// Smallest sphere along the center line enclosing both spheres.
    ///
    /// When one sphere already contains the other the container is returned
    /// unchanged.
    pub fn merge(&self, other: &Self) -> Self {
        let diff = other.center - self.center;
        let length_squared = diff.magnitude_squared();
        let radius_diff = other.radius - self.radius;

        if radius_diff * radius_diff >= length_squared {
            return if radius_diff > 0.0 { *other } else { *self };
        }

        let length = length_squared.sqrt();
        let center = if length > constants::ZERO_TOLERANCE {
            let coeff = (length + radius_diff) / (2.0 * length);
            self.center + diff * coeff
        } else {
            self.center
        };

        Self {
            center,
            radius: 0.5 * (length + self.radius + other.radius),
        }
    }

    /// Is `point` inside or on the sphere
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Is `other` entirely inside this sphere, within `tolerance`
    pub fn contains_sphere(&self, other: &Self, tolerance: f32) -> bool {
        (other.center - self.center).magnitude() + other.radius <= self.radius + tolerance
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &Self) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Distance along `ray` to the first surface hit, 0 when the origin is
    /// inside the sphere
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin - self.center;
        let c = oc.dot(&oc) - self.radius * self.radius;
        if c <= 0.0 {
            return Some(0.0);
        }

        // direction is unit length, so the quadratic's a term is 1
        let b = oc.dot(&ray.direction);
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let t = -b - discriminant.sqrt();
        (t >= 0.0).then_some(t)
    }

    /// Distance from `point` to the surface; negative inside
    pub fn distance_to(&self, point: &Vec3) -> f32 {
        (point - self.center).magnitude() - self.radius
    }

    /// Enclosed volume
    pub fn volume(&self) -> f32 {
        4.0 / 3.0 * constants::PI * self.radius.powi(3)
    }
}
