//! Axis-aligned bounding boxes

use super::plane::{Plane, Side};
use crate::foundation::math::{Quat, Vec3};
use crate::intersection::Ray;
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box
///
/// `center` is kept at the midpoint of `min` and `max` by every constructor
/// and by point fitting. [`BoundingBox::transform`] maps the three points
/// independently, so under a non-axis-aligned rotation the result is only an
/// approximation of the rotated box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Center of the box
    pub center: Vec3,
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl BoundingBox {
    /// Create a new box from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            min,
            max,
        }
    }

    /// Create a box centered at a point with given half extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        let extents = extents.abs();
        Self {
            center,
            min: center - extents,
            max: center + extents,
        }
    }

    /// Exact minimal box around `points`. Empty input leaves the box untouched.
    pub fn compute_from_points(&mut self, points: &[Vec3]) {
        let Some((first, rest)) = points.split_first() else {
            log::debug!("BoundingBox::compute_from_points called with no points, keeping previous bounds");
            return;
        };

        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));

        *self = Self::new(min, max);
    }

    /// Half-size of the box along each axis
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Map min, max and center through rotation, per-axis scale and
    /// translation, each on its own.
    pub fn transform(&self, rotation: &Quat, translation: &Vec3, scale: &Vec3) -> Self {
        let map = |p: &Vec3| (rotation * p).component_mul(scale) + translation;
        Self {
            center: map(&self.center),
            min: map(&self.min),
            max: map(&self.max),
        }
    }

    /// Classify against a plane using the distance from center to `max` as
    /// the radius
    pub fn which_side(&self, plane: &Plane) -> Side {
        let radius = (self.max - self.center).magnitude();
        let distance = plane.pseudo_distance(&self.center);

        if distance <= -radius {
            Side::Negative
        } else if distance >= radius {
            Side::Positive
        } else {
            Side::Straddling
        }
    }

    /// Does this box fully contain `other`, componentwise
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.min.z <= other.min.z
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
            && self.max.z >= other.max.z
    }

    /// Box enclosing both. A box already containing the other is returned
    /// as is.
    pub fn merge(&self, other: &Self) -> Self {
        if self.contains(other) {
            return *self;
        }
        if other.contains(self) {
            return *other;
        }
        Self::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Check if this box contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if this box overlaps another
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Point of the box closest to `point`
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        point.sup(&self.min).inf(&self.max)
    }

    /// Test ray intersection using the slab method.
    /// Returns the distance to the entry point (0 when starting inside).
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = ray.direction.map(|d| if d == 0.0 { f32::INFINITY } else { 1.0 / d });

        let t1 = (self.min - ray.origin).component_mul(&inv_dir);
        let t2 = (self.max - ray.origin).component_mul(&inv_dir);

        let tmin = t1.inf(&t2).max();
        let tmax = t1.sup(&t2).min();

        (tmax >= tmin && tmax >= 0.0).then(|| tmin.max(0.0))
    }

    /// Distance from `point` to the box surface, 0 inside
    pub fn distance_to(&self, point: &Vec3) -> f32 {
        (self.closest_point(point) - point).magnitude()
    }

    /// Enclosed volume
    pub fn volume(&self) -> f32 {
        let size = self.max - self.min;
        size.x * size.y * size.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_compute_from_points_is_exact() {
        let mut bound = BoundingBox::default();
        bound.compute_from_points(&[Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0), Vec3::new(-1.0, 1.0, 0.0)]);

        assert_relative_eq!(bound.min, Vec3::new(-1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(bound.max, Vec3::new(2.0, 2.0, 2.0), epsilon = EPSILON);
        assert_relative_eq!(bound.center, Vec3::new(0.5, 1.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_compute_from_no_points_keeps_bounds() {
        let mut bound = BoundingBox::new(Vec3::zeros(), Vec3::repeat(1.0));
        bound.compute_from_points(&[]);
        assert_eq!(bound, BoundingBox::new(Vec3::zeros(), Vec3::repeat(1.0)));
    }

    #[test]
    fn test_contains_checks_every_axis() {
        let outer = BoundingBox::new(Vec3::new(-2.0, -2.0, -2.0), Vec3::new(2.0, 2.0, 2.0));

        // y below outer.min.y while x is inside; a box that only checked x would accept this
        let poking_down = BoundingBox::new(Vec3::new(0.0, -3.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(!outer.contains(&poking_down));

        let inner = BoundingBox::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn test_point_and_overlap_checks_every_axis() {
        let cube = BoundingBox::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(cube.contains_point(&Vec3::new(1.0, -1.0, 0.5)));
        assert!(!cube.contains_point(&Vec3::new(0.0, 0.0, 1.5)));
        assert!(!cube.contains_point(&Vec3::new(0.0, -1.5, 0.0)));

        let touching = BoundingBox::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let beside = BoundingBox::new(Vec3::new(0.0, 0.0, 1.5), Vec3::new(1.0, 1.0, 2.0));
        assert!(cube.intersects(&touching));
        assert!(!cube.intersects(&beside));
        assert!(!beside.intersects(&cube));
    }

    #[test]
    fn test_merge_returns_container() {
        let outer = BoundingBox::new(Vec3::repeat(-5.0), Vec3::repeat(5.0));
        let inner = BoundingBox::new(Vec3::repeat(-1.0), Vec3::repeat(1.0));

        assert_eq!(outer.merge(&inner), outer);
        assert_eq!(inner.merge(&outer), outer);
    }

    #[test]
    fn test_merge_contains_both() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut random_box = || {
            let center = Vec3::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
            let extents = Vec3::new(rng.gen_range(0.0..4.0), rng.gen_range(0.0..4.0), rng.gen_range(0.0..4.0));
            BoundingBox::from_center_extents(center, extents)
        };

        for _ in 0..200 {
            let a = random_box();
            let b = random_box();

            let ab = a.merge(&b);
            let ba = b.merge(&a);
            assert!(ab.contains(&a) && ab.contains(&b));
            assert!(ba.contains(&a) && ba.contains(&b));
            assert_relative_eq!(ab.min, ba.min, epsilon = EPSILON);
            assert_relative_eq!(ab.max, ba.max, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_transform_maps_corners_independently() {
        let bound = BoundingBox::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let moved = bound.transform(&Quat::identity(), &Vec3::new(1.0, 0.0, 0.0), &Vec3::repeat(2.0));

        assert_relative_eq!(moved.min, Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(moved.max, Vec3::new(5.0, 4.0, 4.0), epsilon = EPSILON);
        assert_relative_eq!(moved.center, Vec3::new(3.0, 2.0, 2.0), epsilon = EPSILON);
    }

    #[test]
    fn test_which_side_uses_corner_radius() {
        let bound = BoundingBox::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0));
        let radius = 3.0_f32.sqrt();

        // farther than the face but closer than the corner still straddles
        let plane = Plane::new(Vec3::x(), -1.5);
        assert_eq!(bound.which_side(&plane), Side::Straddling);

        let far = Plane::new(Vec3::x(), -(radius + 0.1));
        assert_eq!(bound.which_side(&far), Side::Negative);
    }

    #[test]
    fn test_intersect_ray_slab() {
        let bound = BoundingBox::new(Vec3::new(-1.0, -1.0, 4.0), Vec3::new(1.0, 1.0, 6.0));

        let hit = Ray::new(Vec3::zeros(), Vec3::z());
        assert_relative_eq!(bound.intersect_ray(&hit).unwrap(), 4.0, epsilon = EPSILON);

        let miss = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::z());
        assert!(bound.intersect_ray(&miss).is_none());

        let behind = Ray::new(Vec3::zeros(), -Vec3::z());
        assert!(bound.intersect_ray(&behind).is_none());
    }
}
