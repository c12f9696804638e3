//! The bounding volume sum type used throughout the hierarchy

use super::aabb::BoundingBox;
use super::plane::{Plane, Side};
use super::sphere::{BoundingSphere, SpherePolicy};
use crate::error::BoundError;
use crate::foundation::math::{Quat, Vec3};
use crate::intersection::Ray;
use serde::{Deserialize, Serialize};

/// A sphere or an axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundingVolume {
    /// Bounding sphere
    Sphere(BoundingSphere),
    /// Axis-aligned bounding box
    Box(BoundingBox),
}

impl From<BoundingSphere> for BoundingVolume {
    fn from(sphere: BoundingSphere) -> Self {
        Self::Sphere(sphere)
    }
}

impl From<BoundingBox> for BoundingVolume {
    fn from(bound: BoundingBox) -> Self {
        Self::Box(bound)
    }
}

impl BoundingVolume {
    /// Empty sphere at the origin
    pub fn sphere() -> Self {
        Self::Sphere(BoundingSphere::default())
    }

    /// Empty box at the origin
    pub fn aabb() -> Self {
        Self::Box(BoundingBox::default())
    }

    /// Variant name, for messages and capsules
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Sphere(_) => "sphere",
            Self::Box(_) => "box",
        }
    }

    /// Refit to enclose `points` (spheres use the AABB-midpoint policy)
    pub fn compute_from_points(&mut self, points: &[Vec3]) {
        self.compute_from_points_with(points, SpherePolicy::default());
    }

    /// Refit to enclose `points`, choosing how spheres are fitted
    pub fn compute_from_points_with(&mut self, points: &[Vec3], policy: SpherePolicy) {
        match self {
            Self::Sphere(sphere) => sphere.compute_from_points_with(points, policy),
            Self::Box(bound) => bound.compute_from_points(points),
        }
    }

    /// Center of the volume
    pub const fn center(&self) -> Vec3 {
        match self {
            Self::Sphere(sphere) => sphere.center,
            Self::Box(bound) => bound.center,
        }
    }

    /// A new volume for `self` under rotation, per-axis scale and translation
    pub fn transform(&self, rotation: &Quat, translation: &Vec3, scale: &Vec3) -> Self {
        match self {
            Self::Sphere(sphere) => Self::Sphere(sphere.transform(rotation, translation, scale)),
            Self::Box(bound) => Self::Box(bound.transform(rotation, translation, scale)),
        }
    }

    /// Like [`BoundingVolume::transform`], but writes into `store` when it is
    /// the same variant. A `store` of the other variant is returned untouched.
    pub fn transform_into<'a>(
        &self,
        rotation: &Quat,
        translation: &Vec3,
        scale: &Vec3,
        store: &'a mut Self,
    ) -> &'a mut Self {
        match (self, &mut *store) {
            (Self::Sphere(sphere), Self::Sphere(out)) => *out = sphere.transform(rotation, translation, scale),
            (Self::Box(bound), Self::Box(out)) => *out = bound.transform(rotation, translation, scale),
            _ => {}
        }
        store
    }

    /// Classify against a plane
    pub fn which_side(&self, plane: &Plane) -> Side {
        match self {
            Self::Sphere(sphere) => sphere.which_side(plane),
            Self::Box(bound) => bound.which_side(plane),
        }
    }

    /// Merge two volumes of the same variant.
    ///
    /// # Errors
    ///
    /// [`BoundError::VariantMismatch`] when one is a sphere and the other a box.
    pub fn merge(&self, other: &Self) -> Result<Self, BoundError> {
        match (self, other) {
            (Self::Sphere(a), Self::Sphere(b)) => Ok(Self::Sphere(a.merge(b))),
            (Self::Box(a), Self::Box(b)) => Ok(Self::Box(a.merge(b))),
            _ => Err(BoundError::VariantMismatch {
                left: self.kind_name(),
                right: other.kind_name(),
            }),
        }
    }

    /// Merge that never fails: `other` is first replaced by an enclosing
    /// volume of `self`'s variant. The result keeps `self`'s variant.
    pub fn merge_enclosing(&self, other: &Self) -> Self {
        if self.kind_name() != other.kind_name() {
            log::warn!("Merging {} into {} through an enclosing volume", other.kind_name(), self.kind_name());
        }
        match (self, other) {
            (Self::Sphere(a), Self::Box(b)) => {
                let enclosing = BoundingSphere::new(b.center, (b.max - b.center).magnitude());
                Self::Sphere(a.merge(&enclosing))
            }
            (Self::Box(a), Self::Sphere(b)) => {
                let enclosing = BoundingBox::from_center_extents(b.center, Vec3::repeat(b.radius));
                Self::Box(a.merge(&enclosing))
            }
            (Self::Sphere(a), Self::Sphere(b)) => Self::Sphere(a.merge(b)),
            (Self::Box(a), Self::Box(b)) => Self::Box(a.merge(b)),
        }
    }

    /// Is `point` inside the volume
    pub fn contains_point(&self, point: &Vec3) -> bool {
        match self {
            Self::Sphere(sphere) => sphere.contains_point(point),
            Self::Box(bound) => bound.contains_point(point),
        }
    }

    /// Do two volumes overlap
    pub fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Sphere(a), Self::Sphere(b)) => a.intersects(b),
            (Self::Box(a), Self::Box(b)) => a.intersects(b),
            (Self::Sphere(s), Self::Box(b)) | (Self::Box(b), Self::Sphere(s)) => {
                let closest = b.closest_point(&s.center);
                (closest - s.center).magnitude_squared() <= s.radius * s.radius
            }
        }
    }

    /// Does `ray` hit the volume
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        self.ray_distance(ray).is_some()
    }

    /// Distance along `ray` to where it enters the volume
    pub fn ray_distance(&self, ray: &Ray) -> Option<f32> {
        match self {
            Self::Sphere(sphere) => sphere.intersect_ray(ray),
            Self::Box(bound) => bound.intersect_ray(ray),
        }
    }

    /// Distance from `point` to the surface of the volume
    pub fn distance_to(&self, point: &Vec3) -> f32 {
        match self {
            Self::Sphere(sphere) => sphere.distance_to(point),
            Self::Box(bound) => bound.distance_to(point),
        }
    }

    /// Enclosed volume
    pub fn volume(&self) -> f32 {
        match self {
            Self::Sphere(sphere) => sphere.volume(),
            Self::Box(bound) => bound.volume(),
        }
    }

    /// The sphere, if this is one
    pub const fn as_sphere(&self) -> Option<&BoundingSphere> {
        match self {
            Self::Sphere(sphere) => Some(sphere),
            Self::Box(_) => None,
        }
    }

    /// The box, if this is one
    pub const fn as_box(&self) -> Option<&BoundingBox> {
        match self {
            Self::Box(bound) => Some(bound),
            Self::Sphere(_) => None,
        }
    }
}
