//! Bounding volumes
//!
//! Spheres and axis-aligned boxes with the operations the hierarchy needs:
//! fitting to points, transforming into world space, merging child bounds,
//! and classifying against planes for frustum culling.

pub mod aabb;
pub mod plane;
pub mod sphere;
pub mod volume;

pub use aabb::BoundingBox;
pub use plane::{Plane, Side};
pub use sphere::{BoundingSphere, SpherePolicy};
pub use volume::BoundingVolume;
