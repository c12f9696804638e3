//! View frustum and camera used for visibility culling

use crate::bounding::{BoundingVolume, Plane, Side};
use crate::foundation::math::{utils, Mat4, Point3, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Result of testing a bound against the frustum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrustumIntersect {
    /// Entirely outside at least one plane
    Outside,
    /// Straddles at least one plane
    #[default]
    Intersects,
    /// Entirely inside every plane
    Inside,
}

/// Index of each frustum plane
pub mod planes {
    /// Left plane
    pub const LEFT: usize = 0;
    /// Right plane
    pub const RIGHT: usize = 1;
    /// Bottom plane
    pub const BOTTOM: usize = 2;
    /// Top plane
    pub const TOP: usize = 3;
    /// Near plane
    pub const NEAR: usize = 4;
    /// Far plane
    pub const FAR: usize = 5;
}

/// Frustum for visibility culling
///
/// Plane normals face into the frustum, so the positive side of every plane
/// is inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Six planes defining the frustum (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub const fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Uses the Gribb-Hartmann method for a clip space with z in [-1, 1].
    /// Returns `None` if the matrix is degenerate.
    pub fn from_matrix(view_projection: &Mat4) -> Option<Self> {
        let m = view_projection;
        let row = |i: usize| m.row(i).transpose();
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let plane = |v: Vec4| Plane::from_coefficients(v.x, v.y, v.z, v.w);
        Some(Self::new([
            plane(r3 + r0)?,
            plane(r3 - r0)?,
            plane(r3 + r1)?,
            plane(r3 - r1)?,
            plane(r3 + r2)?,
            plane(r3 - r2)?,
        ]))
    }

    /// Test `bound` against the planes not yet marked in `plane_state`.
    ///
    /// Each bit of `plane_state` marks a plane the bound's ancestor is fully
    /// inside of; such planes are skipped and planes this bound is fully
    /// inside of are marked for its descendants.
    pub fn contains(&self, bound: &BoundingVolume, plane_state: &mut u32) -> FrustumIntersect {
        let mut result = FrustumIntersect::Inside;

        for (index, plane) in self.planes.iter().enumerate().rev() {
            let mask = 1 << index;
            if *plane_state & mask != 0 {
                continue;
            }

            match bound.which_side(plane) {
                Side::Negative => return FrustumIntersect::Outside,
                Side::Positive => *plane_state |= mask,
                Side::Straddling => result = FrustumIntersect::Intersects,
            }
        }

        result
    }
}

/// Viewpoint used by [`crate::scene::SceneGraph::draw`]
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub location: Vec3,
    /// World-space frustum
    pub frustum: Frustum,
    plane_state: u32,
}

impl Camera {
    /// Camera at `location` looking through `frustum`
    pub const fn new(location: Vec3, frustum: Frustum) -> Self {
        Self {
            location,
            frustum,
            plane_state: 0,
        }
    }

    /// Right-handed perspective camera looking from `location` at `target`.
    /// `fov_degrees` is the vertical field of view.
    ///
    /// Returns `None` for a degenerate setup (coincident eye and target, or
    /// an empty depth range).
    pub fn perspective(
        location: Vec3,
        target: Vec3,
        up: Vec3,
        fov_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Option<Self> {
        if (target - location).norm_squared() <= f32::EPSILON || far <= near {
            return None;
        }

        let view = Mat4::look_at_rh(&Point3::from(location), &Point3::from(target), &up);
        let projection = Mat4::new_perspective(aspect, utils::deg_to_rad(fov_degrees), near, far);
        let frustum = Frustum::from_matrix(&(projection * view))?;

        log::trace!("Perspective camera at {location:?} looking at {target:?}");
        Some(Self::new(location, frustum))
    }

    /// Mask of planes the current ancestor chain is fully inside of
    pub const fn plane_state(&self) -> u32 {
        self.plane_state
    }

    /// Restore a mask saved by [`Camera::plane_state`]
    pub fn set_plane_state(&mut self, plane_state: u32) {
        self.plane_state = plane_state;
    }

    /// Test a world bound; a spatial without a bound is treated as inside
    pub fn contains(&mut self, bound: Option<&BoundingVolume>) -> FrustumIntersect {
        match bound {
            Some(bound) => self.frustum.contains(bound, &mut self.plane_state),
            None => FrustumIntersect::Inside,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding::{BoundingBox, BoundingSphere};

    fn camera() -> Camera {
        Camera::perspective(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::zeros(),
            Vec3::y(),
            60.0,
            1.0,
            0.1,
            100.0,
        )
        .unwrap()
    }

    #[test]
    fn test_planes_face_inward() {
        let camera = camera();
        for plane in &camera.frustum.planes {
            assert_eq!(plane.which_side(&Vec3::zeros()), Side::Positive);
        }
    }

    #[test]
    fn test_contains_classifies_bounds() {
        let mut camera = camera();

        let inside = BoundingVolume::from(BoundingSphere::new(Vec3::zeros(), 1.0));
        assert_eq!(camera.contains(Some(&inside)), FrustumIntersect::Inside);

        camera.set_plane_state(0);
        let behind = BoundingVolume::from(BoundingSphere::new(Vec3::new(0.0, 0.0, 20.0), 1.0));
        assert_eq!(camera.contains(Some(&behind)), FrustumIntersect::Outside);

        camera.set_plane_state(0);
        let near_plane = BoundingVolume::from(BoundingBox::from_center_extents(Vec3::new(0.0, 0.0, 10.0), Vec3::repeat(1.0)));
        assert_eq!(camera.contains(Some(&near_plane)), FrustumIntersect::Intersects);

        assert_eq!(camera.contains(None), FrustumIntersect::Inside);
    }

    #[test]
    fn test_plane_state_skips_marked_planes() {
        let mut camera = camera();
        let inside = BoundingVolume::from(BoundingSphere::new(Vec3::zeros(), 1.0));
        camera.contains(Some(&inside));
        assert_eq!(camera.plane_state(), 0b11_1111);

        // Every plane is masked, so even a far away bound is not rejected.
        let behind = BoundingVolume::from(BoundingSphere::new(Vec3::new(0.0, 0.0, 20.0), 1.0));
        assert_eq!(camera.contains(Some(&behind)), FrustumIntersect::Inside);
    }

    #[test]
    fn test_degenerate_camera() {
        assert!(Camera::perspective(Vec3::zeros(), Vec3::zeros(), Vec3::y(), 60.0, 1.0, 0.1, 100.0).is_none());
    }
}
