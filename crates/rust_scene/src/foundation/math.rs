//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the [`Transform`] used for both the local
//! and the derived world placement of every spatial.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Translation, rotation and per-axis scale.
///
/// Applying a transform to a point scales it, rotates it, then translates it.
/// Composition with [`Transform::combine`] follows the scene hierarchy rule:
/// the child translation is rotated by the parent, then scaled by the parent
/// scale, then offset by the parent translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation
    pub translation: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only a translation
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix (translate * rotate * scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.translation)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        (self.rotation * point.component_mul(&self.scale)) + self.translation
    }

    /// Compose `child` under `self`, producing the child's world transform.
    ///
    /// Scale first, then rotation, then translation:
    /// `translation = (self.rotation * child.translation) * self.scale + self.translation`.
    pub fn combine(&self, child: &Self) -> Self {
        let scale = self.scale.component_mul(&child.scale);
        let rotation = self.rotation * child.rotation;
        let translation =
            (self.rotation * child.translation).component_mul(&self.scale) + self.translation;

        Self {
            translation,
            rotation,
            scale,
        }
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Tolerance below which a length is treated as zero
    pub const ZERO_TOLERANCE: f32 = 1e-6;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_combine_root_is_identity() {
        let local = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_axis_angle(&Vec3::y_axis(), 0.3),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };

        let world = Transform::identity().combine(&local);
        assert_relative_eq!(world.translation, local.translation, epsilon = EPSILON);
        assert_relative_eq!(world.scale, local.scale, epsilon = EPSILON);
    }

    #[test]
    fn test_combine_rotates_then_scales_then_translates() {
        let parent = Transform {
            translation: Vec3::new(10.0, 0.0, 0.0),
            rotation: Quat::from_axis_angle(&Vec3::z_axis(), constants::PI / 2.0),
            scale: Vec3::new(2.0, 3.0, 1.0),
        };
        let child = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));

        let world = parent.combine(&child);

        // (1,0,0) rotated 90 degrees about z is (0,1,0), scaled by (2,3,1) is (0,3,0)
        assert_relative_eq!(world.translation, Vec3::new(10.0, 3.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(world.scale, Vec3::new(2.0, 3.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transform_point_matches_matrix_for_uniform_scale() {
        let transform = Transform {
            translation: Vec3::new(0.0, -1.0, 4.0),
            rotation: Quat::from_axis_angle(&Vec3::x_axis(), 1.1),
            scale: Vec3::repeat(0.5),
        };
        let point = Vec3::new(1.0, 2.0, 3.0);

        let by_matrix = transform.to_matrix().transform_point(&Point3::from(point));
        assert_relative_eq!(transform.transform_point(&point), by_matrix.coords, epsilon = EPSILON);
    }
}
