//! 3D transformation utilities
//!
//! [`Transform3D`] is the per-instance transform of a swarm and the
//! whole-field model transform handed to the renderer.

use bytemuck::{Pod, Zeroable};
use nalgebra::{Matrix4, Point3, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D affine transformation stored as a column-major homogeneous matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

// Matrix4<f32> is 16 contiguous f32 with no padding.
unsafe impl Pod for Transform3D {}
unsafe impl Zeroable for Transform3D {}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Create a rotation transformation from a quaternion
    pub fn rotation(rotation: UnitQuaternion<f32>) -> Self {
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    /// Rotation about the Y axis by `angle` radians
    pub fn rotation_y(angle: f32) -> Self {
        Self {
            matrix: Rotation3::from_axis_angle(&Vector3::y_axis(), angle).to_homogeneous(),
        }
    }

    /// Rotation from XYZ Euler angles (roll about x, pitch about y, yaw about z)
    pub fn from_euler_angles(angles: [f32; 3]) -> Self {
        Self {
            matrix: Rotation3::from_euler_angles(angles[0], angles[1], angles[2]).to_homogeneous(),
        }
    }

    /// Translation part of the transform
    pub fn position(&self) -> Vector3<f32> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Overwrite the translation part, keeping rotation and scale
    pub fn set_position(&mut self, position: &Vector3<f32>) {
        self.matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(position);
    }

    /// Post-multiply by `other` in place (`self = self * other`)
    pub fn multiply_in_place(&mut self, other: &Self) {
        self.matrix *= other.matrix;
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Apply the transformation to a vector
    pub fn transform_vector(&self, vector: &Vector3<f32>) -> Vector3<f32> {
        self.matrix.fixed_view::<3, 3>(0, 0) * vector
    }

    /// Compose this transformation with another
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f32) -> bool {
        let identity = Matrix4::identity();
        (self.matrix - identity).norm() < epsilon
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Matrix4<f32>> for Transform3D {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_set_position_keeps_rotation() {
        let mut t = Transform3D::rotation_y(0.7);
        t.set_position(&Vector3::new(1.0, 2.0, 3.0));

        assert_relative_eq!(t.position(), Vector3::new(1.0, 2.0, 3.0));
        let rotated = t.transform_vector(&Vector3::x());
        assert_relative_eq!(rotated, Rotation3::from_axis_angle(&Vector3::y_axis(), 0.7) * Vector3::x(), epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_y_in_place_preserves_translation() {
        let mut t = Transform3D::translation(Vector3::new(0.5, -1.0, 2.0));
        t.multiply_in_place(&Transform3D::rotation_y(1.3));
        assert_relative_eq!(t.position(), Vector3::new(0.5, -1.0, 2.0), epsilon = 1e-6);
    }

    #[test]
    fn test_zero_euler_is_identity() {
        assert!(Transform3D::from_euler_angles([0.0; 3]).is_identity(1e-6));
    }

    #[test]
    fn test_transform_point() {
        let t = Transform3D::translation(Vector3::new(1.0, 0.0, 0.0));
        let p = t.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3::new(2.0, 1.0, 1.0));
    }
}
