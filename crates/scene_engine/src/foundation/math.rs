//! Math utilities and types
//!
//! Provides fundamental math types for 3D scene management.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Compose a local transform matrix from position, rotation and scale.
///
/// Scale is applied first, then rotation, then translation (`T * R * S`).
pub fn compose_trs(position: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position)
        * rotation.to_homogeneous()
        * Mat4::new_nonuniform_scaling(scale)
}

/// Extract the translation column of an affine matrix
pub fn translation_of(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

/// Component-wise minimum of two vectors
pub fn min_components(a: &Vec3, b: &Vec3) -> Vec3 {
    a.zip_map(b, f32::min)
}

/// Component-wise maximum of two vectors
pub fn max_components(a: &Vec3, b: &Vec3) -> Vec3 {
    a.zip_map(b, f32::max)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compose_applies_scale_rotation_translation() {
        let position = Vec3::new(1.0, 2.0, 3.0);
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), constants::HALF_PI);
        let scale = Vec3::new(2.0, 2.0, 2.0);

        let matrix = compose_trs(&position, &rotation, &scale);
        let point = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));

        // (1,0,0) scaled to (2,0,0), rotated 90° about Y to (0,0,-2), then translated
        assert_relative_eq!(point.coords, Vec3::new(1.0, 2.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_translation_extraction() {
        let matrix = Mat4::new_translation(&Vec3::new(-4.0, 0.5, 9.0));
        assert_eq!(translation_of(&matrix), Vec3::new(-4.0, 0.5, 9.0));
    }

    #[test]
    fn test_component_min_max() {
        let a = Vec3::new(1.0, -2.0, 3.0);
        let b = Vec3::new(-1.0, 2.0, 3.5);
        assert_eq!(min_components(&a, &b), Vec3::new(-1.0, -2.0, 3.0));
        assert_eq!(max_components(&a, &b), Vec3::new(1.0, 2.0, 3.5));
    }
}
