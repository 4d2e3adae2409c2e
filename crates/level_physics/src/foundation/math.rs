//! Math utilities and types
//!
//! Provides the vector and matrix types shared by the spatial index,
//! the collision routines and the body model.

pub use nalgebra::{Matrix4, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Machine epsilon for single precision, used for parallel and near-zero checks
    pub const EPSILON: f32 = f32::EPSILON;

    /// Single precision epsilon widened to double precision
    pub const EPSILON_F64: f64 = f32::EPSILON as f64;
}

/// Math utility functions
pub mod utils {
    use super::{Mat4, Point3, Vec3, Vector3};

    /// Dot product widened to double precision
    pub fn dot_f64(a: &Vec3, b: &Vec3) -> f64 {
        f64::from(a.x) * f64::from(b.x)
            + f64::from(a.y) * f64::from(b.y)
            + f64::from(a.z) * f64::from(b.z)
    }

    /// Squared length widened to double precision
    pub fn length_squared_f64(v: &Vec3) -> f64 {
        dot_f64(v, v)
    }

    /// Scale a vector by a double precision factor
    #[allow(clippy::cast_possible_truncation)]
    pub fn scale_f64(v: &Vec3, factor: f64) -> Vec3 {
        v * factor as f32
    }

    /// Widen to double precision
    pub fn widen(v: &Vec3) -> Vector3<f64> {
        v.cast::<f64>()
    }

    /// Narrow a double precision result back to single precision
    pub fn narrow(v: &Vector3<f64>) -> Vec3 {
        v.cast::<f32>()
    }

    /// Normalize, returning zero for vectors too short to carry a direction
    pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
        v.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
    }

    /// Transform a position by an affine matrix
    pub fn transform_position(matrix: &Mat4, position: &Vec3) -> Vec3 {
        matrix.transform_point(&Point3::from(*position)).coords
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dot_f64_matches_f32() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-4.0, 0.5, 2.0);
        assert_relative_eq!(dot_f64(&a, &b), f64::from(a.dot(&b)), epsilon = 1e-6);
    }

    #[test]
    fn test_widen_then_narrow_keeps_single_precision_values() {
        let v = Vec3::new(0.1, -2.5, 1.0e-7);
        assert_eq!(narrow(&widen(&v)), v);
    }

    #[test]
    fn test_normalize_or_zero_handles_zero_vector() {
        assert_eq!(normalize_or_zero(&Vec3::zeros()), Vec3::zeros());
        assert_relative_eq!(normalize_or_zero(&Vec3::new(0.0, 3.0, 0.0)), Vec3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_transform_position_applies_translation() {
        let matrix = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let moved = transform_position(&matrix, &Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(moved, Vec3::new(2.0, 3.0, 4.0), epsilon = 1e-6);
    }
}
