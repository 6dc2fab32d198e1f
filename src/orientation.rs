//! Body frame to inertial frame rotation.

use nalgebra::{Matrix3, Quaternion, Vector3};

/// Builds the rotation matrix for an attitude quaternion `(a, b, c, d)` = `(w, x, y, z)`.
///
/// The quaternion is normalized first. A zero or non-finite quaternion yields the
/// identity.
pub fn rotation_matrix(quaternion: &Quaternion<f32>) -> Matrix3<f32> {
    let norm = quaternion.norm();
    if !norm.is_finite() || norm <= f32::EPSILON {
        return Matrix3::identity();
    }

    let a = quaternion.w / norm;
    let b = quaternion.i / norm;
    let c = quaternion.j / norm;
    let d = quaternion.k / norm;

    Matrix3::new(
        a * a + b * b - c * c - d * d,
        2.0 * (b * c - a * d),
        2.0 * (b * d + a * c),
        2.0 * (b * c + a * d),
        a * a - b * b + c * c - d * d,
        2.0 * (c * d - a * b),
        2.0 * (b * d - a * c),
        2.0 * (c * d + a * b),
        a * a - b * b - c * c + d * d,
    )
}

/// Rotates a body frame acceleration into the inertial frame.
pub fn body_to_inertial(
    quaternion: &Quaternion<f32>,
    acceleration_body: &Vector3<f32>,
) -> Vector3<f32> {
    rotation_matrix(quaternion) * acceleration_body
}
