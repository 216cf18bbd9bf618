//! Rotation helpers and analytic Jacobians for the position / yaw-bias filter
//!
//! This module provides the frame rotation used by the odometry transition model, its
//! analytic derivative, and the Jacobians consumed by [crate::pose::PoseEkf].
//!
//! # State Ordering
//!
//! ```text
//! x = [p_x, p_y, p_z, yaw_bias]
//! ```
//! where:
//! - `p_x`, `p_y`, `p_z`: position in the world frame (m)
//! - `yaw_bias`: heading correction about the vertical axis (rad)
//!
//! # Transition Model
//!
//! For a world-frame translation increment $t$:
//!
//! $$
//! \begin{aligned}
//! p(+) &= p(-) + R_z(\psi_b) \, t \\\\
//! \psi_b(+) &= \psi_b(-)
//! \end{aligned}
//! $$
//!
//! so the only non-trivial Jacobian entry is
//! $\partial p(+) / \partial \psi_b = \frac{d R_z}{d \psi_b} t$.

use crate::{POSITION_SIZE, STATE_SIZE, YAW_BIAS_INDEX};
use nalgebra::{Matrix3, Matrix4, Rotation3, SMatrix, Vector3};

/// Rotation by `angle` radians about the vertical (+Z) axis.
///
/// Any other orientation representation (quaternion, axis-angle) can be derived from the
/// returned rotation matrix.
///
/// # Example
///
/// ```rust
/// use pose_ekf::linearize::rotation_about_vertical;
/// use nalgebra::Vector3;
/// let r = rotation_about_vertical(std::f64::consts::FRAC_PI_2);
/// let v = r * Vector3::x();
/// assert!((v - Vector3::y()).norm() < 1e-12);
/// ```
pub fn rotation_about_vertical(angle: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle)
}

/// Derivative of [rotation_about_vertical] with respect to its angle.
///
/// $$
/// \frac{d R_z}{d \psi} = \begin{bmatrix} -\sin\psi & -\cos\psi & 0 \\\\ \cos\psi & -\sin\psi & 0 \\\\ 0 & 0 & 0 \end{bmatrix}
/// $$
pub fn rotation_about_vertical_derivative(angle: f64) -> Matrix3<f64> {
    let (sin, cos) = angle.sin_cos();
    Matrix3::new(
        -sin, -cos, 0.0, //
        cos, -sin, 0.0, //
        0.0, 0.0, 0.0,
    )
}

/// Compute the state transition Jacobian (F) for a translation increment
///
/// Identity except for the block coupling the position rows to the yaw-bias column, which
/// holds $\frac{d R_z}{d \psi_b}(\psi_b) \, t$. The yaw-bias row has no dependence on
/// position.
///
/// # Arguments
///
/// * `yaw_bias` - current yaw-bias estimate (rad)
/// * `translation` - translation increment in the world frame (m)
pub fn transition_jacobian(yaw_bias: f64, translation: &Vector3<f64>) -> Matrix4<f64> {
    let mut jacobian = Matrix4::<f64>::identity();
    jacobian
        .fixed_view_mut::<POSITION_SIZE, 1>(0, YAW_BIAS_INDEX)
        .copy_from(&(rotation_about_vertical_derivative(yaw_bias) * translation));
    jacobian
}

/// Rotate the position block of a process noise covariance into the bias-corrected frame.
///
/// Returns a copy of `process_noise` with its leading 3×3 block replaced by
/// $R Q_{pp} R^T$. The yaw-bias row and column are carried over unchanged.
pub fn rotate_position_noise(
    process_noise: &Matrix4<f64>,
    rotation: &Rotation3<f64>,
) -> Matrix4<f64> {
    let r = rotation.matrix();
    let mut rotated = *process_noise;
    let position_block: Matrix3<f64> = process_noise
        .fixed_view::<POSITION_SIZE, POSITION_SIZE>(0, 0)
        .into_owned();
    rotated
        .fixed_view_mut::<POSITION_SIZE, POSITION_SIZE>(0, 0)
        .copy_from(&(r * position_block * r.transpose()));
    rotated
}

/// Observation Jacobian for a position-only fix: identity on the position rows.
pub fn position_measurement_jacobian() -> SMatrix<f64, POSITION_SIZE, STATE_SIZE> {
    SMatrix::<f64, POSITION_SIZE, STATE_SIZE>::identity()
}

/// Observation Jacobian for a position + yaw-correction fix: identity on every state row.
pub fn position_orientation_measurement_jacobian() -> Matrix4<f64> {
    Matrix4::identity()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn rotation_quarter_turn() {
        let r = rotation_about_vertical(FRAC_PI_2);
        let v = r * Vector3::new(1.0, 0.0, 2.0);
        assert_approx_eq!(v[0], 0.0, 1e-12);
        assert_approx_eq!(v[1], 1.0, 1e-12);
        assert_approx_eq!(v[2], 2.0, 1e-12);
    }

    #[test]
    fn rotation_derivative_matches_finite_difference() {
        let h = 1e-6;
        for angle in [0.0, 0.3, -1.2, PI] {
            let numeric = (rotation_about_vertical(angle + h).matrix()
                - rotation_about_vertical(angle - h).matrix())
                / (2.0 * h);
            let analytic = rotation_about_vertical_derivative(angle);
            assert!((numeric - analytic).amax() < 1e-8);
        }
    }

    #[test]
    fn transition_jacobian_zero_bias() {
        let t = Vector3::new(1.0, 0.0, 0.0);
        let jacobian = transition_jacobian(0.0, &t);
        // dR_z(0) * [1, 0, 0] = [0, 1, 0]
        assert_approx_eq!(jacobian[(0, 3)], 0.0, 1e-12);
        assert_approx_eq!(jacobian[(1, 3)], 1.0, 1e-12);
        assert_approx_eq!(jacobian[(2, 3)], 0.0, 1e-12);
        for i in 0..4 {
            assert_eq!(jacobian[(i, i)], 1.0);
        }
        for j in 0..3 {
            assert_eq!(jacobian[(3, j)], 0.0);
        }
    }

    #[test]
    fn transition_jacobian_matches_finite_difference() {
        let t = Vector3::new(0.7, -1.3, 0.4);
        let bias = 0.25;
        let h = 1e-6;
        let numeric = (rotation_about_vertical(bias + h) * t - rotation_about_vertical(bias - h) * t)
            / (2.0 * h);
        let jacobian = transition_jacobian(bias, &t);
        for i in 0..3 {
            assert_approx_eq!(jacobian[(i, 3)], numeric[i], 1e-8);
        }
        // Vertical motion never couples to the yaw bias
        assert_eq!(jacobian[(2, 3)], 0.0);
    }

    #[test]
    fn rotate_noise_congruence() {
        let q = Matrix4::from_diagonal(&nalgebra::Vector4::new(4.0, 1.0, 2.0, 0.5));
        let rotation = rotation_about_vertical(FRAC_PI_2);
        let rotated = rotate_position_noise(&q, &rotation);
        // Quarter turn swaps the x and y variances.
        assert_approx_eq!(rotated[(0, 0)], 1.0, 1e-12);
        assert_approx_eq!(rotated[(1, 1)], 4.0, 1e-12);
        assert_approx_eq!(rotated[(2, 2)], 2.0, 1e-12);
        assert_eq!(rotated[(3, 3)], 0.5);
        assert_approx_eq!(rotated[(0, 1)], 0.0, 1e-12);
        // Input untouched
        assert_eq!(q[(0, 0)], 4.0);
    }

    #[test]
    fn rotate_isotropic_noise_is_invariant() {
        let q = Matrix4::identity() * 0.3;
        let rotated = rotate_position_noise(&q, &rotation_about_vertical(0.77));
        assert!((rotated - q).amax() < 1e-12);
    }

    #[test]
    fn measurement_jacobians_select_state() {
        let x = nalgebra::Vector4::new(1.0, 2.0, 3.0, 0.1);
        let h_pos = position_measurement_jacobian() * x;
        assert_eq!(h_pos, Vector3::new(1.0, 2.0, 3.0));
        let h_full = position_orientation_measurement_jacobian() * x;
        assert_eq!(h_full, x);
    }
}
