//! Measurement and input types for the position / yaw-bias filter.
//!
//! This module defines the two supported absolute observations, a position fix and a
//! position fix with an observed yaw correction, plus the relative-motion input used by the
//! prediction step. Each observation knows how to apply itself to a [PoseEkf].

use crate::error::FilterResult;
use crate::pose::PoseEkf;

use std::fmt::{self, Display};

use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// Generic measurement model trait for the absolute observations accepted by [PoseEkf]
pub trait MeasurementModel {
    /// Get the dimension of the measurement vector
    fn get_dimension(&self) -> usize;
    /// Apply the measurement as a gated correction. Returns `Ok(true)` when rejected.
    fn correct(&self, filter: &mut PoseEkf, reject_threshold: f64) -> FilterResult<bool>;
}

/// Absolute position fix in the world frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionMeasurement {
    /// Position (m)
    pub position: Vector3<f64>,
    /// Position covariance (m²)
    pub covariance: Matrix3<f64>,
}
impl PositionMeasurement {
    pub fn new(position: Vector3<f64>, covariance: Matrix3<f64>) -> Self {
        PositionMeasurement {
            position,
            covariance,
        }
    }
    /// Diagonal covariance from horizontal and vertical standard deviations (m)
    pub fn from_std(position: Vector3<f64>, horizontal_noise_std: f64, vertical_noise_std: f64) -> Self {
        let covariance = Matrix3::from_diagonal(&Vector3::new(
            horizontal_noise_std.powi(2),
            horizontal_noise_std.powi(2),
            vertical_noise_std.powi(2),
        ));
        PositionMeasurement::new(position, covariance)
    }
}
impl Display for PositionMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PositionMeasurement(x: {:.3}, y: {:.3}, z: {:.3}, horiz_var: {:.4}, vert_var: {:.4})",
            self.position[0],
            self.position[1],
            self.position[2],
            self.covariance[(0, 0)],
            self.covariance[(2, 2)]
        )
    }
}
impl MeasurementModel for PositionMeasurement {
    fn get_dimension(&self) -> usize {
        3
    }
    fn correct(&self, filter: &mut PoseEkf, reject_threshold: f64) -> FilterResult<bool> {
        filter.correct_position(&self.position, &self.covariance, reject_threshold)
    }
}

/// Absolute position fix together with an observed yaw correction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionOrientationMeasurement {
    /// Position (m)
    pub position: Vector3<f64>,
    /// Observed yaw correction (rad)
    pub yaw: f64,
    /// Covariance of `[position, yaw]`
    pub covariance: Matrix4<f64>,
}
impl PositionOrientationMeasurement {
    pub fn new(position: Vector3<f64>, yaw: f64, covariance: Matrix4<f64>) -> Self {
        PositionOrientationMeasurement {
            position,
            yaw,
            covariance,
        }
    }
    pub fn from_std(
        position: Vector3<f64>,
        yaw: f64,
        horizontal_noise_std: f64,
        vertical_noise_std: f64,
        yaw_noise_std: f64,
    ) -> Self {
        let covariance = Matrix4::from_diagonal(&Vector4::new(
            horizontal_noise_std.powi(2),
            horizontal_noise_std.powi(2),
            vertical_noise_std.powi(2),
            yaw_noise_std.powi(2),
        ));
        PositionOrientationMeasurement::new(position, yaw, covariance)
    }
    /// Measurement as `[p_x, p_y, p_z, yaw]`
    pub fn get_vector(&self) -> Vector4<f64> {
        Vector4::new(self.position[0], self.position[1], self.position[2], self.yaw)
    }
}
impl Display for PositionOrientationMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PositionOrientationMeasurement(x: {:.3}, y: {:.3}, z: {:.3}, yaw: {:.4})",
            self.position[0], self.position[1], self.position[2], self.yaw
        )
    }
}
impl MeasurementModel for PositionOrientationMeasurement {
    fn get_dimension(&self) -> usize {
        4
    }
    fn correct(&self, filter: &mut PoseEkf, reject_threshold: f64) -> FilterResult<bool> {
        filter.correct_position_orientation(&self.get_vector(), &self.covariance, reject_threshold)
    }
}

/// Relative motion increment driving the prediction step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OdometryIncrement {
    /// Translation since the last prediction, world frame before bias correction (m)
    pub translation: Vector3<f64>,
    /// Process noise covariance of `[translation, yaw_bias]`
    pub process_noise: Matrix4<f64>,
}
impl OdometryIncrement {
    pub fn new(translation: Vector3<f64>, process_noise: Matrix4<f64>) -> Self {
        OdometryIncrement {
            translation,
            process_noise,
        }
    }
    /// Diagonal process noise from the per-axis translation std (m) and the yaw-bias
    /// random-walk std (rad) of one step
    pub fn from_std(translation: Vector3<f64>, translation_noise_std: f64, yaw_bias_noise_std: f64) -> Self {
        let variance = translation_noise_std.powi(2);
        let process_noise = Matrix4::from_diagonal(&Vector4::new(
            variance,
            variance,
            variance,
            yaw_bias_noise_std.powi(2),
        ));
        OdometryIncrement::new(translation, process_noise)
    }
}
impl Display for OdometryIncrement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OdometryIncrement(dx: {:.4}, dy: {:.4}, dz: {:.4})",
            self.translation[0], self.translation[1], self.translation[2]
        )
    }
}
