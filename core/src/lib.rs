//! Position and yaw-bias estimation toolbox
//!
//! This crate provides an Extended Kalman Filter that fuses relative motion increments (odometry, visual
//! odometry, dead reckoning) with occasional absolute position fixes (GNSS, beacons, map matching) to estimate
//! a platform's position together with a slowly varying heading offset. That heading offset, the yaw bias, is
//! the rotation about the vertical axis between the frame in which the relative motion is integrated and the
//! world frame. Absolute fixes pass through a chi-square innovation gate before they are applied, so gross
//! outliers are rejected instead of corrupting the estimate.
//!
//! This crate is primarily built off of the following dependencies:
//! - [`nalgebra`](https://crates.io/crates/nalgebra): Provides the fixed-size linear algebra used by the filter.
//! - [`statrs`](https://crates.io/crates/statrs): Provides the chi-square quantile used by the innovation gate.
//! - [`rand`](https://crates.io/crates/rand) and [`rand_distr`](https://crates.io/crates/rand_distr): Provide noise generation for the scenario simulator.
//!
//! All other functionality is auxiliary (errors, logging, configuration and CSV I/O).
//!
//! ## Crate overview
//!
//! This crate is organized into several modules:
//! - [error]: Error type shared by every fallible filter operation.
//! - [gating]: Chi-square critical values and Mahalanobis distance gating.
//! - [kalman]: Generic, const-sized Extended Kalman Filter with a gated correction step.
//! - [linalg]: Linear algebra utilities (symmetrization, strict SPD inversion).
//! - [linearize]: Rotations about the vertical axis and the analytic Jacobians of the motion and measurement models.
//! - [measurements]: Typed absolute measurements and odometry increments.
//! - [pose]: The position / yaw-bias filter itself.
//! - [sim]: A seeded scenario simulator for exercising the filter end to end.
//!
//! ## State definition
//!
//! $$
//! x = [p_x, p_y, p_z, \psi_b]
//! $$
//!
//! Where:
//! - $p_x$, $p_y$, and $p_z$ are the platform position in the world frame (m). The third axis is vertical.
//! - $\psi_b$ is the yaw bias (rad), a right-handed rotation about the vertical axis.
//!
//! ## Motion model
//!
//! Given a translation increment $t$ expressed in the odometry frame:
//!
//! $$
//! \begin{aligned}
//! p(+) &= p(-) + R_z(\psi_b) \, t \\\\
//! \psi_b(+) &= \psi_b(-)
//! \end{aligned}
//! $$
//!
//! The yaw bias follows a random walk whose strength is set by the caller through the process noise.
//!
//! ## Measurement models
//!
//! Both absolute measurement models observe the state directly:
//! - Position fixes observe $[p_x, p_y, p_z]$.
//! - Position + orientation fixes observe $[p_x, p_y, p_z, \psi_b]$.
//!
//! In both cases only the two horizontal components of the innovation enter the chi-square gate. The vertical
//! component and the yaw component are applied whenever the horizontal innovation is accepted.
pub mod error;
pub mod gating;
pub mod kalman;
pub mod linalg;
pub mod linearize;
pub mod measurements;
pub mod pose;
pub mod sim;

pub use error::{ConfigError, FilterError, FilterResult};
pub use measurements::{
    MeasurementModel, OdometryIncrement, PositionMeasurement, PositionOrientationMeasurement,
};
pub use pose::{PosYawBiasState, PoseEkf};

/// Number of elements in the filter state
pub const STATE_SIZE: usize = 4;
/// Number of position elements in the filter state
pub const POSITION_SIZE: usize = 3;
/// Index of the first position element
pub const POSITION_INDEX: usize = 0;
/// Index of the yaw-bias element
pub const YAW_BIAS_INDEX: usize = 3;

/// Wrap an angle to the range $-\pi$ to $\pi$ radians
///
/// # Arguments
/// * `angle` - The angle to be wrapped (rad)
/// # Returns
/// * The wrapped angle, in the range $[-\pi, \pi]$ radians. Inputs already in range are returned unchanged and
///   non-finite inputs give NaN.
/// # Example
/// ```rust
/// use pose_ekf::wrap_to_pi;
/// use std::f64::consts::PI;
/// let wrapped = wrap_to_pi(1.5 * PI);
/// assert!((wrapped + 0.5 * PI).abs() < 1e-12);
/// ```
pub fn wrap_to_pi(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    if (-PI..=PI).contains(&angle) {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // Odd multiples of pi above the range land on +pi.
    if wrapped == -PI && angle > 0.0 { PI } else { wrapped }
}
