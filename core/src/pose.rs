//! Position and yaw-bias filter
//!
//! [PoseEkf] adapts the generic [ExtendedKalmanFilter] to a four element state made of a
//! world-frame position and a scalar yaw bias. Relative motion increments drive the
//! prediction; absolute position or position + yaw-correction fixes drive the gated
//! correction.
//!
//! The yaw bias is the heading offset between the frame odometry is integrated in and the
//! world frame. Translation increments are rotated by the current bias estimate before being
//! added to the position, and the process noise of the position block is rotated the same way
//! so that it is expressed in the bias-corrected frame.

use crate::error::FilterResult;
use crate::kalman::ExtendedKalmanFilter;
use crate::linearize::{
    position_measurement_jacobian, position_orientation_measurement_jacobian,
    rotate_position_noise, rotation_about_vertical, transition_jacobian,
};
use crate::measurements::{MeasurementModel, OdometryIncrement};
use crate::{POSITION_INDEX, POSITION_SIZE, STATE_SIZE, YAW_BIAS_INDEX};

use std::fmt::{self, Display};

use log::trace;
use nalgebra::{Matrix3, Matrix4, UnitQuaternion, Vector3, Vector4};

/// Named view over the raw four element state vector
///
/// ```text
/// x = [p_x, p_y, p_z, yaw_bias]
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PosYawBiasState {
    vector: Vector4<f64>,
}
impl Default for PosYawBiasState {
    fn default() -> Self {
        PosYawBiasState {
            vector: Vector4::zeros(),
        }
    }
}
impl PosYawBiasState {
    pub fn new(position: Vector3<f64>, yaw_bias: f64) -> Self {
        let mut vector = Vector4::zeros();
        vector
            .fixed_rows_mut::<POSITION_SIZE>(POSITION_INDEX)
            .copy_from(&position);
        vector[YAW_BIAS_INDEX] = yaw_bias;
        PosYawBiasState { vector }
    }
    /// Position in the world frame (m)
    pub fn position(&self) -> Vector3<f64> {
        self.vector
            .fixed_rows::<POSITION_SIZE>(POSITION_INDEX)
            .into_owned()
    }
    /// Yaw bias (rad)
    pub fn yaw_bias(&self) -> f64 {
        self.vector[YAW_BIAS_INDEX]
    }
    pub fn vector(&self) -> &Vector4<f64> {
        &self.vector
    }
}
impl From<Vector4<f64>> for PosYawBiasState {
    fn from(vector: Vector4<f64>) -> Self {
        PosYawBiasState { vector }
    }
}
impl From<PosYawBiasState> for Vector4<f64> {
    fn from(state: PosYawBiasState) -> Self {
        state.vector
    }
}
impl Display for PosYawBiasState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PosYawBiasState {{ position: [{:.4}, {:.4}, {:.4}], yaw_bias: {:.6} }}",
            self.vector[0], self.vector[1], self.vector[2], self.vector[3]
        )
    }
}

/// Extended Kalman filter estimating position and yaw bias
///
/// # Example
///
/// ```rust
/// use pose_ekf::pose::PoseEkf;
/// use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
///
/// let mut ekf = PoseEkf::new();
/// ekf.init(&Matrix4::identity(), &Vector4::zeros());
/// ekf.predict(&Vector3::new(1.0, 0.0, 0.0), &Matrix4::zeros());
/// assert_eq!(ekf.position(), Vector3::new(1.0, 0.0, 0.0));
///
/// let rejected = ekf
///     .correct_position(&Vector3::new(1.0, 0.0, 0.0), &(Matrix3::identity() * 0.01), 0.997)
///     .unwrap();
/// assert!(!rejected);
/// ```
#[derive(Clone, Debug)]
pub struct PoseEkf {
    filter: ExtendedKalmanFilter<STATE_SIZE>,
    x: PosYawBiasState,
    /// Process noise of the last prediction, after frame rotation
    process_noise: Matrix4<f64>,
}

impl Default for PoseEkf {
    fn default() -> Self {
        PoseEkf {
            filter: ExtendedKalmanFilter::default(),
            x: PosYawBiasState::default(),
            process_noise: Matrix4::zeros(),
        }
    }
}

impl Display for PoseEkf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PoseEkf {{ state: {}, covariance_diagonal: {:?} }}",
            self.x,
            self.filter.covariance().diagonal().as_slice()
        )
    }
}

impl PoseEkf {
    /// Fresh filter with zero state and unit covariance. Call [PoseEkf::init] before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the filter to the supplied covariance and state and clear the stored process noise.
    pub fn init(&mut self, covariance: &Matrix4<f64>, state: &Vector4<f64>) {
        self.process_noise = Matrix4::zeros();
        self.filter.set_covariance(*covariance);
        self.filter.set_state(*state);
        self.refresh_state();
    }

    /// Seed the position and its covariance block, leaving the yaw bias untouched.
    pub fn set_initial_position(&mut self, position: &Vector3<f64>, covariance: &Matrix3<f64>) {
        let mut state = *self.filter.state();
        state
            .fixed_rows_mut::<POSITION_SIZE>(POSITION_INDEX)
            .copy_from(position);
        let mut full_covariance = *self.filter.covariance();
        full_covariance
            .fixed_view_mut::<POSITION_SIZE, POSITION_SIZE>(POSITION_INDEX, POSITION_INDEX)
            .copy_from(covariance);
        self.filter.set_state(state);
        self.filter.set_covariance(full_covariance);
        self.refresh_state();
    }

    /// Propagate the state with a translation increment expressed in the world frame.
    ///
    /// 1. $R = R_z(\psi_b)$ from the current yaw-bias estimate
    /// 2. $Q' = Q$ with its position block replaced by $R Q_{pp} R^T$
    /// 3. $f = [p + R t, \psi_b]$
    /// 4. $P \leftarrow F P F^T + Q'$ with $F$ from [transition_jacobian]
    ///
    /// `process_noise` is read only; the rotated copy is kept for inspection via
    /// [PoseEkf::process_noise].
    pub fn predict(&mut self, translation_world: &Vector3<f64>, process_noise: &Matrix4<f64>) {
        let yaw_bias = self.x.yaw_bias();
        let rotation = rotation_about_vertical(yaw_bias);
        self.process_noise = rotate_position_noise(process_noise, &rotation);

        let transition = PosYawBiasState::new(
            self.x.position() + rotation * translation_world,
            yaw_bias,
        );
        let jacobian = self.jacobian_f(translation_world);

        self.filter
            .prediction(transition.vector(), &jacobian, &self.process_noise);
        self.refresh_state();
        trace!("predict: {}", self.x);
    }

    /// Convenience wrapper around [PoseEkf::predict] for a typed odometry increment.
    pub fn predict_odometry(&mut self, increment: &OdometryIncrement) {
        self.predict(&increment.translation, &increment.process_noise);
    }

    /// Jacobian of the transition function about the current state.
    pub fn jacobian_f(&self, translation_world: &Vector3<f64>) -> Matrix4<f64> {
        transition_jacobian(self.x.yaw_bias(), translation_world)
    }

    /// Correct with an absolute position fix.
    ///
    /// Only the horizontal axes take part in the chi-square gate (two degrees of freedom);
    /// the vertical axis is always applied once the horizontal innovation passes.
    ///
    /// Returns `Ok(true)` when the fix was rejected as an outlier.
    pub fn correct_position(
        &mut self,
        position: &Vector3<f64>,
        covariance: &Matrix3<f64>,
        reject_threshold: f64,
    ) -> FilterResult<bool> {
        let jacobian = position_measurement_jacobian();
        let expected = jacobian * self.x.vector();
        let reject = self.filter.correction_chi_square::<POSITION_SIZE, 2>(
            position,
            covariance,
            &expected,
            &jacobian,
            reject_threshold,
        );
        self.refresh_state();
        reject
    }

    /// Correct with an absolute position fix plus an observed yaw correction.
    ///
    /// `position_orientation` is `[p_x, p_y, p_z, yaw_bias]`. As with
    /// [PoseEkf::correct_position] only the horizontal position drives the gate; altitude and
    /// yaw are accepted whenever the horizontal position passes.
    pub fn correct_position_orientation(
        &mut self,
        position_orientation: &Vector4<f64>,
        covariance: &Matrix4<f64>,
        reject_threshold: f64,
    ) -> FilterResult<bool> {
        let jacobian = position_orientation_measurement_jacobian();
        let expected = jacobian * self.x.vector();
        let reject = self.filter.correction_chi_square::<STATE_SIZE, 2>(
            position_orientation,
            covariance,
            &expected,
            &jacobian,
            reject_threshold,
        );
        self.refresh_state();
        reject
    }

    /// Correct with any typed measurement.
    pub fn correct<M: MeasurementModel + ?Sized>(
        &mut self,
        measurement: &M,
        reject_threshold: f64,
    ) -> FilterResult<bool> {
        measurement.correct(self, reject_threshold)
    }

    /// Overwrite this filter's state and covariance with deep copies of `other`'s.
    pub fn copy_state(&mut self, other: &PoseEkf) {
        self.filter.set_state(*other.filter.state());
        self.filter.set_covariance(*other.filter.covariance());
        self.refresh_state();
    }

    /// Estimated position in the world frame (m)
    pub fn position(&self) -> Vector3<f64> {
        self.x.position()
    }

    /// Covariance of the position estimate (m²)
    pub fn covariance_position(&self) -> Matrix3<f64> {
        self.filter
            .covariance()
            .fixed_view::<POSITION_SIZE, POSITION_SIZE>(POSITION_INDEX, POSITION_INDEX)
            .into_owned()
    }

    /// Current yaw-bias correction as a rotation about the vertical axis
    pub fn orientation_correction(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_rotation_matrix(&rotation_about_vertical(self.x.yaw_bias()))
    }

    /// Variance of the yaw-bias estimate (rad²)
    pub fn orientation_correction_covariance(&self) -> f64 {
        self.filter.covariance()[(YAW_BIAS_INDEX, YAW_BIAS_INDEX)]
    }

    /// Named view of the state
    pub fn state(&self) -> &PosYawBiasState {
        &self.x
    }

    /// Full state covariance
    pub fn covariance(&self) -> &Matrix4<f64> {
        self.filter.covariance()
    }

    /// Rotated process noise used by the last prediction
    pub fn process_noise(&self) -> &Matrix4<f64> {
        &self.process_noise
    }

    /// The underlying generic estimator
    pub fn estimator(&self) -> &ExtendedKalmanFilter<STATE_SIZE> {
        &self.filter
    }

    fn refresh_state(&mut self) {
        self.x = PosYawBiasState::from(*self.filter.state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::linalg::is_positive_semi_definite;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    fn initialized(state: Vector4<f64>) -> PoseEkf {
        let mut ekf = PoseEkf::new();
        ekf.init(&Matrix4::identity(), &state);
        ekf
    }

    fn assert_view_matches_raw(ekf: &PoseEkf) {
        assert_eq!(ekf.state().vector(), ekf.estimator().state());
        assert_eq!(ekf.position(), ekf.estimator().state().fixed_rows::<3>(0).into_owned());
        assert_eq!(ekf.state().yaw_bias(), ekf.estimator().state()[3]);
    }

    #[test]
    fn state_view_slices() {
        let s = PosYawBiasState::new(Vector3::new(1.0, 2.0, 3.0), 0.5);
        assert_eq!(s.position(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(s.yaw_bias(), 0.5);
        assert_eq!(Vector4::from(s), Vector4::new(1.0, 2.0, 3.0, 0.5));
        assert!(format!("{}", s).contains("yaw_bias"));
    }

    #[test]
    fn init_sets_state_and_clears_noise() {
        let mut ekf = initialized(Vector4::zeros());
        ekf.predict(&Vector3::zeros(), &(Matrix4::identity() * 0.1));
        assert_ne!(*ekf.process_noise(), Matrix4::zeros());
        let p = Matrix4::identity() * 2.0;
        let x = Vector4::new(1.0, 2.0, 3.0, 0.1);
        ekf.init(&p, &x);
        assert_eq!(*ekf.process_noise(), Matrix4::zeros());
        assert_eq!(*ekf.covariance(), p);
        assert_eq!(*ekf.state().vector(), x);
        assert_view_matches_raw(&ekf);
    }

    #[test]
    fn predict_straight_line() {
        let mut ekf = initialized(Vector4::zeros());
        ekf.predict(&Vector3::new(1.0, 0.0, 0.0), &Matrix4::zeros());
        assert_eq!(ekf.position(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(ekf.state().yaw_bias(), 0.0);
        assert_view_matches_raw(&ekf);
    }

    #[test]
    fn predict_rotates_translation_by_bias() {
        let mut ekf = initialized(Vector4::new(0.0, 0.0, 0.0, FRAC_PI_2));
        ekf.predict(&Vector3::new(2.0, 0.0, 1.0), &Matrix4::zeros());
        let p = ekf.position();
        assert_approx_eq!(p[0], 0.0, 1e-12);
        assert_approx_eq!(p[1], 2.0, 1e-12);
        assert_approx_eq!(p[2], 1.0, 1e-12);
        assert_eq!(ekf.state().yaw_bias(), FRAC_PI_2);
    }

    #[test]
    fn predict_couples_position_and_bias() {
        let mut ekf = initialized(Vector4::zeros());
        ekf.predict(&Vector3::new(1.0, 0.0, 0.0), &Matrix4::zeros());
        // F = I + e_y e_bias^T, so P = F F^T
        let p = ekf.covariance();
        assert_approx_eq!(p[(1, 1)], 2.0, 1e-12);
        assert_approx_eq!(p[(1, 3)], 1.0, 1e-12);
        assert_approx_eq!(p[(3, 1)], 1.0, 1e-12);
        assert_approx_eq!(p[(0, 0)], 1.0, 1e-12);
        assert!(is_positive_semi_definite(p, 1e-12));
    }

    #[test]
    fn predict_does_not_mutate_caller_noise() {
        let mut ekf = initialized(Vector4::new(0.0, 0.0, 0.0, 0.4));
        let q = Matrix4::from_diagonal(&Vector4::new(1.0, 0.1, 0.2, 0.01));
        let q_copy = q;
        ekf.predict(&Vector3::new(1.0, 1.0, 0.0), &q);
        assert_eq!(q, q_copy);
        assert_ne!(*ekf.process_noise(), q);
    }

    #[test]
    fn predict_trace_grows() {
        let mut ekf = initialized(Vector4::new(0.0, 0.0, 0.0, 0.3));
        let q = Matrix4::from_diagonal(&Vector4::new(0.01, 0.02, 0.03, 1e-4));
        let mut trace = ekf.covariance().trace();
        for _ in 0..20 {
            ekf.predict(&Vector3::new(0.5, 0.1, 0.0), &q);
            let next = ekf.covariance().trace();
            assert!(next >= trace);
            assert!(is_positive_semi_definite(ekf.covariance(), 1e-9));
            trace = next;
        }
    }

    #[test]
    fn correct_position_accepts_consistent_fix() {
        let mut ekf = initialized(Vector4::zeros());
        ekf.predict(&Vector3::new(1.0, 0.0, 0.0), &Matrix4::zeros());
        let before = ekf.covariance_position();
        let rejected = ekf
            .correct_position(&Vector3::new(1.0, 0.0, 0.0), &(Matrix3::identity() * 0.01), 0.997)
            .unwrap();
        assert!(!rejected);
        let after = ekf.covariance_position();
        for i in 0..3 {
            assert!(after[(i, i)] < before[(i, i)]);
        }
        assert!(after.trace() < before.trace());
        assert_view_matches_raw(&ekf);
    }

    #[test]
    fn correct_position_rejects_outlier() {
        let mut ekf = initialized(Vector4::zeros());
        ekf.predict(&Vector3::new(1.0, 0.0, 0.0), &Matrix4::zeros());
        let state_before = *ekf.state();
        let covariance_before = *ekf.covariance();
        // Current horizontal std is at most sqrt(2) m; 50 m is far beyond 5 sigma.
        let rejected = ekf
            .correct_position(&Vector3::new(50.0, 50.0, 0.0), &(Matrix3::identity() * 0.01), 0.997)
            .unwrap();
        assert!(rejected);
        assert_eq!(*ekf.state(), state_before);
        assert_eq!(*ekf.covariance(), covariance_before);
    }

    #[test]
    fn correct_position_ignores_altitude_in_gate() {
        let mut ekf = initialized(Vector4::zeros());
        let rejected = ekf
            .correct_position(&Vector3::new(0.0, 0.0, 100.0), &Matrix3::identity(), 0.997)
            .unwrap();
        assert!(!rejected);
        assert_approx_eq!(ekf.position()[2], 50.0, 1e-9);
    }

    #[test]
    fn correct_position_orientation_updates_bias() {
        let mut ekf = initialized(Vector4::zeros());
        let z = Vector4::new(0.0, 0.0, 0.0, 0.2);
        let rejected = ekf
            .correct_position_orientation(&z, &(Matrix4::identity() * 0.01), 0.997)
            .unwrap();
        assert!(!rejected);
        assert_approx_eq!(ekf.state().yaw_bias(), 0.2 / 1.01, 1e-9);
        assert!(ekf.orientation_correction_covariance() < 1.0);
        assert_view_matches_raw(&ekf);
    }

    #[test]
    fn correct_position_orientation_gates_on_horizontal_only() {
        let mut ekf = initialized(Vector4::zeros());
        let before = *ekf.covariance();
        let outlier = Vector4::new(30.0, 0.0, 0.0, 0.0);
        assert!(ekf
            .correct_position_orientation(&outlier, &(Matrix4::identity() * 0.01), 0.997)
            .unwrap());
        assert_eq!(*ekf.covariance(), before);
        // A large yaw disagreement alone is not gated.
        let yaw_only = Vector4::new(0.0, 0.0, 0.0, 3.0);
        assert!(!ekf
            .correct_position_orientation(&yaw_only, &(Matrix4::identity() * 0.01), 0.997)
            .unwrap());
    }

    #[test]
    fn correct_with_bad_threshold_is_error() {
        let mut ekf = initialized(Vector4::zeros());
        let result = ekf.correct_position(&Vector3::zeros(), &Matrix3::identity(), 99.7);
        assert_eq!(result, Err(FilterError::InvalidConfidence(99.7)));
        assert_view_matches_raw(&ekf);
    }

    #[test]
    fn set_initial_position_keeps_bias() {
        let mut ekf = initialized(Vector4::new(0.0, 0.0, 0.0, 0.3));
        let mut p = Matrix4::identity();
        p[(3, 3)] = 0.05;
        ekf.init(&p, &Vector4::new(0.0, 0.0, 0.0, 0.3));
        ekf.set_initial_position(&Vector3::new(5.0, 6.0, 7.0), &(Matrix3::identity() * 4.0));
        assert_eq!(ekf.position(), Vector3::new(5.0, 6.0, 7.0));
        assert_eq!(ekf.state().yaw_bias(), 0.3);
        assert_eq!(ekf.covariance_position(), Matrix3::identity() * 4.0);
        assert_eq!(ekf.orientation_correction_covariance(), 0.05);
    }

    #[test]
    fn copy_state_is_independent() {
        let mut source = initialized(Vector4::new(1.0, 2.0, 3.0, 0.1));
        source.predict(&Vector3::new(1.0, 0.0, 0.0), &(Matrix4::identity() * 0.1));
        let mut copy = PoseEkf::new();
        copy.copy_state(&source);
        assert_eq!(copy.state(), source.state());
        assert_eq!(copy.covariance(), source.covariance());

        source.predict(&Vector3::new(1.0, 0.0, 0.0), &(Matrix4::identity() * 0.1));
        assert_ne!(copy.state(), source.state());
        assert_ne!(copy.covariance(), source.covariance());
    }

    #[test]
    fn orientation_correction_is_yaw_rotation() {
        let ekf = initialized(Vector4::new(0.0, 0.0, 0.0, 0.4));
        let q = ekf.orientation_correction();
        let (roll, pitch, yaw) = q.euler_angles();
        assert_approx_eq!(roll, 0.0, 1e-10);
        assert_approx_eq!(pitch, 0.0, 1e-10);
        assert_approx_eq!(yaw, 0.4, 1e-10);
        assert_approx_eq!(q.angle(), 0.4, 1e-10);
    }

    #[test]
    fn display_contains_state() {
        let ekf = initialized(Vector4::zeros());
        let s = format!("{}", ekf);
        assert!(s.contains("PoseEkf"));
        assert!(s.contains("yaw_bias"));
    }
}
