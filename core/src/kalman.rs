//! Generic Extended Kalman Filter core
//!
//! This module contains the dimension-parameterized recursive estimator used by the pose
//! filter in [crate::pose]. The engine owns the state estimate and its covariance and knows
//! nothing about what the state components mean; callers evaluate the transition function,
//! the Jacobians and the expected measurement and hand them in.

use crate::error::{FilterError, FilterResult};
use crate::gating::{self, GateDecision};
use crate::linalg::{spd_inverse, symmetrize};

use std::fmt::{self, Debug, Display};

use log::debug;
use nalgebra::{SMatrix, SVector};

/// Extended Kalman Filter (EKF) over a statically sized state of dimension `N`.
///
/// # Mathematical Background
///
/// ## Predict Step
///
/// $$
/// \begin{aligned}
/// \bar{x}_{k+1} &= f(x_k, u_k) \\\\
/// \bar{P}_{k+1} &= F_k P_k F_k^T + Q_k
/// \end{aligned}
/// $$
///
/// where $f(x_k, u_k)$ is evaluated by the caller and $F_k$ is its Jacobian about $x_k$.
///
/// ## Update Step
///
/// $$
/// \begin{aligned}
/// \nu_k &= z_k - h(\bar{x}_k) \\\\
/// S_k &= H_k \bar{P}_k H_k^T + R_k \\\\
/// K_k &= \bar{P}_k H_k^T S_k^{-1} \\\\
/// x_k &= \bar{x}_k + K_k \nu_k \\\\
/// P_k &= (I - K_k H_k) \bar{P}_k
/// \end{aligned}
/// $$
///
/// The update is preceded by a chi-square test on the innovation; measurements failing the
/// test leave the filter untouched.
///
/// # Example
///
/// ```rust
/// use pose_ekf::kalman::ExtendedKalmanFilter;
/// use nalgebra::{Matrix2, Matrix1, SMatrix, Vector1, Vector2};
///
/// let mut ekf = ExtendedKalmanFilter::<2>::new(Vector2::zeros(), Matrix2::identity());
/// ekf.prediction(&Vector2::new(1.0, 0.0), &Matrix2::identity(), &(Matrix2::identity() * 0.1));
///
/// let jacobian = SMatrix::<f64, 1, 2>::new(1.0, 0.0);
/// let expected = jacobian * ekf.state();
/// let rejected = ekf
///     .correction_chi_square::<1, 1>(&Vector1::new(1.2), &Matrix1::new(0.01), &expected, &jacobian, 0.99)
///     .unwrap();
/// assert!(!rejected);
/// ```
#[derive(Clone, PartialEq)]
pub struct ExtendedKalmanFilter<const N: usize> {
    /// State estimate vector
    mean_state: SVector<f64, N>,
    /// State covariance matrix
    covariance: SMatrix<f64, N, N>,
}

impl<const N: usize> Debug for ExtendedKalmanFilter<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EKF")
            .field("mean_state", &self.mean_state)
            .field("covariance", &self.covariance)
            .field("state_size", &N)
            .finish()
    }
}

impl<const N: usize> Display for ExtendedKalmanFilter<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKalmanFilter")
            .field("mean_state", &self.mean_state.as_slice())
            .field("covariance_diagonal", &self.covariance.diagonal().as_slice())
            .field("state_size", &N)
            .finish()
    }
}

impl<const N: usize> Default for ExtendedKalmanFilter<N> {
    /// Zero state with unit covariance.
    fn default() -> Self {
        Self::new(SVector::zeros(), SMatrix::identity())
    }
}

impl<const N: usize> ExtendedKalmanFilter<N> {
    /// Create a new filter from an initial state and covariance.
    pub fn new(mean_state: SVector<f64, N>, covariance: SMatrix<f64, N, N>) -> Self {
        ExtendedKalmanFilter {
            mean_state,
            covariance,
        }
    }

    /// Current state estimate
    pub fn state(&self) -> &SVector<f64, N> {
        &self.mean_state
    }

    /// Current state covariance
    pub fn covariance(&self) -> &SMatrix<f64, N, N> {
        &self.covariance
    }

    pub fn set_state(&mut self, mean_state: SVector<f64, N>) {
        self.mean_state = mean_state;
    }

    pub fn set_covariance(&mut self, covariance: SMatrix<f64, N, N>) {
        self.covariance = covariance;
    }

    /// Prediction step: $x \leftarrow f$, $P \leftarrow F P F^T + Q$.
    ///
    /// # Arguments
    ///
    /// * `transition` - the transition function evaluated at the current state and input
    /// * `jacobian` - Jacobian of the transition function about the current state
    /// * `process_noise` - process noise covariance, already expressed in state space
    pub fn prediction(
        &mut self,
        transition: &SVector<f64, N>,
        jacobian: &SMatrix<f64, N, N>,
        process_noise: &SMatrix<f64, N, N>,
    ) {
        self.mean_state = *transition;
        let propagated = jacobian * self.covariance * jacobian.transpose() + process_noise;
        self.covariance = symmetrize(&propagated);
    }

    /// Gated correction step.
    ///
    /// Computes the innovation $\nu = z - h$ and its covariance $S = H P H^T + R$. The leading
    /// `DOF` components of $\nu$ (and the leading `DOF×DOF` block of $S$) are tested against
    /// the $\chi^2_{DOF}$ quantile at `confidence`. Trailing axes still take part in the update
    /// but never cause a rejection.
    ///
    /// # Arguments
    ///
    /// * `measurement` - observation $z$
    /// * `measurement_noise` - observation covariance $R$
    /// * `expected` - predicted observation $h(\bar{x})$
    /// * `jacobian` - observation Jacobian $H$ (M×N)
    /// * `confidence` - probability of the gate, e.g. `0.997`
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the measurement was rejected (state and covariance unchanged),
    /// `Ok(false)` if it was applied.
    ///
    /// # Errors
    ///
    /// * [FilterError::ZeroDegreesOfFreedom] / [FilterError::TooManyDegreesOfFreedom] when
    ///   `DOF` is not in `1..=M`
    /// * [FilterError::InvalidConfidence] when `confidence` is not in (0, 1)
    /// * [FilterError::SingularInnovation] when $S$ is singular, indefinite or too
    ///   ill-conditioned to invert reliably. No regularization is applied.
    ///
    /// The filter is never modified when an error is returned.
    pub fn correction_chi_square<const M: usize, const DOF: usize>(
        &mut self,
        measurement: &SVector<f64, M>,
        measurement_noise: &SMatrix<f64, M, M>,
        expected: &SVector<f64, M>,
        jacobian: &SMatrix<f64, M, N>,
        confidence: f64,
    ) -> FilterResult<bool> {
        if DOF == 0 {
            return Err(FilterError::ZeroDegreesOfFreedom);
        }
        if DOF > M {
            return Err(FilterError::TooManyDegreesOfFreedom {
                dof: DOF,
                observed: M,
            });
        }

        let innovation = measurement - expected;
        let jacobian_t = jacobian.transpose();
        let innovation_covariance =
            symmetrize(&(jacobian * self.covariance * jacobian_t + measurement_noise));
        let innovation_covariance_inv =
            spd_inverse(&innovation_covariance).ok_or(FilterError::SingularInnovation)?;

        let gate: GateDecision = gating::evaluate(
            &innovation.fixed_rows::<DOF>(0).into_owned(),
            &innovation_covariance.fixed_view::<DOF, DOF>(0, 0).into_owned(),
            confidence,
        )?;
        if gate.is_outlier() {
            debug!(
                "measurement rejected: d2 = {:.4} > chi2({}, {}) = {:.4}",
                gate.distance_squared, DOF, confidence, gate.critical_value
            );
            return Ok(true);
        }
        debug!(
            "measurement accepted: d2 = {:.4} <= {:.4}",
            gate.distance_squared, gate.critical_value
        );

        // Kalman gain: K = P * H^T * S^(-1)
        let gain = self.covariance * jacobian_t * innovation_covariance_inv;
        self.mean_state += gain * innovation;
        let i_kh = SMatrix::<f64, N, N>::identity() - gain * jacobian;
        self.covariance = symmetrize(&(i_kh * self.covariance));
        Ok(false)
    }
}
