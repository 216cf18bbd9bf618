//! Chi-square gating of measurement innovations.
//!
//! A measurement is treated as an outlier when the squared Mahalanobis distance of its
//! innovation,
//!
//! $$
//! d^2 = \nu^T S^{-1} \nu
//! $$
//!
//! exceeds the quantile of the $\chi^2_k$ distribution at the requested confidence level,
//! where $k$ is the number of gated degrees of freedom. For a correctly tuned filter an inlier
//! is rejected with probability `1 - confidence`.

use nalgebra::{SMatrix, SVector};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{FilterError, FilterResult};
use crate::linalg::spd_inverse;

/// Critical value of the chi-square distribution with `dof` degrees of freedom at
/// probability `confidence`.
///
/// # Arguments
/// * `dof` - degrees of freedom, at least one
/// * `confidence` - probability in the open interval (0, 1), e.g. `0.997`
///
/// # Example
/// ```rust
/// use pose_ekf::gating::chi_square_critical_value;
/// let critical = chi_square_critical_value(2, 0.95).unwrap();
/// assert!((critical - 5.991).abs() < 1e-2);
/// ```
pub fn chi_square_critical_value(dof: usize, confidence: f64) -> FilterResult<f64> {
    if dof == 0 {
        return Err(FilterError::ZeroDegreesOfFreedom);
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(FilterError::InvalidConfidence(confidence));
    }
    let distribution =
        ChiSquared::new(dof as f64).map_err(|_| FilterError::ZeroDegreesOfFreedom)?;
    Ok(distribution.inverse_cdf(confidence))
}

/// Squared Mahalanobis distance `νᵀ S⁻¹ ν` of an innovation under covariance `S`.
pub fn mahalanobis_distance_squared<const D: usize>(
    innovation: &SVector<f64, D>,
    covariance: &SMatrix<f64, D, D>,
) -> FilterResult<f64> {
    let inverse = spd_inverse(covariance).ok_or(FilterError::SingularInnovation)?;
    Ok(innovation.dot(&(inverse * innovation)))
}

/// Decision of a single gate evaluation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateDecision {
    pub distance_squared: f64,
    pub critical_value: f64,
}
impl GateDecision {
    /// Strictly above the critical value is rejected; the boundary itself is accepted.
    pub fn is_outlier(&self) -> bool {
        self.distance_squared > self.critical_value
    }
}

/// Evaluate the chi-square gate for an innovation with `D` gated axes.
pub fn evaluate<const D: usize>(
    innovation: &SVector<f64, D>,
    covariance: &SMatrix<f64, D, D>,
    confidence: f64,
) -> FilterResult<GateDecision> {
    let critical_value = chi_square_critical_value(D, confidence)?;
    let distance_squared = mahalanobis_distance_squared(innovation, covariance)?;
    Ok(GateDecision {
        distance_squared,
        critical_value,
    })
}
