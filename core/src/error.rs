//! Error types for the filter core.
//!
//! Statistical rejection of a measurement is *not* an error; corrections report it through
//! their `bool` return value. The variants here cover caller misuse and numerical breakdown,
//! after which the filter state must not be trusted to continue silently.

use thiserror::Error;

/// Contract violations and numerical failures raised by the estimator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The innovation covariance `S = H P Hᵀ + R` (or its gated block) could not be inverted.
    #[error("innovation covariance is singular or not positive definite")]
    SingularInnovation,

    /// The gate confidence is a probability and must lie strictly between 0 and 1.
    #[error("gate confidence must lie in (0, 1), got {0}")]
    InvalidConfidence(f64),

    #[error("chi-square gate needs at least one degree of freedom")]
    ZeroDegreesOfFreedom,

    /// More gated axes were requested than the measurement provides.
    #[error("gate uses {dof} degrees of freedom but the measurement only has {observed} axes")]
    TooManyDegreesOfFreedom { dof: usize, observed: usize },
}

/// Result alias used throughout the filter core
pub type FilterResult<T> = Result<T, FilterError>;

/// Scenario parameters rejected before a simulated run starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("outlier_probability must lie in [0, 1], got {0}")]
    OutlierProbability(f64),

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    /// Standard deviations must be finite and non-negative.
    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidStandardDeviation { field: &'static str, value: f64 },

    /// Per-step turn and heading offset are limited to half a revolution.
    #[error("{field} must lie in [-pi, pi], got {value}")]
    AngleOutOfRange { field: &'static str, value: f64 },
}
