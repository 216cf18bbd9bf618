//! Linear algebra helpers for keeping covariances well-formed.
//!
//! Public API:
//!     pub fn symmetrize(m: &SMatrix<f64, D, D>) -> SMatrix<f64, D, D>
//!     pub fn spd_inverse(a: &SMatrix<f64, D, D>) -> Option<SMatrix<f64, D, D>>
//!     pub fn reciprocal_condition_number(a: &SMatrix<f64, D, D>, a_inv: &SMatrix<f64, D, D>) -> f64
//!     pub fn is_positive_semi_definite(m: &SMatrix<f64, D, D>, tolerance: f64) -> bool
//!
//! Inverting an innovation covariance is strict:
//! 1) Symmetrize S ← 0.5 (S + Sᵀ)
//! 2) Plain Cholesky, no jitter; a zero or negative pivot fails
//! 3) Reject the inverse when the reciprocal 1-norm condition number is below
//!    [MIN_RECIPROCAL_CONDITION]
//!
//! A rank-deficient or numerically singular S is never repaired; the caller reports it as a
//! numerical failure.
//!
//! All helpers work on statically sized matrices so dimension mismatches are rejected by the
//! compiler rather than at runtime.

use nalgebra::SMatrix;
use nalgebra::linalg::Cholesky;

/// Symmetrize a matrix: P ← 0.5 (P + Pᵀ)
///
/// Simple matrix symmetrization function that reduces round-off errors associated
/// with floating point arithmetic.
///
/// # Arguments
/// * `m` - the matrix to symmetrize
///
/// # Returns
/// A symmetrized version of the input matrix.
#[inline]
pub fn symmetrize<const D: usize>(m: &SMatrix<f64, D, D>) -> SMatrix<f64, D, D> {
    0.5 * (m + m.transpose())
}

/// Smallest reciprocal condition number accepted by [spd_inverse]
pub const MIN_RECIPROCAL_CONDITION: f64 = 1e-12;

/// Induced 1-norm: the largest absolute column sum.
pub fn one_norm<const D: usize>(m: &SMatrix<f64, D, D>) -> f64 {
    m.column_iter()
        .map(|column| column.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Reciprocal condition number $1 / (\|A\|_1 \|A^{-1}\|_1)$ given a matrix and its inverse.
///
/// Returns 0 for a zero or non-finite product, so the result is always safe to compare
/// against a threshold.
pub fn reciprocal_condition_number<const D: usize>(
    a: &SMatrix<f64, D, D>,
    a_inv: &SMatrix<f64, D, D>,
) -> f64 {
    let product = one_norm(a) * one_norm(a_inv);
    if product > 0.0 && product.is_finite() {
        1.0 / product
    } else {
        0.0
    }
}

/// Inverse of a symmetric positive definite matrix, or None when it is singular,
/// ill-conditioned, indefinite or contains non-finite entries.
pub fn spd_inverse<const D: usize>(a: &SMatrix<f64, D, D>) -> Option<SMatrix<f64, D, D>> {
    let a_sym = symmetrize(a);
    if !a_sym.iter().all(|v| v.is_finite()) {
        return None;
    }
    let inverse = Cholesky::new(a_sym)?.inverse();
    (reciprocal_condition_number(&a_sym, &inverse) >= MIN_RECIPROCAL_CONDITION).then_some(inverse)
}

/// Check that a symmetric matrix is positive semi-definite up to `tolerance`.
///
/// Implemented as a Cholesky attempt on `m + tolerance·I`, which succeeds exactly when the
/// smallest eigenvalue exceeds `-tolerance`.
pub fn is_positive_semi_definite<const D: usize>(m: &SMatrix<f64, D, D>, tolerance: f64) -> bool {
    let mut shifted = symmetrize(m);
    for i in 0..D {
        shifted[(i, i)] += tolerance;
    }
    Cholesky::new(shifted).is_some()
}

/* =============================== Tests ==================================== */
