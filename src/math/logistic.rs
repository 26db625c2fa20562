//! Numerically stable logistic-function helpers for the BAR estimator.
//!
//! The BAR zero function is built from terms of the form `1/(1 + exp(x))` where `x`
//! is a raw work value shifted by the current free-energy estimate. Real work
//! distributions routinely produce |x| in the hundreds, for which the naive formula
//! overflows (`exp(700)` is already infinite in `f64`). Everything here therefore
//! works in log space: `ln(1/(1+eˣ)) = -softplus(x)`, and the mean over a sample
//! set is taken with the log-sum-exp shift so the sum never leaves the
//! representable range.

/// `ln(1 / (1 + exp(x)))`, stable for any finite `x`.
///
/// For large positive `x` this tends to `-x`; for large negative `x` it tends to
/// zero from below. Both limits are reached without overflow or underflow.
#[inline]
pub fn log_logistic(x: f64) -> f64 {
    -softplus(x)
}

/// `ln(1 + exp(x))` evaluated without overflow.
///
/// The two branches are algebraically identical; the split keeps the argument of
/// `exp` non-positive so the intermediate never exceeds 1.
#[inline]
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Log-space mean of the logistic function over a shifted sample set:
/// `ln( (1/n) · Σᵢ 1/(1 + exp(xᵢ + shift)) )`.
///
/// This is the `logmean` primitive of the BAR zero function. The shift is applied
/// per element rather than materialised into a new vector, and the sum is taken
/// relative to the largest log term (log-sum-exp), so the computation is both
/// allocation-free and stable when every term is tiny.
///
/// Returns NaN if `samples` contains a NaN; the solver treats any non-finite
/// residual as numerical divergence.
pub fn log_mean_logistic(samples: &[f64], shift: f64) -> f64 {
    debug_assert!(!samples.is_empty());

    let mut max_term = f64::NEG_INFINITY;
    for &x in samples {
        let term = log_logistic(x + shift);
        if term > max_term || term.is_nan() {
            max_term = term;
        }
    }
    if !max_term.is_finite() {
        return max_term;
    }

    let mut sum = 0.0;
    for &x in samples {
        sum += (log_logistic(x + shift) - max_term).exp();
    }

    max_term + sum.ln() - (samples.len() as f64).ln()
}
