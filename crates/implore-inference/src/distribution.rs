//! Cumulative distribution functions
//!
//! Normal, Student t, chi-square and F CDFs built on [`crate::special`].
//! Invalid degrees of freedom yield NaN rather than panicking.

use std::f64::consts::SQRT_2;

use crate::special::{erf, incomplete_beta, incomplete_gamma};

/// Standard normal CDF, `Φ(x) = ½(1 + erf(x/√2))`
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// Student t CDF with `df` degrees of freedom
pub fn t_cdf(t: f64, df: f64) -> f64 {
    if t.is_nan() || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        return if t > 0.0 { 1.0 } else { 0.0 };
    }
    let y = df / (df + t * t);
    let tail = incomplete_beta(y, df / 2.0, 0.5);
    if tail.is_nan() {
        return f64::NAN;
    }
    if t > 0.0 {
        1.0 - 0.5 * tail
    } else {
        0.5 * tail
    }
}

/// Chi-square CDF with `df` degrees of freedom
pub fn chi_square_cdf(x: f64, df: f64) -> f64 {
    if x.is_nan() || df.is_nan() || x < 0.0 || df <= 0.0 {
        return f64::NAN;
    }
    incomplete_gamma(x / 2.0, df / 2.0)
}

/// F CDF with `(df1, df2)` degrees of freedom; 0 for negative `x`
pub fn f_cdf(x: f64, df1: f64, df2: f64) -> f64 {
    if x.is_nan() || df1.is_nan() || df2.is_nan() || df1 <= 0.0 || df2 <= 0.0 {
        return f64::NAN;
    }
    if x < 0.0 {
        return 0.0;
    }
    if x.is_infinite() {
        return 1.0;
    }
    let y = (df1 * x / (df1 * x + df2)).clamp(0.0, 1.0);
    incomplete_beta(y, df1 / 2.0, df2 / 2.0)
}

/// Two-sided normal p-value, `2(1 − Φ(|z|))`
pub fn two_sided_normal_p(z: f64) -> f64 {
    (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

/// Two-sided Student t p-value, `2(1 − T(|t|; df))`
pub fn two_sided_t_p(t: f64, df: f64) -> f64 {
    let cdf = t_cdf(t.abs(), df);
    if cdf.is_nan() {
        return f64::NAN;
    }
    (2.0 * (1.0 - cdf)).clamp(0.0, 1.0)
}
