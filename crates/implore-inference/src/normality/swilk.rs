//! Shapiro-Wilk W test (Royston's AS R94 algorithm)
//!
//! Valid for 3 ≤ n ≤ 5000. Weights come from normal order-statistic
//! approximations with Royston's polynomial bias correction; the p-value
//! uses a log-normal approximation of 1 − W with separate coefficient sets
//! for n ≤ 11 and n ≥ 12, and an exact arcsine form for n = 3.

use std::f64::consts::FRAC_1_SQRT_2;

use serde::{Deserialize, Serialize};

use crate::descriptive::sorted_finite;
use crate::distribution::normal_cdf;
use crate::error::{validation, InferenceError, InferenceResult};
use crate::special::normal_quantile;

/// Largest sample the approximation is valid for
pub const MAX_SAMPLE_SIZE: usize = 5000;

/// Data range below which the sample is treated as constant
const SMALL: f64 = 1e-19;

const G: [f64; 2] = [-2.273, 0.459];
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];

/// 6/π
const PI6: f64 = 1.909_859_317_102_74;
/// asin(√(3/4))
const STQR: f64 = 1.047_197_551_196_6;

/// Result of a Shapiro-Wilk test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapiroWilk {
    /// W statistic in (0, 1]
    pub statistic: f64,
    pub p_value: f64,
    /// Number of finite observations used
    pub n: usize,
}

/// Evaluate `cc[0] + cc[1]·x + … + cc[len−1]·x^(len−1)`
fn poly(cc: &[f64], x: f64) -> f64 {
    let nord = cc.len();
    let mut ret = cc[0];
    if nord > 1 {
        let mut p = x * cc[nord - 1];
        for &c in cc[1..nord - 1].iter().rev() {
            p = (p + c) * x;
        }
        ret += p;
    }
    ret
}

fn sign(x: isize) -> f64 {
    match x.signum() {
        1 => 1.0,
        -1 => -1.0,
        _ => 0.0,
    }
}

/// Half-set of antisymmetric weights, 1-indexed (`a[0]` unused)
fn coefficients(n: usize) -> Vec<f64> {
    let nn2 = n / 2;
    let mut a = vec![0.0; nn2 + 1];

    if n == 3 {
        a[1] = FRAC_1_SQRT_2;
        return a;
    }

    let an = n as f64;
    let an25 = an + 0.25;
    let mut summ2 = 0.0;
    for (i, slot) in a.iter_mut().enumerate().skip(1) {
        *slot = normal_quantile((i as f64 - 0.375) / an25);
        summ2 += *slot * *slot;
    }
    summ2 *= 2.0;
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();
    let a1 = poly(&C1, rsn) - a[1] / ssumm2;

    let (i1, fac) = if n > 5 {
        let a2 = -a[2] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * a[1] * a[1] - 2.0 * a[2] * a[2])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        a[2] = a2;
        (3, fac)
    } else {
        let fac = ((summ2 - 2.0 * a[1] * a[1]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (2, fac)
    };

    a[1] = a1;
    for weight in a.iter_mut().skip(i1) {
        *weight /= -fac;
    }
    a
}

/// Shapiro-Wilk test on the finite values of `data`
pub fn shapiro_wilk(data: &[f64]) -> InferenceResult<ShapiroWilk> {
    let x = sorted_finite(data);
    let n = x.len();
    validation::require_len("Shapiro-Wilk", n, 3)?;
    if n > MAX_SAMPLE_SIZE {
        return Err(InferenceError::SampleTooLarge {
            test: "Shapiro-Wilk",
            max: MAX_SAMPLE_SIZE,
            got: n,
        });
    }

    let a = coefficients(n);

    let range = x[n - 1] - x[0];
    if range < SMALL {
        return Err(InferenceError::DegenerateData {
            message: "data range is too small for Shapiro-Wilk".to_string(),
        });
    }

    // Order check; sa and sx accumulate the means of weights and scaled data
    let n_i = n as isize;
    let mut xx = x[0] / range;
    let mut sx = xx;
    let mut sa = -a[1];
    let mut i: isize = 1;
    let mut j: isize = n_i - 1;
    while i < n_i {
        let xi = x[i as usize] / range;
        if xx - xi > SMALL {
            return Err(InferenceError::UnsortedInput);
        }
        sx += xi;
        i += 1;
        if i != j {
            sa += sign(i - j) * a[i.min(j) as usize];
        }
        xx = xi;
        j -= 1;
    }

    sa /= n as f64;
    sx /= n as f64;
    let (mut ssa, mut ssx, mut sax) = (0.0, 0.0, 0.0);
    for (i, &xi) in x.iter().enumerate() {
        let i = i as isize;
        let j = n_i - 1 - i;
        let asa = if i != j {
            sign(i - j) * a[1 + i.min(j) as usize] - sa
        } else {
            -sa
        };
        let xsx = xi / range - sx;
        ssa += asa * asa;
        ssx += xsx * xsx;
        sax += asa * xsx;
    }

    // 1 − W as a difference of squares, accurate when W is close to 1
    let ssassx = (ssa * ssx).sqrt();
    let w1 = ((ssassx - sax) * (ssassx + sax) / (ssa * ssx)).max(0.0);
    let w = validation::require_finite("Shapiro-Wilk", 1.0 - w1)?;
    let p_value = p_value(n, w, w1);

    Ok(ShapiroWilk {
        statistic: w,
        p_value,
        n,
    })
}

fn p_value(n: usize, w: f64, w1: f64) -> f64 {
    if n == 3 {
        return (PI6 * (w.clamp(0.0, 1.0).sqrt().asin() - STQR)).clamp(0.0, 1.0);
    }

    let an = n as f64;
    let y = w1.ln();

    let (z, m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return 1e-99;
        }
        (-(gamma - y).ln(), poly(&C3, an), poly(&C4, an).exp())
    } else {
        let ln_n = an.ln();
        (y, poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    (1.0 - normal_cdf((z - m) / s)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poly() {
        assert_eq!(poly(&[2.0], 5.0), 2.0);
        assert!((poly(&[1.0, 2.0, 3.0], 2.0) - 17.0).abs() < 1e-12);
    }

    #[test]
    fn test_coefficients_unit_norm() {
        for n in [4, 5, 6, 10, 25, 50] {
            let a = coefficients(n);
            let sum_sq: f64 = a.iter().skip(1).map(|w| w * w).sum();
            // Weights are antisymmetric, so the half-set carries half the norm
            assert!((2.0 * sum_sq - 1.0).abs() < 1e-6, "n = {n}: {sum_sq}");
        }
    }

    #[test]
    fn test_n3_exact_p_value() {
        // Equally spaced triple: W = 1, p = 1
        let r = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((r.statistic - 1.0).abs() < 1e-6);
        assert!(r.p_value > 0.99);
    }

    #[test]
    fn test_reference_value() {
        // R: shapiro.test(c(148,154,158,160,161,162,166,170,182,195,236))
        // W = 0.79, p-value = 0.0068
        let data = [
            148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0,
        ];
        let r = shapiro_wilk(&data).unwrap();
        assert!((r.statistic - 0.79).abs() < 0.01, "W = {}", r.statistic);
        assert!(r.p_value < 0.01, "p = {}", r.p_value);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(InferenceError::InsufficientData { .. })
        ));
        assert!(matches!(
            shapiro_wilk(&[4.0, 4.0, 4.0, 4.0]),
            Err(InferenceError::DegenerateData { .. })
        ));
        let big: Vec<f64> = (0..5001).map(|i| i as f64).collect();
        assert!(matches!(
            shapiro_wilk(&big),
            Err(InferenceError::SampleTooLarge { .. })
        ));
    }

    #[test]
    fn test_non_finite_filtered() {
        let with_nan = [1.2, f64::NAN, 2.3, 2.9, 3.1, 4.8, f64::INFINITY];
        let clean = [1.2, 2.3, 2.9, 3.1, 4.8];
        let a = shapiro_wilk(&with_nan).unwrap();
        let b = shapiro_wilk(&clean).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n, 5);
    }
}
