//! Special functions underlying the distribution CDFs
//!
//! - Error function (Abramowitz-Stegun 7.1.26)
//! - Log-gamma (Lanczos, g = 7, 9 coefficients)
//! - Regularized incomplete beta (modified Lentz continued fraction)
//! - Regularized lower incomplete gamma (series / continued fraction)
//! - Normal quantile (Wichura AS241)
//!
//! All functions are total: invalid arguments and non-convergence yield NaN.
//! Non-convergence is additionally reported through `tracing`.

use std::f64::consts::PI;

/// Iteration cap for continued fractions and series
pub const MAX_ITERATIONS: usize = 100;

/// Relative convergence threshold
pub const EPSILON: f64 = 3e-7;

/// Floor that keeps Lentz denominators away from zero
pub const FPMIN: f64 = 1e-30;

const LANCZOS_G: f64 = 7.0;

const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Error function, max absolute error about 1.5e-7.
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    if x.is_nan() {
        return f64::NAN;
    }
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Natural log of the gamma function.
///
/// Arguments in (0, 0.5) go through the reflection identity
/// `ln Γ(z) = ln π − ln|sin πz| − ln Γ(1 − z)`. Returns NaN for `z <= 0`
/// and for non-finite input.
pub fn ln_gamma(z: f64) -> f64 {
    if !z.is_finite() || z <= 0.0 {
        return f64::NAN;
    }

    if z < 0.5 {
        let log_sin = (PI * z).sin().abs().ln();
        let reflected = ln_gamma(1.0 - z);
        if reflected.is_nan() {
            return f64::NAN;
        }
        return PI.ln() - log_sin - reflected;
    }

    let shifted = z - 1.0;
    let series = LANCZOS_COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS_COEFFICIENTS[0], |acc, (i, &c)| {
            acc + c / (shifted + i as f64)
        });
    let t = shifted + LANCZOS_G + 0.5;
    (z - 0.5) * t.ln() - t + ((2.0 * PI).sqrt() * series).ln()
}

/// `ln(n!)` via `ln_gamma(n + 1)`
pub fn ln_factorial(n: u64) -> f64 {
    if n < 2 {
        return 0.0;
    }
    ln_gamma(n as f64 + 1.0)
}

/// Continued fraction for the incomplete beta function.
fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        // Odd step
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < EPSILON {
            return h;
        }
    }

    tracing::warn!(x, a, b, "incomplete beta continued fraction did not converge");
    f64::NAN
}

/// Regularized incomplete beta function `I_x(a, b)`.
///
/// Valid for `x ∈ [0, 1]`, `a > 0`, `b > 0`; NaN otherwise.
pub fn incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x.is_nan() || !(0.0..=1.0).contains(&x) || !(a > 0.0) || !(b > 0.0) {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }

    let ln_beta = ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b);
    if ln_beta.is_nan() {
        return f64::NAN;
    }
    let front = (a * x.ln() + b * (1.0 - x).ln() - ln_beta).exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

/// Regularized lower incomplete gamma function `P(a, x)`.
///
/// Note the argument order `(x, a)`. NaN for `x < 0` or `a <= 0`;
/// the result is clamped to `[0, 1]`.
pub fn incomplete_gamma(x: f64, a: f64) -> f64 {
    if x.is_nan() || x < 0.0 || !(a > 0.0) {
        return f64::NAN;
    }
    let ln_gamma_a = ln_gamma(a);
    if ln_gamma_a.is_nan() {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x.is_infinite() {
        return 1.0;
    }

    let ln_prefix = -x + a * x.ln() - ln_gamma_a;

    if x < a + 1.0 {
        let mut ap = a;
        let mut sum = 1.0 / a;
        let mut del = sum;
        for _ in 0..MAX_ITERATIONS {
            ap += 1.0;
            del *= x / ap;
            sum += del;
            if del.abs() < sum.abs() * EPSILON {
                return (sum * ln_prefix.exp()).clamp(0.0, 1.0);
            }
        }
        tracing::warn!(x, a, "incomplete gamma series did not converge");
        f64::NAN
    } else {
        let mut b = x + 1.0 - a;
        let mut c = 1.0 / FPMIN;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..=MAX_ITERATIONS {
            let i = i as f64;
            let an = -i * (i - a);
            b += 2.0;
            d = an * d + b;
            if d.abs() < FPMIN {
                d = FPMIN;
            }
            c = b + an / c;
            if c.abs() < FPMIN {
                c = FPMIN;
            }
            d = 1.0 / d;
            let del = d * c;
            h *= del;
            if (del - 1.0).abs() < EPSILON {
                return (1.0 - ln_prefix.exp() * h).clamp(0.0, 1.0);
            }
        }
        tracing::warn!(x, a, "incomplete gamma continued fraction did not converge");
        f64::NAN
    }
}

/// Quantile of the standard normal distribution (Wichura AS241).
///
/// Returns `-inf`/`+inf` at 0 and 1, NaN outside `[0, 1]`.
pub fn normal_quantile(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let q = p - 0.5;
    if q.abs() <= 0.425 {
        let r = 0.180_625 - q * q;
        let num = ((((((r * 2_509.080_928_730_122_7 + 33_430.575_583_588_128) * r
            + 67_265.770_927_008_7)
            * r
            + 45_921.953_931_549_87)
            * r
            + 13_731.693_765_509_461)
            * r
            + 1_971.590_950_306_551_3)
            * r
            + 133.141_667_891_784_38)
            * r
            + 3.387_132_872_796_366_5;
        let den = ((((((r * 5_226.495_278_852_854 + 28_729.085_735_721_943) * r
            + 39_307.895_800_092_71)
            * r
            + 21_213.794_301_586_597)
            * r
            + 5_394.196_021_424_751)
            * r
            + 687.187_007_492_057_9)
            * r
            + 42.313_330_701_600_91)
            * r
            + 1.0;
        return q * num / den;
    }

    let tail = if q > 0.0 { 1.0 - p } else { p };
    let mut r = (-tail.ln()).sqrt();
    let val = if r <= 5.0 {
        r -= 1.6;
        let num = ((((((r * 7.745_450_142_783_414e-4 + 0.022_723_844_989_269_184) * r
            + 0.241_780_725_177_450_6)
            * r
            + 1.270_458_252_452_368_4)
            * r
            + 3.647_848_324_763_204_5)
            * r
            + 5.769_497_221_460_691)
            * r
            + 4.630_337_846_156_545)
            * r
            + 1.423_437_110_749_683_5;
        let den = ((((((r * 1.050_750_071_644_416_9e-9 + 5.475_938_084_995_345e-4) * r
            + 0.015_198_666_563_616_457)
            * r
            + 0.148_103_976_427_480_08)
            * r
            + 0.689_767_334_985_1)
            * r
            + 1.676_384_830_183_803_8)
            * r
            + 2.053_191_626_637_759)
            * r
            + 1.0;
        num / den
    } else {
        r -= 5.0;
        let num = ((((((r * 2.010_334_399_292_288e-7 + 2.711_555_568_743_487_6e-5) * r
            + 0.001_242_660_947_388_078_4)
            * r
            + 0.026_532_189_526_576_124)
            * r
            + 0.296_560_571_828_504_9)
            * r
            + 1.784_826_539_917_291_3)
            * r
            + 5.463_784_911_164_114)
            * r
            + 6.657_904_643_501_103;
        let den = ((((((r * 2.044_263_103_389_939_7e-15 + 1.421_511_758_316_446e-7) * r
            + 1.846_318_317_510_054_8e-5)
            * r
            + 7.868_691_311_456_133e-4)
            * r
            + 0.014_875_361_290_850_615)
            * r
            + 0.136_929_880_922_735_8)
            * r
            + 0.599_832_206_555_888)
            * r
            + 1.0;
        num / den
    };

    if q < 0.0 {
        -val
    } else {
        val
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erf_reference_values() {
        assert!(erf(0.0).abs() < 1e-8);
        assert!((erf(0.5) - 0.520_499_877_8).abs() < 2e-7);
        assert!((erf(1.0) - 0.842_700_792_9).abs() < 2e-7);
        assert!((erf(2.0) - 0.995_322_265_0).abs() < 2e-7);
        assert!((erf(-1.0) + erf(1.0)).abs() < 1e-15);
        assert!(erf(f64::NAN).is_nan());
        assert!((erf(f64::INFINITY) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_ln_gamma_integers() {
        // Γ(n) = (n-1)!
        assert!(ln_gamma(1.0).abs() < 1e-10);
        assert!(ln_gamma(2.0).abs() < 1e-10);
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(10.0) - 362_880.0_f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_ln_gamma_half_and_reflection() {
        // Γ(1/2) = √π
        assert!((ln_gamma(0.5) - PI.sqrt().ln()).abs() < 1e-10);
        // Γ(1/4) ≈ 3.625609908
        assert!((ln_gamma(0.25) - 3.625_609_908_221_908_f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_ln_gamma_invalid() {
        assert!(ln_gamma(0.0).is_nan());
        assert!(ln_gamma(-1.5).is_nan());
        assert!(ln_gamma(f64::INFINITY).is_nan());
        assert!(ln_gamma(f64::NAN).is_nan());
    }

    #[test]
    fn test_ln_factorial() {
        assert_eq!(ln_factorial(0), 0.0);
        assert_eq!(ln_factorial(1), 0.0);
        assert!((ln_factorial(6) - 720.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn test_incomplete_beta_bounds() {
        assert_eq!(incomplete_beta(0.0, 2.0, 3.0), 0.0);
        assert_eq!(incomplete_beta(1.0, 2.0, 3.0), 1.0);
        assert!(incomplete_beta(-0.1, 2.0, 3.0).is_nan());
        assert!(incomplete_beta(1.1, 2.0, 3.0).is_nan());
        assert!(incomplete_beta(0.5, 0.0, 3.0).is_nan());
        assert!(incomplete_beta(0.5, 2.0, -1.0).is_nan());
    }

    #[test]
    fn test_incomplete_beta_closed_forms() {
        // I_x(1, 1) = x
        assert!((incomplete_beta(0.3, 1.0, 1.0) - 0.3).abs() < 1e-6);
        // I_x(a, 1) = x^a
        assert!((incomplete_beta(0.4, 3.0, 1.0) - 0.4_f64.powi(3)).abs() < 1e-6);
        // Symmetric case at the midpoint
        assert!((incomplete_beta(0.5, 4.0, 4.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_incomplete_gamma() {
        // P(1, x) = 1 - e^-x
        assert!((incomplete_gamma(1.0, 1.0) - (1.0 - (-1.0_f64).exp())).abs() < 1e-6);
        assert!((incomplete_gamma(5.0, 1.0) - (1.0 - (-5.0_f64).exp())).abs() < 1e-6);
        assert_eq!(incomplete_gamma(0.0, 2.0), 0.0);
        assert!(incomplete_gamma(-1.0, 2.0).is_nan());
        assert!(incomplete_gamma(1.0, 0.0).is_nan());
    }

    #[test]
    fn test_normal_quantile() {
        assert!(normal_quantile(0.5).abs() < 1e-12);
        assert!((normal_quantile(0.975) - 1.959_963_984_540_054).abs() < 1e-9);
        assert!((normal_quantile(0.025) + 1.959_963_984_540_054).abs() < 1e-9);
        assert!((normal_quantile(0.001) + 3.090_232_306_167_813_5).abs() < 1e-9);
        assert!((normal_quantile(1e-15) + 7.941_345_326_170_997).abs() < 1e-6);
        assert_eq!(normal_quantile(0.0), f64::NEG_INFINITY);
        assert_eq!(normal_quantile(1.0), f64::INFINITY);
        assert!(normal_quantile(1.5).is_nan());
    }
}
