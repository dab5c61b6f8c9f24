//! Reference values for the distribution layer and the normality tests
//!
//! Expected values are the usual printed table values (R `pnorm`, `pt`,
//! `pchisq`, `pf`, `shapiro.test`).

use implore_inference::special::ln_factorial;
use implore_inference::{
    chi_square_cdf, erf, f_cdf, lilliefors, normal_cdf, normal_quantile, normality_test,
    shapiro_wilk, t_cdf, two_sided_normal_p, two_sided_t_p, NormalityConclusion, NormalityTest,
};
use rstest::rstest;

const TOL: f64 = 1e-4;

// === Special functions ===

#[rstest]
#[case(0.0, 0.0)]
#[case(0.5, 0.520_500)]
#[case(1.0, 0.842_701)]
#[case(-1.0, -0.842_701)]
#[case(2.0, 0.995_322)]
fn test_erf(#[case] x: f64, #[case] expected: f64) {
    assert!((erf(x) - expected).abs() < TOL, "erf({x}) = {}", erf(x));
}

#[rstest]
#[case(0.5, 0.0)]
#[case(0.975, 1.959_964)]
#[case(0.025, -1.959_964)]
#[case(0.995, 2.575_829)]
#[case(0.841_345, 1.0)]
fn test_normal_quantile(#[case] p: f64, #[case] expected: f64) {
    assert!((normal_quantile(p) - expected).abs() < TOL);
}

#[rstest]
#[case(0, 0.0)]
#[case(1, 0.0)]
#[case(5, 4.787_492)]
#[case(10, 15.104_413)]
fn test_ln_factorial(#[case] n: u64, #[case] expected: f64) {
    assert!((ln_factorial(n) - expected).abs() < TOL);
}

// === CDFs ===

#[rstest]
#[case(0.0, 0.5)]
#[case(1.0, 0.841_345)]
#[case(-1.0, 0.158_655)]
#[case(1.96, 0.975_002)]
#[case(-3.0, 0.001_350)]
fn test_normal_cdf(#[case] x: f64, #[case] expected: f64) {
    assert!((normal_cdf(x) - expected).abs() < TOL);
}

#[rstest]
#[case(0.0, 5.0, 0.5)]
#[case(1.0, 1.0, 0.75)]
#[case(2.0, 10.0, 0.963_306)]
#[case(-2.228_139, 10.0, 0.025)]
#[case(2.0, 30.0, 0.972_687)]
fn test_t_cdf(#[case] t: f64, #[case] df: f64, #[case] expected: f64) {
    assert!((t_cdf(t, df) - expected).abs() < TOL, "t_cdf = {}", t_cdf(t, df));
}

#[rstest]
#[case(3.841_459, 1.0, 0.95)]
#[case(5.991_465, 2.0, 0.95)]
#[case(2.0, 2.0, 0.632_121)]
#[case(10.0, 10.0, 0.559_507)]
#[case(0.0, 3.0, 0.0)]
fn test_chi_square_cdf(#[case] x: f64, #[case] df: f64, #[case] expected: f64) {
    assert!((chi_square_cdf(x, df) - expected).abs() < TOL);
}

#[rstest]
#[case(1.0, 2.0, 2.0, 0.5)]
#[case(4.964_603, 1.0, 10.0, 0.95)]
#[case(3.354_131, 2.0, 27.0, 0.95)]
#[case(0.0, 3.0, 12.0, 0.0)]
fn test_f_cdf(#[case] x: f64, #[case] df1: f64, #[case] df2: f64, #[case] expected: f64) {
    assert!((f_cdf(x, df1, df2) - expected).abs() < TOL);
}

#[rstest]
#[case(1.959_964, 0.05)]
#[case(0.0, 1.0)]
#[case(-2.575_829, 0.01)]
fn test_two_sided_normal_p(#[case] z: f64, #[case] expected: f64) {
    assert!((two_sided_normal_p(z) - expected).abs() < TOL);
}

#[rstest]
#[case(2.228_139, 10.0, 0.05)]
#[case(-12.706_2, 1.0, 0.05)]
#[case(0.0, 4.0, 1.0)]
fn test_two_sided_t_p(#[case] t: f64, #[case] df: f64, #[case] expected: f64) {
    assert!((two_sided_t_p(t, df) - expected).abs() < TOL);
}

#[test]
fn test_invalid_degrees_of_freedom() {
    assert!(t_cdf(1.0, 0.0).is_nan());
    assert!(chi_square_cdf(1.0, -1.0).is_nan());
    assert!(f_cdf(1.0, 0.0, 3.0).is_nan());
}

// === Normality ===

fn normal_quantiles(n: usize) -> Vec<f64> {
    (1..=n)
        .map(|i| normal_quantile((i as f64 - 0.5) / n as f64))
        .collect()
}

#[test]
fn test_shapiro_wilk_reference_sample() {
    // shapiro.test(c(148,154,158,160,161,162,166,170,182,195,236)):
    // W = 0.78881, p-value = 0.006704
    let data = [
        148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0,
    ];
    let r = shapiro_wilk(&data).unwrap();
    assert_eq!(r.n, 11);
    assert!((r.statistic - 0.7888).abs() < 1e-3, "W = {}", r.statistic);
    assert!((r.p_value - 0.0067).abs() < 1e-3, "p = {}", r.p_value);
}

#[rstest]
#[case(12)]
#[case(20)]
#[case(40)]
fn test_shapiro_wilk_accepts_normal_quantiles(#[case] n: usize) {
    let r = shapiro_wilk(&normal_quantiles(n)).unwrap();
    assert!(r.statistic > 0.95);
    assert!(r.p_value > 0.5, "n = {n}: p = {}", r.p_value);
}

#[test]
fn test_shapiro_wilk_rejects_skewed() {
    let skewed: Vec<f64> = (0..20).map(|i| (f64::from(i) / 3.0).exp()).collect();
    let r = shapiro_wilk(&skewed).unwrap();
    assert!(r.p_value < 0.05, "p = {}", r.p_value);
}

#[test]
fn test_lilliefors_large_samples() {
    let normal = lilliefors(&normal_quantiles(100)).unwrap();
    assert!(normal.statistic < 0.02);
    assert!(normal.p_value > 0.2);

    let skewed: Vec<f64> = (0..100).map(|i| (f64::from(i) / 20.0).exp()).collect();
    let skewed = lilliefors(&skewed).unwrap();
    assert!(skewed.statistic > 0.2);
    assert!(skewed.p_value <= 0.01);
}

#[rstest]
#[case(2, NormalityTest::NotRun, NormalityConclusion::InsufficientData)]
#[case(30, NormalityTest::ShapiroWilk, NormalityConclusion::NormalDistribution)]
#[case(50, NormalityTest::ShapiroWilk, NormalityConclusion::NormalDistribution)]
#[case(51, NormalityTest::Lilliefors, NormalityConclusion::NormalDistribution)]
#[case(200, NormalityTest::Lilliefors, NormalityConclusion::NormalDistribution)]
fn test_normality_dispatch(
    #[case] n: usize,
    #[case] test: NormalityTest,
    #[case] conclusion: NormalityConclusion,
) {
    let report = normality_test(&normal_quantiles(n));
    assert_eq!(report.test, test);
    assert_eq!(report.conclusion, conclusion);
    assert_eq!(report.n, n);
}
