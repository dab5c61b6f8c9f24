//! Normality testing
//!
//! [`normality_test`] picks the test by sample size:
//! - n < 3: insufficient data
//! - n ≤ 50: Shapiro-Wilk
//! - n > 50: Lilliefors (Kolmogorov-Smirnov with estimated parameters)
//!
//! The verdict is shared: a sample is treated as normal when p > 0.05.
//! Errors from the underlying test are folded into the report so a batch
//! caller can record the failure and move on.

mod ks;
mod swilk;

pub use ks::*;
pub use swilk::*;

use serde::{Deserialize, Serialize};

use crate::descriptive::clean_sample;

/// Significance level for the normality verdict
pub const NORMALITY_ALPHA: f64 = 0.05;

/// Largest sample routed to Shapiro-Wilk
pub const SHAPIRO_WILK_MAX_N: usize = 50;

/// Which normality test produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalityTest {
    ShapiroWilk,
    Lilliefors,
    /// No test was run
    NotRun,
}

impl NormalityTest {
    /// Display name for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ShapiroWilk => "Shapiro-Wilk",
            Self::Lilliefors => "Kolmogorov-Smirnov (Lilliefors)",
            Self::NotRun => "Insufficient data",
        }
    }
}

/// Conclusion tag, mapped to localized text by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NormalityConclusion {
    NormalDistribution,
    NonNormalDistribution,
    InsufficientData,
    TestError,
}

impl NormalityConclusion {
    /// Conclusion for a p-value under the shared verdict rule
    pub fn from_p_value(p_value: f64) -> Self {
        if is_normal(p_value) {
            Self::NormalDistribution
        } else {
            Self::NonNormalDistribution
        }
    }
}

/// Shared verdict rule
pub fn is_normal(p_value: f64) -> bool {
    p_value > NORMALITY_ALPHA
}

/// Outcome of the normality dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityReport {
    pub test: NormalityTest,
    pub statistic: f64,
    pub p_value: f64,
    pub is_normal: bool,
    pub conclusion: NormalityConclusion,
    /// Number of finite observations
    pub n: usize,
    /// Human-readable failure, when the test could not be computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalityReport {
    fn completed(test: NormalityTest, statistic: f64, p_value: f64, n: usize) -> Self {
        Self {
            test,
            statistic,
            p_value,
            is_normal: is_normal(p_value),
            conclusion: NormalityConclusion::from_p_value(p_value),
            n,
            error: None,
        }
    }

    fn failed(
        test: NormalityTest,
        conclusion: NormalityConclusion,
        n: usize,
        error: String,
    ) -> Self {
        Self {
            test,
            statistic: f64::NAN,
            p_value: f64::NAN,
            is_normal: false,
            conclusion,
            n,
            error: Some(error),
        }
    }
}

/// Test the finite values of `data` for normality
pub fn normality_test(data: &[f64]) -> NormalityReport {
    let x = clean_sample(data);
    let n = x.len();

    if n < 3 {
        tracing::debug!(n, "normality: insufficient data");
        return NormalityReport::failed(
            NormalityTest::NotRun,
            NormalityConclusion::InsufficientData,
            n,
            format!("at least 3 observations are required, got {n}"),
        );
    }

    if n <= SHAPIRO_WILK_MAX_N {
        tracing::debug!(n, "normality: Shapiro-Wilk");
        match shapiro_wilk(&x) {
            Ok(r) => {
                NormalityReport::completed(NormalityTest::ShapiroWilk, r.statistic, r.p_value, n)
            }
            Err(e) => NormalityReport::failed(
                NormalityTest::ShapiroWilk,
                NormalityConclusion::TestError,
                n,
                e.to_string(),
            ),
        }
    } else {
        tracing::debug!(n, "normality: Lilliefors");
        match lilliefors(&x) {
            Ok(r) => {
                NormalityReport::completed(NormalityTest::Lilliefors, r.statistic, r.p_value, n)
            }
            Err(e) => NormalityReport::failed(
                NormalityTest::Lilliefors,
                NormalityConclusion::TestError,
                n,
                e.to_string(),
            ),
        }
    }
}

/// Combined normality verdict across groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNormalityStatus {
    /// Smallest p-value among groups with a computed test
    pub min_p_value: Option<f64>,
    pub is_normal: bool,
    pub conclusion: NormalityConclusion,
}

/// Fold per-group reports into one verdict.
///
/// Any group with p ≤ 0.05 makes the whole set non-normal. Groups whose
/// test failed (NaN p-value) do not affect the verdict. With no groups the
/// set is treated as normal.
pub fn group_normality_status<'a, I>(reports: I) -> GroupNormalityStatus
where
    I: IntoIterator<Item = &'a NormalityReport>,
{
    let mut min_p: Option<f64> = None;
    let mut all_normal = true;

    for report in reports {
        if report.p_value.is_nan() {
            continue;
        }
        min_p = Some(min_p.map_or(report.p_value, |m| m.min(report.p_value)));
        if !is_normal(report.p_value) {
            all_normal = false;
        }
    }

    GroupNormalityStatus {
        min_p_value: min_p,
        is_normal: all_normal,
        conclusion: if all_normal {
            NormalityConclusion::NormalDistribution
        } else {
            NormalityConclusion::NonNormalDistribution
        },
    }
}
