//! Parametric tests: Student's t, one-way ANOVA and Pearson chi-square.

use crate::descriptive::{mean, variance};
use crate::distribution::{chi_square_cdf, f_cdf, two_sided_t_p};
use crate::error::{validation, InferenceError, InferenceResult};

use super::{clean_groups, group_label, TestMethod, TestResult};

/// Student's two-sample t-test with pooled variance.
///
/// `df = n1 + n2 − 2`; each sample needs at least 2 finite values.
pub fn t_test(a: &[f64], b: &[f64]) -> InferenceResult<TestResult> {
    let groups = clean_groups(&[a, b], group_label)?;
    let (x, y) = (&groups[0], &groups[1]);
    validation::require_len("t-test", x.len(), 2)?;
    validation::require_len("t-test", y.len(), 2)?;

    let (n1, n2) = (x.len() as f64, y.len() as f64);
    let df = n1 + n2 - 2.0;
    let pooled_var = ((n1 - 1.0) * variance(x) + (n2 - 1.0) * variance(y)) / df;
    let se = (pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se == 0.0 {
        return Err(InferenceError::DegenerateData {
            message: "both samples have zero variance".to_string(),
        });
    }

    let t = validation::require_finite("t-test", (mean(x) - mean(y)) / se)?;
    let p = validation::require_finite("t-test p-value", two_sided_t_p(t, df))?;
    let mut result =
        TestResult::new(TestMethod::StudentT, t, p, vec![x.len(), y.len()]).with_df(df);
    result.standard_error = Some(se);
    Ok(result)
}

/// One-way ANOVA, `F = MSB / MSW` on `(k − 1, N − k)` degrees of freedom.
pub fn one_way_anova<S: AsRef<[f64]>>(groups: &[S]) -> InferenceResult<TestResult> {
    validation::require_groups(groups.len(), 2)?;
    let groups = clean_groups(groups, group_label)?;
    let sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
    let k = groups.len();
    let n: usize = sizes.iter().sum();
    validation::require_len("ANOVA", n, k + 1)?;

    let grand_mean = mean(&groups.concat());
    let (ssb, ssw) = groups.iter().fold((0.0, 0.0), |(ssb, ssw), g| {
        let m = mean(g);
        let within: f64 = g.iter().map(|x| (x - m).powi(2)).sum();
        (ssb + g.len() as f64 * (m - grand_mean).powi(2), ssw + within)
    });

    let df1 = (k - 1) as f64;
    let df2 = (n - k) as f64;
    let msw = ssw / df2;
    if msw == 0.0 {
        return Err(InferenceError::DegenerateData {
            message: "no variation within groups".to_string(),
        });
    }
    let f = (ssb / df1) / msw;
    let p = validation::require_finite("ANOVA p-value", 1.0 - f_cdf(f, df1, df2))?;

    let mut result = TestResult::new(TestMethod::OneWayAnova, f, p, sizes).with_df(df1);
    result.df2 = Some(df2);
    Ok(result)
}

/// Pearson chi-square test of independence on an r×c count table.
///
/// Expected counts come from the margins; `df = (r − 1)(c − 1)`. Tables
/// smaller than 2×2 or with an empty row or column are rejected.
pub fn chi_square_independence(table: &[Vec<u64>]) -> InferenceResult<TestResult> {
    validation::validate_table(table)?;
    let (row_sums, col_sums) = margins(table);
    if row_sums.len() < 2 || col_sums.len() < 2 {
        return Err(InferenceError::InvalidTable {
            message: "at least a 2x2 table is required".to_string(),
        });
    }
    if row_sums.contains(&0) || col_sums.contains(&0) {
        return Err(InferenceError::InvalidTable {
            message: "a row or column total is zero".to_string(),
        });
    }

    let total = row_sums.iter().sum::<u64>() as f64;
    let mut chi2 = 0.0;
    for (row, &row_sum) in table.iter().zip(&row_sums) {
        for (&observed, &col_sum) in row.iter().zip(&col_sums) {
            let expected = row_sum as f64 * col_sum as f64 / total;
            chi2 += (observed as f64 - expected).powi(2) / expected;
        }
    }

    let df = ((row_sums.len() - 1) * (col_sums.len() - 1)) as f64;
    let sizes = row_sums.iter().map(|&s| s as usize).collect();
    let p = validation::require_finite("chi-square p-value", 1.0 - chi_square_cdf(chi2, df))?;
    Ok(TestResult::new(TestMethod::ChiSquare, chi2, p, sizes).with_df(df))
}

/// Row and column totals of a rectangular table
pub(crate) fn margins(table: &[Vec<u64>]) -> (Vec<u64>, Vec<u64>) {
    let cols = table.first().map_or(0, Vec::len);
    let row_sums = table.iter().map(|row| row.iter().sum()).collect();
    let col_sums = (0..cols).map(|j| table.iter().map(|row| row[j]).sum()).collect();
    (row_sums, col_sums)
}
