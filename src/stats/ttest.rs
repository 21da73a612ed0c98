// SPDX-License-Identifier: AGPL-3.0-or-later
//! Student-t tests: one-sample, paired, and Welch two-sample.
//!
//! Semantics follow R's `t.test`: Welch (unequal-variance) df for
//! unpaired comparisons, 95% intervals, and one-sided intervals open on
//! the untested side. The `alternative` is an a-priori choice per
//! hypothesis — callers must preserve the direction their hypothesis
//! was registered with, not default it.
//!
//! One deliberate divergence: R aborts on zero-variance input ("data
//! are essentially constant"); here a degenerate sample yields a
//! point-mass interval with an infinite statistic, so exact synthetic
//! fixtures (constant paired offsets) remain testable.

use super::descriptive::{mean, sample_variance, CONF_LEVEL};
use super::special::{t_cdf, t_quantile};
use crate::error::{Error, Result};

/// Directional alternative hypothesis, fixed a priori per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternative {
    /// Estimate differs from the null in either direction.
    TwoSided,
    /// Estimate exceeds the null (prior literature gives direction).
    Greater,
    /// Estimate falls below the null.
    Less,
}

/// Outcome of a single t-test.
#[derive(Debug, Clone, Copy)]
pub struct TTest {
    /// Point estimate (mean, mean difference, or mean of differences).
    pub estimate: f64,
    /// Standard error of the estimate (0 for degenerate samples).
    pub se: f64,
    /// t statistic (±∞ for degenerate nonzero estimates).
    pub statistic: f64,
    /// Degrees of freedom (Welch-adjusted for unpaired tests).
    pub df: f64,
    /// Raw p-value under the chosen alternative.
    pub p: f64,
    /// Lower confidence bound (−∞ under [`Alternative::Less`]).
    pub ci_low: f64,
    /// Upper confidence bound (+∞ under [`Alternative::Greater`]).
    pub ci_high: f64,
    /// Total observations used.
    pub n: usize,
}

fn p_value(statistic: f64, df: f64, alternative: Alternative) -> f64 {
    match alternative {
        Alternative::TwoSided => 2.0 * (1.0 - t_cdf(statistic.abs(), df)),
        Alternative::Greater => 1.0 - t_cdf(statistic, df),
        Alternative::Less => t_cdf(statistic, df),
    }
}

fn confidence_interval(estimate: f64, se: f64, df: f64, alternative: Alternative) -> (f64, f64) {
    if se == 0.0 {
        return (estimate, estimate);
    }
    match alternative {
        Alternative::TwoSided => {
            let t = t_quantile(1.0 - (1.0 - CONF_LEVEL) / 2.0, df);
            (t.mul_add(-se, estimate), t.mul_add(se, estimate))
        }
        Alternative::Greater => {
            let t = t_quantile(CONF_LEVEL, df);
            (t.mul_add(-se, estimate), f64::INFINITY)
        }
        Alternative::Less => {
            let t = t_quantile(CONF_LEVEL, df);
            (f64::NEG_INFINITY, t.mul_add(se, estimate))
        }
    }
}

/// Assemble a [`TTest`] once estimate, se, and df are known.
fn from_estimate(
    estimate: f64,
    se: f64,
    df: f64,
    n: usize,
    alternative: Alternative,
) -> TTest {
    let (statistic, p) = if se == 0.0 {
        // Degenerate sample: point mass at the estimate.
        if estimate == 0.0 {
            (0.0, 1.0)
        } else {
            let sign = estimate.signum();
            let p = match alternative {
                Alternative::TwoSided => 0.0,
                Alternative::Greater => {
                    if sign > 0.0 {
                        0.0
                    } else {
                        1.0
                    }
                }
                Alternative::Less => {
                    if sign < 0.0 {
                        0.0
                    } else {
                        1.0
                    }
                }
            };
            (sign * f64::INFINITY, p)
        }
    } else {
        let statistic = estimate / se;
        (statistic, p_value(statistic, df, alternative))
    };
    let (ci_low, ci_high) = confidence_interval(estimate, se, df, alternative);
    TTest {
        estimate,
        se,
        statistic,
        df,
        p,
        ci_low,
        ci_high,
        n,
    }
}

/// One-sample t-test of `mean(xs)` against `mu0`.
///
/// # Errors
///
/// [`Error::InsufficientGroupSize`] for fewer than two observations.
#[allow(clippy::cast_precision_loss)]
pub fn one_sample(xs: &[f64], mu0: f64, alternative: Alternative) -> Result<TTest> {
    let n = xs.len();
    if n < 2 {
        return Err(Error::InsufficientGroupSize(format!(
            "one-sample test needs >= 2 observations, got {n}"
        )));
    }
    let estimate = mean(xs) - mu0;
    let se = (sample_variance(xs) / n as f64).sqrt();
    Ok(from_estimate(estimate, se, (n - 1) as f64, n, alternative))
}

/// Paired t-test on per-pair differences `xs[i] - ys[i]`.
///
/// # Errors
///
/// [`Error::UnpairedInput`] for unequal lengths;
/// [`Error::InsufficientGroupSize`] for fewer than two pairs.
pub fn paired(xs: &[f64], ys: &[f64], alternative: Alternative) -> Result<TTest> {
    if xs.len() != ys.len() {
        return Err(Error::UnpairedInput(format!(
            "{} vs {} observations",
            xs.len(),
            ys.len()
        )));
    }
    let diffs: Vec<f64> = xs.iter().zip(ys).map(|(x, y)| x - y).collect();
    one_sample(&diffs, 0.0, alternative)
}

/// Welch two-sample t-test of `mean(xs) - mean(ys)`.
///
/// Welch-Satterthwaite degrees of freedom; variances never pooled
/// (R's `t.test` default, which the legacy analysis used throughout).
///
/// # Errors
///
/// [`Error::InsufficientGroupSize`] if either side has fewer than two
/// observations.
#[allow(clippy::cast_precision_loss)]
pub fn welch(xs: &[f64], ys: &[f64], alternative: Alternative) -> Result<TTest> {
    let (n1, n2) = (xs.len(), ys.len());
    if n1 < 2 || n2 < 2 {
        return Err(Error::InsufficientGroupSize(format!(
            "two-sample test needs >= 2 per side, got {n1} and {n2}"
        )));
    }
    let estimate = mean(xs) - mean(ys);
    let (v1, v2) = (sample_variance(xs), sample_variance(ys));
    let (r1, r2) = (v1 / n1 as f64, v2 / n2 as f64);
    let se = (r1 + r2).sqrt();
    let df = if se == 0.0 {
        (n1 + n2 - 2) as f64
    } else {
        (r1 + r2) * (r1 + r2) / (r1 * r1 / (n1 - 1) as f64 + r2 * r2 / (n2 - 1) as f64)
    };
    Ok(from_estimate(estimate, se, df, n1 + n2, alternative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_sample_matches_r() {
        // R: t.test(1:5) -> t = 4.2426, df = 4, p = 0.01324,
        //    CI [1.036757, 4.963243]
        let r = one_sample(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.0, Alternative::TwoSided).unwrap();
        assert!((r.estimate - 3.0).abs() < 1e-12);
        assert!((r.statistic - 4.242_640_687).abs() < 1e-8);
        assert!((r.df - 4.0).abs() < f64::EPSILON);
        assert!((r.p - 0.013_24).abs() < 5e-5);
        assert!((r.ci_low - 1.036_757).abs() < 1e-5);
        assert!((r.ci_high - 4.963_243).abs() < 1e-5);
    }

    #[test]
    fn one_sample_nonzero_null() {
        let r = one_sample(&[1.0, 2.0, 3.0, 4.0, 5.0], 3.0, Alternative::TwoSided).unwrap();
        assert!(r.estimate.abs() < 1e-12);
        assert!((r.p - 1.0).abs() < 1e-12);
    }

    #[test]
    fn one_sided_greater() {
        // R: t.test(1:5, alternative="greater") -> p = 0.006619,
        //    CI [1.492297, Inf]
        let r = one_sample(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.0, Alternative::Greater).unwrap();
        assert!((r.p - 0.006_619).abs() < 5e-5);
        assert!((r.ci_low - 1.492_297).abs() < 1e-5);
        assert!(r.ci_high.is_infinite());
    }

    #[test]
    fn one_sided_less_mirrors_greater() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let g = one_sample(&xs, 0.0, Alternative::Greater).unwrap();
        let l = one_sample(&xs, 0.0, Alternative::Less).unwrap();
        assert!((g.p + l.p - 1.0).abs() < 1e-12);
        assert!(l.ci_low.is_infinite() && l.ci_low < 0.0);
    }

    #[test]
    fn paired_constant_offset_gives_point_mass() {
        // Strictly increasing sequences, constant offset 1.0: the
        // estimate is exactly 1 and the interval excludes 0.
        let xs = [2.0, 3.0, 4.0, 5.0];
        let ys = [1.0, 2.0, 3.0, 4.0];
        let r = paired(&xs, &ys, Alternative::TwoSided).unwrap();
        assert!((r.estimate - 1.0).abs() < 1e-12);
        assert!(r.statistic.is_infinite() && r.statistic > 0.0);
        assert!(r.p.abs() < 1e-12);
        assert!(r.ci_low > 0.0);
        assert!((r.ci_low - 1.0).abs() < 1e-12 && (r.ci_high - 1.0).abs() < 1e-12);
    }

    #[test]
    fn paired_matches_one_sample_of_differences() {
        let xs = [3.1, 4.0, 2.7, 5.5];
        let ys = [2.0, 3.8, 2.9, 4.1];
        let p = paired(&xs, &ys, Alternative::TwoSided).unwrap();
        let diffs: Vec<f64> = xs.iter().zip(&ys).map(|(x, y)| x - y).collect();
        let o = one_sample(&diffs, 0.0, Alternative::TwoSided).unwrap();
        assert!((p.statistic - o.statistic).abs() < 1e-12);
        assert!((p.p - o.p).abs() < 1e-12);
    }

    #[test]
    fn paired_rejects_unequal_lengths() {
        let err = paired(&[1.0, 2.0], &[1.0], Alternative::TwoSided).unwrap_err();
        assert!(matches!(err, Error::UnpairedInput(_)));
    }

    #[test]
    fn welch_matches_r() {
        // R: t.test(c(1,2,3,4,5), c(2,4,6,8,10)) ->
        //    t = -2, df = 5.8824, p = 0.0932
        let r = welch(
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &[2.0, 4.0, 6.0, 8.0, 10.0],
            Alternative::TwoSided,
        )
        .unwrap();
        assert!((r.estimate + 3.0).abs() < 1e-12);
        assert!((r.statistic + 2.0).abs() < 1e-12);
        assert!((r.df - 5.882_353).abs() < 1e-5);
        assert!((r.p - 0.0932).abs() < 2e-3);
    }

    #[test]
    fn insufficient_observations() {
        assert!(matches!(
            one_sample(&[1.0], 0.0, Alternative::TwoSided),
            Err(Error::InsufficientGroupSize(_))
        ));
        assert!(matches!(
            welch(&[1.0, 2.0], &[3.0], Alternative::TwoSided),
            Err(Error::InsufficientGroupSize(_))
        ));
    }

    #[test]
    fn zero_estimate_zero_variance() {
        let r = paired(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], Alternative::TwoSided).unwrap();
        assert!(r.estimate.abs() < 1e-15);
        assert!((r.p - 1.0).abs() < 1e-15);
        assert!(r.statistic.abs() < 1e-15);
    }
}
