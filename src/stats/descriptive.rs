// SPDX-License-Identifier: AGPL-3.0-or-later
//! Descriptive summaries for report display: n, mean, sd, se, 95% CI.
//!
//! Display helper only — inference lives in [`crate::stats::ttest`] and
//! friends.

use super::special::t_quantile;

/// Confidence level used for every interval in the pipeline.
pub const CONF_LEVEL: f64 = 0.95;

/// Arithmetic mean. Returns `f64::NAN` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Unbiased sample variance (n − 1 denominator).
///
/// Returns `f64::NAN` for fewer than two observations.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample_variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    ss / (xs.len() - 1) as f64
}

/// Descriptive summary of one sample.
#[derive(Debug, Clone, Copy)]
pub struct Summary {
    /// Number of observations.
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (`NaN` when n < 2).
    pub sd: f64,
    /// Standard error of the mean (`NaN` when n < 2).
    pub se: f64,
    /// Lower 95% confidence bound (`NaN` when n < 2).
    pub ci_low: f64,
    /// Upper 95% confidence bound (`NaN` when n < 2).
    pub ci_high: f64,
}

/// Summarize one sample; `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(xs: &[f64]) -> Option<Summary> {
    if xs.is_empty() {
        return None;
    }
    let n = xs.len();
    let m = mean(xs);
    if n < 2 {
        return Some(Summary {
            n,
            mean: m,
            sd: f64::NAN,
            se: f64::NAN,
            ci_low: f64::NAN,
            ci_high: f64::NAN,
        });
    }
    let sd = sample_variance(xs).sqrt();
    let se = sd / (n as f64).sqrt();
    let tcrit = t_quantile(1.0 - (1.0 - CONF_LEVEL) / 2.0, (n - 1) as f64);
    Some(Summary {
        n,
        mean: m,
        sd,
        se,
        ci_low: tcrit.mul_add(-se, m),
        ci_high: tcrit.mul_add(se, m),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_variance() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((mean(&xs) - 3.0).abs() < 1e-12);
        assert!((sample_variance(&xs) - 2.5).abs() < 1e-12);
        assert!(mean(&[]).is_nan());
        assert!(sample_variance(&[1.0]).is_nan());
    }

    #[test]
    fn summary_matches_r() {
        // R: t.test(1:5) CI = [1.036757, 4.963243]
        let s = summarize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(s.n, 5);
        assert!((s.mean - 3.0).abs() < 1e-12);
        assert!((s.se - 0.5_f64.sqrt()).abs() < 1e-12);
        assert!((s.ci_low - 1.036_757).abs() < 1e-5);
        assert!((s.ci_high - 4.963_243).abs() < 1e-5);
    }

    #[test]
    fn degenerate_sizes() {
        assert!(summarize(&[]).is_none());
        let s = summarize(&[7.0]).unwrap();
        assert_eq!(s.n, 1);
        assert!((s.mean - 7.0).abs() < 1e-12);
        assert!(s.sd.is_nan() && s.ci_low.is_nan());
    }
}
