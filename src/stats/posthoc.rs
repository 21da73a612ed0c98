// SPDX-License-Identifier: AGPL-3.0-or-later
//! Post-hoc comparisons among the levels of one factor.
//!
//! Two shapes, both family-wise-error controlled with Holm's step-down
//! correction over the family actually run:
//!
//! - [`post_hoc_all_pairs`] — every unordered pair of levels;
//! - [`post_hoc_vs_control`] — every non-control level against a
//!   designated control level only (a smaller family, so more power
//!   per comparison). Never compares the control against itself.
//!
//! Individual comparisons are Welch two-sample t-tests; an undersized
//! level skips its comparisons with an explicit record rather than
//! aborting the family.

use super::correction::holm_bonferroni;
use super::grouped::SkippedGroup;
use super::ttest::{self, Alternative};
use crate::error::{Error, Result};

/// One pairwise level comparison.
#[derive(Debug, Clone)]
pub struct PairwiseResult {
    /// First level (the non-control level in vs-control families).
    pub level_a: String,
    /// Second level (the control in vs-control families).
    pub level_b: String,
    /// Mean difference `a - b`.
    pub estimate: f64,
    /// Welch t statistic.
    pub statistic: f64,
    /// Welch-Satterthwaite degrees of freedom.
    pub df: f64,
    /// Raw p-value (two-sided).
    pub p_raw: f64,
    /// Holm-adjusted p-value across this family.
    pub p_adjusted: f64,
}

/// A family of post-hoc comparisons.
#[derive(Debug, Clone)]
pub struct PosthocBatch {
    /// Comparisons in enumeration order.
    pub comparisons: Vec<PairwiseResult>,
    /// Comparisons skipped for insufficient observations.
    pub skipped: Vec<SkippedGroup>,
}

/// Values per level, in first-appearance order.
fn partition_levels<R>(
    records: &[R],
    level: impl Fn(&R) -> String,
    metric: impl Fn(&R) -> f64,
) -> Vec<(String, Vec<f64>)> {
    let mut levels: Vec<(String, Vec<f64>)> = Vec::new();
    for rec in records {
        let key = level(rec);
        let value = metric(rec);
        match levels.iter_mut().find(|(l, _)| *l == key) {
            Some((_, values)) => values.push(value),
            None => levels.push((key, vec![value])),
        }
    }
    levels
}

fn run_family(pairs: Vec<(String, Vec<f64>, String, Vec<f64>)>) -> Result<PosthocBatch> {
    let mut comparisons = Vec::new();
    let mut skipped = Vec::new();
    for (level_a, xs, level_b, ys) in pairs {
        match ttest::welch(&xs, &ys, Alternative::TwoSided) {
            Ok(t) => comparisons.push(PairwiseResult {
                level_a,
                level_b,
                estimate: t.estimate,
                statistic: t.statistic,
                df: t.df,
                p_raw: t.p,
                p_adjusted: f64::NAN,
            }),
            Err(Error::InsufficientGroupSize(reason)) => skipped.push(SkippedGroup {
                group: format!("{level_a} vs {level_b}"),
                reason,
            }),
            Err(other) => return Err(other),
        }
    }
    let raw: Vec<f64> = comparisons.iter().map(|c| c.p_raw).collect();
    for (c, adj) in comparisons.iter_mut().zip(holm_bonferroni(&raw)) {
        c.p_adjusted = adj;
    }
    Ok(PosthocBatch {
        comparisons,
        skipped,
    })
}

/// All-pairs comparisons among the levels of one factor.
///
/// # Errors
///
/// [`Error::InvalidInput`] if fewer than two levels are observed; any
/// comparison failure other than an undersized group propagates.
pub fn post_hoc_all_pairs<R>(
    records: &[R],
    metric: impl Fn(&R) -> f64,
    level: impl Fn(&R) -> String,
) -> Result<PosthocBatch> {
    let levels = partition_levels(records, level, metric);
    if levels.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "all-pairs post-hoc needs >= 2 levels, got {}",
            levels.len()
        )));
    }
    let mut pairs = Vec::new();
    for i in 0..levels.len() {
        for j in i + 1..levels.len() {
            pairs.push((
                levels[i].0.clone(),
                levels[i].1.clone(),
                levels[j].0.clone(),
                levels[j].1.clone(),
            ));
        }
    }
    run_family(pairs)
}

/// Each non-control level against `control_level` only.
///
/// # Errors
///
/// [`Error::UnknownLevel`] if `control_level` is not among the observed
/// levels — never silently compared against nothing. Any comparison
/// failure other than an undersized group propagates.
pub fn post_hoc_vs_control<R>(
    records: &[R],
    metric: impl Fn(&R) -> f64,
    level: impl Fn(&R) -> String,
    control_level: &str,
) -> Result<PosthocBatch> {
    let levels = partition_levels(records, level, metric);
    let control = levels
        .iter()
        .find(|(l, _)| l == control_level)
        .ok_or_else(|| Error::UnknownLevel(control_level.to_string()))?
        .clone();

    let pairs = levels
        .iter()
        .filter(|(l, _)| l != control_level)
        .map(|(l, values)| {
            (
                l.clone(),
                values.clone(),
                control.0.clone(),
                control.1.clone(),
            )
        })
        .collect();
    run_family(pairs)
}
