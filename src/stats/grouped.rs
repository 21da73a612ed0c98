// SPDX-License-Identifier: AGPL-3.0-or-later
//! Grouped comparison framework.
//!
//! Partitions records by a categorical key, runs one significance test
//! per partition, then corrects the whole batch of raw p-values with
//! Benjamini-Hochberg. One call = one coherent hypothesis family;
//! never pool batches from unrelated families into one correction.
//!
//! Groups enumerate in first-appearance order, and the BH ranking
//! breaks ties by that order, so a rerun on the same file reproduces
//! the same table row for row.
//!
//! Undersized groups (fewer than two observations per side) are
//! skipped with an explicit [`SkippedGroup`] record. A paired test
//! whose sides disagree on pairing-key values aborts the whole batch —
//! that is a data-integrity failure, not a small group.

use super::correction::benjamini_hochberg;
use super::ttest::{self, Alternative, TTest};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// One row of a grouped-test table.
///
/// Created by [`grouped_test`]; `p_adjusted` is written once by the
/// batch correction step and the row is never mutated afterwards.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Group label (strain, pair, condition...).
    pub group: String,
    /// Observations used.
    pub n: usize,
    /// Point estimate.
    pub estimate: f64,
    /// Standard error of the estimate.
    pub se: f64,
    /// t statistic.
    pub statistic: f64,
    /// Degrees of freedom.
    pub df: f64,
    /// Lower confidence bound.
    pub ci_low: f64,
    /// Upper confidence bound.
    pub ci_high: f64,
    /// Raw p-value.
    pub p_raw: f64,
    /// Benjamini-Hochberg adjusted p-value (across this batch).
    pub p_adjusted: f64,
}

impl TestResult {
    fn from_ttest(group: String, t: &TTest) -> Self {
        Self {
            group,
            n: t.n,
            estimate: t.estimate,
            se: t.se,
            statistic: t.statistic,
            df: t.df,
            ci_low: t.ci_low,
            ci_high: t.ci_high,
            p_raw: t.p,
            p_adjusted: f64::NAN,
        }
    }
}

/// A group that produced no test, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedGroup {
    /// Group label.
    pub group: String,
    /// Why the group was skipped.
    pub reason: String,
}

/// Results of one hypothesis family.
#[derive(Debug, Clone)]
pub struct GroupedTestBatch {
    /// One row per tested group, in enumeration order.
    pub results: Vec<TestResult>,
    /// Groups skipped for insufficient observations.
    pub skipped: Vec<SkippedGroup>,
}

/// Which test runs inside each group.
pub enum TestKind<'a, R> {
    /// One-sample t of the metric against zero.
    OneSampleVsZero,
    /// Welch two-sample t; `split` returns true for the left side.
    TwoSampleUnpaired {
        /// Side selector: true = left subset, false = right subset.
        split: &'a dyn Fn(&R) -> bool,
    },
    /// Paired t; sides aligned on `pair_key` (here always the
    /// replicate block).
    TwoSamplePaired {
        /// Side selector: true = left subset, false = right subset.
        split: &'a dyn Fn(&R) -> bool,
        /// Pairing key; both sides must cover the same key set.
        pair_key: &'a dyn Fn(&R) -> u32,
    },
}

/// Align two sides of a paired comparison on their pairing key.
///
/// Returns the two value vectors in ascending key order.
fn align_pairs<R>(
    group: &str,
    records: &[&R],
    split: &dyn Fn(&R) -> bool,
    pair_key: &dyn Fn(&R) -> u32,
    metric: &dyn Fn(&R) -> f64,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut left: BTreeMap<u32, f64> = BTreeMap::new();
    let mut right: BTreeMap<u32, f64> = BTreeMap::new();
    for &rec in records {
        let side = if split(rec) { &mut left } else { &mut right };
        if side.insert(pair_key(rec), metric(rec)).is_some() {
            return Err(Error::UnpairedInput(format!(
                "group '{group}': duplicate pairing key {}",
                pair_key(rec)
            )));
        }
    }
    let left_keys: Vec<u32> = left.keys().copied().collect();
    let right_keys: Vec<u32> = right.keys().copied().collect();
    if left_keys != right_keys {
        return Err(Error::UnpairedInput(format!(
            "group '{group}': pairing keys {left_keys:?} vs {right_keys:?}"
        )));
    }
    Ok((
        left.into_values().collect(),
        right.into_values().collect(),
    ))
}

/// Run one test per group and BH-correct the batch.
///
/// # Errors
///
/// [`Error::UnpairedInput`] aborts the batch (pairing-key mismatch is a
/// data-integrity failure). Undersized groups do not error — they land
/// in [`GroupedTestBatch::skipped`].
pub fn grouped_test<R>(
    records: &[R],
    group_key: impl Fn(&R) -> String,
    metric: impl Fn(&R) -> f64,
    kind: &TestKind<'_, R>,
    alternative: Alternative,
) -> Result<GroupedTestBatch> {
    // Partition in first-appearance order.
    let mut order: Vec<String> = Vec::new();
    let mut groups: BTreeMap<String, Vec<&R>> = BTreeMap::new();
    for rec in records {
        let key = group_key(rec);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(rec);
    }

    let mut results = Vec::new();
    let mut skipped = Vec::new();

    for group in order {
        let members = &groups[&group];
        let outcome = match kind {
            TestKind::OneSampleVsZero => {
                let values: Vec<f64> = members.iter().map(|r| metric(r)).collect();
                ttest::one_sample(&values, 0.0, alternative)
            }
            TestKind::TwoSampleUnpaired { split } => {
                let (mut left, mut right) = (Vec::new(), Vec::new());
                for &rec in members.iter() {
                    if split(rec) {
                        left.push(metric(rec));
                    } else {
                        right.push(metric(rec));
                    }
                }
                ttest::welch(&left, &right, alternative)
            }
            TestKind::TwoSamplePaired { split, pair_key } => {
                let (left, right) =
                    align_pairs(&group, members, split, pair_key, &metric)?;
                ttest::paired(&left, &right, alternative)
            }
        };
        match outcome {
            Ok(t) => results.push(TestResult::from_ttest(group, &t)),
            Err(Error::InsufficientGroupSize(reason)) => {
                skipped.push(SkippedGroup { group, reason });
            }
            Err(other) => return Err(other),
        }
    }

    // One correction across the whole family, in enumeration order.
    let raw: Vec<f64> = results.iter().map(|r| r.p_raw).collect();
    for (result, adj) in results.iter_mut().zip(benjamini_hochberg(&raw)) {
        result.p_adjusted = adj;
    }

    Ok(GroupedTestBatch { results, skipped })
}
