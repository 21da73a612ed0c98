// SPDX-License-Identifier: AGPL-3.0-or-later
//! Orchestration of the two experiment analyses.
//!
//! Each experiment ([`lab_strains`], [`natural_isolates`]) runs the same
//! shape of sequence: clean with its enumerated exclusion rules, derive
//! spore metrics, then a fixed series of analysis blocks (grouped test
//! families, ANOVAs, post-hoc families, descriptive summaries). No state
//! is shared between the experiments or between blocks; every block
//! filters its own view of the cleaned dataset.
//!
//! A block that hits a data-integrity error records the error and the
//! report prints it in place of the table. The run never yields a
//! partially-computed silent result: the reader sees either a complete
//! table or the exact failure.

pub mod lab_strains;
pub mod natural_isolates;

use crate::assay::clean::CleanReport;
use crate::error::{Error, Result};
use crate::stats::anova::AnovaTable;
use crate::stats::descriptive::Summary;
use crate::stats::grouped::GroupedTestBatch;
use crate::stats::posthoc::PosthocBatch;
use std::fmt::Write as _;

/// What one analysis block produced.
#[derive(Debug)]
pub enum BlockOutcome {
    /// A grouped hypothesis-test family (BH-corrected).
    Grouped(GroupedTestBatch),
    /// A factorial ANOVA table.
    Anova(AnovaTable),
    /// A post-hoc comparison family (Holm-corrected).
    Posthoc(PosthocBatch),
    /// Descriptive per-group summaries for display.
    Summaries(Vec<(String, Summary)>),
    /// The error that aborted the block.
    Failed(Error),
}

/// One named analysis block of an experiment report.
#[derive(Debug)]
pub struct AnalysisBlock {
    /// Block title as printed in the report.
    pub name: String,
    /// Table or failure.
    pub outcome: BlockOutcome,
}

/// Full report of one experiment's pipeline run.
#[derive(Debug)]
pub struct AnalysisReport {
    /// Experiment title.
    pub experiment: String,
    /// Cleaning outcome, including stale-rule warnings.
    pub cleaning: CleanReport,
    /// Analysis blocks in execution order.
    pub blocks: Vec<AnalysisBlock>,
}

impl AnalysisReport {
    /// Record a block, converting a failed computation into
    /// [`BlockOutcome::Failed`] so later blocks still run.
    pub fn push(&mut self, name: &str, outcome: Result<BlockOutcome>) {
        self.blocks.push(AnalysisBlock {
            name: name.to_string(),
            outcome: outcome.unwrap_or_else(BlockOutcome::Failed),
        });
    }

    /// Number of blocks that aborted with an error.
    #[must_use]
    pub fn failed_blocks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b.outcome, BlockOutcome::Failed(_)))
            .count()
    }

    /// Render the whole report as plain text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {} ===", self.experiment);
        let _ = writeln!(
            out,
            "cleaning: {} kept, {} dropped",
            self.cleaning.kept.len(),
            self.cleaning.dropped
        );
        for (label, count) in &self.cleaning.rule_matches {
            let _ = writeln!(out, "  rule '{label}': {count} row(s)");
        }
        for label in &self.cleaning.stale_rules {
            let _ = writeln!(out, "  warning: stale exclusion rule '{label}'");
        }
        for block in &self.blocks {
            let _ = writeln!(out, "\n-- {} --", block.name);
            match &block.outcome {
                BlockOutcome::Grouped(batch) => render_grouped(&mut out, batch),
                BlockOutcome::Anova(table) => render_anova(&mut out, table),
                BlockOutcome::Posthoc(batch) => render_posthoc(&mut out, batch),
                BlockOutcome::Summaries(rows) => render_summaries(&mut out, rows),
                BlockOutcome::Failed(err) => {
                    let _ = writeln!(out, "FAILED: {err}");
                }
            }
        }
        out
    }
}

/// Fixed-width numeric cell (`NA` for NaN, `Inf`/`-Inf` for infinities).
fn cell(x: f64) -> String {
    if x.is_nan() {
        "NA".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "Inf" } else { "-Inf" }.to_string()
    } else {
        format!("{x:.4}")
    }
}

fn render_grouped(out: &mut String, batch: &GroupedTestBatch) {
    let _ = writeln!(
        out,
        "{:<20} {:>3} {:>9} {:>8} {:>8} {:>7} {:>9} {:>9} {:>8} {:>8}",
        "group", "n", "estimate", "se", "t", "df", "ci_low", "ci_high", "p", "p_adj"
    );
    for r in &batch.results {
        let _ = writeln!(
            out,
            "{:<20} {:>3} {:>9} {:>8} {:>8} {:>7} {:>9} {:>9} {:>8} {:>8}",
            r.group,
            r.n,
            cell(r.estimate),
            cell(r.se),
            cell(r.statistic),
            cell(r.df),
            cell(r.ci_low),
            cell(r.ci_high),
            cell(r.p_raw),
            cell(r.p_adjusted),
        );
    }
    for s in &batch.skipped {
        let _ = writeln!(out, "skipped '{}': {}", s.group, s.reason);
    }
}

fn render_anova(out: &mut String, table: &AnovaTable) {
    let _ = writeln!(
        out,
        "{:<24} {:>3} {:>10} {:>10} {:>9} {:>8}",
        "term", "df", "sum_sq", "mean_sq", "F", "p"
    );
    for row in &table.rows {
        let _ = writeln!(
            out,
            "{:<24} {:>3} {:>10} {:>10} {:>9} {:>8}",
            row.term,
            row.df,
            cell(row.sum_sq),
            cell(row.mean_sq),
            row.f.map_or_else(String::new, cell),
            row.p.map_or_else(String::new, cell),
        );
    }
    let q = table.residual_quantiles;
    let _ = writeln!(
        out,
        "residual quantiles: min {} q1 {} med {} q3 {} max {}",
        cell(q[0]),
        cell(q[1]),
        cell(q[2]),
        cell(q[3]),
        cell(q[4]),
    );
}

fn render_posthoc(out: &mut String, batch: &PosthocBatch) {
    let _ = writeln!(
        out,
        "{:<24} {:>9} {:>8} {:>7} {:>8} {:>8}",
        "comparison", "estimate", "t", "df", "p", "p_adj"
    );
    for c in &batch.comparisons {
        let _ = writeln!(
            out,
            "{:<24} {:>9} {:>8} {:>7} {:>8} {:>8}",
            format!("{} vs {}", c.level_a, c.level_b),
            cell(c.estimate),
            cell(c.statistic),
            cell(c.df),
            cell(c.p_raw),
            cell(c.p_adjusted),
        );
    }
    for s in &batch.skipped {
        let _ = writeln!(out, "skipped '{}': {}", s.group, s.reason);
    }
}

fn render_summaries(out: &mut String, rows: &[(String, Summary)]) {
    let _ = writeln!(
        out,
        "{:<20} {:>3} {:>9} {:>8} {:>8} {:>9} {:>9}",
        "group", "n", "mean", "sd", "se", "ci_low", "ci_high"
    );
    for (group, s) in rows {
        let _ = writeln!(
            out,
            "{:<20} {:>3} {:>9} {:>8} {:>8} {:>9} {:>9}",
            group,
            s.n,
            cell(s.mean),
            cell(s.sd),
            cell(s.se),
            cell(s.ci_low),
            cell(s.ci_high),
        );
    }
}

/// Per-group descriptive summaries in first-appearance group order.
pub(crate) fn summarize_by<R>(
    records: &[R],
    group_key: impl Fn(&R) -> String,
    metric: impl Fn(&R) -> f64,
) -> Vec<(String, Summary)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for rec in records {
        let key = group_key(rec);
        let value = metric(rec);
        match groups.iter_mut().find(|(g, _)| *g == key) {
            Some((_, values)) => values.push(value),
            None => groups.push((key, vec![value])),
        }
    }
    groups
        .into_iter()
        .filter_map(|(g, values)| {
            crate::stats::descriptive::summarize(&values).map(|s| (g, s))
        })
        .collect()
}
