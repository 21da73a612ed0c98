// SPDX-License-Identifier: AGPL-3.0-or-later
//! Validation: t-tests, corrections, ANOVA, post-hoc vs R baselines.
//!
//! # Provenance
//!
//! | Field | Value |
//! |-------|-------|
//! | Baseline | R 4.3 `t.test`, `p.adjust`, `aov`, `qt` |
//! | Exact commands | `t.test(1:5)`; `t.test(1:5, alternative="greater")`; `t.test(c(1,2,3,4,5), c(2,4,6,8,10))`; `p.adjust(c(.01,.02,.03,.04), "BH")`; `p.adjust(c(.01,.02,.03,.04), "holm")`; `summary(aov(y ~ A * B))`; `qt(0.975, 4)` |

use myxostat::stats::anova::{anova, Factor};
use myxostat::stats::correction::{benjamini_hochberg, holm_bonferroni};
use myxostat::stats::grouped::{grouped_test, TestKind};
use myxostat::stats::posthoc::post_hoc_vs_control;
use myxostat::stats::special::t_quantile;
use myxostat::stats::ttest::{one_sample, welch, Alternative};
use myxostat::tolerances;
use myxostat::validation::Validator;

fn main() {
    let mut v = Validator::new("Grouped Statistics: R 4.3 baselines");

    // ── One-sample t ──────────────────────────────────────────────
    v.section("── t.test(1:5) ──");
    let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
    let t = one_sample(&xs, 0.0, Alternative::TwoSided).unwrap();
    v.check("t statistic", t.statistic, 4.242_641, tolerances::R_PRINTOUT);
    v.check("df", t.df, 4.0, tolerances::EXACT);
    v.check("p", t.p, 0.013_24, tolerances::R_PRINTOUT);
    v.check("ci low", t.ci_low, 1.036_757, tolerances::R_PRINTOUT);
    v.check("ci high", t.ci_high, 4.963_243, tolerances::R_PRINTOUT);

    v.section("── t.test(1:5, alternative=\"greater\") ──");
    let g = one_sample(&xs, 0.0, Alternative::Greater).unwrap();
    v.check("p (one-sided)", g.p, 0.006_619, tolerances::R_PRINTOUT);
    v.check("ci low (one-sided)", g.ci_low, 1.492_297, tolerances::R_PRINTOUT);
    v.check_bool("ci high unbounded", g.ci_high.is_infinite());

    // ── Welch two-sample ──────────────────────────────────────────
    v.section("── t.test(c(1..5), c(2,4,6,8,10)) ──");
    let w = welch(&xs, &[2.0, 4.0, 6.0, 8.0, 10.0], Alternative::TwoSided).unwrap();
    v.check("t statistic", w.statistic, -2.0, tolerances::ANALYTICAL_F64);
    v.check("Welch df", w.df, 5.882_353, tolerances::R_PRINTOUT);
    v.check("p", w.p, 0.093_2, 2.0e-3);

    // ── Quantile ──────────────────────────────────────────────────
    v.section("── qt(0.975, 4) ──");
    v.check(
        "t quantile",
        t_quantile(0.975, 4.0),
        2.776_445,
        tolerances::R_PRINTOUT,
    );

    // ── Corrections ───────────────────────────────────────────────
    v.section("── p.adjust baselines ──");
    let bh = benjamini_hochberg(&[0.01, 0.02, 0.03, 0.04]);
    for (i, &adj) in bh.iter().enumerate() {
        v.check(&format!("BH[{i}] = 0.04"), adj, 0.04, tolerances::ANALYTICAL_F64);
    }
    let holm = holm_bonferroni(&[0.01, 0.02, 0.03, 0.04]);
    v.check("holm[0]", holm[0], 0.04, tolerances::ANALYTICAL_F64);
    v.check("holm[1]", holm[1], 0.06, tolerances::ANALYTICAL_F64);
    v.check("holm[2]", holm[2], 0.06, tolerances::ANALYTICAL_F64);
    v.check("holm[3]", holm[3], 0.06, tolerances::ANALYTICAL_F64);

    // ── Balanced 2x2 ANOVA ────────────────────────────────────────
    v.section("── aov(y ~ A * B), balanced 2x2, 2 per cell ──");
    let rows: Vec<(&str, &str, f64)> = vec![
        ("a1", "b1", 1.0),
        ("a1", "b1", 2.0),
        ("a1", "b2", 3.0),
        ("a1", "b2", 4.0),
        ("a2", "b1", 5.0),
        ("a2", "b1", 6.0),
        ("a2", "b2", 7.0),
        ("a2", "b2", 8.0),
    ];
    let table = anova(
        &rows,
        |r| r.2,
        &[
            Factor {
                name: "A",
                level: &|r: &(&str, &str, f64)| r.0.to_string(),
            },
            Factor {
                name: "B",
                level: &|r: &(&str, &str, f64)| r.1.to_string(),
            },
        ],
    )
    .unwrap();
    v.check("SS(A)", table.rows[0].sum_sq, 32.0, tolerances::R_ANOVA_F);
    v.check("SS(B)", table.rows[1].sum_sq, 8.0, tolerances::R_ANOVA_F);
    v.check("SS(A:B)", table.rows[2].sum_sq, 0.0, tolerances::R_ANOVA_F);
    v.check("SS(resid)", table.rows[3].sum_sq, 2.0, tolerances::R_ANOVA_F);
    v.check_count("resid df", table.rows[3].df, 4);
    v.check("F(A)", table.rows[0].f.unwrap(), 64.0, tolerances::R_ANOVA_F);
    v.check("F(B)", table.rows[1].f.unwrap(), 16.0, tolerances::R_ANOVA_F);
    v.check_bool("p(A) significant", table.rows[0].p.unwrap() < 0.01);

    // ── Grouped framework ─────────────────────────────────────────
    v.section("── grouped one-sample family ──");
    let records = [
        ("strong", 1.0),
        ("strong", 1.2),
        ("strong", 0.9),
        ("weak", 0.05),
        ("weak", -0.02),
        ("weak", 0.01),
        ("tiny", 3.0),
    ];
    let batch = grouped_test(
        &records,
        |r| r.0.to_string(),
        |r| r.1,
        &TestKind::OneSampleVsZero,
        Alternative::TwoSided,
    )
    .unwrap();
    v.check_count("tested groups", batch.results.len(), 2);
    v.check_count("skipped groups", batch.skipped.len(), 1);
    v.check_bool(
        "adjusted never below raw",
        batch.results.iter().all(|r| r.p_adjusted >= r.p_raw),
    );

    // ── Post-hoc vs control ───────────────────────────────────────
    v.section("── post-hoc vs control ──");
    let levels = [
        ("ctrl", 0.0),
        ("ctrl", 0.1),
        ("ctrl", 0.2),
        ("m1", 2.0),
        ("m1", 2.1),
        ("m1", 2.2),
        ("m2", 4.0),
        ("m2", 4.1),
        ("m2", 4.2),
    ];
    let ph = post_hoc_vs_control(&levels, |r| r.1, |r| r.0.to_string(), "ctrl").unwrap();
    v.check_count("comparisons (no self)", ph.comparisons.len(), 2);
    v.check_bool(
        "control never compared to itself",
        ph.comparisons.iter().all(|c| c.level_a != "ctrl"),
    );
    v.check_bool(
        "unknown control level rejected",
        post_hoc_vs_control(&levels, |r| r.1, |r| r.0.to_string(), "missing").is_err(),
    );

    v.finish()
}
