// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lab-strain cheating assay.
//!
//! Developmentally defective lab strains were mixed 1:9 with their
//! proficient GJV1 partner, sporulated, and plated with and without the
//! mutant's selective marker. The analysis sequence:
//!
//! 1. pure-culture sporulation ANOVA (logspores ~ strain * nutrients);
//! 2. paired marker-effect check on marked pure cultures;
//! 3. Wij derivation from selective vs unselective mixture counts;
//! 4. one-sided Wij > 0 family for the a-priori cheater strains,
//!    two-sided family for the rest, BH within each family;
//! 5. Wij ANOVA over strain and both nutrient histories;
//! 6. all-pairs strain post-hoc within each nutrient stratum.
//!
//! Each block filters a fresh view of the cleaned dataset.

use super::{summarize_by, AnalysisReport, BlockOutcome};
use crate::assay::clean::{clean, LAB_STRAIN_EXCLUSIONS};
use crate::assay::derive::{
    compute_wij, derive_all, FitnessRecord, SporeRecord, CHEATER_MIXING_RATIO,
};
use crate::assay::observation::{Nutrients, Observation};
use crate::error::{Error, Result};
use crate::stats::anova::{anova, Factor};
use crate::stats::grouped::{grouped_test, TestKind};
use crate::stats::posthoc::post_hoc_all_pairs;
use crate::stats::ttest::Alternative;

/// Strains whose cheating was directional a priori (prior literature
/// established over-representation), so their Wij family is one-sided.
pub const A_PRIORI_CHEATERS: &[&str] = &["csgA", "asgB"];

/// Derive one Wij value per selective mixture count.
///
/// Each selective count is matched to the unselective total of the same
/// (plate, strain, strain2, replicate) mixture.
///
/// # Errors
///
/// [`Error::MissingReference`] if a selective count has no unselective
/// total; pairing and range errors from [`compute_wij`].
fn wij_records(records: &[SporeRecord]) -> Result<Vec<FitnessRecord>> {
    let mixtures: Vec<&SporeRecord> = records
        .iter()
        .filter(|r| !r.obs.is_pure_culture())
        .collect();

    let mut out = Vec::new();
    for sel in mixtures.iter().filter(|r| !r.obs.is_unselective()) {
        let total = mixtures
            .iter()
            .find(|t| {
                t.obs.is_unselective()
                    && t.obs.plate == sel.obs.plate
                    && t.obs.strain == sel.obs.strain
                    && t.obs.strain2 == sel.obs.strain2
                    && t.obs.replicate == sel.obs.replicate
            })
            .ok_or_else(|| {
                Error::MissingReference(format!(
                    "no unselective total for mixture plate {} rep {}",
                    sel.obs.plate, sel.obs.replicate
                ))
            })?;
        let value = compute_wij(sel, total, CHEATER_MIXING_RATIO)?;
        out.push(FitnessRecord {
            strain: sel.obs.strain.clone(),
            partner: sel.obs.strain2.clone(),
            nutrients: sel.obs.nutrients,
            nutrients2: sel.obs.nutrients2,
            pair: sel.obs.pair.clone(),
            replicate: sel.obs.replicate,
            value,
        });
    }
    Ok(out)
}

fn wij_group(r: &FitnessRecord) -> String {
    format!("{} ({})", r.strain, r.nutrients)
}

/// Run the full lab-strain analysis on loaded observations.
#[must_use]
pub fn run(observations: Vec<Observation>) -> AnalysisReport {
    let cleaning = clean(observations, LAB_STRAIN_EXCLUSIONS);
    let records = derive_all(&cleaning.kept);
    let mut report = AnalysisReport {
        experiment: "lab-strain cheating assay".to_string(),
        cleaning,
        blocks: Vec::new(),
    };

    // Pure-culture sporulation across strains and nutrient histories.
    let pure: Vec<SporeRecord> = records
        .iter()
        .filter(|r| r.obs.is_pure_culture() && r.obs.is_unselective())
        .cloned()
        .collect();
    report.push(
        "pure-culture sporulation: logspores ~ strain * nutrients",
        anova(
            &pure,
            |r| r.logspores,
            &[
                Factor {
                    name: "strain",
                    level: &|r: &SporeRecord| r.obs.strain.clone(),
                },
                Factor {
                    name: "nutrients",
                    level: &|r: &SporeRecord| r.obs.nutrients.to_string(),
                },
            ],
        )
        .map(BlockOutcome::Anova),
    );

    // Marker effect: marked strains plated with vs without selection,
    // paired on replicate. Unmarked strains have no selective counts
    // and stay out of this block.
    let marker_pure: Vec<SporeRecord> = records
        .iter()
        .filter(|r| {
            r.obs.is_pure_culture()
                && records.iter().any(|s| {
                    s.obs.is_pure_culture()
                        && !s.obs.is_unselective()
                        && s.obs.strain == r.obs.strain
                })
        })
        .cloned()
        .collect();
    let split = |r: &SporeRecord| r.obs.is_unselective();
    let pair_key = |r: &SporeRecord| r.obs.replicate;
    report.push(
        "marker effect on pure-culture logspores (paired by replicate)",
        grouped_test(
            &marker_pure,
            |r| format!("{} ({})", r.obs.strain, r.obs.nutrients),
            |r| r.logspores,
            &TestKind::TwoSamplePaired {
                split: &split,
                pair_key: &pair_key,
            },
            Alternative::TwoSided,
        )
        .map(BlockOutcome::Grouped),
    );

    match wij_records(&records) {
        Ok(wij) => {
            let (directional, two_sided): (Vec<FitnessRecord>, Vec<FitnessRecord>) = wij
                .iter()
                .cloned()
                .partition(|r| A_PRIORI_CHEATERS.contains(&r.strain.as_str()));

            if !directional.is_empty() {
                report.push(
                    "Wij > 0, a-priori cheater strains (one-sided, BH)",
                    grouped_test(
                        &directional,
                        wij_group,
                        |r| r.value,
                        &TestKind::OneSampleVsZero,
                        Alternative::Greater,
                    )
                    .map(BlockOutcome::Grouped),
                );
            }
            if !two_sided.is_empty() {
                report.push(
                    "Wij vs 0, remaining strains (two-sided, BH)",
                    grouped_test(
                        &two_sided,
                        wij_group,
                        |r| r.value,
                        &TestKind::OneSampleVsZero,
                        Alternative::TwoSided,
                    )
                    .map(BlockOutcome::Grouped),
                );
            }

            report.push(
                "Wij summaries per strain and nutrient history",
                Ok(BlockOutcome::Summaries(summarize_by(
                    &wij,
                    wij_group,
                    |r| r.value,
                ))),
            );

            report.push(
                "Wij ~ strain * nutrients * nutrients2",
                anova(
                    &wij,
                    |r| r.value,
                    &[
                        Factor {
                            name: "strain",
                            level: &|r: &FitnessRecord| r.strain.clone(),
                        },
                        Factor {
                            name: "nutrients",
                            level: &|r: &FitnessRecord| r.nutrients.to_string(),
                        },
                        Factor {
                            name: "nutrients2",
                            level: &|r: &FitnessRecord| {
                                r.nutrients2.map_or_else(|| "none".to_string(), |n| n.to_string())
                            },
                        },
                    ],
                )
                .map(BlockOutcome::Anova),
            );

            for nutrients in [Nutrients::High, Nutrients::Low] {
                let stratum: Vec<FitnessRecord> = wij
                    .iter()
                    .filter(|r| r.nutrients == nutrients)
                    .cloned()
                    .collect();
                if stratum.is_empty() {
                    continue;
                }
                report.push(
                    &format!("Wij post-hoc: strain all pairs, {nutrients} nutrients"),
                    post_hoc_all_pairs(&stratum, |r| r.value, |r| r.strain.clone())
                        .map(BlockOutcome::Posthoc),
                );
            }
        }
        Err(err) => report.push("Wij derivation", Err(err)),
    }

    report
}
