// SPDX-License-Identifier: AGPL-3.0-or-later
//! Natural-isolate exploitation hierarchy.
//!
//! Three wild isolates (D, I, G) were mixed pairwise 1:1, sporulated,
//! and plated both unselectively (pair totals) and on each strain's
//! intrinsic resistance marker (per-strain counts within the mixture).
//! The analysis sequence:
//!
//! 1. pure-culture sporulation ANOVA (logspores ~ strain * nutrients);
//! 2. paired marker-effect check on the pure cultures (each isolate
//!    plated on its own marker vs without selection);
//! 3. Ci(j) derivation: each selective mixture count against the same
//!    strain's pure-culture output in the same replicate and nutrient
//!    condition;
//! 4. two-sided Ci(j) vs 0 family per (counted strain, partner), BH;
//! 5. Ci(j) ANOVA over counted strain, partner, and the counted
//!    strain's nutrient history (the diagonal strain:partner cells are
//!    absent by design — a strain is never mixed with itself);
//! 6. strain post-hoc: all pairs, and every strain against the G
//!    reference isolate;
//! 7. Bi(j) derivation from unselective pair totals against published
//!    initial densities, and its vs-0 family per pair.

use super::{summarize_by, AnalysisReport, BlockOutcome};
use crate::assay::clean::{clean, NATURAL_ISOLATE_EXCLUSIONS};
use crate::assay::derive::{
    compute_bij, compute_cij, derive_all, FitnessRecord, PairDensities, PureCultureLookup,
    SporeRecord, StrainRole,
};
use crate::assay::observation::Observation;
use crate::error::{Error, Result};
use crate::stats::anova::{anova, Factor};
use crate::stats::grouped::{grouped_test, TestKind};
use crate::stats::posthoc::{post_hoc_all_pairs, post_hoc_vs_control};
use crate::stats::ttest::Alternative;

/// Intrinsic antibiotic-resistance marker of each isolate.
///
/// The marker identifies which strain of a mixture a selective count
/// belongs to; an unrecognized marker is a data-integrity failure.
pub const STRAIN_MARKERS: &[(&str, &str)] = &[("D", "rif"), ("I", "km"), ("G", "sm")];

/// Reference isolate for the vs-control post-hoc family.
pub const CONTROL_ISOLATE: &str = "G";

fn marker_of(strain: &str) -> Option<&'static str> {
    STRAIN_MARKERS
        .iter()
        .find(|(s, _)| *s == strain)
        .map(|(_, m)| *m)
}

/// Derive one Ci(j) value per selective mixture count.
///
/// The selective marker decides whether the count is of the focal
/// strain or the partner, which in turn picks the pure-culture
/// reference (same strain, same nutrient history, same replicate).
///
/// # Errors
///
/// [`Error::UnknownLevel`] for a marker matching neither strain of the
/// mixture; [`Error::MissingReference`] and [`Error::InvalidInput`]
/// from [`compute_cij`].
fn cij_records(records: &[SporeRecord]) -> Result<Vec<FitnessRecord>> {
    let lookup = PureCultureLookup::from_records(records);
    let mut out = Vec::new();

    for rec in records
        .iter()
        .filter(|r| !r.obs.is_pure_culture() && !r.obs.is_unselective())
    {
        let marker = rec.obs.antibiotics.as_str();
        let role = if Some(marker) == marker_of(&rec.obs.strain) {
            StrainRole::Focal
        } else if Some(marker) == marker_of(&rec.obs.strain2) {
            StrainRole::Partner
        } else {
            return Err(Error::UnknownLevel(format!(
                "marker '{marker}' identifies neither {} nor {}",
                rec.obs.strain, rec.obs.strain2
            )));
        };
        let value = compute_cij(rec, role, &lookup)?;
        let (strain, partner, nutrients) = match role {
            StrainRole::Focal => (
                rec.obs.strain.clone(),
                rec.obs.strain2.clone(),
                rec.obs.nutrients,
            ),
            StrainRole::Partner => (
                rec.obs.strain2.clone(),
                rec.obs.strain.clone(),
                // compute_cij already rejected a partner-role row
                // without a partner history.
                rec.obs.nutrients2.ok_or_else(|| {
                    Error::InvalidInput("partner-role count without partner nutrients".into())
                })?,
            ),
        };
        out.push(FitnessRecord {
            strain,
            partner,
            nutrients,
            nutrients2: rec.obs.nutrients2,
            pair: rec.obs.pair.clone(),
            replicate: rec.obs.replicate,
            value,
        });
    }
    Ok(out)
}

/// Derive one Bi(j) value per unselective pair-total count.
fn bij_records(records: &[SporeRecord]) -> Result<Vec<FitnessRecord>> {
    let densities = PairDensities::published();
    let mut out = Vec::new();
    for rec in records
        .iter()
        .filter(|r| !r.obs.is_pure_culture() && r.obs.is_unselective())
    {
        let value = compute_bij(rec, &densities)?;
        out.push(FitnessRecord {
            strain: rec.obs.strain.clone(),
            partner: rec.obs.strain2.clone(),
            nutrients: rec.obs.nutrients,
            nutrients2: rec.obs.nutrients2,
            pair: rec.obs.pair.clone(),
            replicate: rec.obs.replicate,
            value,
        });
    }
    Ok(out)
}

fn cij_group(r: &FitnessRecord) -> String {
    format!("{}({})", r.strain, r.partner)
}

/// Run the full natural-isolate analysis on loaded observations.
#[must_use]
pub fn run(observations: Vec<Observation>) -> AnalysisReport {
    let cleaning = clean(observations, NATURAL_ISOLATE_EXCLUSIONS);
    let records = derive_all(&cleaning.kept);
    let mut report = AnalysisReport {
        experiment: "natural-isolate exploitation hierarchy".to_string(),
        cleaning,
        blocks: Vec::new(),
    };

    // Pure-culture sporulation across isolates and nutrient histories.
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

    // Marker effect: each isolate plated on its own marker vs without
    // selection, paired on replicate. Isolates lacking selective pure
    // counts stay out of this block.
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

    match cij_records(&records) {
        Ok(cij) => {
            report.push(
                "Ci(j) vs 0 per counted strain and partner (two-sided, BH)",
                grouped_test(
                    &cij,
                    cij_group,
                    |r| r.value,
                    &TestKind::OneSampleVsZero,
                    Alternative::TwoSided,
                )
                .map(BlockOutcome::Grouped),
            );

            report.push(
                "Ci(j) summaries per counted strain and partner",
                Ok(BlockOutcome::Summaries(summarize_by(
                    &cij,
                    cij_group,
                    |r| r.value,
                ))),
            );

            report.push(
                "Ci(j) ~ strain * partner * nutrients",
                anova(
                    &cij,
                    |r| r.value,
                    &[
                        Factor {
                            name: "strain",
                            level: &|r: &FitnessRecord| r.strain.clone(),
                        },
                        Factor {
                            name: "partner",
                            level: &|r: &FitnessRecord| r.partner.clone(),
                        },
                        Factor {
                            name: "nutrients",
                            level: &|r: &FitnessRecord| r.nutrients.to_string(),
                        },
                    ],
                )
                .map(BlockOutcome::Anova),
            );

            report.push(
                "Ci(j) post-hoc: strain all pairs",
                post_hoc_all_pairs(&cij, |r| r.value, |r| r.strain.clone())
                    .map(BlockOutcome::Posthoc),
            );
            report.push(
                &format!("Ci(j) post-hoc: strains vs {CONTROL_ISOLATE}"),
                post_hoc_vs_control(&cij, |r| r.value, |r| r.strain.clone(), CONTROL_ISOLATE)
                    .map(BlockOutcome::Posthoc),
            );
        }
        Err(err) => report.push("Ci(j) derivation", Err(err)),
    }

    match bij_records(&records) {
        Ok(bij) => {
            report.push(
                "Bi(j) vs 0 per pair (two-sided, BH)",
                grouped_test(
                    &bij,
                    |r| r.pair.clone().unwrap_or_else(|| "unlabeled".to_string()),
                    |r| r.value,
                    &TestKind::OneSampleVsZero,
                    Alternative::TwoSided,
                )
                .map(BlockOutcome::Grouped),
            );
        }
        Err(err) => report.push("Bi(j) derivation", Err(err)),
    }

    report
}
