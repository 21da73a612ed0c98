// SPDX-License-Identifier: AGPL-3.0-or-later
//! Exclusion of observations compromised by documented technical failures.
//!
//! Every ratio and log derivation downstream assumes its inputs are
//! clean. Contaminated plates and marker cross-reactivity incidents are
//! therefore removed up front, by an explicit enumerated rule table —
//! one [`ExclusionRule`] per documented incident, keyed on exact
//! (replicate, strain, strain2, nutrients, pair, dilution) tuples.
//!
//! A rule that matches zero rows is *stale*: the dataset no longer looks
//! like the one the rule was written against. Staleness is surfaced as a
//! warning in the [`CleanReport`], not a hard failure, since the file
//! may simply have been pre-cleaned.

use super::observation::{Nutrients, Observation};

/// One documented contamination / technical-failure incident.
///
/// A `None` field matches any value; `Some` fields must all match for
/// the observation to be dropped.
#[derive(Debug, Clone, Copy)]
pub struct ExclusionRule {
    /// Human-readable description of the incident (lab-notebook entry).
    pub label: &'static str,
    /// Replicate block the incident occurred in.
    pub replicate: Option<u32>,
    /// Focal strain affected.
    pub strain: Option<&'static str>,
    /// Partner strain affected.
    pub strain2: Option<&'static str>,
    /// Focal nutrient history affected.
    pub nutrients: Option<Nutrients>,
    /// Strain pair affected (natural-isolate dataset).
    pub pair: Option<&'static str>,
    /// Specific dilution level affected.
    pub dilution: Option<i32>,
}

impl ExclusionRule {
    /// Whether this rule matches (and therefore drops) an observation.
    #[must_use]
    pub fn matches(&self, obs: &Observation) -> bool {
        self.replicate.is_none_or(|r| obs.replicate == r)
            && self.strain.is_none_or(|s| obs.strain == s)
            && self.strain2.is_none_or(|s| obs.strain2 == s)
            && self.nutrients.is_none_or(|n| obs.nutrients == n)
            && self
                .pair
                .is_none_or(|p| obs.pair.as_deref() == Some(p))
            && self.dilution.is_none_or(|d| obs.dilution == d)
    }
}

/// Documented incidents in the lab-strain cheating dataset.
///
/// Replicate 2's Ch1 high-nutrient plates grew a fungal contaminant;
/// all counts from that (replicate, strain, nutrients) cell are
/// unusable regardless of partner.
pub const LAB_STRAIN_EXCLUSIONS: &[ExclusionRule] = &[ExclusionRule {
    label: "replicate 2, Ch1 high-nutrient plates contaminated",
    replicate: Some(2),
    strain: Some("Ch1"),
    strain2: None,
    nutrients: Some(Nutrients::High),
    pair: None,
    dilution: None,
}];

/// Documented incidents in the natural-isolate dataset.
///
/// Replicate 1's D:I plates suffered marker-antibiotic cross-reactivity
/// (the selective counts are inflated); and replicate 3's I:G dilution-3
/// plates were miscounted — the dilution-4 recount is retained, so the
/// dilution-3 rows are dropped.
pub const NATURAL_ISOLATE_EXCLUSIONS: &[ExclusionRule] = &[
    ExclusionRule {
        label: "replicate 1, D:I marker cross-reactivity",
        replicate: Some(1),
        strain: None,
        strain2: None,
        nutrients: None,
        pair: Some("D:I"),
        dilution: None,
    },
    ExclusionRule {
        label: "replicate 3, I:G dilution-3 miscount (dilution-4 recount retained)",
        replicate: Some(3),
        strain: None,
        strain2: None,
        nutrients: None,
        pair: Some("I:G"),
        dilution: Some(3),
    },
];

/// Outcome of applying an exclusion-rule table to a dataset.
#[derive(Debug, Clone)]
pub struct CleanReport {
    /// Observations that survived every rule.
    pub kept: Vec<Observation>,
    /// Number of observations dropped.
    pub dropped: usize,
    /// (rule label, rows matched) per rule, in table order.
    pub rule_matches: Vec<(String, usize)>,
    /// Labels of rules that matched zero rows — the stale-exclusion-rule
    /// condition. Stale rules warn in the rendered report (dataset
    /// drifted or already pre-cleaned); they never fail the clean.
    pub stale_rules: Vec<String>,
}

/// Drop every observation matched by any rule.
///
/// Pure transform: applied to already-clean data it removes nothing
/// (every rule then reports stale).
#[must_use]
pub fn clean(observations: Vec<Observation>, rules: &[ExclusionRule]) -> CleanReport {
    let mut match_counts = vec![0_usize; rules.len()];
    let mut kept = Vec::with_capacity(observations.len());
    let mut dropped = 0;

    for obs in observations {
        let mut hit = false;
        for (i, rule) in rules.iter().enumerate() {
            if rule.matches(&obs) {
                match_counts[i] += 1;
                hit = true;
            }
        }
        if hit {
            dropped += 1;
        } else {
            kept.push(obs);
        }
    }

    let rule_matches: Vec<(String, usize)> = rules
        .iter()
        .zip(&match_counts)
        .map(|(r, &c)| (r.label.to_string(), c))
        .collect();
    let stale_rules = rule_matches
        .iter()
        .filter(|(_, c)| *c == 0)
        .map(|(label, _)| label.clone())
        .collect();

    CleanReport {
        kept,
        dropped,
        rule_matches,
        stale_rules,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assay::observation::PURE_CULTURE;

    fn obs(strain: &str, replicate: u32, nutrients: Nutrients) -> Observation {
        Observation {
            plate: "P1".into(),
            strain: strain.into(),
            strain2: PURE_CULTURE.into(),
            nutrients,
            nutrients2: None,
            antibiotics: "none".into(),
            replicate,
            dilution: 5,
            cfus: 10.0,
            pair: None,
            trt: None,
        }
    }

    #[test]
    fn drops_matching_rows_only() {
        let data = vec![
            obs("Ch1", 2, Nutrients::High),
            obs("Ch1", 2, Nutrients::Low),
            obs("Ch1", 1, Nutrients::High),
            obs("Ch2", 2, Nutrients::High),
        ];
        let report = clean(data, LAB_STRAIN_EXCLUSIONS);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.kept.len(), 3);
        assert!(report.stale_rules.is_empty());
        assert_eq!(report.rule_matches[0].1, 1);
    }

    #[test]
    fn stale_rule_is_reported_not_fatal() {
        let data = vec![obs("Ch2", 1, Nutrients::Low)];
        let report = clean(data, LAB_STRAIN_EXCLUSIONS);
        assert_eq!(report.kept.len(), 1);
        assert_eq!(report.stale_rules.len(), 1);
        assert!(report.stale_rules[0].contains("Ch1"));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let data = vec![
            obs("Ch1", 2, Nutrients::High),
            obs("Ch2", 1, Nutrients::Low),
        ];
        let first = clean(data, LAB_STRAIN_EXCLUSIONS);
        let second = clean(first.kept.clone(), LAB_STRAIN_EXCLUSIONS);
        assert_eq!(second.dropped, 0);
        assert_eq!(second.kept.len(), first.kept.len());
        // Second pass finds nothing left to drop: every rule is stale.
        assert_eq!(second.stale_rules.len(), LAB_STRAIN_EXCLUSIONS.len());
    }

    #[test]
    fn pair_and_dilution_matchers() {
        let mut mix = obs("I", 3, Nutrients::High);
        mix.strain2 = "G".into();
        mix.nutrients2 = Some(Nutrients::High);
        mix.pair = Some("I:G".into());
        mix.dilution = 3;
        let mut recount = mix.clone();
        recount.dilution = 4;

        let report = clean(vec![mix, recount], NATURAL_ISOLATE_EXCLUSIONS);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.kept[0].dilution, 4);
    }
}
