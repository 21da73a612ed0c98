// SPDX-License-Identifier: AGPL-3.0-or-later
//! Spore-count extrapolation and the three relative-fitness metrics.
//!
//! Derivations from raw CFU counts, in order:
//!
//! - zero-count floor: a plate count of 0 is reinterpreted as
//!   [`DETECTION_FLOOR`] before any ratio or log — a true zero cannot be
//!   distinguished from "below detection", and log(0) is undefined;
//! - `numspores = cfus * 10^dilution` (extrapolated population size);
//! - `logspores = log10(numspores + 1)` (variance-stabilizing);
//! - `Wij`, lab-strain cheating fitness in a 1:9 minority mixture
//!   (Velicer, Kroos & Lenski 2000, *Nature* 404:598-601);
//! - `Ci(j)`, natural-isolate mixing effect against the strain's own
//!   pure-culture baseline, and `Bi(j)`, pairwise mixture yield against
//!   the pair's expected initial density (Fiegna & Velicer 2005,
//!   *PLoS Biol* 3:e370).
//!
//! All functions here are pure; failed lookups and mismatched pairings
//! are data-integrity errors, never silently defaulted.

use super::observation::{Nutrients, Observation};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Minimum distinguishable-from-zero CFU count.
///
/// Substituted for raw zero counts before any derived metric uses them.
pub const DETECTION_FLOOR: f64 = 0.9;

/// Partner:cheater initial ratio of the lab-strain mixtures (1:9 design).
///
/// A parameter of [`compute_wij`] rather than an embedded literal so
/// tests can exercise other designs.
pub const CHEATER_MIXING_RATIO: f64 = 9.0;

/// Initial-frequency factor for the 1:1 natural-isolate mixtures.
pub const EQUAL_MIX_FACTOR: f64 = 2.0;

/// Undercount floor for within-mixture spore counts.
///
/// Mirrors the CFU detection floor: a derived in-mixture count below
/// one spore is clamped to one before the log.
pub const MIX_SPORE_FLOOR: f64 = 1.0;

/// Apply the detection floor to a raw CFU count.
#[must_use]
pub fn floor_cfus(cfus: f64) -> f64 {
    if cfus == 0.0 {
        DETECTION_FLOOR
    } else {
        cfus
    }
}

/// Extrapolated total spore count: `floored_cfus * 10^dilution`.
#[must_use]
pub fn num_spores(cfus: f64, dilution: i32) -> f64 {
    floor_cfus(cfus) * 10_f64.powi(dilution)
}

/// Variance-stabilizing log transform: `log10(numspores + 1)`.
///
/// The +1 keeps the transform defined when `numspores` itself is
/// fractional-near-zero (floored counts at negative dilutions).
#[must_use]
pub fn log_spores(numspores: f64) -> f64 {
    (numspores + 1.0).log10()
}

/// An observation with its derived spore metrics attached.
///
/// Immutable after derivation; analysis blocks operate on independently
/// filtered copies.
#[derive(Debug, Clone)]
pub struct SporeRecord {
    /// The cleaned source observation.
    pub obs: Observation,
    /// Extrapolated total spore count.
    pub numspores: f64,
    /// `log10(numspores + 1)`.
    pub logspores: f64,
}

/// Compute and attach the spore metrics for one observation.
///
/// Pure and total: defined for every non-negative count and integer
/// dilution, deterministic.
#[must_use]
pub fn derive_spores(obs: &Observation) -> SporeRecord {
    let numspores = num_spores(obs.cfus, obs.dilution);
    SporeRecord {
        obs: obs.clone(),
        numspores,
        logspores: log_spores(numspores),
    }
}

/// Derive spore metrics for a whole cleaned dataset.
#[must_use]
pub fn derive_all(observations: &[Observation]) -> Vec<SporeRecord> {
    observations.iter().map(derive_spores).collect()
}

/// Lab-strain cheating fitness Wij.
///
/// For a cheater strain in a 1:`mixing_ratio` (cheater:partner)
/// mixture:
///
/// ```text
/// Wij = log10(mixing_ratio * spores_cheater / spores_partner)
/// ```
///
/// `spores_partner` is obtained by subtraction from the unselective
/// total count — it is never measured directly. A subtracted partner
/// count below [`MIX_SPORE_FLOOR`] is clamped to the floor before the
/// ratio. `Wij > 0` means the cheater is over-represented among the
/// mixture's spores relative to its minority starting frequency.
///
/// # Errors
///
/// [`Error::MismatchedPairing`] if the selective and total rows do not
/// share (plate, replicate) identity; [`Error::InvalidInput`] if the
/// cheater count exceeds the total it was subtracted from.
pub fn compute_wij(cheater: &SporeRecord, total: &SporeRecord, mixing_ratio: f64) -> Result<f64> {
    if cheater.obs.plate != total.obs.plate || cheater.obs.replicate != total.obs.replicate {
        return Err(Error::MismatchedPairing(format!(
            "cheater ({}, rep {}) vs total ({}, rep {})",
            cheater.obs.plate, cheater.obs.replicate, total.obs.plate, total.obs.replicate
        )));
    }
    if cheater.numspores > total.numspores {
        return Err(Error::InvalidInput(format!(
            "cheater spores {} exceed mixture total {}",
            cheater.numspores, total.numspores
        )));
    }
    let partner = (total.numspores - cheater.numspores).max(MIX_SPORE_FLOOR);
    Ok((mixing_ratio * cheater.numspores / partner).log10())
}

/// Which strain of a mixture row a selective count belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrainRole {
    /// The count is of `strain`, matched on its own `nutrients`.
    Focal,
    /// The count is of `strain2`, matched on `nutrients2`.
    Partner,
}

/// Pure-culture spore counts keyed by (strain, nutrients, replicate).
///
/// The reference side of the Ci(j) derivation: each mixture count is
/// matched to the same strain's pure-culture output in the *same
/// replicate* under the *same prior-nutrient condition*.
#[derive(Debug, Clone, Default)]
pub struct PureCultureLookup {
    map: HashMap<(String, Nutrients, u32), f64>,
}

impl PureCultureLookup {
    /// Build from the pure-culture subset of a derived dataset.
    ///
    /// Only unselective pure-culture rows contribute; a duplicate key
    /// keeps the first row (the datasets carry one unselective count
    /// per pure culture).
    #[must_use]
    pub fn from_records(records: &[SporeRecord]) -> Self {
        let mut map = HashMap::new();
        for rec in records {
            if rec.obs.is_pure_culture() && rec.obs.is_unselective() {
                map.entry((rec.obs.strain.clone(), rec.obs.nutrients, rec.obs.replicate))
                    .or_insert(rec.numspores);
            }
        }
        Self { map }
    }

    /// Pure-culture spore count for (strain, nutrients, replicate).
    #[must_use]
    pub fn get(&self, strain: &str, nutrients: Nutrients, replicate: u32) -> Option<f64> {
        self.map
            .get(&(strain.to_string(), nutrients, replicate))
            .copied()
    }

    /// Number of reference cultures indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no reference cultures were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Natural-isolate mixing effect Ci(j).
///
/// For strain i counted in a 1:1 mixture with j:
///
/// ```text
/// Ci(j) = log10(2 * spores_i_in_mix / spores_i_pure)
/// ```
///
/// matched on the same replicate and the nutrient condition that strain
/// actually experienced (`role` selects own vs partner history). A
/// mixture count below [`MIX_SPORE_FLOOR`] is clamped before the log.
/// `Ci(j) > 0` means i is exploiting j.
///
/// # Errors
///
/// [`Error::MissingReference`] if no pure-culture observation matches —
/// fatal, well-formed input always has the reference.
/// [`Error::InvalidInput`] for a partner-role row without a partner
/// nutrient history.
pub fn compute_cij(mix: &SporeRecord, role: StrainRole, lookup: &PureCultureLookup) -> Result<f64> {
    let (strain, nutrients) = match role {
        StrainRole::Focal => (mix.obs.strain.as_str(), mix.obs.nutrients),
        StrainRole::Partner => {
            let n2 = mix.obs.nutrients2.ok_or_else(|| {
                Error::InvalidInput(format!(
                    "partner-role count without partner nutrients (strain2 {})",
                    mix.obs.strain2
                ))
            })?;
            (mix.obs.strain2.as_str(), n2)
        }
    };
    let pure = lookup
        .get(strain, nutrients, mix.obs.replicate)
        .ok_or_else(|| {
            Error::MissingReference(format!(
                "no pure culture for {strain} ({nutrients}, rep {})",
                mix.obs.replicate
            ))
        })?;
    let in_mix = mix.numspores.max(MIX_SPORE_FLOOR);
    Ok((EQUAL_MIX_FACTOR * in_mix / pure).log10())
}

/// Expected initial densities per strain pair, from published counts.
///
/// Bi(j) is not generalized: three literal constants keyed by pair
/// identity, each strain's known initial cell density halved (1:1 mix)
/// and summed. Preserved as configuration, never inferred from data.
#[derive(Debug, Clone)]
pub struct PairDensities {
    map: HashMap<String, f64>,
}

/// Published initial cell density of isolate D (cells per assay).
pub const DENSITY_D: f64 = 4.6e9;
/// Published initial cell density of isolate I (cells per assay).
pub const DENSITY_I: f64 = 5.2e9;
/// Published initial cell density of isolate G (cells per assay).
pub const DENSITY_G: f64 = 3.8e9;

impl PairDensities {
    /// The three published pairs: D:I, D:G, I:G.
    #[must_use]
    pub fn published() -> Self {
        let mut map = HashMap::new();
        map.insert("D:I".to_string(), DENSITY_D / 2.0 + DENSITY_I / 2.0);
        map.insert("D:G".to_string(), DENSITY_D / 2.0 + DENSITY_G / 2.0);
        map.insert("I:G".to_string(), DENSITY_I / 2.0 + DENSITY_G / 2.0);
        Self { map }
    }

    /// Expected initial density for a pair label.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPair`] if the pair is not configured — never
    /// silently defaulted.
    pub fn expected_density(&self, pair: &str) -> Result<f64> {
        self.map
            .get(pair)
            .copied()
            .ok_or_else(|| Error::UnknownPair(pair.to_string()))
    }
}

/// Pairwise mixture yield Bi(j).
///
/// ```text
/// Bij = logspores_total_mixture - log10(expected_initial_density)
/// ```
///
/// # Errors
///
/// [`Error::InvalidInput`] if the row carries no pair label;
/// [`Error::UnknownPair`] from the density lookup.
pub fn compute_bij(mix_total: &SporeRecord, pairs: &PairDensities) -> Result<f64> {
    let pair = mix_total
        .obs
        .pair
        .as_deref()
        .ok_or_else(|| Error::InvalidInput("mixture row without a pair label".into()))?;
    let expected = pairs.expected_density(pair)?;
    Ok(mix_total.logspores - expected.log10())
}

/// One derived fitness value with the metadata the statistics group on.
#[derive(Debug, Clone)]
pub struct FitnessRecord {
    /// Strain the value belongs to (cheater for Wij, counted strain
    /// for Cij, unused pair-total marker for Bij).
    pub strain: String,
    /// Partner strain in the mixture.
    pub partner: String,
    /// Nutrient history of the counted strain.
    pub nutrients: Nutrients,
    /// Partner's nutrient history.
    pub nutrients2: Option<Nutrients>,
    /// Pair label (natural-isolate dataset).
    pub pair: Option<String>,
    /// Replicate block.
    pub replicate: u32,
    /// The metric value (Wij, Cij, or Bij).
    pub value: f64,
}
