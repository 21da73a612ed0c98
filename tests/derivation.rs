// SPDX-License-Identifier: AGPL-3.0-or-later
//! Derivation properties: detection floor, spore transforms, fitness
//! metrics, and bitwise determinism across reruns.

use myxostat::assay::clean::{clean, LAB_STRAIN_EXCLUSIONS};
use myxostat::assay::derive::{
    compute_bij, compute_cij, compute_wij, derive_all, derive_spores, log_spores, num_spores,
    PairDensities, PureCultureLookup, SporeRecord, StrainRole, CHEATER_MIXING_RATIO,
    DETECTION_FLOOR, EQUAL_MIX_FACTOR,
};
use myxostat::assay::observation::{Nutrients, Observation, NO_ANTIBIOTIC, PURE_CULTURE};

fn pure_obs(strain: &str, replicate: u32, dilution: i32, cfus: f64) -> Observation {
    Observation {
        plate: format!("pure-{strain}-{replicate}"),
        strain: strain.to_string(),
        strain2: PURE_CULTURE.to_string(),
        nutrients: Nutrients::High,
        nutrients2: None,
        antibiotics: NO_ANTIBIOTIC.to_string(),
        replicate,
        dilution,
        cfus,
        pair: None,
        trt: None,
    }
}

fn mix_record(strain: &str, numspores: f64) -> SporeRecord {
    let mut obs = pure_obs(strain, 1, 0, 1.0);
    obs.strain2 = "GJV1".to_string();
    obs.nutrients2 = Some(Nutrients::High);
    SporeRecord {
        obs,
        numspores,
        logspores: log_spores(numspores),
    }
}

// ═══════════════════════════════════════════════════════════════════
// Detection floor
// ═══════════════════════════════════════════════════════════════════

#[test]
fn zero_counts_use_the_floor_in_every_downstream_derivation() {
    let rec = derive_spores(&pure_obs("GJV1", 1, 5, 0.0));
    assert!((rec.numspores - DETECTION_FLOOR * 1.0e5).abs() < 1e-9);
    assert!((rec.logspores - (DETECTION_FLOOR * 1.0e5 + 1.0).log10()).abs() < 1e-12);
}

#[test]
fn pure_culture_scenario_with_floored_replicate() {
    // Three replicates, cfus 10 / 12 / 0 at dilution 5.
    let records: Vec<SporeRecord> = [10.0, 12.0, 0.0]
        .iter()
        .enumerate()
        .map(|(i, &cfus)| derive_spores(&pure_obs("GJV1", u32::try_from(i).unwrap() + 1, 5, cfus)))
        .collect();
    assert!((records[0].numspores - 1.0e6).abs() < 1e-9);
    assert!((records[1].numspores - 1.2e6).abs() < 1e-9);
    assert!((records[2].numspores - 9.0e4).abs() < 1e-9);
    assert!((records[2].logspores - 4.954_248).abs() < 5e-4);
}

// ═══════════════════════════════════════════════════════════════════
// Determinism — rerun identical, expect bitwise-identical output
// ═══════════════════════════════════════════════════════════════════

#[test]
fn spore_derivation_deterministic_across_runs() {
    let observations: Vec<Observation> = (1..=50)
        .map(|i| pure_obs("GJV1", i, i32::try_from(i % 7).unwrap() - 2, f64::from(i * 3 % 17)))
        .collect();
    let run1 = derive_all(&observations);
    let run2 = derive_all(&observations);
    for (a, b) in run1.iter().zip(&run2) {
        assert_eq!(a.numspores.to_bits(), b.numspores.to_bits());
        assert_eq!(a.logspores.to_bits(), b.logspores.to_bits());
    }
}

#[test]
fn fitness_metrics_deterministic_across_runs() {
    let cheater = mix_record("csgA", 2.3e5);
    let total = mix_record("csgA", 1.7e6);
    let w1 = compute_wij(&cheater, &total, CHEATER_MIXING_RATIO).unwrap();
    let w2 = compute_wij(&cheater, &total, CHEATER_MIXING_RATIO).unwrap();
    assert_eq!(w1.to_bits(), w2.to_bits());

    let lookup = PureCultureLookup::from_records(&[derive_spores(&pure_obs("csgA", 1, 4, 37.0))]);
    let mix = mix_record("csgA", 8.1e4);
    let c1 = compute_cij(&mix, StrainRole::Focal, &lookup).unwrap();
    let c2 = compute_cij(&mix, StrainRole::Focal, &lookup).unwrap();
    assert_eq!(c1.to_bits(), c2.to_bits());
}

// ═══════════════════════════════════════════════════════════════════
// Metric edge cases
// ═══════════════════════════════════════════════════════════════════

#[test]
fn wij_antisymmetric_under_role_swap() {
    let total = mix_record("x", 1.0e6);
    let a = 3.0e5;
    let wij = compute_wij(&mix_record("x", a), &total, 9.0).unwrap();
    let wji = compute_wij(&mix_record("x", 1.0e6 - a), &total, 1.0 / 9.0).unwrap();
    assert!((wij + wji).abs() < 1e-12);
}

#[test]
fn cij_clamp_produces_larger_value_than_unclamped() {
    let lookup = PureCultureLookup::from_records(&[derive_spores(&pure_obs("D", 1, 3, 1.0))]);
    let mut mix = mix_record("D", 0.5);
    mix.obs.strain = "D".to_string();
    let clamped = compute_cij(&mix, StrainRole::Focal, &lookup).unwrap();
    assert!((clamped - 0.002_f64.log10()).abs() < 1e-12);
    assert!(clamped > (EQUAL_MIX_FACTOR * 0.5 / 1000.0).log10());
}

#[test]
fn bij_uses_published_pair_density() {
    let pairs = PairDensities::published();
    let mut mix = mix_record("I", 2.0e6);
    mix.obs.pair = Some("I:G".to_string());
    let bij = compute_bij(&mix, &pairs).unwrap();
    let expected = log_spores(2.0e6) - (5.2e9_f64 / 2.0 + 3.8e9 / 2.0).log10();
    assert!((bij - expected).abs() < 1e-12);
}

// ═══════════════════════════════════════════════════════════════════
// Cleaning
// ═══════════════════════════════════════════════════════════════════

#[test]
fn clean_is_idempotent_on_cleaned_data() {
    let mut observations = Vec::new();
    for rep in 1..=3 {
        for strain in ["Ch1", "csgA"] {
            for nutrients in [Nutrients::High, Nutrients::Low] {
                let mut o = pure_obs(strain, rep, 4, 50.0);
                o.nutrients = nutrients;
                observations.push(o);
            }
        }
    }
    let first = clean(observations, LAB_STRAIN_EXCLUSIONS);
    assert_eq!(first.dropped, 1);
    let second = clean(first.kept.clone(), LAB_STRAIN_EXCLUSIONS);
    assert_eq!(second.dropped, 0);
    assert_eq!(second.kept.len(), first.kept.len());
    assert_eq!(second.stale_rules.len(), LAB_STRAIN_EXCLUSIONS.len());
}

#[test]
fn numspores_matches_hand_values() {
    assert!((num_spores(2.0, 3) - 2000.0).abs() < f64::EPSILON);
    assert!((log_spores(2000.0) - 2001_f64.log10()).abs() < f64::EPSILON);
}
