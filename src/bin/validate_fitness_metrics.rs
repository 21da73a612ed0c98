// SPDX-License-Identifier: AGPL-3.0-or-later
//! Validation: spore derivation and fitness-metric scenarios.
//!
//! # Provenance
//!
//! | Field | Value |
//! |-------|-------|
//! | Baseline | legacy R analysis scripts (sporulation fitness study) |
//! | Values | hand-derived from the published formulas, cross-checked in R 4.3 |
//! | Exact command | `Rscript -e 'log10(0.9 * 10^5 + 1)'` and companions |

use myxostat::assay::derive::{
    compute_bij, compute_cij, compute_wij, derive_spores, floor_cfus, log_spores, num_spores,
    PairDensities, PureCultureLookup, SporeRecord, StrainRole, CHEATER_MIXING_RATIO,
    DENSITY_D, DENSITY_I, DETECTION_FLOOR, EQUAL_MIX_FACTOR,
};
use myxostat::assay::observation::{Nutrients, Observation, NO_ANTIBIOTIC, PURE_CULTURE};
use myxostat::tolerances;
use myxostat::validation::Validator;

fn observation(strain: &str, dilution: i32, cfus: f64) -> Observation {
    Observation {
        plate: "P1".to_string(),
        strain: strain.to_string(),
        strain2: PURE_CULTURE.to_string(),
        nutrients: Nutrients::High,
        nutrients2: None,
        antibiotics: NO_ANTIBIOTIC.to_string(),
        replicate: 1,
        dilution,
        cfus,
        pair: None,
        trt: None,
    }
}

fn mixture_record(numspores: f64) -> SporeRecord {
    let mut obs = observation("csgA", 0, 1.0);
    obs.strain2 = "GJV1".to_string();
    obs.nutrients2 = Some(Nutrients::High);
    SporeRecord {
        obs,
        numspores,
        logspores: log_spores(numspores),
    }
}

fn main() {
    let mut v = Validator::new("Fitness Metrics: derivation scenarios vs hand-checked R values");

    // ── Detection floor and spore derivation ──────────────────────
    v.section("── Detection floor ──");
    v.check("floor(0) = 0.9", floor_cfus(0.0), DETECTION_FLOOR, tolerances::EXACT);
    v.check("floor(3) untouched", floor_cfus(3.0), 3.0, tolerances::EXACT);
    v.check(
        "numspores(0, 5) = 9e4",
        num_spores(0.0, 5),
        9.0e4,
        tolerances::ANALYTICAL_F64,
    );
    v.check(
        "logspores of floored zero at dilution 5",
        log_spores(num_spores(0.0, 5)),
        4.954_248,
        tolerances::R_PRINTOUT,
    );

    v.section("── Deterministic spore derivation ──");
    v.check(
        "numspores(2, 3) = 2000",
        num_spores(2.0, 3),
        2000.0,
        tolerances::ANALYTICAL_F64,
    );
    v.check(
        "logspores(2000) = log10(2001)",
        log_spores(2000.0),
        3.301_247,
        tolerances::R_PRINTOUT,
    );
    // Three pure-culture replicates, cfus 10 / 12 / 0 at dilution 5.
    let reps: Vec<SporeRecord> = [10.0, 12.0, 0.0]
        .iter()
        .map(|&cfus| derive_spores(&observation("GJV1", 5, cfus)))
        .collect();
    v.check("rep 1 numspores", reps[0].numspores, 1.0e6, tolerances::ANALYTICAL_F64);
    v.check("rep 2 numspores", reps[1].numspores, 1.2e6, tolerances::ANALYTICAL_F64);
    v.check("rep 3 numspores (floored)", reps[2].numspores, 9.0e4, tolerances::ANALYTICAL_F64);
    v.check("rep 3 logspores", reps[2].logspores, 4.954_248, tolerances::R_PRINTOUT);

    // ── Wij ───────────────────────────────────────────────────────
    v.section("── Wij cheating fitness ──");
    let cheater = mixture_record(1.0e5);
    let total = mixture_record(1.0e6);
    let wij = compute_wij(&cheater, &total, CHEATER_MIXING_RATIO).unwrap();
    v.check("Wij = 0 at exact 1:9 parity", wij, 0.0, tolerances::ANALYTICAL_F64);

    let over = compute_wij(&mixture_record(5.0e5), &total, CHEATER_MIXING_RATIO).unwrap();
    v.check_bool("Wij > 0 when cheater over-represented", over > 0.0);

    // Antisymmetry: swap roles, invert the ratio.
    let a = 2.0e5;
    let b = 1.0e6 - a;
    let wij_ab = compute_wij(&mixture_record(a), &total, 9.0).unwrap();
    let wij_ba = compute_wij(&mixture_record(b), &total, 1.0 / 9.0).unwrap();
    v.check("Wij antisymmetry", wij_ab + wij_ba, 0.0, tolerances::ANALYTICAL_F64);

    let mut off_rep = mixture_record(1.0e6);
    off_rep.obs.replicate = 2;
    v.check_bool(
        "mismatched pairing rejected",
        compute_wij(&cheater, &off_rep, 9.0).is_err(),
    );

    // ── Cij ───────────────────────────────────────────────────────
    v.section("── Ci(j) mixing effect ──");
    let pure_obs = observation("D", 3, 1.0);
    let lookup = PureCultureLookup::from_records(&[derive_spores(&pure_obs)]);
    let mut mix = mixture_record(0.5);
    mix.obs.strain = "D".to_string();
    let clamped = compute_cij(&mix, StrainRole::Focal, &lookup).unwrap();
    v.check(
        "undercount clamped to 1 before log",
        clamped,
        0.002_f64.log10(),
        tolerances::ANALYTICAL_F64,
    );
    v.check_bool(
        "clamped value exceeds unclamped",
        clamped > (EQUAL_MIX_FACTOR * 0.5 / 1000.0).log10(),
    );
    v.check_bool(
        "missing pure-culture reference is fatal",
        compute_cij(&mix, StrainRole::Focal, &PureCultureLookup::default()).is_err(),
    );

    // ── Bij ───────────────────────────────────────────────────────
    v.section("── Bi(j) pair yield ──");
    let pairs = PairDensities::published();
    let mut pair_total = mixture_record(1.0e6);
    pair_total.obs.pair = Some("D:I".to_string());
    let bij = compute_bij(&pair_total, &pairs).unwrap();
    let expected = log_spores(1.0e6) - (DENSITY_D / 2.0 + DENSITY_I / 2.0).log10();
    v.check("Bij for D:I", bij, expected, tolerances::ANALYTICAL_F64);

    let mut unknown = mixture_record(1.0e6);
    unknown.obs.pair = Some("D:Z".to_string());
    v.check_bool(
        "unknown pair rejected",
        compute_bij(&unknown, &pairs).is_err(),
    );

    v.finish()
}
