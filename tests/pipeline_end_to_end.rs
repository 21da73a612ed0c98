// SPDX-License-Identifier: AGPL-3.0-or-later
//! CSV fixture -> load -> clean -> derive -> full analysis report.

use flate2::write::GzEncoder;
use flate2::Compression;
use myxostat::assay::observation;
use myxostat::io::table::parse_table;
use myxostat::pipeline::{lab_strains, natural_isolates, BlockOutcome};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

const HEADER: &str = "plate,strain,strain2,nutrients,nutrients2,antibiotics,replicate,dilution,cfus";

fn lab_csv() -> String {
    let mut csv = String::new();
    let _ = writeln!(csv, "{HEADER}");
    let both = ["high", "low"];
    for strain in ["csgA", "Ch1", "GJV1"] {
        for nutrients in both {
            for rep in 1..=3 {
                let base = 100.0 + f64::from(rep) * 3.0;
                let _ = writeln!(
                    csv,
                    "pure-{strain}-{nutrients}-{rep},{strain},none,{nutrients},none,none,{rep},4,{base}"
                );
                if strain != "GJV1" {
                    let marked = base * 0.9;
                    let _ = writeln!(
                        csv,
                        "pure-{strain}-{nutrients}-{rep}-km,{strain},none,{nutrients},none,km,{rep},4,{marked}"
                    );
                }
            }
        }
    }
    for strain in ["csgA", "Ch1"] {
        for nutrients in both {
            for nutrients2 in both {
                for rep in 1..=3 {
                    let total = 200.0 + f64::from(rep) * 5.0;
                    let cheater =
                        if strain == "csgA" { 60.0 } else { 25.0 } + f64::from(rep);
                    let plate = format!("mix-{strain}-{nutrients}-{nutrients2}-{rep}");
                    let _ = writeln!(
                        csv,
                        "{plate},{strain},GJV1,{nutrients},{nutrients2},km,{rep},4,{cheater}"
                    );
                    let _ = writeln!(
                        csv,
                        "{plate},{strain},GJV1,{nutrients},{nutrients2},none,{rep},4,{total}"
                    );
                }
            }
        }
    }
    csv
}

fn isolates_csv() -> String {
    let markers = [("D", "rif"), ("I", "km"), ("G", "sm")];
    let marker = |s: &str| markers.iter().find(|(n, _)| *n == s).unwrap().1;
    let mut csv = String::new();
    let _ = writeln!(csv, "{HEADER},pair,trt");
    for rep in 1..=3 {
        for nutrients in ["high", "low"] {
            for strain in ["D", "I", "G"] {
                let cfus = 80.0 + f64::from(rep) * 4.0;
                let m = marker(strain);
                let marked = cfus * 0.95;
                let _ = writeln!(
                    csv,
                    "pure-{strain}-{nutrients}-{rep},{strain},none,{nutrients},none,none,{rep},4,{cfus},,pure"
                );
                let _ = writeln!(
                    csv,
                    "pure-{strain}-{nutrients}-{rep}-{m},{strain},none,{nutrients},none,{m},{rep},4,{marked},,pure"
                );
            }
            for (a, b) in [("D", "I"), ("D", "G"), ("I", "G")] {
                let total = 150.0 + f64::from(rep) * 6.0;
                let plate = format!("mix-{a}{b}-{nutrients}-{rep}");
                let (ca, cb, ct) = (total * 0.4, total * 0.5, total / 100.0);
                let ma = marker(a);
                let mb = marker(b);
                let _ = writeln!(
                    csv,
                    "{plate},{a},{b},{nutrients},{nutrients},{ma},{rep},4,{ca},{a}:{b},mix"
                );
                let _ = writeln!(
                    csv,
                    "{plate},{a},{b},{nutrients},{nutrients},{mb},{rep},4,{cb},{a}:{b},mix"
                );
                let _ = writeln!(
                    csv,
                    "{plate},{a},{b},{nutrients},{nutrients},none,{rep},6,{ct},{a}:{b},mix"
                );
            }
        }
    }
    csv
}

fn load_csv(contents: &str) -> Vec<observation::Observation> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("obs.csv");
    File::create(&path)
        .unwrap()
        .write_all(contents.as_bytes())
        .unwrap();
    observation::load(&parse_table(&path).unwrap()).unwrap()
}

#[test]
fn lab_strain_pipeline_end_to_end() {
    let report = lab_strains::run(load_csv(&lab_csv()));
    assert_eq!(report.failed_blocks(), 0, "{}", report.render());
    // The replicate-2 Ch1-high contamination rule must fire.
    assert!(report.cleaning.dropped > 0);
    assert!(report.cleaning.stale_rules.is_empty());

    let text = report.render();
    assert!(text.contains("=== lab-strain cheating assay ==="));
    assert!(text.contains("pure-culture sporulation"));
    assert!(text.contains("a-priori cheater"));
    assert!(text.contains("p_adj"));
    assert!(text.contains("Residuals"));
}

#[test]
fn natural_isolate_pipeline_end_to_end() {
    let report = natural_isolates::run(load_csv(&isolates_csv()));
    assert_eq!(report.failed_blocks(), 0, "{}", report.render());

    let text = report.render();
    assert!(text.contains("=== natural-isolate exploitation hierarchy ==="));
    assert!(text.contains("pure-culture sporulation"));
    assert!(text.contains("marker effect"));
    assert!(text.contains("Ci(j) vs 0"));
    assert!(text.contains("strain * partner * nutrients"));
    assert!(text.contains("Bi(j) vs 0"));
    assert!(text.contains("vs G"));
    // The I:G dilution rule matches nothing in this fixture.
    assert!(!report.cleaning.stale_rules.is_empty());
}

#[test]
fn cheater_family_detects_overrepresentation() {
    // csgA counts are ~29% of mixture spores from a 10% start.
    let report = lab_strains::run(load_csv(&lab_csv()));
    let block = report
        .blocks
        .iter()
        .find(|b| b.name.contains("a-priori"))
        .unwrap();
    let BlockOutcome::Grouped(batch) = &block.outcome else {
        panic!("expected grouped outcome");
    };
    for r in &batch.results {
        assert!(r.estimate > 0.0, "group {} estimate {}", r.group, r.estimate);
        assert!(r.p_adjusted < 0.05);
        assert!(r.ci_high.is_infinite());
    }
}

#[test]
fn gzipped_tables_load_identically() {
    let csv = lab_csv();
    let dir = TempDir::new().unwrap();

    let plain = dir.path().join("lab.csv");
    File::create(&plain)
        .unwrap()
        .write_all(csv.as_bytes())
        .unwrap();

    let gz = dir.path().join("lab.csv.gz");
    let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
    encoder.write_all(csv.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let a = observation::load(&parse_table(&plain).unwrap()).unwrap();
    let b = observation::load(&parse_table(&gz).unwrap()).unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.plate, y.plate);
        assert_eq!(x.cfus.to_bits(), y.cfus.to_bits());
    }
}

#[test]
fn pipeline_reruns_render_identical_reports() {
    let observations = load_csv(&isolates_csv());
    let r1 = natural_isolates::run(observations.clone());
    let r2 = natural_isolates::run(observations);
    assert_eq!(r1.render(), r2.render());
}
