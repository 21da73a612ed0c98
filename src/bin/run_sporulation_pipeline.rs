// SPDX-License-Identifier: AGPL-3.0-or-later
//! Run both sporulation-fitness analyses top to bottom.
//!
//! Reads the two observation tables (CSV, optionally gzipped) from
//! `MYXOSTAT_DATA_DIR` (default: `data/` under the crate root), runs
//! the lab-strain and natural-isolate pipelines, and prints each
//! report. Exit 0 when every analysis block produced a table, 1 when
//! any block aborted, 2 when the data files are absent.

use myxostat::assay::observation::{self, Observation};
use myxostat::io::table::parse_table;
use myxostat::pipeline::{lab_strains, natural_isolates, AnalysisReport};
use myxostat::validation::{data_dir, exit_skipped};
use std::path::{Path, PathBuf};

/// First existing candidate among `name.csv` and `name.csv.gz`.
fn find_table(dir: &Path, name: &str) -> Option<PathBuf> {
    [format!("{name}.csv"), format!("{name}.csv.gz")]
        .into_iter()
        .map(|f| dir.join(f))
        .find(|p| p.exists())
}

fn load(path: &Path) -> myxostat::Result<Vec<Observation>> {
    let table = parse_table(path)?;
    observation::load(&table)
}

fn main() {
    let dir = data_dir("MYXOSTAT_DATA_DIR", "data");
    let Some(lab_path) = find_table(&dir, "lab_strains") else {
        exit_skipped(&format!("no lab_strains.csv[.gz] under {}", dir.display()));
    };
    let Some(iso_path) = find_table(&dir, "natural_isolates") else {
        exit_skipped(&format!(
            "no natural_isolates.csv[.gz] under {}",
            dir.display()
        ));
    };

    let mut failed = 0_usize;
    for (path, run) in [
        (
            lab_path,
            lab_strains::run as fn(Vec<Observation>) -> AnalysisReport,
        ),
        (
            iso_path,
            natural_isolates::run as fn(Vec<Observation>) -> AnalysisReport,
        ),
    ] {
        match load(&path) {
            Ok(observations) => {
                let report = run(observations);
                print!("{}", report.render());
                println!();
                failed += report.failed_blocks();
            }
            Err(err) => {
                eprintln!("failed to load {}: {err}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} analysis block(s) aborted");
        std::process::exit(1);
    }
}
