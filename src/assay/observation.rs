// SPDX-License-Identifier: AGPL-3.0-or-later
//! Typed CFU-count observations from dilution-plated cultures.
//!
//! One [`Observation`] is one colony count from one dilution-plated
//! sample: strain identities, prior-nutrient histories, the selective
//! antibiotic (if any), the replicate block, the log10 dilution factor,
//! and the raw count. Pure cultures carry the sentinel partner
//! [`PURE_CULTURE`] and no partner nutrient history.
//!
//! Loading is strict: every required column must be present and typed,
//! counts must be non-negative, replicates positive. The natural-isolate
//! dataset carries two extra columns (`pair`, `trt`) which load as
//! `Option` fields and stay `None` for the lab-strain dataset.

use crate::error::{Error, Result};
use crate::io::table::Table;
use std::fmt;

/// Sentinel value of `strain2` for pure (unmixed) cultures.
pub const PURE_CULTURE: &str = "none";

/// Sentinel value of `antibiotics` for non-selective plating.
pub const NO_ANTIBIOTIC: &str = "none";

/// Prior nutrient-level history of a culture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrients {
    /// Grown at high nutrient level before the assay.
    High,
    /// Grown at low nutrient level before the assay.
    Low,
}

impl Nutrients {
    /// Parse from a table field (`high` / `low`).
    ///
    /// # Errors
    ///
    /// [`Error::Table`] for any other value.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            other => Err(Error::Table(format!(
                "nutrient level must be 'high' or 'low', got '{other}'"
            ))),
        }
    }

    /// Canonical lowercase label, matching the input files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Nutrients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw CFU-count observation with its experimental metadata.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Plate / treatment label.
    pub plate: String,
    /// Primary (focal) strain identity.
    pub strain: String,
    /// Partner strain identity, [`PURE_CULTURE`] for unmixed samples.
    pub strain2: String,
    /// Focal strain's prior nutrient level.
    pub nutrients: Nutrients,
    /// Partner strain's prior nutrient level; `None` for pure cultures.
    pub nutrients2: Option<Nutrients>,
    /// Selective marker used for counting, [`NO_ANTIBIOTIC`] if unselective.
    pub antibiotics: String,
    /// Replicate block identifier (positive).
    pub replicate: u32,
    /// log10 dilution factor of the plated sample.
    pub dilution: i32,
    /// Colony-forming units counted (non-negative; 0 = below detection).
    pub cfus: f64,
    /// Strain-pair label (natural-isolate dataset only, e.g. `D:I`).
    pub pair: Option<String>,
    /// Treatment label (natural-isolate dataset only).
    pub trt: Option<String>,
}

impl Observation {
    /// Whether this sample is an unmixed (pure) culture.
    #[must_use]
    pub fn is_pure_culture(&self) -> bool {
        self.strain2 == PURE_CULTURE
    }

    /// Whether this count was plated without selection.
    #[must_use]
    pub fn is_unselective(&self) -> bool {
        self.antibiotics == NO_ANTIBIOTIC
    }
}

/// Load typed observations from a parsed table.
///
/// Requires columns `plate`, `strain`, `strain2`, `nutrients`,
/// `nutrients2`, `antibiotics`, `replicate`, `dilution`, `cfus`.
/// Optional columns `pair` and `trt` load when present.
///
/// # Errors
///
/// [`Error::Table`] for missing columns or untypable fields;
/// [`Error::InvalidInput`] for negative counts or a zero replicate.
pub fn load(table: &Table) -> Result<Vec<Observation>> {
    let has_pair = table.has_column("pair");
    let has_trt = table.has_column("trt");
    let mut observations = Vec::with_capacity(table.n_rows());

    for row in 0..table.n_rows() {
        let strain2 = table.field(row, "strain2")?.to_string();
        let nutrients2_raw = table.field(row, "nutrients2")?;
        let nutrients2 = if nutrients2_raw == PURE_CULTURE || nutrients2_raw.is_empty() {
            None
        } else {
            Some(Nutrients::parse(nutrients2_raw)?)
        };
        if strain2 == PURE_CULTURE && nutrients2.is_some() {
            return Err(Error::Table(format!(
                "row {}: pure culture with a partner nutrient history",
                row + 2
            )));
        }

        let cfus = table.f64_field(row, "cfus")?;
        if cfus < 0.0 {
            return Err(Error::InvalidInput(format!(
                "row {}: negative CFU count {cfus}",
                row + 2
            )));
        }
        let replicate = table.u32_field(row, "replicate")?;
        if replicate == 0 {
            return Err(Error::InvalidInput(format!(
                "row {}: replicate must be positive",
                row + 2
            )));
        }

        observations.push(Observation {
            plate: table.field(row, "plate")?.to_string(),
            strain: table.field(row, "strain")?.to_string(),
            strain2,
            nutrients: Nutrients::parse(table.field(row, "nutrients")?)?,
            nutrients2,
            antibiotics: table.field(row, "antibiotics")?.to_string(),
            replicate,
            dilution: table.i32_field(row, "dilution")?,
            cfus,
            pair: if has_pair {
                Some(table.field(row, "pair")?.to_string())
            } else {
                None
            },
            trt: if has_trt {
                Some(table.field(row, "trt")?.to_string())
            } else {
                None
            },
        });
    }

    Ok(observations)
}
