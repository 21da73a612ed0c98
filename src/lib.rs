// SPDX-License-Identifier: AGPL-3.0-or-later
//! myxostat — sporulation-fitness statistics for social-bacterium assays.
//!
//! Rust implementation of the analysis pipeline behind two *Myxococcus
//! xanthus* sporulation experiments:
//! - lab-strain developmental cheating (1:9 mixtures, relative fitness Wij)
//! - natural-isolate exploitation hierarchy (1:1 mixtures, mixing effect
//!   Ci(j) and pairwise yield Bi(j))
//!
//! Raw colony-forming-unit counts from dilution plating are cleaned
//! against documented contamination incidents, extrapolated to spore
//! counts, and pushed through a battery of grouped t-tests (with
//! Benjamini-Hochberg correction per hypothesis family) and factorial
//! ANOVAs with post-hoc comparisons. Each analysis block is validated
//! against the documented legacy R results before replacing them.

pub mod assay;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod stats;
pub mod tolerances;
pub mod validation;

pub use error::{Error, Result};
