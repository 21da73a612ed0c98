// SPDX-License-Identifier: AGPL-3.0-or-later
//! Centralized validation tolerances with statistical justification.
//!
//! Every tolerance threshold used in validation binaries and integration
//! tests is defined here with documentation of its origin. No ad-hoc
//! magic numbers.
//!
//! # Tolerance categories
//!
//! | Category | Basis | Example |
//! |----------|-------|---------|
//! | Exact | IEEE 754 f64 | 0.0 for row counts |
//! | Machine | f64 arithmetic | 1e-12 for closed-form derivations |
//! | Distribution | CDF approximation error | 1e-6 for t/F p-values |
//! | Baseline | Legacy R printout precision | 5e-4 for 4-digit R output |

// ═══════════════════════════════════════════════════════════════════
// Machine-precision tolerances (IEEE 754 f64)
// ═══════════════════════════════════════════════════════════════════

/// Operations that must be exact (row counts, group counts, df).
pub const EXACT: f64 = 0.0;

/// Closed-form derivations with minimal f64 rounding
/// (`numspores`, `logspores`, Wij/Cij/Bij arithmetic).
///
/// f64 carries ~15.9 significant digits; 1e-12 allows 3 digits of
/// accumulated rounding in short arithmetic chains.
pub const ANALYTICAL_F64: f64 = 1e-12;

// ═══════════════════════════════════════════════════════════════════
// Distribution-function tolerances
// ═══════════════════════════════════════════════════════════════════

/// Student-t and F p-values via the regularized incomplete beta.
///
/// The Lentz continued fraction converges to ~1e-14; 1e-6 leaves
/// headroom for the erf-based tail pieces (A&S 7.1.26 is good to
/// 1.5e-7 in absolute terms).
pub const DISTRIBUTION_CDF: f64 = 1e-6;

/// t quantiles obtained by bisection on the CDF.
///
/// Bisection narrows to ~1e-10 in t units; quoted against R's `qt`.
pub const T_QUANTILE: f64 = 1e-6;

// ═══════════════════════════════════════════════════════════════════
// Legacy R baseline tolerances
// ═══════════════════════════════════════════════════════════════════

/// Values transcribed from 4-significant-digit legacy R printouts
/// (`t.test`, `p.adjust` console output).
pub const R_PRINTOUT: f64 = 5e-4;

/// ANOVA F statistics against legacy R `aov` summaries.
///
/// Sequential sums of squares accumulate more rounding than a single
/// t statistic; 1e-3 still distinguishes any wrong term assignment.
pub const R_ANOVA_F: f64 = 1e-3;
