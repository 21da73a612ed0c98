// SPDX-License-Identifier: AGPL-3.0-or-later
//! Validation framework for legacy-R-baseline comparison.
//!
//! Used by validation binaries (`validate_fitness_metrics`,
//! `validate_grouped_stats`, ...) to compare Rust results against
//! documented R baselines. Each check prints a formatted pass/fail line
//! with the actual value, the expected baseline, and the tolerance
//! applied.
//!
//! Every validation binary follows the same contract:
//! - Hardcoded expected values sourced from documented R runs
//! - Explicit pass/fail per check with human-readable output
//! - Exit code 0 = all passed, 1 = at least one failed, 2 = skipped
//!
//! Prefer the [`Validator`] struct over bare [`check`] calls — it
//! tracks pass/fail counts automatically and avoids manual bookkeeping.

// ── Standalone helpers (for one-off use) ──────────────────────

/// Compare `actual` against `expected` within absolute `tolerance`.
///
/// Prints a formatted `[OK]` or `[FAIL]` line and returns whether
/// the check passed. Tolerance of `0.0` requires exact match.
///
/// ```
/// use myxostat::validation::check;
///
/// assert!(check("log10(2001)", 2001_f64.log10(), 3.3012, 1e-4));
/// assert!(!check("deliberate fail", 2.0, 1.0, 0.5));
/// ```
#[must_use]
pub fn check(label: &str, actual: f64, expected: f64, tolerance: f64) -> bool {
    let pass = (actual - expected).abs() <= tolerance;
    let tag = if pass { "OK" } else { "FAIL" };
    println!("  [{tag}]  {label}: {actual:.6} (expected {expected:.6}, tol {tolerance:.6})");
    pass
}

/// Compare an exact count — no floating-point conversion needed.
///
/// ```
/// use myxostat::validation::check_count;
///
/// assert!(check_count("kept rows", 42, 42));
/// assert!(!check_count("mismatched", 10, 20));
/// ```
#[must_use]
pub fn check_count(label: &str, actual: usize, expected: usize) -> bool {
    let pass = actual == expected;
    let tag = if pass { "OK" } else { "FAIL" };
    println!("  [{tag}]  {label}: {actual} (expected {expected})");
    pass
}

/// Check a boolean condition (hypothesis direction, CI exclusion).
#[must_use]
pub fn check_bool(label: &str, actual: bool) -> bool {
    let tag = if actual { "OK" } else { "FAIL" };
    println!("  [{tag}]  {label}: {actual}");
    actual
}

/// Print summary and return whether all checks passed.
///
/// Separates logic from exit behavior for testability.
#[must_use]
pub fn print_result(name: &str, passed: u32, total: u32) -> bool {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("  {name}: {passed}/{total} checks passed");
    if passed == total {
        println!("  RESULT: PASS");
    } else {
        println!("  RESULT: FAIL ({} checks failed)", total - passed);
    }
    println!("═══════════════════════════════════════════════════════════");
    passed == total
}

/// Exit with code 2 indicating the run was skipped (data unavailable).
pub fn exit_skipped(reason: &str) -> ! {
    println!("  SKIP: {reason}");
    println!("  (exit 2 = skipped, not a failure)");
    std::process::exit(2)
}

/// Resolve a data directory using env-var override or repo-relative default.
///
/// Checks `env_var` first, then falls back to
/// `CARGO_MANIFEST_DIR/{default_subpath}`.
///
/// ```text
/// let dir = data_dir("MYXOSTAT_DATA_DIR", "data");
/// ```
#[must_use]
pub fn data_dir(env_var: &str, default_subpath: &str) -> std::path::PathBuf {
    std::env::var(env_var).map_or_else(
        |_| std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(default_subpath),
        std::path::PathBuf::from,
    )
}

// ── Validator: structured check accumulator ───────────────────

/// Accumulated validation state, removing manual pass/fail bookkeeping.
///
/// ```
/// use myxostat::validation::Validator;
///
/// let mut v = Validator::new("doc-test");
/// v.check("pi", std::f64::consts::PI, 3.14159, 1e-4);
/// v.check_count("groups", 4, 4);
/// assert_eq!(v.counts(), (2, 2));
/// ```
pub struct Validator {
    name: String,
    passed: u32,
    total: u32,
}

impl Validator {
    /// Create a new validator for the given binary name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        println!("═══════════════════════════════════════════════════════════");
        println!("  {name}");
        println!("═══════════════════════════════════════════════════════════\n");
        Self {
            name,
            passed: 0,
            total: 0,
        }
    }

    /// Print a section header (no check counted).
    pub fn section(&self, label: &str) {
        println!("\n{label}");
    }

    /// Check an f64 value against expected within tolerance.
    pub fn check(&mut self, label: &str, actual: f64, expected: f64, tolerance: f64) {
        self.total += 1;
        if check(label, actual, expected, tolerance) {
            self.passed += 1;
        }
    }

    /// Check an exact count.
    pub fn check_count(&mut self, label: &str, actual: usize, expected: usize) {
        self.total += 1;
        if check_count(label, actual, expected) {
            self.passed += 1;
        }
    }

    /// Check a boolean condition.
    pub fn check_bool(&mut self, label: &str, actual: bool) {
        self.total += 1;
        if check_bool(label, actual) {
            self.passed += 1;
        }
    }

    /// Retrieve current (passed, total) for external logic.
    #[must_use]
    pub const fn counts(&self) -> (u32, u32) {
        (self.passed, self.total)
    }

    /// Print summary and exit with 0 (pass) or 1 (fail).
    pub fn finish(self) -> ! {
        let ok = print_result(&self.name, self.passed, self.total);
        std::process::exit(i32::from(!ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_exact_match() {
        assert!(check("exact", 42.0, 42.0, 0.0));
    }

    #[test]
    fn check_within_tolerance() {
        assert!(check("close", 42.001, 42.0, 0.01));
    }

    #[test]
    fn check_outside_tolerance() {
        assert!(!check("far", 50.0, 42.0, 1.0));
    }

    #[test]
    fn check_count_mismatch() {
        assert!(check_count("exact", 7, 7));
        assert!(!check_count("diff", 7, 8));
    }

    #[test]
    fn check_bool_passthrough() {
        assert!(check_bool("yes", true));
        assert!(!check_bool("no", false));
    }

    #[test]
    fn print_result_pass_and_fail() {
        assert!(print_result("test", 3, 3));
        assert!(!print_result("test", 2, 3));
    }

    #[test]
    fn validator_accumulates() {
        let mut v = Validator::new("test");
        v.check("ok", 1.0, 1.0, 0.0);
        v.check("fail", 2.0, 1.0, 0.0);
        v.check_count("count_ok", 5, 5);
        v.check_bool("bool_fail", false);
        assert_eq!(v.counts(), (2, 4));
    }

    #[test]
    fn validator_section_does_not_count() {
        let v = Validator::new("test");
        v.section("── some section ──");
        assert_eq!(v.counts(), (0, 0));
    }

    #[test]
    fn data_dir_fallback_uses_manifest() {
        let dir = data_dir("MYXOSTAT_NONEXISTENT_98765", "data/test");
        assert!(dir.to_string_lossy().contains("data/test"));
    }

    #[test]
    fn data_dir_env_override() {
        // Unique key avoids cross-test races.
        let key = "MYXOSTAT_TEST_DATA_DIR_UNIT";
        std::env::set_var(key, "/tmp/override");
        let dir = data_dir(key, "data/default");
        assert_eq!(dir, std::path::PathBuf::from("/tmp/override"));
        std::env::remove_var(key);
    }
}
