// SPDX-License-Identifier: AGPL-3.0-or-later
//! Multiple-comparison corrections.
//!
//! [`benjamini_hochberg`] controls the false discovery rate across one
//! coherent family of hypotheses (the grouped-test batches);
//! [`holm_bonferroni`] controls the family-wise error rate (the
//! post-hoc comparison families). Both return adjusted p-values in the
//! caller's original order — ranking is internal, with ties broken by
//! input position (stable sort), so enumeration order is reproducible.

use std::cmp::Ordering;

/// Benjamini-Hochberg FDR correction.
///
/// Adjusted values are monotone in the raw ranking and never below the
/// raw p-value; all are clamped to 1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    let n = pvalues.len();
    if n == 0 {
        return Vec::new();
    }

    let mut indexed: Vec<(usize, f64)> = pvalues.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let mut adjusted = vec![0.0; n];
    let mut cummin = f64::INFINITY;
    for i in (0..n).rev() {
        let rank = i + 1;
        let adj = indexed[i].1 * n as f64 / rank as f64;
        cummin = cummin.min(adj).min(1.0);
        adjusted[indexed[i].0] = cummin;
    }
    adjusted
}

/// Holm step-down Bonferroni correction (family-wise error rate).
///
/// Adjusted p is the running maximum of `(m − rank + 1) * p` over the
/// ascending raw ranking, clamped to 1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn holm_bonferroni(pvalues: &[f64]) -> Vec<f64> {
    let n = pvalues.len();
    if n == 0 {
        return Vec::new();
    }

    let mut indexed: Vec<(usize, f64)> = pvalues.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let mut adjusted = vec![0.0; n];
    let mut cummax: f64 = 0.0;
    for (i, &(orig, p)) in indexed.iter().enumerate() {
        let adj = ((n - i) as f64 * p).min(1.0);
        cummax = cummax.max(adj);
        adjusted[orig] = cummax;
    }
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bh_matches_r_p_adjust() {
        // R: p.adjust(c(0.01, 0.02, 0.03, 0.04), "BH") = 0.04 0.04 0.04 0.04
        let adj = benjamini_hochberg(&[0.01, 0.02, 0.03, 0.04]);
        for a in &adj {
            assert!((a - 0.04).abs() < 1e-12);
        }
        // R: p.adjust(c(0.005, 0.04, 0.03), "BH") = 0.015 0.040 0.040
        let adj = benjamini_hochberg(&[0.005, 0.04, 0.03]);
        assert!((adj[0] - 0.015).abs() < 1e-12);
        assert!((adj[1] - 0.04).abs() < 1e-12);
        assert!((adj[2] - 0.04).abs() < 1e-12);
    }

    #[test]
    fn bh_monotone_and_never_below_raw() {
        let raw = [0.001, 0.21, 0.04, 0.8, 0.04, 0.012];
        let adj = benjamini_hochberg(&raw);
        for (r, a) in raw.iter().zip(&adj) {
            assert!(a >= r, "adjusted {a} below raw {r}");
            assert!(*a <= 1.0);
        }
        // Rank monotonicity: sort both by raw; adjusted must be non-decreasing.
        let mut order: Vec<usize> = (0..raw.len()).collect();
        order.sort_by(|&i, &j| raw[i].partial_cmp(&raw[j]).unwrap());
        for w in order.windows(2) {
            assert!(adj[w[0]] <= adj[w[1]] + 1e-15);
        }
    }

    #[test]
    fn bh_ties_adjust_identically() {
        let adj = benjamini_hochberg(&[0.02, 0.02, 0.02]);
        assert!((adj[0] - adj[1]).abs() < 1e-15);
        assert!((adj[1] - adj[2]).abs() < 1e-15);
    }

    #[test]
    fn bh_empty_input() {
        assert!(benjamini_hochberg(&[]).is_empty());
    }

    #[test]
    fn holm_matches_r_p_adjust() {
        // R: p.adjust(c(0.01, 0.02, 0.03, 0.04), "holm") = 0.04 0.06 0.06 0.06
        let adj = holm_bonferroni(&[0.01, 0.02, 0.03, 0.04]);
        assert!((adj[0] - 0.04).abs() < 1e-12);
        assert!((adj[1] - 0.06).abs() < 1e-12);
        assert!((adj[2] - 0.06).abs() < 1e-12);
        assert!((adj[3] - 0.06).abs() < 1e-12);
    }

    #[test]
    fn holm_single_p_unchanged() {
        let adj = holm_bonferroni(&[0.037]);
        assert!((adj[0] - 0.037).abs() < 1e-15);
    }

    #[test]
    fn holm_clamps_to_one() {
        let adj = holm_bonferroni(&[0.6, 0.7, 0.9]);
        for a in &adj {
            assert!(*a <= 1.0);
        }
    }
}
