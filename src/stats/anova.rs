// SPDX-License-Identifier: AGPL-3.0-or-later
//! Factorial analysis of variance over 1-3 categorical factors.
//!
//! Fits the full-factorial linear model (all main effects plus every
//! interaction) with treatment-coded dummy columns, and decomposes the
//! metric's variance into sequential (Type I) sums of squares — the
//! same decomposition R's `aov` reports, so legacy tables compare
//! term for term. Rank deficiency from missing factor-level cells is
//! handled by pivot skipping: a term whose columns are linearly
//! dependent on earlier ones simply loses those degrees of freedom.
//!
//! # Precondition
//!
//! The F tests assume approximately normal residuals. That check is a
//! human gate: inspect [`AnovaTable::residual_quantiles`] (or a full
//! residual plot upstream) before trusting the p-values. Nothing here
//! automates it.

use super::special::f_cdf;
use crate::error::{Error, Result};

/// One term (main effect, interaction, or residuals) of an ANOVA table.
#[derive(Debug, Clone)]
pub struct AnovaRow {
    /// Term name, e.g. `strain` or `strain:nutrients`.
    pub term: String,
    /// Degrees of freedom actually spent by the term.
    pub df: usize,
    /// Sequential sum of squares.
    pub sum_sq: f64,
    /// `sum_sq / df` (`NaN` when df = 0).
    pub mean_sq: f64,
    /// F statistic against the residual mean square; `None` for the
    /// residual row and zero-df terms.
    pub f: Option<f64>,
    /// Upper-tail p-value of the F statistic.
    pub p: Option<f64>,
}

/// Full ANOVA decomposition.
#[derive(Debug, Clone)]
pub struct AnovaTable {
    /// Effect rows in model order, residuals last.
    pub rows: Vec<AnovaRow>,
    /// Min, Q1, median, Q3, max of the residuals (normality gate).
    pub residual_quantiles: [f64; 5],
    /// Observations fitted.
    pub n: usize,
}

/// A categorical predictor: display name plus level extractor.
pub struct Factor<'a, R> {
    /// Name used for term labels.
    pub name: &'a str,
    /// Level of a record.
    pub level: &'a dyn Fn(&R) -> String,
}

/// Integer-coded factor with its ordered level labels.
struct CodedFactor {
    levels: Vec<String>,
    codes: Vec<usize>,
}

fn code_factor<R>(records: &[R], factor: &Factor<'_, R>) -> Result<CodedFactor> {
    let mut levels: Vec<String> = Vec::new();
    let mut codes = Vec::with_capacity(records.len());
    for rec in records {
        let level = (factor.level)(rec);
        let code = match levels.iter().position(|l| *l == level) {
            Some(code) => code,
            None => {
                levels.push(level);
                levels.len() - 1
            }
        };
        codes.push(code);
    }
    if levels.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "factor '{}' has {} observed level(s), need >= 2",
            factor.name,
            levels.len()
        )));
    }
    Ok(CodedFactor { levels, codes })
}

/// All non-empty subsets of `0..k`, mains first, then interactions by
/// ascending size (R's `A*B*C` term order).
fn factorial_terms(k: usize) -> Vec<Vec<usize>> {
    let mut terms: Vec<Vec<usize>> = Vec::new();
    for size in 1..=k {
        let mut subset: Vec<usize> = (0..size).collect();
        loop {
            terms.push(subset.clone());
            // Next combination in lexicographic order.
            let mut i = size;
            loop {
                if i == 0 {
                    break;
                }
                i -= 1;
                if subset[i] < k - (size - i) {
                    subset[i] += 1;
                    for j in i + 1..size {
                        subset[j] = subset[j - 1] + 1;
                    }
                    break;
                }
                if i == 0 {
                    subset.clear();
                    break;
                }
            }
            if subset.is_empty() {
                break;
            }
        }
    }
    terms
}

/// Treatment-coded dummy columns for one term.
///
/// One column per combination of non-reference levels of the term's
/// factors; entry = 1 when the record sits at exactly that combination.
fn term_columns(term: &[usize], coded: &[CodedFactor], n: usize) -> Vec<Vec<f64>> {
    // Combinations of level indices >= 1 for each factor in the term.
    let mut combos: Vec<Vec<usize>> = vec![Vec::new()];
    for &f in term {
        let mut next = Vec::new();
        for combo in &combos {
            for level in 1..coded[f].levels.len() {
                let mut c = combo.clone();
                c.push(level);
                next.push(c);
            }
        }
        combos = next;
    }

    combos
        .iter()
        .map(|combo| {
            (0..n)
                .map(|row| {
                    let hit = term
                        .iter()
                        .zip(combo)
                        .all(|(&f, &level)| coded[f].codes[row] == level);
                    if hit {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

/// A pivoted least-squares fit of the design columns to `y`.
struct LsFit {
    /// Coefficient per column (zero for dropped columns).
    coefficients: Vec<f64>,
    /// Columns that survived pivoting.
    active: Vec<bool>,
}

impl LsFit {
    fn rank(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    fn residuals(&self, cols: &[Vec<f64>], y: &[f64]) -> Vec<f64> {
        (0..y.len())
            .map(|row| {
                let mut fitted = 0.0;
                for (j, col) in cols.iter().enumerate() {
                    if self.active[j] {
                        fitted = self.coefficients[j].mul_add(col[row], fitted);
                    }
                }
                y[row] - fitted
            })
            .collect()
    }
}

/// Least squares via pivoted Cholesky on the normal equations.
///
/// Columns whose pivot collapses are dropped (coefficient zero), which
/// is exactly the missing-cell behavior the sequential decomposition
/// needs.
fn least_squares(cols: &[Vec<f64>], y: &[f64]) -> LsFit {
    let p = cols.len();

    let mut xtx = vec![vec![0.0_f64; p]; p];
    let mut xty = vec![0.0_f64; p];
    for i in 0..p {
        for j in i..p {
            let dot: f64 = cols[i].iter().zip(&cols[j]).map(|(a, b)| a * b).sum();
            xtx[i][j] = dot;
            xtx[j][i] = dot;
        }
        xty[i] = cols[i].iter().zip(y).map(|(a, b)| a * b).sum();
    }

    // Outer-product Cholesky with pivot skipping (XtX is PSD).
    let mut l = vec![vec![0.0_f64; p]; p];
    let mut active = vec![true; p];
    for j in 0..p {
        let mut d = xtx[j][j];
        for k in 0..j {
            if active[k] {
                d -= l[j][k] * l[j][k];
            }
        }
        let tol = 1e-9 * xtx[j][j].max(1.0);
        if d <= tol {
            active[j] = false;
            continue;
        }
        l[j][j] = d.sqrt();
        for i in j + 1..p {
            let mut s = xtx[i][j];
            for k in 0..j {
                if active[k] {
                    s -= l[i][k] * l[j][k];
                }
            }
            l[i][j] = s / l[j][j];
        }
    }

    // Forward solve L z = X'y, back solve L' b = z (active columns only).
    let mut z = vec![0.0_f64; p];
    for j in 0..p {
        if !active[j] {
            continue;
        }
        let mut s = xty[j];
        for k in 0..j {
            if active[k] {
                s -= l[j][k] * z[k];
            }
        }
        z[j] = s / l[j][j];
    }
    let mut coefficients = vec![0.0_f64; p];
    for j in (0..p).rev() {
        if !active[j] {
            continue;
        }
        let mut s = z[j];
        for i in j + 1..p {
            if active[i] {
                s -= l[i][j] * coefficients[i];
            }
        }
        coefficients[j] = s / l[j][j];
    }

    LsFit {
        coefficients,
        active,
    }
}

/// Residual sum of squares and rank of a fit.
fn fit_rss(cols: &[Vec<f64>], y: &[f64]) -> (f64, usize) {
    let fit = least_squares(cols, y);
    let rss = fit
        .residuals(cols, y)
        .iter()
        .map(|r| r * r)
        .sum();
    (rss, fit.rank())
}

/// R type-7 sample quantile.
#[allow(clippy::cast_precision_loss)]
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Fit a full-factorial ANOVA of `metric` against `factors`.
///
/// Factors are an ordered set; the sequential decomposition attributes
/// shared variance to earlier terms, exactly as R's `aov` does with the
/// same formula order.
///
/// # Errors
///
/// [`Error::InvalidInput`] for zero factors, more than three, a factor
/// with fewer than two observed levels, or a model with no residual
/// degrees of freedom.
#[allow(clippy::cast_precision_loss, clippy::too_many_lines)]
pub fn anova<R>(
    records: &[R],
    metric: impl Fn(&R) -> f64,
    factors: &[Factor<'_, R>],
) -> Result<AnovaTable> {
    if factors.is_empty() || factors.len() > 3 {
        return Err(Error::InvalidInput(format!(
            "anova supports 1-3 factors, got {}",
            factors.len()
        )));
    }
    let n = records.len();
    let y: Vec<f64> = records.iter().map(&metric).collect();
    let coded: Vec<CodedFactor> = factors
        .iter()
        .map(|f| code_factor(records, f))
        .collect::<Result<_>>()?;

    let terms = factorial_terms(factors.len());
    let term_names: Vec<String> = terms
        .iter()
        .map(|t| {
            t.iter()
                .map(|&f| factors[f].name)
                .collect::<Vec<_>>()
                .join(":")
        })
        .collect();

    // Sequential fits: intercept-only, then one term block at a time.
    let grand_mean = y.iter().sum::<f64>() / n as f64;
    let mut cols: Vec<Vec<f64>> = vec![vec![1.0; n]];
    let mut rss_prev: f64 = y.iter().map(|v| (v - grand_mean) * (v - grand_mean)).sum();
    let mut rank_prev = 1_usize;

    let mut effect_rows: Vec<(String, usize, f64)> = Vec::new();
    for (term, name) in terms.iter().zip(&term_names) {
        cols.extend(term_columns(term, &coded, n));
        let (rss, rank) = fit_rss(&cols, &y);
        let df = rank - rank_prev;
        let sum_sq = (rss_prev - rss).max(0.0);
        effect_rows.push((name.clone(), df, sum_sq));
        rss_prev = rss;
        rank_prev = rank;
    }

    let resid_df = n.saturating_sub(rank_prev);
    if resid_df == 0 {
        return Err(Error::InvalidInput(format!(
            "saturated model: {n} observations for rank {rank_prev}"
        )));
    }
    let resid_ms = rss_prev / resid_df as f64;

    let mut rows: Vec<AnovaRow> = effect_rows
        .into_iter()
        .map(|(term, df, sum_sq)| {
            if df == 0 {
                AnovaRow {
                    term,
                    df,
                    sum_sq,
                    mean_sq: f64::NAN,
                    f: None,
                    p: None,
                }
            } else {
                let mean_sq = sum_sq / df as f64;
                let f = mean_sq / resid_ms;
                let p = 1.0 - f_cdf(f, df as f64, resid_df as f64);
                AnovaRow {
                    term,
                    df,
                    sum_sq,
                    mean_sq,
                    f: Some(f),
                    p: Some(p),
                }
            }
        })
        .collect();
    rows.push(AnovaRow {
        term: "Residuals".into(),
        df: resid_df,
        sum_sq: rss_prev,
        mean_sq: resid_ms,
        f: None,
        p: None,
    });

    // Residuals of the full model, for the human normality inspection.
    let full_fit = least_squares(&cols, &y);
    let mut residuals = full_fit.residuals(&cols, &y);
    residuals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let residual_quantiles = [
        residuals[0],
        quantile(&residuals, 0.25),
        quantile(&residuals, 0.5),
        quantile(&residuals, 0.75),
        residuals[residuals.len() - 1],
    ];

    Ok(AnovaTable {
        rows,
        residual_quantiles,
        n,
    })
}
