// SPDX-License-Identifier: AGPL-3.0-or-later
//! Hypothesis-testing machinery: t-tests, grouped comparisons with FDR
//! correction, factorial ANOVA, and post-hoc comparisons.

pub mod anova;
pub mod correction;
pub mod descriptive;
pub mod grouped;
pub mod posthoc;
pub mod special;
pub mod ttest;
