// SPDX-License-Identifier: AGPL-3.0-or-later
//! Experimental record model, data cleaning, and fitness derivations.

pub mod clean;
pub mod derive;
pub mod observation;
