// SPDX-License-Identifier: AGPL-3.0-or-later
//! I/O parsers for tabular experiment data.

pub mod table;
