// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for myxostat I/O and statistics.
//!
//! All loader and analysis errors use [`Error`], with variants for each
//! failure mode. No external error crates — zero-dependency error type.
//!
//! Data-integrity variants ([`Error::MismatchedPairing`],
//! [`Error::MissingReference`], [`Error::UnknownPair`],
//! [`Error::UnknownLevel`], [`Error::UnpairedInput`]) are fatal for the
//! analysis block that raises them: they mean the input no longer matches
//! the pipeline's hard-coded experimental assumptions.
//! [`Error::InsufficientGroupSize`] is recoverable — the grouped framework
//! catches it and records a skip instead of aborting the batch.

use std::fmt;
use std::path::PathBuf;

/// Errors produced by myxostat loaders and analyses.
#[derive(Debug)]
pub enum Error {
    /// File I/O error with path context.
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Delimited-table parsing error (sovereign parser).
    Table(String),
    /// Mixture and total rows do not share (plate, replicate) identity.
    MismatchedPairing(String),
    /// No pure-culture reference observation for a mixture row.
    MissingReference(String),
    /// Strain pair absent from the initial-density configuration.
    UnknownPair(String),
    /// Control level absent from a factor's observed levels.
    UnknownLevel(String),
    /// Paired test where the two sides' pairing-key sets differ.
    UnpairedInput(String),
    /// Fewer than two observations on one side of a comparison.
    InsufficientGroupSize(String),
    /// Invalid input parameters (dimensions, ranges, constraints).
    InvalidInput(String),
}

/// Result type alias for myxostat operations.
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Table(msg) => write!(f, "table parse error: {msg}"),
            Self::MismatchedPairing(msg) => write!(f, "mismatched pairing: {msg}"),
            Self::MissingReference(msg) => write!(f, "missing pure-culture reference: {msg}"),
            Self::UnknownPair(msg) => write!(f, "unknown strain pair: {msg}"),
            Self::UnknownLevel(msg) => write!(f, "unknown factor level: {msg}"),
            Self::UnpairedInput(msg) => write!(f, "unpaired input: {msg}"),
            Self::InsufficientGroupSize(msg) => write!(f, "insufficient group size: {msg}"),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Table(_)
            | Self::MismatchedPairing(_)
            | Self::MissingReference(_)
            | Self::UnknownPair(_)
            | Self::UnknownLevel(_)
            | Self::UnpairedInput(_)
            | Self::InsufficientGroupSize(_)
            | Self::InvalidInput(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_io_error() {
        let err = Error::Io {
            path: PathBuf::from("data/labstrains.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("labstrains.csv"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn display_all_variants() {
        let cases: Vec<(Error, &str)> = vec![
            (Error::Table("row 3".into()), "table parse error"),
            (
                Error::MismatchedPairing("plate A vs B".into()),
                "mismatched pairing",
            ),
            (
                Error::MissingReference("GJV1 high rep 2".into()),
                "missing pure-culture reference",
            ),
            (Error::UnknownPair("D:Z".into()), "unknown strain pair"),
            (Error::UnknownLevel("ctrl".into()), "unknown factor level"),
            (
                Error::UnpairedInput("reps {1,2} vs {1,3}".into()),
                "unpaired input",
            ),
            (
                Error::InsufficientGroupSize("n=1".into()),
                "insufficient group size",
            ),
            (Error::InvalidInput("empty sample".into()), "invalid input"),
        ];
        for (err, expected_prefix) in cases {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "'{msg}' should start with '{expected_prefix}'"
            );
        }
    }

    #[test]
    fn error_source_chain() {
        let io_err = Error::Io {
            path: PathBuf::from("x"),
            source: std::io::Error::other("inner"),
        };
        assert!(std::error::Error::source(&io_err).is_some());
        assert!(std::error::Error::source(&Error::Table("bad".into())).is_none());
    }
}
