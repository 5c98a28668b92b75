// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types for time representation and conversion.
//!
//! Every fallible operation in the crate returns [`TimeResult<T>`], which is
//! `Result<T, TimeError>`. Errors are raised at the point of detection and
//! are never substituted with defaults; callers should treat them as fatal
//! to the operation, not to the process.
//!
//! # Error categories
//!
//! | Variant | Use case |
//! |---------|----------|
//! | [`NotFound`](TimeError::NotFound) | Unknown system/format/unit name; leap lookup before the table start |
//! | [`RangeViolation`](TimeError::RangeViolation) | Fraction out of bounds, field bounds, integer overflow |
//! | [`ParseFailure`](TimeError::ParseFailure) | Malformed numeric literal or ISO-8601 layout, non-integral leap row |
//! | [`ConvergenceFailure`](TimeError::ConvergenceFailure) | TDB→TT iteration exceeded its bound |
//! | [`ConfigurationConflict`](TimeError::ConfigurationConflict) | Competing ephemeris selection or mixed-system arithmetic |

use thiserror::Error;

/// Unified error type for time operations.
///
/// Use the constructor methods ([`not_found`](Self::not_found),
/// [`range_violation`](Self::range_violation), etc.) for consistent error
/// creation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeError {
    /// A name-keyed lookup found nothing.
    #[error("no {kind} named \"{name}\"")]
    NotFound {
        kind: &'static str,
        name: String,
    },

    /// A value violated a documented bound.
    #[error("range violation: {context}")]
    RangeViolation { context: String },

    /// A textual input did not match the required layout.
    #[error("cannot parse \"{input}\": {reason}")]
    ParseFailure { input: String, reason: String },

    /// The bounded TDB→TT fixed-point iteration did not converge.
    #[error(
        "TDB to TT conversion did not converge after {iterations} iterations \
         (residual {residual:e} s)"
    )]
    ConvergenceFailure { iterations: u32, residual: f64 },

    /// Two mutually exclusive configurations were requested.
    #[error("configuration conflict: \"{active}\" is active, \"{requested}\" requested")]
    ConfigurationConflict { active: String, requested: String },
}

/// Convenience alias for `Result<T, TimeError>`.
pub type TimeResult<T> = Result<T, TimeError>;

impl TimeError {
    /// Creates a [`NotFound`](Self::NotFound) error.
    ///
    /// `kind` names the namespace that was searched ("time system",
    /// "time format", "time unit", "leap second entry").
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Creates a [`RangeViolation`](Self::RangeViolation) error.
    pub fn range_violation(context: impl Into<String>) -> Self {
        Self::RangeViolation {
            context: context.into(),
        }
    }

    /// Creates a [`ParseFailure`](Self::ParseFailure) error.
    pub fn parse_failure(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseFailure {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`ConvergenceFailure`](Self::ConvergenceFailure) error.
    pub fn convergence_failure(iterations: u32, residual: f64) -> Self {
        Self::ConvergenceFailure {
            iterations,
            residual,
        }
    }

    /// Creates a [`ConfigurationConflict`](Self::ConfigurationConflict) error.
    pub fn configuration_conflict(
        active: impl Into<String>,
        requested: impl Into<String>,
    ) -> Self {
        Self::ConfigurationConflict {
            active: active.into(),
            requested: requested.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_namespace() {
        let err = TimeError::not_found("time system", "GPS");
        assert_eq!(err.to_string(), "no time system named \"GPS\"");
    }

    #[test]
    fn range_violation_carries_context() {
        let err = TimeError::range_violation("day-of-year 367 exceeds 366");
        assert!(err.to_string().contains("367"));
    }

    #[test]
    fn parse_failure_echoes_input() {
        let err = TimeError::parse_failure("1998-01-05", "missing time fields");
        assert!(err.to_string().contains("1998-01-05"));
        assert!(err.to_string().contains("missing time fields"));
    }

    #[test]
    fn convergence_failure_reports_iterations() {
        let err = TimeError::convergence_failure(100, 3.2e-7);
        assert!(err.to_string().contains("100 iterations"));
    }

    #[test]
    fn configuration_conflict_names_both_sides() {
        let err = TimeError::configuration_conflict("FB1990", "JPL DE405");
        let text = err.to_string();
        assert!(text.contains("FB1990"));
        assert!(text.contains("JPL DE405"));
    }

    #[test]
    fn errors_are_send_sync() {
        fn _assert_send<T: Send>() {}
        fn _assert_sync<T: Sync>() {}
        _assert_send::<TimeError>();
        _assert_sync::<TimeError>();
    }
}
