//! Error taxonomy for the rotation engine.
//!
//! Five categories, mirroring how failures surface to callers:
//! input problems (no retry), proven infeasibility, deadline expiry,
//! internal solver failures, and external cancellation.
//!
//! Soft-constraint violations are never errors. They are counted in
//! [`Diagnostics`](crate::solver::Diagnostics) and priced into the score.

use thiserror::Error;

/// An input problem detected before or during ingestion.
///
/// Carries enough context (row index, column, offending value) that the
/// caller can point at the exact cell of a team CSV.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The team is empty.
    #[error("team is empty")]
    EmptyTeam,

    /// Two people share the same name.
    #[error("duplicate person name: {0:?}")]
    DuplicateName(String),

    /// A person's name is blank.
    #[error("row {row}: person name is empty")]
    EmptyName { row: usize },

    /// A numeric or boolean cell could not be parsed.
    #[error("row {row}: bad value {value:?} for column {column:?}")]
    BadToken {
        row: usize,
        column: String,
        value: String,
    },

    /// A day token is not one of Lun..Dim / Mon..Sun.
    #[error("row {row}: unknown day token {value:?}")]
    UnknownDay { row: usize, value: String },

    /// `workdays_per_week` outside 0..=5.
    #[error("{name}: workdays_per_week {value} is out of range 0..=5")]
    WorkdaysOutOfRange { name: String, value: i64 },

    /// A required CSV column is missing.
    #[error("missing required column {0:?}")]
    MissingColumn(String),

    /// A configuration value outside its documented range.
    #[error("config: {field} = {value} is out of range {range}")]
    ConfigOutOfRange {
        field: &'static str,
        value: String,
        range: &'static str,
    },

    /// Underlying CSV machinery failed (I/O, quoting, ragged rows).
    #[error("csv: {0}")]
    Csv(String),
}

/// A failure of one solve attempt, or of the whole solve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// Malformed team or config. Surfaced immediately, never retried.
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    /// The hard constraints admit no assignment. The message carries the
    /// tightest reason the engine can name (first unfillable slot).
    #[error("infeasible: {0}")]
    Infeasible(String),

    /// Deadline elapsed without a feasible result.
    #[error("timed out after {limit_seconds}s without a feasible result")]
    Timeout { limit_seconds: u64 },

    /// Internal failure of one attempt. Logged with attempt index and seed.
    #[error("solver failure in attempt {attempt} (seed {seed}): {message}")]
    Solver {
        attempt: u32,
        seed: u64,
        message: String,
    },

    /// External cancellation observed via the shared cancel flag.
    #[error("cancelled")]
    Cancelled,
}

impl SolveError {
    /// Coarse classification used by the driver when every attempt failed.
    pub fn kind(&self) -> &'static str {
        match self {
            SolveError::Input(_) => "input",
            SolveError::Infeasible(_) => "infeasible",
            SolveError::Timeout { .. } => "timeout",
            SolveError::Solver { .. } => "solver",
            SolveError::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_messages_carry_context() {
        let e = InputError::BadToken {
            row: 3,
            column: "max_nights".into(),
            value: "abc".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("max_nights"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_solve_error_kind() {
        assert_eq!(
            SolveError::Input(InputError::EmptyTeam).kind(),
            "input"
        );
        assert_eq!(SolveError::Infeasible("x".into()).kind(), "infeasible");
        assert_eq!(SolveError::Timeout { limit_seconds: 30 }.kind(), "timeout");
        assert_eq!(SolveError::Cancelled.kind(), "cancelled");
    }
}
