//! Unified error types for the CEP ecosystem
//!
//! This module provides a common error type [`CepError`] that can represent
//! errors from any part of the system. Domain-specific failures carry
//! structured variants so callers can identify the offending component
//! without parsing strings.
//!
//! # Example
//!
//! ```ignore
//! use cep_core::{CepError, CepResult};
//!
//! fn report_period(period: &mut Period) -> CepResult<()> {
//!     let costs = get_detailed_costs(period, &settings, 1.0)?;
//!     write_tables(costs)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all CEP operations.
///
/// Precondition violations and data-shape mismatches are fatal and carry
/// the identity of the offending component; validation mismatches never
/// surface here (they are warnings, not errors).
#[derive(Error, Debug)]
pub enum CepError {
    /// A cost was computed from a component before the discounting pass
    /// populated the required cost field
    #[error("cost basis not ready on `{component}`: `{field}` has not been set by a discounting pass")]
    CostBasisNotReady {
        component: String,
        field: &'static str,
    },

    /// The one-shot myopic horizon correction was applied twice
    #[error("myopic horizon correction already applied to `{component}`")]
    MyopicCorrectionApplied { component: String },

    /// Two subproblems reported a value for the same key and time index
    #[error("conflicting value for `{key}` at time index {time}: {existing} vs {incoming}")]
    MergeCollision {
        key: String,
        time: usize,
        existing: f64,
        incoming: f64,
    },

    /// A period-to-subproblem mapping referenced a subproblem that does not exist
    #[error("subproblem index {index} out of range ({len} subproblems)")]
    SubproblemIndexOutOfRange { index: usize, len: usize },

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using CepError.
pub type CepResult<T> = Result<T, CepError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for CepError {
    fn from(err: anyhow::Error) -> Self {
        CepError::Other(err.to_string())
    }
}

// Conversion from string-like types for convenience
impl From<String> for CepError {
    fn from(s: String) -> Self {
        CepError::Other(s)
    }
}

impl From<&str> for CepError {
    fn from(s: &str) -> Self {
        CepError::Other(s.to_string())
    }
}

// JSON parsing errors
impl From<serde_json::Error> for CepError {
    fn from(err: serde_json::Error) -> Self {
        CepError::Parse(err.to_string())
    }
}
