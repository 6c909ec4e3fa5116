//! Error taxonomy for Phi analysis
//!
//! Validation failures surface at construction time (never deep inside a
//! search), and degenerate conditioning propagates immediately rather than
//! being coerced to zero, which would corrupt downstream minimum/maximum
//! selections. Budget exhaustion is not an error: searches return their
//! best-so-far result tagged with a status flag instead.

use crate::system::ElementSet;
use thiserror::Error;

/// Errors raised by Phi analysis queries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhiError {
    /// A TPM row does not sum to 1
    #[error("TPM row {row} sums to {sum} (expected 1 within tolerance)")]
    RowNotStochastic { row: usize, sum: f64 },

    /// A TPM entry is negative
    #[error("TPM entry ({row}, {col}) is negative: {value}")]
    NegativeProbability { row: usize, col: usize, value: f64 },

    /// Conditioning on a mechanism state that no past state can produce
    #[error(
        "degenerate conditioning: mechanism {mechanism} in state {state} \
         leaves zero probability mass over purview {purview}"
    )]
    DegenerateConditioning {
        mechanism: ElementSet,
        state: usize,
        purview: ElementSet,
    },

    /// A non-empty mechanism, purview, or candidate set was required
    #[error("{operation} requires a non-empty {what}")]
    EmptyInput {
        operation: &'static str,
        what: &'static str,
    },
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, PhiError>;
