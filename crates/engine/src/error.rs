//! Error types for the engine.

use thiserror::Error;

/// Errors that can occur while computing rates, indices or fees.
///
/// Every error is local to the call that produced it: the engine holds no
/// state, so a failed call changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// An input violated the engine's contract
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: &'static str },

    /// A time interval ends before it starts
    #[error("Invalid timestamp order: {to} is before {from}")]
    InvalidTimestampOrder { from: u64, to: u64 },

    /// Interest rate model parameters are out of range
    #[error("Invalid rate parameter {field}: {reason}")]
    InvalidRateParameter {
        field: &'static str,
        reason: &'static str,
    },

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// A result does not fit in 256 bits
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: &'static str },
}

impl EngineError {
    /// Returns true for the errors caused by malformed inputs (bad ordering,
    /// bad parameters, amounts outside the allowed range).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidArgument { .. }
                | EngineError::InvalidTimestampOrder { .. }
                | EngineError::InvalidRateParameter { .. }
        )
    }

    pub(crate) fn overflow(operation: &'static str) -> Self {
        EngineError::ArithmeticOverflow { operation }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Checks that `from <= to`.
pub(crate) fn ensure_ordered(from: u64, to: u64) -> Result<()> {
    if to < from {
        return Err(EngineError::InvalidTimestampOrder { from, to });
    }
    Ok(())
}
