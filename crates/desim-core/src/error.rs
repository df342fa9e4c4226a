//! Kernel error type.
//!
//! Precondition violations (negative delays, peeking an empty scheduler,
//! scheduling a time in the past) stay as `assert!`/`debug_assert!` panics —
//! they are programmer errors, not recoverable conditions. `KernelError` is
//! reserved for the handful of conditions a caller can legitimately react to.

use thiserror::Error;

/// Errors returned by fallible kernel operations.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum KernelError {
    /// Q64.64 division by zero.
    #[error("division by zero in Q64.64 arithmetic")]
    ArithmeticError,

    /// `remove` was called with an id that is not currently in the scheduler.
    #[error("event {uid} at {ns}ns is not present in the scheduler")]
    NotFound {
        /// The uid the caller asked to remove.
        uid: u32,
        /// The scheduled ns the caller asked to remove.
        ns: u64,
    },

    /// The time resolution or scheduler backend was changed after first use.
    #[error("configuration conflict: {0}")]
    ConfigurationConflict(String),
}
