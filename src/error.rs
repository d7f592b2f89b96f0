//! Typed error taxonomy surfaced by the receiver and sender.

use thiserror_no_std::Error;

/// Errors surfaced by a transfer operation.
///
/// Transient per-frame problems (bad block number, bad checksum, a single
/// frame's deadline expiring) are handled locally by the state machines via
/// NAK-and-retry; they never reach this type.
#[derive(Debug, Error)]
pub enum ModemError {
    /// The sender received no handshake byte within its attempt budget.
    #[error("no handshake byte received from peer")]
    HandshakeTimeout,

    /// The sender's EOT went unacknowledged for the full attempt budget.
    #[error("EOT went unacknowledged by peer")]
    EotTimeout,

    /// The peer (or caller) cancelled the transfer.
    #[error("transfer cancelled")]
    Cancelled,

    /// The receiver's output buffer has no room for a further block.
    #[error("output buffer exhausted after {bytes_received} bytes")]
    BufferFull {
        /// Bytes already committed to the caller's buffer when the guard tripped.
        bytes_received: usize,
    },

    /// The sender exhausted its per-block retry budget.
    #[error("retry budget exhausted")]
    RetryBudgetExhausted,
}

/// Convenience alias for fallible core operations.
pub type ModemResult<T> = core::result::Result<T, ModemError>;
