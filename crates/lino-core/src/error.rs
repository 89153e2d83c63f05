// crates/lino-core/src/error.rs
//
// Protocol-wide error type shared by every crate in the workspace.

use thiserror::Error;

/// Protocol-wide error types for the Lino ledger core.
#[derive(Debug, Error)]
pub enum LinoError {
    /// Storage layer error (in-memory store, cache store, RocksDB).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid state transition or violated ledger invariant.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record written at genesis is missing from the store.
    #[error("Uninitialized record: {0}")]
    Uninitialized(String),

    /// An event was registered for a time earlier than the current block.
    #[error("Expired event: registered for {time}, current block time is {block_time}")]
    ExpiredEvent { time: i64, block_time: i64 },

    /// The event kind cannot be handled by this dispatcher.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// A parameter value is outside its permitted range.
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// A coin amount would become negative.
    #[error("Negative coin: {0}")]
    NegativeCoin(String),

    /// Fixed-point or integer arithmetic overflowed its representation.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Division by a zero amount.
    #[error("Division by zero: {0}")]
    DivisionByZero(String),
}

impl From<serde_json::Error> for LinoError {
    fn from(e: serde_json::Error) -> Self {
        LinoError::Serialization(e.to_string())
    }
}

impl LinoError {
    /// Whether this error indicates a broken store rather than a rejected request.
    ///
    /// The block driver halts on these; validation failures go back to the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LinoError::Storage(_) | LinoError::Serialization(_) | LinoError::Uninitialized(_)
        )
    }
}
