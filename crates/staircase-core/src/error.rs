//! Error types for controller construction and snapshot restore.
//!
//! Recording trials never fails: incomplete trial data degrades to "does not
//! qualify for promotion" instead of surfacing an error.

use thiserror::Error;

/// Errors that can occur when building or restoring a difficulty controller.
#[derive(Debug, Error)]
pub enum StaircaseError {
    /// The game key does not name a known game type or alias.
    #[error("unknown game type: {0}")]
    UnknownGameType(String),

    /// The engine key is neither `tuned` nor `generic`.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// A persisted snapshot violates a controller invariant.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StaircaseError {
    /// Returns `true` if the error came from caller input rather than stored data.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            StaircaseError::UnknownGameType(_) | StaircaseError::UnknownEngine(_)
        )
    }
}
