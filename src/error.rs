//! Error types for the position indexer.

use thiserror::Error;

/// Errors surfaced by a ledger node.
///
/// `CallFailed` covers reverted or undecodable contract calls; callers replace
/// it with an explicit default. `Unavailable` means the node could not be
/// reached and always propagates.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger node unavailable: {0}")]
    Unavailable(String),

    #[error("contract call failed: {0}")]
    CallFailed(String),
}

/// Errors that abort a sync cycle.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("ledger node unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Other(String),
}

impl IndexerError {
    /// Returns `true` for failures that are expected to clear up on their own.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<LedgerError> for IndexerError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Unavailable(msg) => IndexerError::Unavailable(msg),
            LedgerError::CallFailed(msg) => IndexerError::Other(msg),
        }
    }
}

pub type Result<T, E = IndexerError> = std::result::Result<T, E>;
