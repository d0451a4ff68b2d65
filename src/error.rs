//! Error types for the causal-tree engine.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while mutating or querying a [`crate::replica::Replica`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The sitemap already holds the maximum number of sites (2^16 - 1).
    #[error("site table exhausted: cannot fork, sitemap is full")]
    SiteExhausted,

    /// The local Lamport clock would overflow its 32-bit range.
    #[error("lamport clock exhausted")]
    StateExhausted,

    /// `delete_char` was called with the cursor at "none".
    #[error("no atom under the cursor to delete")]
    NoAtomToDelete,

    /// `set_cursor` was given an index outside the visible linearization.
    #[error("cursor index out of range")]
    CursorOutOfRange,

    /// A weft did not have one entry per sitemap entry.
    #[error("weft length does not match sitemap length")]
    WeftInvalidLength,

    /// A weft cut would orphan an atom from its cause.
    #[error("weft cut is causally disconnected")]
    WeftDisconnected,

    /// The requested parent/child tag combination is not permitted.
    #[error("invalid parent/child tag combination")]
    InvalidChild,
}
