//! Error types shared by every engine component.

use thiserror::Error;

use crate::bracket::{BracketId, MatchId};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Bracket engine errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Input rejected before any structural mutation
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Operation not allowed in the match's current state
    #[error("Invalid state transition for {match_id}: {reason}")]
    InvalidStateTransition { match_id: String, reason: String },

    /// Optimistic concurrency check failed on write
    #[error("Concurrency conflict on {entity}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        entity: String,
        expected: u64,
        actual: u64,
    },

    /// Generated or mutated structure would break the bracket graph
    #[error("Structural invariant violation: {0}")]
    StructuralInvariantViolation(String),

    /// Bracket not found
    #[error("Bracket not found: {0}")]
    BracketNotFound(BracketId),

    /// Match not found
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// Failure at a collaborator boundary (storage, ranking)
    #[error("Collaborator error: {0}")]
    Collaborator(String),
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidStateTransition`] on a match
    pub fn invalid_transition(match_id: MatchId, reason: impl Into<String>) -> Self {
        Self::InvalidStateTransition {
            match_id: format!("{}/{}", match_id.bracket, match_id),
            reason: reason.into(),
        }
    }

    /// Whether the caller can reload state and retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::ConcurrencyConflict { .. } | EngineError::Collaborator(_)
        )
    }
}
