//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These never cross the engine's public boundary: the application layer
/// converts every variant into an `error`-sentinel [`ConsensusResult`]
/// so callers handle one uniform result shape.
///
/// [`ConsensusResult`]: crate::consensus::ConsensusResult
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown consensus strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown tie-break policy: {0}")]
    UnknownTieBreakPolicy(String),

    #[error("Vote weights sum to zero, weighted aggregation is undefined")]
    ZeroWeightSum,

    #[error("Confidence contributions sum to zero, confidence weighting is undefined")]
    ZeroConfidenceMass,
}

impl DomainError {
    /// Check whether this error came from an unrecognized selector name.
    pub fn is_unknown_selector(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownStrategy(_) | DomainError::UnknownTieBreakPolicy(_)
        )
    }
}
