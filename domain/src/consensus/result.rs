//! Consensus result type
//!
//! The immutable outcome of one consensus calculation, carrying the full
//! normalized vote list for audit.

use super::sentinel;
use super::strategy::ConsensusStrategy;
use super::tie_break::TieBreakPolicy;
use super::vote::Vote;
use serde::{Deserialize, Serialize};

/// Outcome of one consensus calculation
///
/// Produced fresh per call; the engine retains no reference to it after
/// returning. `final_decision` is either one of the decisions present in
/// the input votes or a reserved [`sentinel`] label.
///
/// # Example
///
/// ```
/// use verdict_domain::consensus::{ConsensusResult, ConsensusStrategy, Vote};
///
/// let result = ConsensusResult {
///     final_decision: "approve".to_string(),
///     confidence_score: 0.85,
///     strategy: ConsensusStrategy::WeightedAverage,
///     agreement_score: 1.0,
///     participating_evaluators: vec!["claude-sonnet-4.5".to_string()],
///     votes: vec![Vote::new("claude-sonnet-4.5", "approve", 0.85, 0.25)],
///     tie_broken: false,
///     tie_break_strategy: None,
///     processing_time_ms: 0,
///     metadata: None,
/// };
/// assert!(result.is_decisive());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Chosen decision label, or a reserved sentinel
    pub final_decision: String,
    /// Certainty in `final_decision` (0.0 to 1.0)
    pub confidence_score: f64,
    /// The strategy that produced the (possibly tie-broken) result
    pub strategy: ConsensusStrategy,
    /// Fraction of input votes matching `final_decision`
    pub agreement_score: f64,
    /// Evaluator identifiers considered, in normalized order
    pub participating_evaluators: Vec<String>,
    /// Full normalized vote list, retained for audit
    pub votes: Vec<Vote>,
    /// True if the tie breaker intervened
    pub tie_broken: bool,
    /// The policy that resolved the tie, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tie_break_strategy: Option<TieBreakPolicy>,
    /// Wall-clock cost of the calculation, informational
    pub processing_time_ms: u64,
    /// Free-form diagnostic payload (e.g., error text, escalation marker)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ConsensusResult {
    /// Build an `error`-sentinel result from an internal fault.
    ///
    /// Callers must treat it like any other sentinel: defer to a human or
    /// a fallback policy.
    pub fn from_error(
        message: impl Into<String>,
        strategy: ConsensusStrategy,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            final_decision: sentinel::ERROR.to_string(),
            confidence_score: 0.0,
            strategy,
            agreement_score: 0.0,
            participating_evaluators: Vec::new(),
            votes: Vec::new(),
            tie_broken: false,
            tie_break_strategy: None,
            processing_time_ms,
            metadata: Some(serde_json::json!({ "error": message.into() })),
        }
    }

    /// Check whether a real decision was reached (not a sentinel).
    pub fn is_decisive(&self) -> bool {
        !sentinel::is_sentinel(&self.final_decision)
    }

    /// Check whether the calculation itself failed.
    pub fn is_error(&self) -> bool {
        self.final_decision == sentinel::ERROR
    }

    /// Visual vote summary against the final decision (e.g., "[●●○]").
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for vote in &self.votes {
            summary.push(if vote.decision == self.final_decision {
                '●'
            } else {
                '○'
            });
        }
        summary.push(']');
        summary
    }
}
