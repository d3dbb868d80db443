//! Vote types for consensus calculation
//!
//! This module defines the core voting primitive used in consensus
//! decision making, plus agreement scoring over a vote set.

use serde::{Deserialize, Serialize};

/// A single evaluator's judgment on a question
///
/// # Example
///
/// ```
/// use verdict_domain::consensus::Vote;
///
/// let vote = Vote::new("claude-sonnet-4.5", "approve", 0.9, 0.25)
///     .with_reasoning("The plan is sound and follows best practices.");
/// assert_eq!(vote.decision, "approve");
/// assert_eq!(vote.confidence, 0.9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    /// Evaluator identifier (e.g., "claude-sonnet-4.5", "gpt-5.2-codex")
    pub evaluator_id: String,
    /// The decision this evaluator voted for
    pub decision: String,
    /// Self-reported certainty (0.0 to 1.0)
    pub confidence: f64,
    /// Relative importance of this evaluator (>= 0.0)
    pub weight: f64,
    /// Free-text reasoning, carried through for audit and never parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Secondary score (e.g., constitutional alignment) used by some
    /// tie-break policies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_score: Option<f64>,
    /// Evaluator response time in milliseconds, informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl Vote {
    /// Create a new vote
    ///
    /// Confidence is clamped to `[0.0, 1.0]` and weight to `>= 0.0`.
    pub fn new(
        evaluator_id: impl Into<String>,
        decision: impl Into<String>,
        confidence: f64,
        weight: f64,
    ) -> Self {
        Self {
            evaluator_id: evaluator_id.into(),
            decision: decision.into(),
            confidence: confidence.clamp(0.0, 1.0),
            weight: weight.max(0.0),
            reasoning: None,
            domain_score: None,
            latency_ms: None,
        }
    }

    /// Attach reasoning to the vote
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// Attach a domain score to the vote
    pub fn with_domain_score(mut self, score: f64) -> Self {
        self.domain_score = Some(score);
        self
    }

    /// Attach the evaluator's response latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// Fraction of votes whose decision matches `final_decision`
///
/// Computed against the final (post-tie-break) decision. An empty vote set
/// scores 0.0.
pub fn agreement_score(votes: &[Vote], final_decision: &str) -> f64 {
    if votes.is_empty() {
        return 0.0;
    }
    let matching = votes
        .iter()
        .filter(|v| v.decision == final_decision)
        .count();
    matching as f64 / votes.len() as f64
}
