//! Tie detection and deterministic tie-breaking
//!
//! A provisional strategy result is ambiguous when its confidence falls
//! below the configured threshold or its decision is a non-error sentinel.
//! Ambiguous results are re-resolved by a [`TieBreakPolicy`] operating on
//! the normalized vote list, never on the provisional result alone.

use super::sentinel;
use super::vote::Vote;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Check whether a provisional result needs tie-breaking.
///
/// The `error` sentinel is deliberately not breakable: a failed
/// calculation must surface as such, not be resolved into a decision.
pub fn is_ambiguous(decision: &str, confidence: f64, confidence_threshold: f64) -> bool {
    confidence < confidence_threshold || sentinel::is_breakable(decision)
}

/// A deterministic rule for resolving an ambiguous result
///
/// Every policy keeps the first vote in normalized order on exact score
/// ties (strictly-greater scans), so tie-breaking itself can never
/// introduce nondeterminism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakPolicy {
    /// Adopt the decision of the single most confident vote
    #[default]
    HighestConfidence,

    /// Adopt the decision of the heaviest-weighted vote
    HighestWeight,

    /// Adopt the decision of the vote with the highest domain score;
    /// leaves the result unchanged when no vote carries one
    ConstitutionalPriority,

    /// Adopt the last vote in normalization order. The engine trusts the
    /// caller-supplied insertion order as a proxy for recency and performs
    /// no timestamp comparison, so this is only meaningful when votes were
    /// collected chronologically.
    MostRecent,

    /// Never resolves automatically; marks the result for external human
    /// escalation instead
    HumanReview,
}

/// Outcome of applying a tie-break policy.
#[derive(Debug, Clone, PartialEq)]
pub enum TieBreakOutcome {
    /// The policy produced a replacement decision and confidence.
    Resolved { decision: String, confidence: f64 },
    /// The policy could not apply (no votes, or no domain scores for
    /// ConstitutionalPriority); the provisional result stands.
    Unresolved,
    /// HumanReview: the ambiguity is intentionally left for escalation.
    NeedsHumanReview,
}

impl TieBreakPolicy {
    /// All supported policies, in documentation order.
    pub const ALL: [TieBreakPolicy; 5] = [
        TieBreakPolicy::HighestConfidence,
        TieBreakPolicy::HighestWeight,
        TieBreakPolicy::ConstitutionalPriority,
        TieBreakPolicy::MostRecent,
        TieBreakPolicy::HumanReview,
    ];

    /// Canonical snake_case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreakPolicy::HighestConfidence => "highest_confidence",
            TieBreakPolicy::HighestWeight => "highest_weight",
            TieBreakPolicy::ConstitutionalPriority => "constitutional_priority",
            TieBreakPolicy::MostRecent => "most_recent",
            TieBreakPolicy::HumanReview => "human_review",
        }
    }

    /// Resolve an ambiguous result against the normalized vote list.
    pub fn resolve(&self, votes: &[Vote]) -> TieBreakOutcome {
        match self {
            TieBreakPolicy::HighestConfidence => adopt(first_max(votes.iter(), |v| v.confidence)),
            TieBreakPolicy::HighestWeight => adopt(first_max(votes.iter(), |v| v.weight)),
            TieBreakPolicy::ConstitutionalPriority => adopt(first_max(
                votes.iter().filter(|v| v.domain_score.is_some()),
                |v| v.domain_score.unwrap_or_default(),
            )),
            TieBreakPolicy::MostRecent => adopt(votes.last()),
            TieBreakPolicy::HumanReview => TieBreakOutcome::NeedsHumanReview,
        }
    }
}

impl std::fmt::Display for TieBreakPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TieBreakPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "highest_confidence" => Ok(TieBreakPolicy::HighestConfidence),
            "highest_weight" => Ok(TieBreakPolicy::HighestWeight),
            "constitutional_priority" => Ok(TieBreakPolicy::ConstitutionalPriority),
            "most_recent" => Ok(TieBreakPolicy::MostRecent),
            "human_review" => Ok(TieBreakPolicy::HumanReview),
            _ => Err(DomainError::UnknownTieBreakPolicy(s.to_string())),
        }
    }
}

fn adopt(vote: Option<&Vote>) -> TieBreakOutcome {
    match vote {
        Some(v) => TieBreakOutcome::Resolved {
            decision: v.decision.clone(),
            confidence: v.confidence,
        },
        None => TieBreakOutcome::Unresolved,
    }
}

/// First vote holding the maximum key (exact ties keep the earlier vote).
fn first_max<'a>(
    votes: impl Iterator<Item = &'a Vote>,
    key: impl Fn(&Vote) -> f64,
) -> Option<&'a Vote> {
    let mut best: Option<&'a Vote> = None;
    for vote in votes {
        match best {
            Some(current) if key(vote) <= key(current) => {}
            _ => best = Some(vote),
        }
    }
    best
}
