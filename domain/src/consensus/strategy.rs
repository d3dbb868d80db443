//! Consensus aggregation strategies
//!
//! Five selectable algorithms reduce a normalized vote list to a
//! provisional decision and confidence. Each is a deterministic pure
//! function: argmax ties resolve to the first decision encountered in
//! normalized order, and no strategy consults a clock or RNG.
//!
//! The provisional result may still be ambiguous (low confidence or a
//! sentinel decision); flagging and resolving that is the job of
//! [`tie_break`](super::tie_break), not of the strategies themselves.

use super::sentinel;
use super::vote::Vote;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A named algorithm for reducing a vote set to one decision
///
/// A closed enumeration: adding a strategy is a compile-time-checked,
/// additive change (the `apply` match is exhaustive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusStrategy {
    /// Decision scores are confidence-weighted by evaluator weight;
    /// overall confidence is the weighted mean confidence of all votes
    #[default]
    WeightedAverage,

    /// Unweighted head count; the leading decision is reported even when
    /// it falls short of a strict majority
    MajorityVote,

    /// Like WeightedAverage but contributions scale with confidence
    /// squared, emphasizing high-certainty evaluators super-linearly
    ConfidenceWeighted,

    /// All votes must share one decision, otherwise `no_consensus`
    UnanimousRequired,

    /// The leading decision must reach a configured vote share
    /// (default two-thirds), otherwise `no_supermajority`
    Supermajority,
}

/// Strategy threshold knobs, sourced from engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyThresholds {
    /// Vote share a decision must exceed for a clear (non-soft) majority
    pub majority: f64,
    /// Vote share a decision must reach for a supermajority
    pub supermajority: f64,
}

impl Default for StrategyThresholds {
    fn default() -> Self {
        Self {
            majority: 0.5,
            supermajority: 0.67,
        }
    }
}

/// Pre-tie-break outcome of a strategy: a decision and its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Provisional {
    pub decision: String,
    pub confidence: f64,
}

impl Provisional {
    fn new(decision: impl Into<String>, confidence: f64) -> Self {
        Self {
            decision: decision.into(),
            confidence,
        }
    }

    /// Outcome for an empty vote set.
    fn empty() -> Self {
        Self::new(sentinel::UNKNOWN, 0.0)
    }
}

impl ConsensusStrategy {
    /// All supported strategies, in documentation order.
    pub const ALL: [ConsensusStrategy; 5] = [
        ConsensusStrategy::WeightedAverage,
        ConsensusStrategy::MajorityVote,
        ConsensusStrategy::ConfidenceWeighted,
        ConsensusStrategy::UnanimousRequired,
        ConsensusStrategy::Supermajority,
    ];

    /// Canonical snake_case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusStrategy::WeightedAverage => "weighted_average",
            ConsensusStrategy::MajorityVote => "majority_vote",
            ConsensusStrategy::ConfidenceWeighted => "confidence_weighted",
            ConsensusStrategy::UnanimousRequired => "unanimous_required",
            ConsensusStrategy::Supermajority => "supermajority",
        }
    }

    /// Reduce a vote list to a provisional decision
    ///
    /// An empty vote list is a normal outcome (`unknown`, confidence 0),
    /// not an error. `Err` is reserved for degenerate arithmetic such as a
    /// zero weight sum, which the engine converts to an error result.
    pub fn apply(
        &self,
        votes: &[Vote],
        thresholds: &StrategyThresholds,
    ) -> Result<Provisional, DomainError> {
        match self {
            ConsensusStrategy::WeightedAverage => weighted_average(votes),
            ConsensusStrategy::MajorityVote => Ok(majority_vote(votes, thresholds.majority)),
            ConsensusStrategy::ConfidenceWeighted => confidence_weighted(votes),
            ConsensusStrategy::UnanimousRequired => Ok(unanimous_required(votes)),
            ConsensusStrategy::Supermajority => {
                Ok(supermajority(votes, thresholds.supermajority))
            }
        }
    }
}

impl std::fmt::Display for ConsensusStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ConsensusStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weighted_average" => Ok(ConsensusStrategy::WeightedAverage),
            "majority_vote" => Ok(ConsensusStrategy::MajorityVote),
            "confidence_weighted" => Ok(ConsensusStrategy::ConfidenceWeighted),
            "unanimous_required" => Ok(ConsensusStrategy::UnanimousRequired),
            "supermajority" => Ok(ConsensusStrategy::Supermajority),
            _ => Err(DomainError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Accumulate per-decision scores in first-seen order.
///
/// `contribution` maps a vote to its additive score. Returning a `Vec`
/// rather than a map keeps argmax iteration deterministic.
fn scores_by_decision(votes: &[Vote], contribution: impl Fn(&Vote) -> f64) -> Vec<(String, f64)> {
    let mut scores: Vec<(String, f64)> = Vec::new();
    for vote in votes {
        match scores.iter_mut().find(|(d, _)| *d == vote.decision) {
            Some((_, score)) => *score += contribution(vote),
            None => scores.push((vote.decision.clone(), contribution(vote))),
        }
    }
    scores
}

/// Count votes per decision in first-seen order.
fn counts_by_decision(votes: &[Vote]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for vote in votes {
        match counts.iter_mut().find(|(d, _)| *d == vote.decision) {
            Some((_, count)) => *count += 1,
            None => counts.push((vote.decision.clone(), 1)),
        }
    }
    counts
}

/// First entry holding the maximum score (strictly-greater scan, so exact
/// ties keep the earlier decision).
fn argmax(scores: &[(String, f64)]) -> Option<&(String, f64)> {
    let mut best: Option<&(String, f64)> = None;
    for entry in scores {
        match best {
            Some((_, top)) if entry.1 <= *top => {}
            _ => best = Some(entry),
        }
    }
    best
}

fn weighted_average(votes: &[Vote]) -> Result<Provisional, DomainError> {
    if votes.is_empty() {
        return Ok(Provisional::empty());
    }

    let total_weight: f64 = votes.iter().map(|v| v.weight).sum();
    if total_weight <= 0.0 {
        return Err(DomainError::ZeroWeightSum);
    }

    let mut scores = scores_by_decision(votes, |v| v.weight * v.confidence);
    for (_, score) in &mut scores {
        *score /= total_weight;
    }

    let (decision, _) = argmax(&scores).cloned().unwrap_or_else(|| {
        (sentinel::UNKNOWN.to_string(), 0.0)
    });

    // Overall weighted mean confidence across all votes, not just the
    // winning bucket.
    let confidence = votes
        .iter()
        .map(|v| v.weight * v.confidence)
        .sum::<f64>()
        / total_weight;

    Ok(Provisional::new(decision, confidence))
}

fn majority_vote(votes: &[Vote], threshold: f64) -> Provisional {
    if votes.is_empty() {
        return Provisional::empty();
    }

    let counts = counts_by_decision(votes);
    let max_count = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let share = max_count as f64 / votes.len() as f64;
    let contested = counts.iter().filter(|(_, c)| *c == max_count).count() > 1;
    let winner = counts
        .iter()
        .find(|(_, c)| *c == max_count)
        .map(|(d, _)| d.clone())
        .unwrap_or_else(|| sentinel::UNKNOWN.to_string());

    if !contested && share > threshold {
        // Clear majority.
        return Provisional::new(winner, share);
    }

    // Soft majority: the leading decision is still reported with its vote
    // share; the tie detector downstream flags the low-confidence case.
    Provisional::new(winner, share)
}

fn confidence_weighted(votes: &[Vote]) -> Result<Provisional, DomainError> {
    if votes.is_empty() {
        return Ok(Provisional::empty());
    }

    // Squaring confidence rewards certainty super-linearly: a 0.9 vote
    // contributes ~3x what a 0.5 vote of equal weight does.
    let total_mass: f64 = votes
        .iter()
        .map(|v| v.weight * v.confidence * v.confidence)
        .sum();
    if total_mass <= 0.0 {
        return Err(DomainError::ZeroConfidenceMass);
    }

    let mut scores = scores_by_decision(votes, |v| v.weight * v.confidence * v.confidence);
    for (_, score) in &mut scores {
        *score /= total_mass;
    }

    // Unlike weighted_average, the confidence reported here is the winning
    // bucket's normalized score.
    let (decision, confidence) = argmax(&scores)
        .cloned()
        .unwrap_or_else(|| (sentinel::UNKNOWN.to_string(), 0.0));

    Ok(Provisional::new(decision, confidence))
}

fn unanimous_required(votes: &[Vote]) -> Provisional {
    let Some(first) = votes.first() else {
        return Provisional::empty();
    };

    if votes.iter().any(|v| v.decision != first.decision) {
        return Provisional::new(sentinel::NO_CONSENSUS, 0.0);
    }

    let mean_confidence =
        votes.iter().map(|v| v.confidence).sum::<f64>() / votes.len() as f64;
    Provisional::new(first.decision.clone(), mean_confidence)
}

fn supermajority(votes: &[Vote], threshold: f64) -> Provisional {
    if votes.is_empty() {
        return Provisional::empty();
    }

    let total = votes.len() as f64;
    let counts = counts_by_decision(votes);

    // Vote share comparison with `>=`: 67 of 100 meets the default 0.67
    // threshold exactly, 2 of 3 (~0.667) does not.
    for (decision, count) in &counts {
        let share = *count as f64 / total;
        if share >= threshold {
            return Provisional::new(decision.clone(), share);
        }
    }

    Provisional::new(sentinel::NO_SUPERMAJORITY, 0.0)
}
