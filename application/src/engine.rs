//! Consensus engine use case
//!
//! Orchestrates one calculation: normalize → strategy → tie detect →
//! tie break → agreement score → tracker update. The engine is an
//! explicitly constructed value (no globals); `calculate` takes `&self`
//! and is safe to call from many threads concurrently, since the
//! performance tracker is the only shared mutable state and it is atomic.

use crate::config::EngineConfig;
use crate::metrics::{MetricsSnapshot, PerformanceTracker};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};
use verdict_domain::consensus::{
    agreement_score, is_ambiguous, normalize_votes, ConsensusResult, ConsensusStrategy,
    TieBreakOutcome, TieBreakPolicy,
};
use verdict_domain::DomainError;

/// Input for one consensus calculation
///
/// Defaults: Weighted Average strategy, Highest Confidence tie-breaking,
/// no per-call weight overrides.
#[derive(Debug, Clone)]
pub struct ConsensusInput {
    /// Raw mapping of evaluator identifier to response payload. Iteration
    /// order (insertion order) defines vote order, which the Most Recent
    /// tie-break policy treats as recency.
    pub responses: Map<String, Value>,
    /// Aggregation strategy
    pub strategy: ConsensusStrategy,
    /// Policy applied when the provisional result is ambiguous
    pub tie_break: TieBreakPolicy,
    /// Per-call weight table overriding the engine defaults
    pub custom_weights: Option<HashMap<String, f64>>,
}

impl ConsensusInput {
    pub fn new(responses: Map<String, Value>) -> Self {
        Self {
            responses,
            strategy: ConsensusStrategy::default(),
            tie_break: TieBreakPolicy::default(),
            custom_weights: None,
        }
    }

    pub fn with_strategy(mut self, strategy: ConsensusStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_tie_break(mut self, policy: TieBreakPolicy) -> Self {
        self.tie_break = policy;
        self
    }

    pub fn with_custom_weights(mut self, weights: HashMap<String, f64>) -> Self {
        self.custom_weights = Some(weights);
        self
    }
}

/// Weighted multi-evaluator consensus engine
///
/// Construct one per configuration and share it freely (`Send + Sync`).
/// Every invocation returns a [`ConsensusResult`]; faults are folded into
/// an `error`-sentinel result rather than surfaced as `Err` or a panic,
/// so callers handle one uniform shape.
pub struct ConsensusEngine {
    config: EngineConfig,
    tracker: PerformanceTracker,
}

impl Default for ConsensusEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ConsensusEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            tracker: PerformanceTracker::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one consensus calculation.
    pub fn calculate(&self, input: &ConsensusInput) -> ConsensusResult {
        let started = Instant::now();

        match self.run_pipeline(input, started) {
            Ok(result) => {
                self.tracker.record_success();
                info!(
                    strategy = %input.strategy,
                    decision = %result.final_decision,
                    confidence = result.confidence_score,
                    tie_broken = result.tie_broken,
                    "consensus calculated"
                );
                result
            }
            Err(error) => {
                self.tracker.record_failure();
                warn!(strategy = %input.strategy, %error, "consensus calculation failed");
                ConsensusResult::from_error(error.to_string(), input.strategy, elapsed_ms(started))
            }
        }
    }

    /// Run one calculation with string-keyed strategy and policy selectors.
    ///
    /// For callers driven by external configuration. An unrecognized name
    /// becomes an `error`-sentinel result carrying the invalid name in its
    /// metadata, never a panic or an `Err`.
    pub fn calculate_named(
        &self,
        responses: Map<String, Value>,
        strategy: &str,
        tie_break: &str,
        custom_weights: Option<HashMap<String, f64>>,
    ) -> ConsensusResult {
        let started = Instant::now();

        let selectors = strategy
            .parse::<ConsensusStrategy>()
            .and_then(|s| Ok((s, tie_break.parse::<TieBreakPolicy>()?)));

        match selectors {
            Ok((strategy, tie_break)) => {
                let mut input = ConsensusInput::new(responses)
                    .with_strategy(strategy)
                    .with_tie_break(tie_break);
                input.custom_weights = custom_weights;
                self.calculate(&input)
            }
            Err(error) => {
                self.tracker.record_failure();
                warn!(%error, "rejected consensus request with unknown selector");
                let mut result = ConsensusResult::from_error(
                    error.to_string(),
                    ConsensusStrategy::default(),
                    elapsed_ms(started),
                );
                result.metadata = Some(json!({
                    "error": error.to_string(),
                    "requested_strategy": strategy,
                    "requested_tie_break": tie_break,
                }));
                result
            }
        }
    }

    /// Performance tracker snapshot plus the supported selector names.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.tracker.snapshot()
    }

    fn run_pipeline(
        &self,
        input: &ConsensusInput,
        started: Instant,
    ) -> Result<ConsensusResult, DomainError> {
        let votes = normalize_votes(
            &input.responses,
            input.custom_weights.as_ref(),
            &self.config.default_weights,
            self.config.fallback_weight,
        );
        debug!(
            received = input.responses.len(),
            normalized = votes.len(),
            strategy = %input.strategy,
            "normalized votes"
        );

        let provisional = input.strategy.apply(&votes, &self.config.thresholds())?;

        let mut final_decision = provisional.decision;
        let mut confidence = provisional.confidence;
        let mut tie_broken = false;
        let mut tie_break_strategy = None;
        let mut metadata = None;

        if is_ambiguous(&final_decision, confidence, self.config.confidence_threshold) {
            debug!(
                decision = %final_decision,
                confidence,
                policy = %input.tie_break,
                "provisional result ambiguous, applying tie-break"
            );

            match input.tie_break.resolve(&votes) {
                TieBreakOutcome::Resolved {
                    decision,
                    confidence: adopted,
                } => {
                    self.tracker.record_tie_break();
                    final_decision = decision;
                    confidence = adopted;
                    tie_broken = true;
                    tie_break_strategy = Some(input.tie_break);
                }
                TieBreakOutcome::NeedsHumanReview => {
                    metadata = Some(json!({
                        "human_review_required": true,
                        "provisional_confidence": confidence,
                    }));
                }
                TieBreakOutcome::Unresolved => {
                    // Policy not applicable (e.g., no domain scores); the
                    // provisional result stands as-is.
                }
            }
        }

        let agreement = agreement_score(&votes, &final_decision);

        Ok(ConsensusResult {
            final_decision,
            confidence_score: confidence,
            strategy: input.strategy,
            agreement_score: agreement,
            participating_evaluators: votes.iter().map(|v| v.evaluator_id.clone()).collect(),
            votes,
            tie_broken,
            tie_break_strategy,
            processing_time_ms: elapsed_ms(started),
            metadata,
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_domain::consensus::sentinel;

    const EPSILON: f64 = 1e-12;

    fn responses(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(id, payload)| (id.to_string(), payload.clone()))
            .collect()
    }

    /// The five-vote board used across the scenario tests: A/B/D approve,
    /// C/E reject.
    fn board() -> Map<String, Value> {
        responses(&[
            ("evaluator-a", json!({"decision": "approve", "confidence": 0.9})),
            ("evaluator-b", json!({"decision": "approve", "confidence": 0.85})),
            ("evaluator-c", json!({"decision": "reject", "confidence": 0.95})),
            ("evaluator-d", json!({"decision": "approve", "confidence": 0.8})),
            ("evaluator-e", json!({"decision": "reject", "confidence": 0.7})),
        ])
    }

    fn board_weights() -> HashMap<String, f64> {
        [
            ("evaluator-a", 0.25),
            ("evaluator-b", 0.20),
            ("evaluator-c", 0.25),
            ("evaluator-d", 0.20),
            ("evaluator-e", 0.10),
        ]
        .into_iter()
        .map(|(id, w)| (id.to_string(), w))
        .collect()
    }

    #[test]
    fn test_majority_end_to_end() {
        // With the detector relaxed below the 0.6 vote share, the majority
        // result is decisive and passes through untouched.
        let engine =
            ConsensusEngine::new(EngineConfig::default().with_confidence_threshold(0.6));
        let input = ConsensusInput::new(board())
            .with_strategy(ConsensusStrategy::MajorityVote)
            .with_custom_weights(board_weights());

        let result = engine.calculate(&input);

        assert_eq!(result.final_decision, "approve");
        assert_eq!(result.confidence_score, 0.6);
        assert_eq!(result.agreement_score, 0.6);
        assert!(!result.tie_broken);
        assert!(result.tie_break_strategy.is_none());
        assert_eq!(result.participating_evaluators.len(), 5);
        assert_eq!(result.votes[0].weight, 0.25);
    }

    #[test]
    fn test_majority_below_default_threshold_gets_tie_broken() {
        // Same board under the default 0.7 threshold: 0.6 is ambiguous and
        // highest-confidence tie-breaking adopts evaluator-c's rejection.
        let engine = ConsensusEngine::default();
        let input = ConsensusInput::new(board())
            .with_strategy(ConsensusStrategy::MajorityVote)
            .with_custom_weights(board_weights());

        let result = engine.calculate(&input);

        assert_eq!(result.final_decision, "reject");
        assert_eq!(result.confidence_score, 0.95);
        assert!(result.tie_broken);
        assert_eq!(
            result.tie_break_strategy,
            Some(TieBreakPolicy::HighestConfidence)
        );
        assert_eq!(result.agreement_score, 0.4);
        assert_eq!(engine.metrics().tie_breaking_events, 1);
    }

    #[test]
    fn test_exact_tie_scenario() {
        // 0.55 vs 0.55: weighted average lands below the threshold, and the
        // tie-of-ties rule keeps the first vote in order.
        let engine = ConsensusEngine::default();
        let raw = responses(&[
            ("evaluator-a", json!({"decision": "approve", "confidence": 0.55})),
            ("evaluator-b", json!({"decision": "reject", "confidence": 0.55})),
        ]);
        let weights = [("evaluator-a", 0.5), ("evaluator-b", 0.5)]
            .into_iter()
            .map(|(id, w)| (id.to_string(), w))
            .collect();
        let input = ConsensusInput::new(raw).with_custom_weights(weights);

        let result = engine.calculate(&input);

        assert_eq!(result.final_decision, "approve");
        assert!((result.confidence_score - 0.55).abs() < EPSILON);
        assert!(result.tie_broken);
        assert_eq!(
            result.tie_break_strategy,
            Some(TieBreakPolicy::HighestConfidence)
        );
        assert_eq!(result.agreement_score, 0.5);
    }

    #[test]
    fn test_empty_responses_is_normal_outcome() {
        let engine = ConsensusEngine::default();
        let result = engine.calculate(&ConsensusInput::new(Map::new()));

        assert_eq!(result.final_decision, sentinel::UNKNOWN);
        assert_eq!(result.confidence_score, 0.0);
        assert_eq!(result.agreement_score, 0.0);
        assert!(!result.is_error());
        assert!(result.votes.is_empty());
        assert_eq!(engine.metrics().successful_calculations, 1);
    }

    #[test]
    fn test_final_decision_closure() {
        // Any non-empty vote list yields either an input decision or a
        // reserved sentinel, across every strategy.
        let engine = ConsensusEngine::default();
        for strategy in ConsensusStrategy::ALL {
            let result =
                engine.calculate(&ConsensusInput::new(board()).with_strategy(strategy));
            let from_votes = result
                .votes
                .iter()
                .any(|v| v.decision == result.final_decision);
            assert!(
                from_votes || sentinel::is_sentinel(&result.final_decision),
                "{strategy} produced a decision outside the closure"
            );
        }
    }

    #[test]
    fn test_unknown_strategy_name_is_error_result() {
        let engine = ConsensusEngine::default();
        let result = engine.calculate_named(board(), "borda_count", "highest_confidence", None);

        assert!(result.is_error());
        let metadata = result.metadata.unwrap();
        assert_eq!(metadata["requested_strategy"], "borda_count");
        assert_eq!(engine.metrics().failed_calculations, 1);
        assert_eq!(engine.metrics().successful_calculations, 0);
    }

    #[test]
    fn test_unknown_tie_break_name_is_error_result() {
        let engine = ConsensusEngine::default();
        let result = engine.calculate_named(board(), "majority_vote", "coin_flip", None);

        assert!(result.is_error());
        assert_eq!(result.metadata.unwrap()["requested_tie_break"], "coin_flip");
    }

    #[test]
    fn test_calculate_named_happy_path() {
        let engine = ConsensusEngine::default();
        let result = engine.calculate_named(
            board(),
            "supermajority",
            "human_review",
            Some(board_weights()),
        );

        // 3 of 5 misses the 0.67 bar; human review leaves the sentinel.
        assert_eq!(result.final_decision, sentinel::NO_SUPERMAJORITY);
        assert!(!result.tie_broken);
        assert_eq!(result.metadata.unwrap()["human_review_required"], true);
    }

    #[test]
    fn test_zero_weight_fault_becomes_error_result() {
        let engine = ConsensusEngine::default();
        let weights = [("evaluator-a", 0.0)]
            .into_iter()
            .map(|(id, w)| (id.to_string(), w))
            .collect();
        let raw = responses(&[(
            "evaluator-a",
            json!({"decision": "approve", "confidence": 0.9}),
        )]);
        let input = ConsensusInput::new(raw).with_custom_weights(weights);

        let result = engine.calculate(&input);

        assert!(result.is_error());
        assert!(result.metadata.unwrap()["error"]
            .as_str()
            .unwrap()
            .contains("zero"));
        assert_eq!(engine.metrics().failed_calculations, 1);
    }

    #[test]
    fn test_constitutional_priority_unresolved_keeps_provisional() {
        // No vote carries a domain score, so the ambiguous provisional
        // result passes through unchanged.
        let engine = ConsensusEngine::default();
        let raw = responses(&[
            ("a", json!({"decision": "approve", "confidence": 0.5})),
            ("b", json!({"decision": "reject", "confidence": 0.5})),
        ]);
        let input = ConsensusInput::new(raw)
            .with_tie_break(TieBreakPolicy::ConstitutionalPriority);

        let result = engine.calculate(&input);

        assert_eq!(result.final_decision, "approve");
        assert!(!result.tie_broken);
        assert!(result.tie_break_strategy.is_none());
        assert_eq!(engine.metrics().tie_breaking_events, 0);
    }

    #[test]
    fn test_constitutional_priority_resolves_by_domain_score() {
        let engine = ConsensusEngine::default();
        let raw = responses(&[
            ("a", json!({"decision": "approve", "confidence": 0.5, "domain_score": 0.6})),
            ("b", json!({"decision": "reject", "confidence": 0.5, "domain_score": 0.9})),
        ]);
        let input = ConsensusInput::new(raw)
            .with_tie_break(TieBreakPolicy::ConstitutionalPriority);

        let result = engine.calculate(&input);

        assert_eq!(result.final_decision, "reject");
        assert!(result.tie_broken);
    }

    #[test]
    fn test_most_recent_adopts_last_vote() {
        let engine = ConsensusEngine::default();
        let raw = responses(&[
            ("early", json!({"decision": "approve", "confidence": 0.5})),
            ("late", json!({"decision": "reject", "confidence": 0.5})),
        ]);
        let input = ConsensusInput::new(raw).with_tie_break(TieBreakPolicy::MostRecent);

        let result = engine.calculate(&input);

        assert_eq!(result.final_decision, "reject");
        assert_eq!(
            result.tie_break_strategy,
            Some(TieBreakPolicy::MostRecent)
        );
    }

    #[test]
    fn test_determinism_excluding_processing_time() {
        let engine = ConsensusEngine::default();
        let input = ConsensusInput::new(board())
            .with_strategy(ConsensusStrategy::ConfidenceWeighted)
            .with_custom_weights(board_weights());

        let mut first = engine.calculate(&input);
        let mut second = engine.calculate(&input);
        first.processing_time_ms = 0;
        second.processing_time_ms = 0;

        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_entries_dropped_not_fatal() {
        let engine = ConsensusEngine::default();
        let raw = responses(&[
            ("broken", json!("not an object")),
            ("ok", json!({"decision": "approve", "confidence": 0.9})),
        ]);

        let result = engine.calculate(&ConsensusInput::new(raw));

        assert_eq!(result.final_decision, "approve");
        assert_eq!(result.participating_evaluators, vec!["ok".to_string()]);
        assert_eq!(result.agreement_score, 1.0);
    }

    #[test]
    fn test_unanimity_across_default_ensemble() {
        let engine = ConsensusEngine::default();
        let raw = responses(&[
            ("claude-sonnet-4.5", json!({"decision": "ship", "confidence": 0.9})),
            ("gpt-5.2-codex", json!({"decision": "ship", "confidence": 0.8})),
            ("gemini-3-pro", json!({"decision": "ship", "confidence": 0.85})),
        ]);
        let input =
            ConsensusInput::new(raw).with_strategy(ConsensusStrategy::UnanimousRequired);

        let result = engine.calculate(&input);

        assert_eq!(result.final_decision, "ship");
        assert_eq!(result.agreement_score, 1.0);
        assert!(!result.tie_broken);
    }

    #[test]
    fn test_metrics_accumulate_across_calls() {
        let engine = ConsensusEngine::default();
        engine.calculate(&ConsensusInput::new(board()));
        engine.calculate(&ConsensusInput::new(Map::new()));
        engine.calculate_named(Map::new(), "nope", "highest_confidence", None);

        let snapshot = engine.metrics();
        assert_eq!(snapshot.total_calculations, 3);
        assert_eq!(snapshot.successful_calculations, 2);
        assert_eq!(snapshot.failed_calculations, 1);
        assert!(snapshot
            .supported_strategies
            .contains(&"supermajority".to_string()));
        assert!(snapshot
            .supported_tie_breakers
            .contains(&"human_review".to_string()));
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        let engine = std::sync::Arc::new(ConsensusEngine::default());
        let mut handles = Vec::new();

        for _ in 0..4 {
            let engine = std::sync::Arc::clone(&engine);
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    let result = engine.calculate(&ConsensusInput::new(board()));
                    assert!(!result.is_error());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(engine.metrics().total_calculations, 200);
    }
}
