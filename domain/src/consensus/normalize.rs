//! Vote normalization
//!
//! Turns a raw mapping of evaluator identifier to loose JSON payload into
//! validated [`Vote`] records. This is pure domain logic — no I/O, just
//! permissive structural extraction: individual malformed entries are
//! skipped so aggregation can proceed with whatever valid votes remain.

use super::sentinel;
use super::vote::Vote;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Weight assigned to evaluators absent from both weight tables.
///
/// Unknown evaluators are deliberately admitted with a small weight rather
/// than rejected, so a new evaluator can join an ensemble without a
/// configuration change locking it out.
pub const FALLBACK_WEIGHT: f64 = 0.1;

/// Confidence assumed when a payload omits it or carries a non-numeric value.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Normalize raw evaluator responses into an ordered vote list
///
/// Output order is the iteration order of `responses` (insertion order —
/// `serde_json` is built with `preserve_order`). The engine performs no
/// resorting, which is what gives the Most Recent tie-break policy its
/// "last vote wins" meaning.
///
/// Field extraction per entry:
/// - `decision`: from `decision`, falling back to `choice`, defaulting to
///   the `unknown` sentinel.
/// - `confidence`: numeric `confidence` field, else [`DEFAULT_CONFIDENCE`].
/// - `weight`: `custom_weights` → `default_weights` → `fallback_weight`.
/// - `reasoning`, `domain_score` (or `score`), `latency_ms`: optional.
///
/// Entries whose payload is not a JSON object are dropped silently.
pub fn normalize_votes(
    responses: &Map<String, Value>,
    custom_weights: Option<&HashMap<String, f64>>,
    default_weights: &HashMap<String, f64>,
    fallback_weight: f64,
) -> Vec<Vote> {
    responses
        .iter()
        .filter_map(|(evaluator_id, payload)| {
            let fields = payload.as_object()?;

            let decision = fields
                .get("decision")
                .and_then(Value::as_str)
                .or_else(|| fields.get("choice").and_then(Value::as_str))
                .unwrap_or(sentinel::UNKNOWN);

            let confidence = fields
                .get("confidence")
                .and_then(Value::as_f64)
                .unwrap_or(DEFAULT_CONFIDENCE);

            let weight = resolve_weight(
                evaluator_id,
                custom_weights,
                default_weights,
                fallback_weight,
            );

            let mut vote = Vote::new(evaluator_id, decision, confidence, weight);

            if let Some(reasoning) = fields.get("reasoning").and_then(Value::as_str) {
                vote = vote.with_reasoning(reasoning);
            }
            if let Some(score) = fields
                .get("domain_score")
                .or_else(|| fields.get("score"))
                .and_then(Value::as_f64)
            {
                vote = vote.with_domain_score(score);
            }
            if let Some(latency) = fields.get("latency_ms").and_then(Value::as_u64) {
                vote = vote.with_latency(latency);
            }

            Some(vote)
        })
        .collect()
}

/// Resolve an evaluator's weight: custom table → default table → fallback.
fn resolve_weight(
    evaluator_id: &str,
    custom_weights: Option<&HashMap<String, f64>>,
    default_weights: &HashMap<String, f64>,
    fallback_weight: f64,
) -> f64 {
    custom_weights
        .and_then(|table| table.get(evaluator_id))
        .or_else(|| default_weights.get(evaluator_id))
        .copied()
        .unwrap_or(fallback_weight)
}
