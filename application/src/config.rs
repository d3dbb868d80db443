//! Engine configuration with multi-source loading
//!
//! Thresholds and the default evaluator weight table are constructor-time
//! configuration, never hardcoded into the algorithms. [`EngineConfig`]
//! can be built in code or loaded by merging defaults, a TOML file, and
//! `VERDICT_`-prefixed environment variables.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use verdict_domain::consensus::{StrategyThresholds, FALLBACK_WEIGHT};

/// Severity of a configuration issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Unusual but workable (e.g., weights not summing to 1.0)
    Warning,
    /// The engine would misbehave (e.g., threshold outside [0, 1])
    Error,
}

/// A single issue found while validating a configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub message: String,
}

impl ConfigIssue {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Consensus engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Provisional results below this confidence are ambiguous and go to
    /// the tie breaker
    pub confidence_threshold: f64,
    /// Vote share for a clear (non-soft) majority
    pub majority_threshold: f64,
    /// Vote share required by the Supermajority strategy
    pub supermajority_threshold: f64,
    /// Weight for evaluators absent from every weight table
    pub fallback_weight: f64,
    /// Default weights for known evaluators, overridable per call
    pub default_weights: HashMap<String, f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        // Stock ensemble of five evaluators, weights summing to 1.0.
        let default_weights = [
            ("claude-sonnet-4.5", 0.25),
            ("gpt-5.2-codex", 0.25),
            ("gemini-3-pro", 0.20),
            ("claude-haiku-4", 0.15),
            ("mistral-large", 0.15),
        ]
        .into_iter()
        .map(|(id, w)| (id.to_string(), w))
        .collect();

        Self {
            confidence_threshold: 0.7,
            majority_threshold: 0.5,
            supermajority_threshold: 0.67,
            fallback_weight: FALLBACK_WEIGHT,
            default_weights,
        }
    }
}

impl EngineConfig {
    /// Load configuration by merging sources, lowest to highest priority:
    /// built-in defaults, `verdict.toml` (or the explicit path), then
    /// `VERDICT_*` environment variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new().merge(Serialized::defaults(EngineConfig::default()));

        figment = match config_path {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment.merge(Toml::file("verdict.toml")),
        };

        figment.merge(Env::prefixed("VERDICT_")).extract()
    }

    // ==================== Builder Methods ====================

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_supermajority_threshold(mut self, threshold: f64) -> Self {
        self.supermajority_threshold = threshold;
        self
    }

    pub fn with_fallback_weight(mut self, weight: f64) -> Self {
        self.fallback_weight = weight;
        self
    }

    pub fn with_default_weights(mut self, weights: HashMap<String, f64>) -> Self {
        self.default_weights = weights;
        self
    }

    /// Threshold slice consumed by the strategy functions.
    pub fn thresholds(&self) -> StrategyThresholds {
        StrategyThresholds {
            majority: self.majority_threshold,
            supermajority: self.supermajority_threshold,
        }
    }

    // ==================== Validation ====================

    /// Validate the configuration, returning any issues found.
    ///
    /// A weight table not summing to ~1.0 is only a warning: weights are
    /// relative and the strategies renormalize, so this is permitted.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("majority_threshold", self.majority_threshold),
            ("supermajority_threshold", self.supermajority_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(ConfigIssue::error(format!(
                    "{name} must be within [0.0, 1.0], got {value}"
                )));
            }
        }

        if self.fallback_weight < 0.0 {
            issues.push(ConfigIssue::error(format!(
                "fallback_weight must be non-negative, got {}",
                self.fallback_weight
            )));
        }

        if let Some((id, weight)) = self
            .default_weights
            .iter()
            .find(|(_, w)| **w < 0.0 || !w.is_finite())
        {
            issues.push(ConfigIssue::error(format!(
                "default weight for '{id}' must be finite and non-negative, got {weight}"
            )));
        }

        let weight_sum: f64 = self.default_weights.values().sum();
        if !self.default_weights.is_empty() && (weight_sum - 1.0).abs() > 0.05 {
            issues.push(ConfigIssue::warning(format!(
                "default weights sum to {weight_sum:.3}, not ~1.0; strategies renormalize but \
                 relative weights may not mean what you intended"
            )));
        }

        issues
    }

    /// Check whether any issue is fatal.
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}
