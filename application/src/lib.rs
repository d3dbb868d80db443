//! Application layer for verdict
//!
//! Wires the pure domain logic into a usable engine: configuration
//! loading, the calculation use case, and performance metrics.
//!
//! # Example
//!
//! ```
//! use serde_json::{json, Map};
//! use verdict_application::{ConsensusEngine, ConsensusInput};
//!
//! let engine = ConsensusEngine::default();
//!
//! let mut responses = Map::new();
//! responses.insert(
//!     "claude-sonnet-4.5".to_string(),
//!     json!({"decision": "approve", "confidence": 0.9}),
//! );
//! responses.insert(
//!     "gpt-5.2-codex".to_string(),
//!     json!({"decision": "approve", "confidence": 0.85}),
//! );
//!
//! let result = engine.calculate(&ConsensusInput::new(responses));
//! assert_eq!(result.final_decision, "approve");
//! assert!(!result.tie_broken);
//! ```

pub mod config;
pub mod engine;
pub mod metrics;

// Re-export commonly used types
pub use config::{ConfigIssue, EngineConfig, Severity};
pub use engine::{ConsensusEngine, ConsensusInput};
pub use metrics::{MetricsSnapshot, PerformanceTracker};

// Re-export the domain surface callers need alongside the engine
pub use verdict_domain::consensus::{
    ConsensusResult, ConsensusStrategy, TieBreakPolicy, Vote,
};
