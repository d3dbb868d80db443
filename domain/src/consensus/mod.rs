//! Consensus domain
//!
//! Core concepts for weighted multi-evaluator decision fusion.
//!
//! # Pipeline
//!
//! ```text
//! raw responses → normalize → strategy → tie detect → tie break → result
//! ```
//!
//! Everything in this module is pure: no I/O, no clocks, no shared state.
//! Orchestration, timing, and metrics live in the application layer.

pub mod normalize;
pub mod result;
pub mod sentinel;
pub mod strategy;
pub mod tie_break;
pub mod vote;

// Re-export main types
pub use normalize::{normalize_votes, DEFAULT_CONFIDENCE, FALLBACK_WEIGHT};
pub use result::ConsensusResult;
pub use strategy::{ConsensusStrategy, Provisional, StrategyThresholds};
pub use tie_break::{is_ambiguous, TieBreakOutcome, TieBreakPolicy};
pub use vote::{agreement_score, Vote};
