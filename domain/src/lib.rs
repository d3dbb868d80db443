//! Domain layer for verdict
//!
//! This crate contains the pure consensus logic: vote normalization,
//! aggregation strategies, tie detection and breaking, and agreement
//! scoring. It has no dependencies on configuration, logging, or any
//! other application concern.
//!
//! # Core Concepts
//!
//! ## Vote
//!
//! One evaluator's judgment: a decision label, a self-reported confidence,
//! and a relative weight.
//!
//! ## Strategy
//!
//! A named, deterministic algorithm reducing a vote set to one decision
//! ([`ConsensusStrategy`]).
//!
//! ## Tie-break
//!
//! When a provisional result is ambiguous (low confidence or a sentinel
//! decision), a [`TieBreakPolicy`] re-resolves it deterministically.

pub mod consensus;
pub mod core;

// Re-export commonly used types
pub use consensus::{
    agreement_score, is_ambiguous, normalize_votes, ConsensusResult, ConsensusStrategy,
    Provisional, StrategyThresholds, TieBreakOutcome, TieBreakPolicy, Vote,
};
pub use core::error::DomainError;
