//! Reserved decision labels.
//!
//! A [`ConsensusResult`](super::ConsensusResult) carries an opaque decision
//! string. Four labels are reserved to signal that no real agreement was
//! reached; callers must treat all of them as "defer to a human or a
//! fallback policy", never as a green light.

/// No decision could be derived (empty input, missing decision fields).
pub const UNKNOWN: &str = "unknown";

/// The unanimity requirement was not met.
pub const NO_CONSENSUS: &str = "no_consensus";

/// No decision reached the supermajority threshold.
pub const NO_SUPERMAJORITY: &str = "no_supermajority";

/// The calculation itself failed (bad selector name, degenerate weights).
pub const ERROR: &str = "error";

/// Check whether a decision label is one of the four reserved sentinels.
pub fn is_sentinel(decision: &str) -> bool {
    matches!(decision, UNKNOWN | NO_CONSENSUS | NO_SUPERMAJORITY | ERROR)
}

/// Check whether a sentinel decision is eligible for tie-breaking.
///
/// `error` is excluded: a failed calculation must not be "resolved" into a
/// decision by a tie-break policy.
pub fn is_breakable(decision: &str) -> bool {
    matches!(decision, UNKNOWN | NO_CONSENSUS | NO_SUPERMAJORITY)
}
