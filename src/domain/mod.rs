//! Domain types for the contradiction engine.
//!
//! This module contains the core data structures:
//! - Claim: Atomic facts extracted from text, plus the carried time context
//! - Verdict: Contradictions found between two claims

pub mod claim;
pub mod verdict;

// Re-export commonly used types
pub use claim::{Claim, TimeContext, UNKNOWN_TIME_CONTEXT};
pub use verdict::{ContradictionVerdict, Verdict};
