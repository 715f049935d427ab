//! Contradiction verdicts produced by the detectors.

use serde::{Deserialize, Serialize};

use super::claim::Claim;

/// Outcome of a pairwise comparison.
///
/// Only positive detections are materialized; a consistent pair simply
/// produces no verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Contradiction,
}

/// Two claims about the same entity that conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionVerdict {
    /// Entity of the left claim
    pub entity: String,

    /// Attribute of the left claim
    pub attribute: String,

    /// The two conflicting values, in comparison order
    pub values: (String, String),

    /// Time contexts of the two claims, same order as `values`
    pub locations: (String, String),

    /// Strength of the contradiction signal
    pub delta: f64,

    pub verdict: Verdict,

    pub source_texts: (String, String),

    pub confidence_scores: (f64, f64),
}

impl ContradictionVerdict {
    /// Build a verdict from an ordered claim pair
    pub fn between(left: &Claim, right: &Claim, delta: f64) -> Self {
        Self {
            entity: left.entity.clone(),
            attribute: left.attribute.clone(),
            values: (left.value.clone(), right.value.clone()),
            locations: (left.time_context.clone(), right.time_context.clone()),
            delta,
            verdict: Verdict::Contradiction,
            source_texts: (left.source_text.clone(), right.source_text.clone()),
            confidence_scores: (left.confidence, right.confidence),
        }
    }
}
