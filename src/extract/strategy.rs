//! Interchangeable extraction strategies.

use serde::{Deserialize, Serialize};

use super::confidence::{hedged_confidence, PATTERN_CONFIDENCE};
use super::rules::{Candidate, STATE_RULES, VERB_RULES};

/// Which extraction strategy to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Copula/death rules with a fixed confidence
    #[default]
    Pattern,
    /// Copula, death and state-verb rules with penalty scoring
    Hedged,
}

/// Turns one sentence into candidate facts and scores it
pub trait ExtractionStrategy: Send + Sync {
    /// Human-readable strategy name
    fn name(&self) -> &str;

    /// Candidate facts found in the sentence, in rule order
    fn candidates(&self, sentence: &str) -> Vec<Candidate>;

    /// Confidence shared by every candidate of the sentence
    fn confidence(&self, sentence: &str) -> f64;
}

/// Build the strategy selected in configuration
pub fn build(kind: StrategyKind) -> Box<dyn ExtractionStrategy> {
    match kind {
        StrategyKind::Pattern => Box::new(PatternStrategy),
        StrategyKind::Hedged => Box::new(HedgedStrategy),
    }
}

/// Regex rules, fixed confidence
#[derive(Debug, Default)]
pub struct PatternStrategy;

impl ExtractionStrategy for PatternStrategy {
    fn name(&self) -> &str {
        "pattern"
    }

    fn candidates(&self, sentence: &str) -> Vec<Candidate> {
        STATE_RULES
            .iter()
            .flat_map(|rule| rule.apply(sentence))
            .collect()
    }

    fn confidence(&self, _sentence: &str) -> f64 {
        PATTERN_CONFIDENCE
    }
}

/// Regex and state-verb rules, confidence reduced by hedging language
#[derive(Debug, Default)]
pub struct HedgedStrategy;

impl ExtractionStrategy for HedgedStrategy {
    fn name(&self) -> &str {
        "hedged"
    }

    fn candidates(&self, sentence: &str) -> Vec<Candidate> {
        STATE_RULES
            .iter()
            .chain(VERB_RULES.iter())
            .flat_map(|rule| rule.apply(sentence))
            .collect()
    }

    fn confidence(&self, sentence: &str) -> f64 {
        hedged_confidence(sentence)
    }
}
