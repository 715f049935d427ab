//! Claim extraction.
//!
//! Converts one chunk of text into atomic [`Claim`]s. The only state that
//! crosses chunk boundaries is the narrative [`TimeContext`], and it is
//! passed in and handed back explicitly:
//!
//! ```ignore
//! let mut context = TimeContext::default();
//! for (chunk_id, chunk) in chunks.enumerate() {
//!     let extraction = extractor.extract(&chunk, chunk_id as u64, context, None);
//!     claims.extend(extraction.claims);
//!     context = extraction.context;
//! }
//! ```

pub mod confidence;
pub mod rules;
pub mod strategy;
pub mod temporal;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Claim, TimeContext};

pub use rules::{is_likely_name, Candidate};
pub use strategy::{ExtractionStrategy, HedgedStrategy, PatternStrategy, StrategyKind};
pub use temporal::TemporalDetector;

/// Sentence-like segment: text up to and including a run of terminators
static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]*").expect("segment pattern must compile"));

/// Settings for claim extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Extraction strategy (default: pattern)
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Claims scoring below this are never built (default: 0.7)
    #[serde(default = "default_min_claim_confidence")]
    pub min_claim_confidence: f64,

    /// Segments shorter than this carry no fact (default: 10)
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,

    /// Longest accepted entity phrase (default: 50)
    #[serde(default = "default_max_entity_chars")]
    pub max_entity_chars: usize,

    /// Keywords introducing a time marker, in priority order
    #[serde(default = "temporal::default_keywords")]
    pub temporal_keywords: Vec<String>,
}

fn default_min_claim_confidence() -> f64 {
    0.7
}
fn default_min_sentence_chars() -> usize {
    10
}
fn default_max_entity_chars() -> usize {
    50
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            min_claim_confidence: default_min_claim_confidence(),
            min_sentence_chars: default_min_sentence_chars(),
            max_entity_chars: default_max_entity_chars(),
            temporal_keywords: temporal::default_keywords(),
        }
    }
}

/// Claims of one chunk plus the context to hand to the next chunk
#[derive(Debug, Clone)]
pub struct Extraction {
    pub claims: Vec<Claim>,
    pub context: TimeContext,
}

/// Extracts claims from chunks using a pluggable strategy
pub struct ClaimExtractor {
    strategy: Box<dyn ExtractionStrategy>,
    temporal: TemporalDetector,
    min_claim_confidence: f64,
    min_sentence_chars: usize,
    max_entity_chars: usize,
}

impl ClaimExtractor {
    /// Build the extractor and strategy named in `config`
    pub fn new(config: &ExtractionConfig) -> Result<Self, regex::Error> {
        Self::with_strategy(config, strategy::build(config.strategy))
    }

    /// Build an extractor around a custom strategy
    pub fn with_strategy(
        config: &ExtractionConfig,
        strategy: Box<dyn ExtractionStrategy>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            strategy,
            temporal: TemporalDetector::new(&config.temporal_keywords)?,
            min_claim_confidence: config.min_claim_confidence,
            min_sentence_chars: config.min_sentence_chars,
            max_entity_chars: config.max_entity_chars,
        })
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Extract claims from one chunk.
    ///
    /// `explicit` overrides marker detection. Otherwise a marker found in
    /// the chunk replaces `context`, and without one `context` is kept.
    pub fn extract(
        &self,
        chunk: &str,
        chunk_id: u64,
        context: TimeContext,
        explicit: Option<&str>,
    ) -> Extraction {
        let context = match explicit {
            Some(marker) => TimeContext::new(marker),
            None => self
                .temporal
                .detect(chunk)
                .map(TimeContext::new)
                .unwrap_or(context),
        };

        let claims: Vec<Claim> = SEGMENT_RE
            .find_iter(chunk)
            .map(|segment| segment.as_str().trim())
            .filter(|sentence| self.long_enough(sentence))
            .flat_map(|sentence| self.extract_sentence(sentence, chunk_id, &context))
            .collect();

        debug!(
            chunk = chunk_id,
            claims = claims.len(),
            context = %context,
            "Extracted claims from chunk"
        );

        Extraction { claims, context }
    }

    fn long_enough(&self, sentence: &str) -> bool {
        let body = sentence.trim_end_matches(['.', '!', '?']).trim();
        body.chars().count() >= self.min_sentence_chars
    }

    fn extract_sentence(&self, sentence: &str, chunk_id: u64, context: &TimeContext) -> Vec<Claim> {
        let candidates: Vec<Candidate> = self
            .strategy
            .candidates(sentence)
            .into_iter()
            .filter(|c| {
                let keep = is_likely_name(&c.entity, self.max_entity_chars);
                if !keep {
                    debug!(rule = c.rule, entity = %c.entity, "Dropping unlikely entity");
                }
                keep
            })
            .collect();

        if candidates.is_empty() {
            return Vec::new();
        }

        let confidence = self.strategy.confidence(sentence).clamp(0.0, 1.0);
        if confidence < self.min_claim_confidence {
            let rules: Vec<&str> = candidates.iter().map(|c| c.rule).collect();
            debug!(confidence, sentence, ?rules, "Dropping low-confidence sentence");
            return Vec::new();
        }

        candidates
            .into_iter()
            .map(|candidate| Claim {
                entity: candidate.entity,
                attribute: candidate.attribute,
                value: candidate.value,
                time_context: context.to_string(),
                source_text: sentence.to_string(),
                chunk_id,
                confidence,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(kind: StrategyKind) -> ClaimExtractor {
        ClaimExtractor::new(&ExtractionConfig {
            strategy: kind,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_extracts_claim_with_detected_context() {
        let ex = extractor(StrategyKind::Pattern);
        let out = ex.extract(
            "CHAPTER 5: THE TRAGEDY. Lord Edmund was dead.",
            3,
            TimeContext::default(),
            None,
        );

        assert_eq!(out.context.as_str(), "Chapter 5");
        assert_eq!(out.claims.len(), 1);
        let claim = &out.claims[0];
        assert_eq!(claim.entity, "Lord Edmund");
        assert_eq!(claim.attribute, "alive");
        assert_eq!(claim.value, "dead");
        assert_eq!(claim.time_context, "Chapter 5");
        assert_eq!(claim.source_text, "Lord Edmund was dead.");
        assert_eq!(claim.chunk_id, 3);
        assert_eq!(claim.confidence, 0.8);
    }

    #[test]
    fn test_context_is_sticky() {
        let ex = extractor(StrategyKind::Pattern);
        let first = ex.extract("Chapter 2. Isabella was poor.", 0, TimeContext::default(), None);
        let second = ex.extract("Isabella was rich.", 1, first.context, None);

        assert_eq!(second.context.as_str(), "Chapter 2");
        assert_eq!(second.claims[0].time_context, "Chapter 2");
    }

    #[test]
    fn test_explicit_context_wins() {
        let ex = extractor(StrategyKind::Pattern);
        let out = ex.extract(
            "Chapter 2. Isabella was poor.",
            0,
            TimeContext::new("Chapter 1"),
            Some("Prologue"),
        );
        assert_eq!(out.context.as_str(), "Prologue");
        assert_eq!(out.claims[0].time_context, "Prologue");
    }

    #[test]
    fn test_short_segments_are_skipped() {
        let ex = extractor(StrategyKind::Pattern);
        // "Al is old" has only nine characters before the period
        let out = ex.extract("Al is old.", 0, TimeContext::default(), None);
        assert!(out.claims.is_empty());
    }

    #[test]
    fn test_function_word_entities_are_rejected() {
        let ex = extractor(StrategyKind::Pattern);
        let out = ex.extract("That Man was dead. When Edmund was rich.", 0, TimeContext::default(), None);
        assert!(out.claims.is_empty());
    }

    #[test]
    fn test_hedged_drops_uncertain_sentences() {
        let ex = extractor(StrategyKind::Hedged);
        let out = ex.extract(
            "Edmund was dead, perhaps. Isabella was poor.",
            0,
            TimeContext::default(),
            None,
        );
        // One marker leaves 0.7, which still passes
        assert_eq!(out.claims.len(), 2);
        assert!((out.claims[0].confidence - 0.7).abs() < 1e-9);

        let out = ex.extract(
            "Edmund was dead, or maybe not, perhaps. Isabella was poor?",
            0,
            TimeContext::default(),
            None,
        );
        assert!(out.claims.is_empty());
    }

    #[test]
    fn test_hedged_confidence_is_recorded() {
        let ex = extractor(StrategyKind::Hedged);
        let out = ex.extract("Edmund was dead.", 0, TimeContext::default(), None);
        assert_eq!(out.claims.len(), 1);
        assert_eq!(out.claims[0].confidence, 1.0);
    }

    #[test]
    fn test_unknown_context_by_default() {
        let ex = extractor(StrategyKind::Pattern);
        let out = ex.extract("Isabella was poor.", 0, TimeContext::default(), None);
        assert!(out.context.is_unknown());
        assert_eq!(out.claims[0].time_context, "Unknown");
    }
}
