//! Penalty-based extraction confidence.
//!
//! Starts at 1.0 and subtracts a fixed penalty for every occurrence of a
//! hedging word or metaphor marker, plus one for a trailing question mark.

use std::sync::LazyLock;

use regex::Regex;

/// Fixed confidence for plain pattern extraction
pub const PATTERN_CONFIDENCE: f64 = 0.8;

pub const UNCERTAINTY_PENALTY: f64 = 0.3;
pub const METAPHOR_PENALTY: f64 = 0.4;
pub const QUESTION_PENALTY: f64 = 0.5;

static UNCERTAINTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(maybe|perhaps|possibly|might|could|seemed)\b")
        .expect("uncertainty pattern must compile")
});

static METAPHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(like|as\s+if|metaphorically|figuratively)\b")
        .expect("metaphor pattern must compile")
});

/// Score a sentence; the result is always within [0, 1]
pub fn hedged_confidence(sentence: &str) -> f64 {
    let uncertain = UNCERTAINTY_RE.find_iter(sentence).count() as f64;
    let metaphoric = METAPHOR_RE.find_iter(sentence).count() as f64;
    let question = if sentence.trim_end().ends_with('?') {
        QUESTION_PENALTY
    } else {
        0.0
    };

    let confidence =
        1.0 - uncertain * UNCERTAINTY_PENALTY - metaphoric * METAPHOR_PENALTY - question;
    confidence.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_plain_sentence_is_certain() {
        assert!(approx(hedged_confidence("Lord Edmund was dead."), 1.0));
    }

    #[test]
    fn test_each_occurrence_is_penalized() {
        assert!(approx(hedged_confidence("Edmund was perhaps dead."), 0.7));
        assert!(approx(
            hedged_confidence("Perhaps Edmund was dead, perhaps not."),
            0.4
        ));
    }

    #[test]
    fn test_metaphor_markers() {
        assert!(approx(hedged_confidence("He was dead, as if turned to stone."), 0.6));
        // "likely" is not "like"
        assert!(approx(hedged_confidence("He was likely rich."), 1.0));
    }

    #[test]
    fn test_question_penalty() {
        assert!(approx(hedged_confidence("Was Edmund dead?"), 0.5));
    }

    #[test]
    fn test_clamped_at_zero() {
        let sentence = "Maybe, perhaps, possibly he might be like a ghost?";
        assert_eq!(hedged_confidence(sentence), 0.0);
    }
}
