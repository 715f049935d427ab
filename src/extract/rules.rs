//! Extraction rule tables.
//!
//! Each rule is a regex over one sentence. The entity phrase is matched
//! case-sensitively (capitalized words), the copula and state words
//! case-insensitively. A rule either captures its value or implies a
//! fixed one ("died" means `alive = dead`).

use std::sync::LazyLock;

use regex::Regex;

/// One or more capitalized words
const ENTITY: &str = r"\b([A-Z][A-Za-z'\-]+(?:[ \t]+[A-Z][A-Za-z'\-]+)*)";

/// Linking verb between entity and adjective
const COPULA: &str = r"(?i:was|is|were)";

/// Words that cannot open an entity phrase
const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "it", "he", "she", "they", "what",
    "when", "where",
];

/// Where a rule gets its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleValue {
    /// Second capture group, lowercased
    Captured,
    /// Implied by the verb itself
    Fixed(&'static str),
}

/// A single extraction rule
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub attribute: &'static str,
    pub value: RuleValue,
    pattern: Regex,
}

impl Rule {
    fn adjective(name: &'static str, attribute: &'static str, adjectives: &str) -> Self {
        let pattern = format!(r"{}\s+{}\s+(?i:({}))\b", ENTITY, COPULA, adjectives);
        Self {
            name,
            attribute,
            value: RuleValue::Captured,
            pattern: Regex::new(&pattern).expect("adjective rule must compile"),
        }
    }

    fn implicit(
        name: &'static str,
        verbs: &str,
        attribute: &'static str,
        value: &'static str,
    ) -> Self {
        let pattern = format!(r"{}\s+(?i:{})\b", ENTITY, verbs);
        Self {
            name,
            attribute,
            value: RuleValue::Fixed(value),
            pattern: Regex::new(&pattern).expect("implicit rule must compile"),
        }
    }

    /// All `(entity, attribute, value)` candidates in `sentence`
    pub fn apply(&self, sentence: &str) -> Vec<Candidate> {
        self.pattern
            .captures_iter(sentence)
            .filter_map(|caps| {
                let entity = caps.get(1)?.as_str().trim().to_string();
                let value = match self.value {
                    RuleValue::Captured => caps.get(2)?.as_str().trim().to_lowercase(),
                    RuleValue::Fixed(value) => value.to_string(),
                };
                Some(Candidate {
                    entity,
                    attribute: self.attribute.to_string(),
                    value,
                    rule: self.name,
                })
            })
            .collect()
    }
}

/// An unscored fact found by a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entity: String,
    pub attribute: String,
    pub value: String,
    /// Name of the rule that produced it
    pub rule: &'static str,
}

/// Copula and death rules shared by every strategy
pub static STATE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::adjective("alive", "alive", "alive|dead|living"),
        Rule::implicit("died", "died|perished", "alive", "dead"),
        Rule::adjective("wealth", "wealth", "wealthy|rich|poor|destitute"),
        Rule::adjective("age", "age", "young|old|aged"),
        Rule::adjective("marital_status", "marital_status", "married|single|widowed"),
    ]
});

/// Additional state-verb rules
pub static VERB_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::implicit("killed", r"(?:was|were)\s+(?:killed|slain|murdered)", "alive", "dead"),
        Rule::implicit("married", "married", "marital_status", "married"),
        Rule::adjective("presence", "presence", "present|absent"),
        Rule::implicit("left", "left|departed", "presence", "absent"),
        Rule::implicit("arrived", "arrived|returned", "presence", "present"),
    ]
});

/// Whether a captured phrase is plausibly a name
pub fn is_likely_name(entity: &str, max_chars: usize) -> bool {
    let Some(first_char) = entity.chars().next() else {
        return false;
    };
    if !first_char.is_uppercase() {
        return false;
    }

    let first_word = entity.split_whitespace().next().unwrap_or_default();
    if FUNCTION_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(first_word))
    {
        return false;
    }

    entity.chars().count() <= max_chars
}
