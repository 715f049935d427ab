//! Narrative time markers ("Chapter 5", "Act II").

use regex::Regex;

/// Default keywords, tried in this order
pub fn default_keywords() -> Vec<String> {
    ["chapter", "act", "scene", "part", "book", "section"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// Finds the first temporal marker in a chunk
#[derive(Debug, Clone)]
pub struct TemporalDetector {
    /// (title-cased keyword, pattern) in priority order
    patterns: Vec<(String, Regex)>,
}

impl TemporalDetector {
    pub fn new(keywords: &[String]) -> Result<Self, regex::Error> {
        let patterns = keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|keyword| {
                let keyword = keyword.trim();
                let pattern = Regex::new(&format!(
                    r"(?i)\b{}\s+([IVX\d]+)\b",
                    regex::escape(keyword)
                ))?;
                Ok((title_case(keyword), pattern))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { patterns })
    }

    /// Return `"<Keyword> <numeral>"` for the first keyword that matches
    pub fn detect(&self, text: &str) -> Option<String> {
        self.patterns.iter().find_map(|(keyword, pattern)| {
            pattern
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|numeral| format!("{} {}", keyword, numeral.as_str()))
        })
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
