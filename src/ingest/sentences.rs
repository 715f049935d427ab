//! Abbreviation-aware sentence scanning.
//!
//! The scanner walks the text once and breaks after `.`, `!` or `?` unless
//! the text so far ends in a known abbreviation ("Dr.", "e.g.", ...).
//! Whatever follows the last break is returned untouched as the tail, so
//! the reader can carry it into the next block without losing whitespace.

/// Abbreviations that never end a sentence
pub const ABBREVIATIONS: &[&str] = &[
    "Mr.", "Mrs.", "Dr.", "Ms.", "Prof.", "Sr.", "Jr.", "vs.", "etc.", "i.e.", "e.g.", "Inc.",
    "Ltd.",
];

/// Characters that end a sentence candidate
const TERMINATORS: &[char] = &['.', '!', '?'];

/// Closing quotes that stay with the sentence they close
const CLOSING_QUOTES: &[char] = &['"', '\'', '\u{201d}', '\u{2019}'];

/// Result of scanning one piece of text
#[derive(Debug, Default, PartialEq)]
pub struct Scan {
    /// Trimmed sentences that ended at a terminator
    pub sentences: Vec<String>,
    /// Raw text after the last terminator (may be empty)
    pub tail: String,
}

/// Whether `text` ends in one of the known abbreviations
pub fn ends_with_abbreviation(text: &str) -> bool {
    let trimmed = text.trim_end();
    ABBREVIATIONS.iter().any(|abbrev| trimmed.ends_with(abbrev))
}

/// Split `text` into sentence candidates plus the unterminated tail.
///
/// A run of terminators ("?!", "...") breaks once, after its last
/// character, and closing quotes right after it stay in the sentence. A
/// terminator glued to a following letter or digit ("i.e", "3.5") does
/// not break.
pub fn scan(text: &str) -> Scan {
    let mut scan = Scan::default();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !TERMINATORS.contains(&ch) {
            continue;
        }

        let mut end = idx + ch.len_utf8();
        while let Some(&(quote_idx, quote)) = chars.peek() {
            if !CLOSING_QUOTES.contains(&quote) {
                break;
            }
            end = quote_idx + quote.len_utf8();
            chars.next();
        }

        match chars.peek() {
            Some((_, next)) if TERMINATORS.contains(next) || next.is_alphanumeric() => continue,
            _ => {}
        }

        let current = &text[start..end];

        // A lone terminator is not a sentence yet
        if current.trim().chars().count() <= 1 {
            continue;
        }
        if ends_with_abbreviation(current) {
            continue;
        }

        scan.sentences.push(current.trim().to_string());
        start = end;
    }

    scan.tail = text[start..].to_string();
    scan
}
