//! Atomic claims extracted from narrative text.
//!
//! A claim is the `<entity, attribute, value, time_context>` tuple plus the
//! provenance needed to audit it. The JSON shape of [`Claim`] is the
//! claims.jsonl line format and must keep exactly these seven fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel used before any temporal marker has been seen
pub const UNKNOWN_TIME_CONTEXT: &str = "Unknown";

/// An atomic factual assertion about an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Character or object name, as extracted
    pub entity: String,

    /// Property being asserted (e.g. "alive", "wealth")
    pub attribute: String,

    /// Asserted state (e.g. "dead", "wealthy")
    pub value: String,

    /// Narrative-time marker the claim holds under
    pub time_context: String,

    /// Verbatim originating sentence
    pub source_text: String,

    /// Index of the chunk the claim came from
    pub chunk_id: u64,

    /// Extraction confidence in [0, 1]
    pub confidence: f64,
}

impl Claim {
    /// Entity key used for grouping: lowercased and trimmed
    pub fn entity_key(&self) -> String {
        self.entity.trim().to_lowercase()
    }

    /// Value key used for deduplication: lowercased and trimmed
    pub fn value_key(&self) -> String {
        self.value.trim().to_lowercase()
    }

    /// Whether the claim carries a real time context
    pub fn has_time_context(&self) -> bool {
        self.time_context != UNKNOWN_TIME_CONTEXT
    }
}

/// Narrative time carried from one chunk to the next.
///
/// Extraction takes the previous context in and hands the (possibly
/// updated) context back, so no extractor holds it between calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeContext(String);

impl TimeContext {
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_TIME_CONTEXT.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_TIME_CONTEXT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TimeContext {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for TimeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
