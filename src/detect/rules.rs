//! Deterministic opposition-table detector.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{ContradictionDetector, DetectError};
use crate::domain::{Claim, ContradictionVerdict};

/// Value pairs that cannot both hold for one entity attribute
pub const OPPOSING_PAIRS: &[(&str, &str)] = &[
    ("alive", "dead"),
    ("rich", "poor"),
    ("married", "single"),
    ("present", "absent"),
    ("young", "old"),
];

/// Whether two values sit on opposite sides of an opposing pair.
///
/// Matching is by substring: a value opposes another when it contains one
/// member of a pair and the other value contains the other member. Equal
/// values (after trimming and lowercasing) never oppose.
pub fn opposes(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return false;
    }

    OPPOSING_PAIRS.iter().any(|(left, right)| {
        (a.contains(left) && b.contains(right)) || (a.contains(right) && b.contains(left))
    })
}

/// Flags opposing values of the same entity attribute, always with delta 1.0
#[derive(Debug, Default, Clone)]
pub struct RuleBasedDetector;

impl RuleBasedDetector {
    pub fn new() -> Self {
        Self
    }

    /// Run the opposition check; never fails
    pub fn scan(&self, claims: &[Claim]) -> Vec<ContradictionVerdict> {
        info!(claims = claims.len(), "Starting rule-based detection");

        let mut verdicts = Vec::new();
        for ((entity, attribute), group) in group_by_entity_attribute(claims) {
            if group.len() < 2 {
                continue;
            }

            // First claim seen for each distinct value represents it
            let mut seen: Vec<(String, &Claim)> = Vec::new();
            for claim in group {
                let key = claim.value_key();
                if !seen.iter().any(|(v, _)| *v == key) {
                    seen.push((key, claim));
                }
            }

            let before = verdicts.len();
            for i in 0..seen.len() {
                for j in (i + 1)..seen.len() {
                    let (left_value, left) = &seen[i];
                    let (right_value, right) = &seen[j];
                    if opposes(left_value, right_value) {
                        verdicts.push(ContradictionVerdict::between(left, right, 1.0));
                    }
                }
            }

            debug!(
                entity = %entity,
                attribute = %attribute,
                values = seen.len(),
                found = verdicts.len() - before,
                "Checked attribute"
            );
        }

        info!(contradictions = verdicts.len(), "Rule-based detection complete");
        verdicts
    }
}

/// Group by `(entity key, lowercase attribute)` in first-seen order
fn group_by_entity_attribute(claims: &[Claim]) -> Vec<((String, String), Vec<&Claim>)> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<((String, String), Vec<&Claim>)> = Vec::new();

    for claim in claims {
        let key = (claim.entity_key(), claim.attribute.trim().to_lowercase());
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(claim),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![claim]));
            }
        }
    }

    groups
}

#[async_trait]
impl ContradictionDetector for RuleBasedDetector {
    fn name(&self) -> &str {
        "rules"
    }

    async fn detect(&self, claims: &[Claim]) -> Result<Vec<ContradictionVerdict>, DetectError> {
        Ok(self.scan(claims))
    }
}
