//! Vector similarity and canonical claim rendering.

use crate::domain::Claim;

/// Render a claim as the sentence handed to the providers.
///
/// `"<entity> <attribute> <value>[ in <time_context>]"`, with the time
/// context left out when it is unknown.
pub fn canonical_text(claim: &Claim) -> String {
    if claim.has_time_context() {
        format!(
            "{} {} {} in {}",
            claim.entity, claim.attribute, claim.value, claim.time_context
        )
    } else {
        format!("{} {} {}", claim.entity, claim.attribute, claim.value)
    }
}

/// Cosine similarity in [-1, 1].
///
/// Zero when either vector has no magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
