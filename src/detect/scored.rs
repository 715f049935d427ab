//! Two-stage detector backed by external models.
//!
//! Stage one embeds every claim and keeps only same-entity pairs whose
//! canonical sentences are similar enough to be worth judging. Stage two
//! asks the entailment model about each surviving pair and keeps those
//! whose contradiction score beats entailment by the configured margin.
//!
//! Any provider failure aborts the whole run; a partial result set is
//! never returned.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::similarity::{canonical_text, cosine_similarity};
use super::{ContradictionDetector, DetectError, DetectionConfig};
use crate::adapters::{EmbeddingProvider, EntailmentProvider};
use crate::domain::{Claim, ContradictionVerdict};

/// Similarity pre-filter plus entailment juror
pub struct SimilarityEntailmentDetector {
    config: DetectionConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    juror: Arc<dyn EntailmentProvider>,
}

impl std::fmt::Debug for SimilarityEntailmentDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityEntailmentDetector")
            .field("config", &self.config)
            .field("embedder", &self.embedder.name())
            .field("juror", &self.juror.name())
            .finish()
    }
}

impl SimilarityEntailmentDetector {
    /// Build the detector, failing fast if either provider is unusable
    pub async fn new(
        config: DetectionConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        juror: Arc<dyn EntailmentProvider>,
    ) -> Result<Self, DetectError> {
        embedder
            .health_check()
            .await
            .map_err(DetectError::Initialization)?;
        juror
            .health_check()
            .await
            .map_err(DetectError::Initialization)?;

        info!(
            embedder = embedder.name(),
            juror = juror.name(),
            similarity_threshold = config.similarity_threshold,
            contradiction_threshold = config.contradiction_threshold,
            "Initialized scored detector"
        );

        Ok(Self {
            config,
            embedder,
            juror,
        })
    }

    /// Embed every text not yet in `cache`, in batches
    async fn embed_missing(
        &self,
        texts: &[String],
        cache: &mut HashMap<String, Vec<f32>>,
    ) -> Result<(), DetectError> {
        let mut missing: Vec<String> = Vec::new();
        for text in texts {
            if !cache.contains_key(text) && !missing.contains(text) {
                missing.push(text.clone());
            }
        }

        for batch in missing.chunks(self.config.batch_size.max(1)) {
            let vectors = self
                .embedder
                .encode(batch)
                .await
                .map_err(DetectError::Embedding)?;

            if vectors.len() != batch.len() {
                return Err(DetectError::Embedding(
                    crate::adapters::ProviderError::CountMismatch {
                        provider: self.embedder.name().to_string(),
                        expected: batch.len(),
                        actual: vectors.len(),
                    },
                ));
            }

            for (text, vector) in batch.iter().zip(vectors) {
                cache.insert(text.clone(), vector);
            }
        }

        Ok(())
    }

    /// Pairs `(i, j)` with `i < j` whose embeddings are similar enough
    fn candidate_pairs(
        &self,
        texts: &[String],
        cache: &HashMap<String, Vec<f32>>,
    ) -> Result<Vec<(usize, usize)>, DetectError> {
        let vectors: Vec<&[f32]> = texts
            .iter()
            .map(|t| cache.get(t).map(Vec::as_slice).unwrap_or(&[]))
            .collect();

        let mut pairs = Vec::new();
        for i in 0..vectors.len() {
            for j in (i + 1)..vectors.len() {
                if vectors[i].len() != vectors[j].len() {
                    return Err(DetectError::DimensionMismatch {
                        left: vectors[i].len(),
                        right: vectors[j].len(),
                    });
                }
                if cosine_similarity(vectors[i], vectors[j]) >= self.config.similarity_threshold {
                    pairs.push((i, j));
                }
            }
        }
        Ok(pairs)
    }
}

/// Group by entity key in first-seen order
fn group_by_entity(claims: &[Claim]) -> Vec<(String, Vec<&Claim>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Claim>)> = Vec::new();

    for claim in claims {
        let key = claim.entity_key();
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
impl ContradictionDetector for SimilarityEntailmentDetector {
    fn name(&self) -> &str {
        "scored"
    }

    async fn detect(&self, claims: &[Claim]) -> Result<Vec<ContradictionVerdict>, DetectError> {
        info!(claims = claims.len(), "Starting scored detection");

        let groups = group_by_entity(claims);
        let mut cache: HashMap<String, Vec<f32>> = HashMap::new();
        let mut verdicts = Vec::new();

        for (entity, group) in &groups {
            if group.len() < 2 {
                continue;
            }

            let texts: Vec<String> = group.iter().map(|c| canonical_text(c)).collect();
            self.embed_missing(&texts, &mut cache).await?;

            let pairs = self.candidate_pairs(&texts, &cache)?;
            debug!(entity = %entity, claims = group.len(), candidates = pairs.len(), "Filtered pairs");

            for (i, j) in pairs {
                let scores = self
                    .juror
                    .score(&texts[i], &texts[j])
                    .await
                    .map_err(DetectError::Entailment)?;

                let delta = scores.delta();
                if delta >= self.config.contradiction_threshold {
                    verdicts.push(ContradictionVerdict::between(group[i], group[j], delta));
                }
            }
        }

        info!(
            entities = groups.len(),
            contradictions = verdicts.len(),
            "Scored detection complete"
        );
        Ok(verdicts)
    }
}
