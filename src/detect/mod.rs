//! Contradiction detection over a complete claim set.
//!
//! Two interchangeable detectors share the [`ContradictionDetector`] seam:
//! - [`RuleBasedDetector`]: opposition table, no external services
//! - [`SimilarityEntailmentDetector`]: embedding pre-filter plus NLI juror

pub mod rules;
pub mod scored;
pub mod similarity;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::{EmbeddingProvider, EntailmentProvider, ProviderError};
use crate::domain::{Claim, ContradictionVerdict};

pub use rules::{opposes, RuleBasedDetector, OPPOSING_PAIRS};
pub use scored::SimilarityEntailmentDetector;
pub use similarity::{canonical_text, cosine_similarity};

/// Errors raised during detection
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Embedding failed: {0}")]
    Embedding(#[source] ProviderError),

    #[error("Entailment scoring failed: {0}")]
    Entailment(#[source] ProviderError),

    #[error("Detector initialization failed: {0}")]
    Initialization(#[source] ProviderError),

    #[error("Embedding dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Configured for the {configured:?} detector but given {given:?}")]
    StrategyMismatch {
        configured: DetectorKind,
        given: DetectorKind,
    },
}

/// Which detector the front end should build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    #[default]
    Rules,
    Scored,
}

impl std::str::FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rules" => Ok(DetectorKind::Rules),
            "scored" => Ok(DetectorKind::Scored),
            other => Err(format!("Unknown detector '{}': expected rules or scored", other)),
        }
    }
}

/// Thresholds and batching for detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Detector to run (default: rules)
    #[serde(default)]
    pub strategy: DetectorKind,

    /// Minimum delta for a verdict (default: 0.5)
    #[serde(default = "default_contradiction_threshold")]
    pub contradiction_threshold: f64,

    /// Minimum cosine similarity for a candidate pair (default: 0.6)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Texts per embedding request (default: 16)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_contradiction_threshold() -> f64 {
    0.5
}
fn default_similarity_threshold() -> f64 {
    0.6
}
fn default_batch_size() -> usize {
    16
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            strategy: DetectorKind::default(),
            contradiction_threshold: default_contradiction_threshold(),
            similarity_threshold: default_similarity_threshold(),
            batch_size: default_batch_size(),
        }
    }
}

/// A contradiction detector
#[async_trait]
pub trait ContradictionDetector: Send + Sync {
    /// Human-readable detector name
    fn name(&self) -> &str;

    /// Verdicts for every contradicting pair in `claims`
    async fn detect(&self, claims: &[Claim]) -> Result<Vec<ContradictionVerdict>, DetectError>;
}

/// Detector selection with its collaborators
#[derive(Clone)]
pub enum Strategy {
    Rules,
    Scored {
        embedder: Arc<dyn EmbeddingProvider>,
        juror: Arc<dyn EntailmentProvider>,
    },
}

impl Strategy {
    pub fn kind(&self) -> DetectorKind {
        match self {
            Strategy::Rules => DetectorKind::Rules,
            Strategy::Scored { .. } => DetectorKind::Scored,
        }
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Rules => write!(f, "Rules"),
            Strategy::Scored { embedder, juror } => f
                .debug_struct("Scored")
                .field("embedder", &embedder.name())
                .field("juror", &juror.name())
                .finish(),
        }
    }
}

/// Run one detection pass.
///
/// The rule-based detector ignores both thresholds. The scored detector
/// uses `threshold` for the delta cut and `similarity_threshold` (or the
/// default) for the pre-filter.
pub async fn detect(
    claims: &[Claim],
    strategy: &Strategy,
    threshold: f64,
    similarity_threshold: Option<f64>,
) -> Result<Vec<ContradictionVerdict>, DetectError> {
    detect_with(
        claims,
        strategy,
        DetectionConfig {
            strategy: strategy.kind(),
            contradiction_threshold: threshold,
            similarity_threshold: similarity_threshold.unwrap_or_else(default_similarity_threshold),
            ..Default::default()
        },
    )
    .await
}

/// Run one detection pass with a full configuration.
///
/// `config.strategy` must name the same detector as `strategy`.
pub async fn detect_with(
    claims: &[Claim],
    strategy: &Strategy,
    config: DetectionConfig,
) -> Result<Vec<ContradictionVerdict>, DetectError> {
    if config.strategy != strategy.kind() {
        return Err(DetectError::StrategyMismatch {
            configured: config.strategy,
            given: strategy.kind(),
        });
    }

    match strategy {
        Strategy::Rules => RuleBasedDetector::new().detect(claims).await,
        Strategy::Scored { embedder, juror } => {
            let detector =
                SimilarityEntailmentDetector::new(config, embedder.clone(), juror.clone()).await?;
            detector.detect(claims).await
        }
    }
}
