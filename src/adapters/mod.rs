//! Adapter interfaces for external scoring models.
//!
//! The scored detector delegates all numeric judgment to two providers:
//! an embedding model (for the similarity pre-filter) and an entailment
//! model (for the contradiction verdict). Both are injected at detector
//! construction.

pub mod hashing;
pub mod tei;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export the concrete providers
pub use hashing::HashingEmbedder;
pub use tei::{TeiEmbedder, TeiEntailment};

/// Errors raised by provider calls
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} is unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    #[error("{provider} request failed: {reason}")]
    Request { provider: String, reason: String },

    #[error("{provider} returned a malformed response: {reason}")]
    MalformedResponse { provider: String, reason: String },

    #[error("{provider} returned {actual} results for {expected} inputs")]
    CountMismatch {
        provider: String,
        expected: usize,
        actual: usize,
    },
}

/// Three-way entailment scores for a premise/hypothesis pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntailmentScores {
    pub contradiction: f64,
    pub entailment: f64,
    pub neutral: f64,
}

impl EntailmentScores {
    pub fn new(contradiction: f64, entailment: f64, neutral: f64) -> Self {
        Self {
            contradiction,
            entailment,
            neutral,
        }
    }

    /// Contradiction signal: contradiction minus entailment
    pub fn delta(&self) -> f64 {
        self.contradiction - self.entailment
    }
}

/// Text embedding model
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// One vector per input text, in input order
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Fails if the model cannot serve requests
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Natural-language inference model
#[async_trait]
pub trait EntailmentProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Score `hypothesis` against `premise`
    async fn score(&self, premise: &str, hypothesis: &str)
        -> Result<EntailmentScores, ProviderError>;

    /// Fails if the model cannot serve requests
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Endpoints and limits for the providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Embedding server URL; the offline hashing embedder is used when unset
    #[serde(default)]
    pub embedding_endpoint: Option<String>,

    /// Entailment server URL; required by the scored detector
    #[serde(default)]
    pub entailment_endpoint: Option<String>,

    /// Dimensions of the offline hashing embedder (default: 384)
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// Per-request timeout in seconds (default: 60)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_embedding_dimensions() -> usize {
    384
}
fn default_timeout_seconds() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            embedding_endpoint: None,
            entailment_endpoint: None,
            embedding_dimensions: default_embedding_dimensions(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Build the configured embedding provider
    pub fn embedder(&self) -> Result<Arc<dyn EmbeddingProvider>, ProviderError> {
        match &self.embedding_endpoint {
            Some(url) => Ok(Arc::new(TeiEmbedder::new(url, self.timeout())?)),
            None => Ok(Arc::new(HashingEmbedder::new(self.embedding_dimensions))),
        }
    }

    /// Build the configured entailment provider
    pub fn juror(&self) -> Result<Arc<dyn EntailmentProvider>, ProviderError> {
        match &self.entailment_endpoint {
            Some(url) => Ok(Arc::new(TeiEntailment::new(url, self.timeout())?)),
            None => Err(ProviderError::Unavailable {
                provider: "entailment".to_string(),
                reason: "no entailment endpoint configured".to_string(),
            }),
        }
    }
}
