//! HTTP clients for text-embeddings-inference style model servers.
//!
//! Endpoints:
//! - `GET  /health`
//! - `POST /embed   {"inputs": [text, ...]}`      -> `[[f32, ...], ...]`
//! - `POST /predict {"inputs": [[premise, hyp]]}` -> `[{"label", "score"}, ...]`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{EmbeddingProvider, EntailmentProvider, EntailmentScores, ProviderError};

fn build_client(provider: &str, timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Unavailable {
            provider: provider.to_string(),
            reason: e.to_string(),
        })
}

async fn check_health(
    client: &reqwest::Client,
    provider: &str,
    base: &str,
) -> Result<(), ProviderError> {
    let unavailable = |reason: String| ProviderError::Unavailable {
        provider: provider.to_string(),
        reason,
    };

    let response = client
        .get(format!("{}/health", base))
        .send()
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(unavailable(format!("health check returned {}", status)))
    }
}

async fn post_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    provider: &str,
    url: String,
    body: &serde_json::Value,
) -> Result<T, ProviderError> {
    let request_failed = |reason: String| ProviderError::Request {
        provider: provider.to_string(),
        reason,
    };

    let response = client
        .post(&url)
        .json(body)
        .send()
        .await
        .map_err(|e| request_failed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(request_failed(format!("{} ({})", status, text)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::MalformedResponse {
            provider: provider.to_string(),
            reason: e.to_string(),
        })
}

/// Embedding model served over HTTP
pub struct TeiEmbedder {
    base_url: String,
    client: reqwest::Client,
}

impl TeiEmbedder {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client("tei-embed", timeout)?,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for TeiEmbedder {
    fn name(&self) -> &str {
        "tei-embed"
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({ "inputs": texts });
        let vectors: Vec<Vec<f32>> = post_json(
            &self.client,
            self.name(),
            format!("{}/embed", self.base_url),
            &body,
        )
        .await?;

        if vectors.len() != texts.len() {
            return Err(ProviderError::CountMismatch {
                provider: self.name().to_string(),
                expected: texts.len(),
                actual: vectors.len(),
            });
        }

        debug!(count = vectors.len(), "Encoded batch");
        Ok(vectors)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        check_health(&self.client, self.name(), &self.base_url).await
    }
}

/// One label/score entry of a classifier response
#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// `/predict` answers with a flat list for one input or a nested list per input
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictResponse {
    Single(Vec<LabelScore>),
    Batch(Vec<Vec<LabelScore>>),
}

impl PredictResponse {
    fn into_first(self) -> Vec<LabelScore> {
        match self {
            PredictResponse::Single(scores) => scores,
            PredictResponse::Batch(mut batch) => {
                if batch.is_empty() {
                    Vec::new()
                } else {
                    batch.swap_remove(0)
                }
            }
        }
    }
}

fn find_label(provider: &str, scores: &[LabelScore], label: &str) -> Result<f64, ProviderError> {
    scores
        .iter()
        .find(|s| s.label.eq_ignore_ascii_case(label))
        .map(|s| s.score)
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider: provider.to_string(),
            reason: format!("missing '{}' label", label),
        })
}

fn into_scores(provider: &str, scores: &[LabelScore]) -> Result<EntailmentScores, ProviderError> {
    Ok(EntailmentScores::new(
        find_label(provider, scores, "contradiction")?,
        find_label(provider, scores, "entailment")?,
        find_label(provider, scores, "neutral")?,
    ))
}

/// Entailment classifier served over HTTP
pub struct TeiEntailment {
    base_url: String,
    client: reqwest::Client,
}

impl TeiEntailment {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client("tei-nli", timeout)?,
        })
    }
}

#[async_trait]
impl EntailmentProvider for TeiEntailment {
    fn name(&self) -> &str {
        "tei-nli"
    }

    async fn score(
        &self,
        premise: &str,
        hypothesis: &str,
    ) -> Result<EntailmentScores, ProviderError> {
        let body = serde_json::json!({ "inputs": [[premise, hypothesis]] });
        let response: PredictResponse = post_json(
            &self.client,
            self.name(),
            format!("{}/predict", self.base_url),
            &body,
        )
        .await?;

        into_scores(self.name(), &response.into_first())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        check_health(&self.client, self.name(), &self.base_url).await
    }
}
