//! Contradiction Detection Integration Tests
//!
//! Tests for both detectors through the public `detect` entry point,
//! with synthetic embedding and entailment providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use contradict::adapters::{
    EmbeddingProvider, EntailmentProvider, EntailmentScores, ProviderError,
};
use contradict::detect::{
    detect, detect_with, opposes, DetectError, DetectionConfig, DetectorKind, Strategy,
    OPPOSING_PAIRS,
};
use contradict::{Claim, Verdict};
use proptest::prelude::*;

fn claim(entity: &str, attribute: &str, value: &str, time_context: &str) -> Claim {
    Claim {
        entity: entity.to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
        time_context: time_context.to_string(),
        source_text: format!("{} was {}.", entity, value),
        chunk_id: 0,
        confidence: 0.8,
    }
}

/// Two fixed unit vectors with cosine similarity 0.9
struct FixedEmbedder;

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts
            .iter()
            .map(|t| {
                if t.contains("alive alive") {
                    vec![1.0, 0.0]
                } else {
                    vec![0.9, 0.435_889_9]
                }
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Same vector for every text
struct ConstantEmbedder;

#[async_trait]
impl EmbeddingProvider for ConstantEmbedder {
    fn name(&self) -> &str {
        "constant"
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts.iter().map(|_| vec![0.6, 0.8]).collect())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Constant vectors, remembering the size of every batch
#[derive(Default)]
struct RecordingEmbedder {
    batches: Mutex<Vec<usize>>,
}

impl RecordingEmbedder {
    fn batches(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for RecordingEmbedder {
    fn name(&self) -> &str {
        "recording"
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.batches.lock().unwrap().push(texts.len());
        Ok(texts.iter().map(|_| vec![0.6, 0.8]).collect())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Returns one score triple for every pair and counts calls
struct FixedJuror {
    scores: EntailmentScores,
    calls: AtomicUsize,
}

impl FixedJuror {
    fn new(contradiction: f64, entailment: f64, neutral: f64) -> Arc<Self> {
        Arc::new(Self {
            scores: EntailmentScores::new(contradiction, entailment, neutral),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntailmentProvider for FixedJuror {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn score(&self, _: &str, _: &str) -> Result<EntailmentScores, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Fails the second scoring call
struct FlakyJuror {
    calls: AtomicUsize,
}

#[async_trait]
impl EntailmentProvider for FlakyJuror {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn score(&self, _: &str, _: &str) -> Result<EntailmentScores, ProviderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 1 {
            return Err(ProviderError::Request {
                provider: "flaky".to_string(),
                reason: "connection reset".to_string(),
            });
        }
        Ok(EntailmentScores::new(0.9, 0.05, 0.05))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

struct DownJuror;

#[async_trait]
impl EntailmentProvider for DownJuror {
    fn name(&self) -> &str {
        "down"
    }

    async fn score(&self, _: &str, _: &str) -> Result<EntailmentScores, ProviderError> {
        panic!("scoring must not start when the model is down");
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Err(ProviderError::Unavailable {
            provider: "down".to_string(),
            reason: "model failed to load".to_string(),
        })
    }
}

fn scored(juror: Arc<dyn EntailmentProvider>) -> Strategy {
    Strategy::Scored {
        embedder: Arc::new(FixedEmbedder),
        juror,
    }
}

#[tokio::test]
async fn test_rules_alive_dead() {
    let claims = vec![
        claim("Lord Edmund", "alive", "alive", "Ch1"),
        claim("Lord Edmund", "alive", "dead", "Ch5"),
    ];

    let verdicts = detect(&claims, &Strategy::Rules, 0.5, None).await.unwrap();

    assert_eq!(verdicts.len(), 1);
    assert_eq!(
        verdicts[0].values,
        ("alive".to_string(), "dead".to_string())
    );
    assert_eq!(verdicts[0].delta, 1.0);
    assert_eq!(verdicts[0].verdict, Verdict::Contradiction);
}

#[tokio::test]
async fn test_rules_rich_poor() {
    let claims = vec![
        claim("Isabella", "wealth", "poor", "Ch2"),
        claim("Isabella", "wealth", "rich", "Ch8"),
    ];

    let verdicts = detect(&claims, &Strategy::Rules, 0.5, None).await.unwrap();

    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].delta, 1.0);
    assert_eq!(verdicts[0].locations, ("Ch2".to_string(), "Ch8".to_string()));
}

#[tokio::test]
async fn test_no_claims_no_verdicts() {
    let juror = FixedJuror::new(0.9, 0.0, 0.1);

    assert!(detect(&[], &Strategy::Rules, 0.5, None).await.unwrap().is_empty());
    assert!(detect(&[], &scored(juror.clone()), 0.5, Some(0.6))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(juror.calls(), 0);
}

#[tokio::test]
async fn test_scored_emits_above_threshold() {
    let claims = vec![
        claim("Lord Edmund", "alive", "alive", "Unknown"),
        claim("Lord Edmund", "alive", "dead", "Unknown"),
    ];
    let juror = FixedJuror::new(0.8, 0.1, 0.1);

    let verdicts = detect(&claims, &scored(juror.clone()), 0.5, Some(0.6))
        .await
        .unwrap();

    assert_eq!(juror.calls(), 1);
    assert_eq!(verdicts.len(), 1);
    assert!((verdicts[0].delta - 0.7).abs() < 1e-9);
    assert_eq!(
        verdicts[0].values,
        ("alive".to_string(), "dead".to_string())
    );
}

#[tokio::test]
async fn test_scored_drops_below_threshold() {
    let claims = vec![
        claim("Lord Edmund", "alive", "alive", "Unknown"),
        claim("Lord Edmund", "alive", "dead", "Unknown"),
    ];
    let juror = FixedJuror::new(0.5, 0.2, 0.3);

    let verdicts = detect(&claims, &scored(juror.clone()), 0.5, Some(0.6))
        .await
        .unwrap();

    assert_eq!(juror.calls(), 1);
    assert!(verdicts.is_empty());
}

#[tokio::test]
async fn test_similarity_filter_bounds_juror_calls() {
    let claims = vec![
        claim("Lord Edmund", "alive", "alive", "Unknown"),
        claim("Lord Edmund", "alive", "dead", "Unknown"),
    ];
    let juror = FixedJuror::new(0.9, 0.0, 0.1);

    // 0.9 similarity does not reach a 0.95 cut, so the juror is never asked
    let verdicts = detect(&claims, &scored(juror.clone()), 0.5, Some(0.95))
        .await
        .unwrap();

    assert!(verdicts.is_empty());
    assert_eq!(juror.calls(), 0);
}

#[tokio::test]
async fn test_scored_failure_is_fatal() {
    let claims = vec![
        claim("Lord Edmund", "alive", "alive", "Unknown"),
        claim("Lord Edmund", "alive", "dead", "Unknown"),
        claim("Lord Edmund", "alive", "living", "Unknown"),
    ];
    let strategy = Strategy::Scored {
        embedder: Arc::new(ConstantEmbedder),
        juror: Arc::new(FlakyJuror {
            calls: AtomicUsize::new(0),
        }),
    };

    let result = detect(&claims, &strategy, 0.5, Some(0.6)).await;
    assert!(matches!(result, Err(DetectError::Entailment(_))));
}

#[tokio::test]
async fn test_unavailable_provider_fails_before_detection() {
    let claims = vec![
        claim("Lord Edmund", "alive", "alive", "Unknown"),
        claim("Lord Edmund", "alive", "dead", "Unknown"),
    ];
    let strategy = Strategy::Scored {
        embedder: Arc::new(FixedEmbedder),
        juror: Arc::new(DownJuror),
    };

    let result = detect(&claims, &strategy, 0.5, None).await;
    assert!(matches!(result, Err(DetectError::Initialization(_))));
}

#[tokio::test]
async fn test_detect_with_small_batches() {
    let claims: Vec<Claim> = ["alive", "dead", "living", "dead", "alive"]
        .iter()
        .enumerate()
        .map(|(i, v)| claim("Edmund", "alive", v, &format!("Chapter {}", i + 1)))
        .collect();
    let embedder = Arc::new(RecordingEmbedder::default());
    let juror = FixedJuror::new(0.9, 0.0, 0.1);
    let strategy = Strategy::Scored {
        embedder: embedder.clone(),
        juror: juror.clone(),
    };
    let config = DetectionConfig {
        strategy: DetectorKind::Scored,
        batch_size: 2,
        ..Default::default()
    };

    let verdicts = detect_with(&claims, &strategy, config).await.unwrap();

    // Five distinct canonical texts in batches of two
    assert_eq!(embedder.batches(), vec![2, 2, 1]);
    // Every one of the 10 pairs is similar and judged contradictory
    assert_eq!(juror.calls(), 10);
    assert_eq!(verdicts.len(), 10);
}

#[tokio::test]
async fn test_repeated_texts_are_embedded_once() {
    let claims: Vec<Claim> = ["alive", "dead", "living", "dead", "alive"]
        .iter()
        .map(|v| claim("Edmund", "alive", v, "Unknown"))
        .collect();
    let embedder = Arc::new(RecordingEmbedder::default());
    let strategy = Strategy::Scored {
        embedder: embedder.clone(),
        juror: FixedJuror::new(0.9, 0.0, 0.1),
    };
    let config = DetectionConfig {
        strategy: DetectorKind::Scored,
        batch_size: 2,
        ..Default::default()
    };

    detect_with(&claims, &strategy, config).await.unwrap();

    // Only alive, dead and living reach the provider
    assert_eq!(embedder.batches(), vec![2, 1]);
}

fn run<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn table_word() -> impl proptest::strategy::Strategy<Value = String> {
    let words: Vec<String> = OPPOSING_PAIRS
        .iter()
        .flat_map(|(a, b)| [a.to_string(), b.to_string()])
        .collect();
    prop_oneof![prop::sample::select(words), "[a-z ]{0,10}"]
}

proptest! {
    #[test]
    fn opposition_is_symmetric(a in table_word(), b in table_word()) {
        prop_assert_eq!(opposes(&a, &b), opposes(&b, &a));
    }

    #[test]
    fn equal_values_never_oppose(a in table_word()) {
        prop_assert!(!opposes(&a, &a));
        prop_assert!(!opposes(&a, &a.to_uppercase()));
    }

    #[test]
    fn single_claim_entities_yield_nothing(
        values in prop::collection::vec(table_word(), 0..12),
    ) {
        // Every claim gets its own entity
        let claims: Vec<Claim> = values
            .iter()
            .enumerate()
            .map(|(i, v)| claim(&format!("Person{}", i), "alive", v, "Unknown"))
            .collect();

        let juror = FixedJuror::new(1.0, 0.0, 0.0);
        let strategy = Strategy::Scored {
            embedder: Arc::new(ConstantEmbedder),
            juror: juror.clone(),
        };

        let rules = run(detect(&claims, &Strategy::Rules, 0.5, None)).unwrap();
        let scored = run(detect(&claims, &strategy, 0.0, Some(-1.0))).unwrap();

        prop_assert!(rules.is_empty());
        prop_assert!(scored.is_empty());
        prop_assert_eq!(juror.calls(), 0);
    }
}
