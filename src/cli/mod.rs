//! Command-line interface for contradict.
//!
//! Provides commands for analyzing a document end to end, extracting
//! and storing claims, running detection over stored claims, and showing
//! the resolved configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::{self, ResolvedConfig};
use crate::core::{extract_file, read_jsonl, ClaimStore};
use crate::detect::{self, DetectorKind, Strategy};
use crate::domain::{Claim, ContradictionVerdict};
use crate::extract::ClaimExtractor;

pub mod output;

pub use output::OutputFormat;

/// contradict - Narrative contradiction detection for long-form text
#[derive(Parser, Debug)]
#[command(name = "contradict")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "debug")
    #[arg(long, global = true, env = "CONTRADICT_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Detection flags shared by `analyze` and `detect`
#[derive(clap::Args, Debug, Clone)]
pub struct DetectArgs {
    /// Detector: rules or scored
    #[arg(short, long)]
    pub strategy: Option<DetectorKind>,

    /// Minimum contradiction delta for a verdict
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Minimum cosine similarity for a candidate pair (scored only)
    #[arg(long)]
    pub similarity_threshold: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract claims from a document and report contradictions
    Analyze {
        /// Text document to analyze
        #[arg(short, long)]
        input: PathBuf,

        /// Use previously stored claims for this document when present
        #[arg(long)]
        reuse_claims: bool,

        #[command(flatten)]
        detect: DetectArgs,
    },

    /// Extract claims from a document and store them
    Extract {
        /// Text document to read
        #[arg(short, long)]
        input: PathBuf,

        /// Print claims as JSONL instead of the stored file path
        #[arg(long)]
        stdout: bool,
    },

    /// Report contradictions in a stored claims file
    Detect {
        /// Claims file (JSONL)
        #[arg(short, long)]
        claims: PathBuf,

        #[command(flatten)]
        detect: DetectArgs,
    },

    /// Show resolved configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let mut cfg = config::load_config()?;

        match self.command {
            Commands::Analyze {
                input,
                reuse_claims,
                detect: args,
            } => {
                apply_detect_args(&mut cfg, &args);
                analyze(&cfg, &input, reuse_claims, args.output).await
            }
            Commands::Extract { input, stdout } => extract(&cfg, &input, stdout).await,
            Commands::Detect {
                claims,
                detect: args,
            } => {
                apply_detect_args(&mut cfg, &args);
                detect_stored(&cfg, &claims, args.output).await
            }
            Commands::Config => show_config(&cfg),
        }
    }
}

/// Flags win over file and environment settings
fn apply_detect_args(cfg: &mut ResolvedConfig, args: &DetectArgs) {
    let detection = &mut cfg.engine.detection;
    if let Some(kind) = args.strategy {
        detection.strategy = kind;
    }
    if let Some(threshold) = args.threshold {
        detection.contradiction_threshold = threshold;
    }
    if let Some(similarity) = args.similarity_threshold {
        detection.similarity_threshold = similarity;
    }
}

/// Build the detector collaborators named in configuration
fn build_strategy(cfg: &ResolvedConfig) -> Result<Strategy> {
    match cfg.engine.detection.strategy {
        DetectorKind::Rules => Ok(Strategy::Rules),
        DetectorKind::Scored => {
            let providers = &cfg.engine.providers;
            let embedder = providers
                .embedder()
                .context("Failed to build embedding provider")?;
            let juror = providers
                .juror()
                .context("Failed to build entailment provider (set CONTRADICT_ENTAILMENT_URL)")?;
            Ok(Strategy::Scored { embedder, juror })
        }
    }
}

/// Stable key for a document: its canonical path when it resolves
fn document_path(input: &Path) -> PathBuf {
    input.canonicalize().unwrap_or_else(|_| input.to_path_buf())
}

/// Validate, extract and store the claims of `input` on the blocking pool
async fn extract_and_store(
    cfg: &ResolvedConfig,
    input: &Path,
    store: &ClaimStore,
) -> Result<Vec<Claim>> {
    let (cfg, input, store) = (cfg.clone(), input.to_path_buf(), store.clone());
    tokio::task::spawn_blocking(move || extract_and_store_blocking(&cfg, &input, &store))
        .await
        .context("Extraction task failed")?
}

fn extract_and_store_blocking(
    cfg: &ResolvedConfig,
    input: &Path,
    store: &ClaimStore,
) -> Result<Vec<Claim>> {
    let size = cfg
        .engine
        .limits
        .validate_path(input)
        .with_context(|| format!("Rejected input: {}", input.display()))?;
    info!(path = %input.display(), bytes = size, "Accepted input");

    let extractor = ClaimExtractor::new(&cfg.engine.extraction)
        .context("Invalid temporal keyword in configuration")?;
    let claims = extract_file(input, &cfg.engine.reader, &extractor)
        .with_context(|| format!("Failed to read input: {}", input.display()))?;

    store
        .save_claims(&claims, &document_path(input))
        .context("Failed to save claims")?;

    Ok(claims)
}

async fn run_detection(cfg: &ResolvedConfig, claims: &[Claim]) -> Result<Vec<ContradictionVerdict>> {
    let strategy = build_strategy(cfg)?;
    let verdicts = detect::detect_with(claims, &strategy, cfg.engine.detection.clone())
        .await
        .context("Contradiction detection failed")?;
    info!(contradictions = verdicts.len(), "Detection finished");
    Ok(verdicts)
}

async fn analyze(
    cfg: &ResolvedConfig,
    input: &Path,
    reuse_claims: bool,
    format: OutputFormat,
) -> Result<()> {
    let store = ClaimStore::new(&cfg.claims_dir).context("Failed to open claim store")?;

    let mut claims = Vec::new();
    if reuse_claims {
        claims = store
            .load_claims(&document_path(input))
            .await
            .context("Failed to load stored claims")?;
        if !claims.is_empty() {
            info!(claims = claims.len(), "Reusing stored claims");
        }
    }
    if claims.is_empty() {
        claims = extract_and_store(cfg, input, &store).await?;
    }

    if claims.is_empty() {
        warn!(path = %input.display(), "No claims extracted");
        println!("{}", output::render(&[], format)?);
        return Ok(());
    }

    let verdicts = run_detection(cfg, &claims).await?;
    println!("{}", output::render(&verdicts, format)?);
    Ok(())
}

async fn extract(cfg: &ResolvedConfig, input: &Path, stdout: bool) -> Result<()> {
    let store = ClaimStore::new(&cfg.claims_dir).context("Failed to open claim store")?;
    let claims = extract_and_store(cfg, input, &store).await?;

    if stdout {
        for claim in &claims {
            println!("{}", serde_json::to_string(claim).context("Failed to serialize claim")?);
        }
    } else {
        println!("{}", store.claims_path(&document_path(input)).display());
    }
    Ok(())
}

async fn detect_stored(cfg: &ResolvedConfig, claims_path: &Path, format: OutputFormat) -> Result<()> {
    let claims = read_jsonl(claims_path)
        .await
        .with_context(|| format!("Failed to read claims file: {}", claims_path.display()))?;

    if claims.is_empty() {
        warn!(path = %claims_path.display(), "Claims file is empty");
    }

    let verdicts = run_detection(cfg, &claims).await?;
    println!("{}", output::render(&verdicts, format)?);
    Ok(())
}

fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("contradict configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!("Home:        {}", cfg.home.display());
    println!("Claims:      {}", cfg.claims_dir.display());
    println!();

    let engine = serde_yaml::to_string(&cfg.engine).context("Failed to serialize configuration")?;
    print!("{}", engine);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, EnvOverrides};

    fn resolved() -> ResolvedConfig {
        resolve(PathBuf::from("/tmp/.contradict"), None, &EnvOverrides::default())
    }

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::parse_from([
            "contradict",
            "analyze",
            "--input",
            "novel.txt",
            "--strategy",
            "scored",
            "--threshold",
            "0.4",
            "--output",
            "summary",
        ]);

        match cli.command {
            Commands::Analyze {
                input,
                detect: args,
                reuse_claims,
            } => {
                assert_eq!(input, PathBuf::from("novel.txt"));
                assert_eq!(args.strategy, Some(DetectorKind::Scored));
                assert_eq!(args.threshold, Some(0.4));
                assert_eq!(args.output, OutputFormat::Summary);
                assert!(!reuse_claims);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let mut cfg = resolved();
        let args = DetectArgs {
            strategy: Some(DetectorKind::Scored),
            threshold: Some(0.3),
            similarity_threshold: None,
            output: OutputFormat::Json,
        };
        apply_detect_args(&mut cfg, &args);

        assert_eq!(cfg.engine.detection.strategy, DetectorKind::Scored);
        assert_eq!(cfg.engine.detection.contradiction_threshold, 0.3);
        assert_eq!(cfg.engine.detection.similarity_threshold, 0.6);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_extract_and_store_leaves_runtime_free() {
        let temp = tempfile::TempDir::new().unwrap();
        let input = temp.path().join("novel.txt");
        std::fs::write(&input, "Chapter 1. Isabella was poor. Chapter 8. Isabella was rich.")
            .unwrap();
        let store = ClaimStore::new(temp.path().join("claims")).unwrap();

        // A task on the single runtime thread keeps running while extraction works
        let ticker = tokio::spawn(async { tokio::task::yield_now().await });
        let claims = extract_and_store(&resolved(), &input, &store).await.unwrap();
        ticker.await.unwrap();

        assert_eq!(claims.len(), 2);
        assert_eq!(
            store.load_claims(&document_path(&input)).await.unwrap(),
            claims
        );
    }

    #[test]
    fn test_scored_requires_entailment_endpoint() {
        let mut cfg = resolved();
        cfg.engine.detection.strategy = DetectorKind::Scored;
        assert!(build_strategy(&cfg).is_err());

        cfg.engine.providers.entailment_endpoint = Some("http://localhost:8081".to_string());
        let strategy = build_strategy(&cfg).unwrap();
        assert_eq!(strategy.kind(), DetectorKind::Scored);
    }
}
