//! Configuration for the contradiction engine.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI on top of the resolved config)
//! 2. Environment variables (CONTRADICT_HOME, CONTRADICT_CLAIMS_DIR,
//!    CONTRADICT_EMBEDDING_URL, CONTRADICT_ENTAILMENT_URL)
//! 3. Config file (.contradict/config.yaml)
//! 4. Defaults (~/.contradict)
//!
//! Config file discovery:
//! - Searches current directory and parents for .contradict/config.yaml
//! - Paths in config file are relative to the .contradict/ directory

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::ProviderConfig;
use crate::core::InputLimits;
use crate::detect::DetectionConfig;
use crate::extract::ExtractionConfig;
use crate::ingest::ReaderConfig;

/// Name of the per-project configuration directory
pub const CONFIG_DIR: &str = ".contradict";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub providers: ProviderConfig,
    #[serde(default)]
    pub limits: InputLimits,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Engine state directory (relative to .contradict/)
    pub home: Option<String>,
    /// Claim files directory (relative to .contradict/)
    pub claims_dir: Option<String>,
}

/// Settings handed to each engine component at construction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub providers: ProviderConfig,
    #[serde(default)]
    pub limits: InputLimits,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Engine state directory
    pub home: PathBuf,
    /// Where claim files are stored
    pub claims_dir: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Component settings
    pub engine: EngineConfig,
}

/// Values read from the environment
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub home: Option<String>,
    pub claims_dir: Option<String>,
    pub embedding_url: Option<String>,
    pub entailment_url: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            home: var("CONTRADICT_HOME"),
            claims_dir: var("CONTRADICT_CLAIMS_DIR"),
            embedding_url: var("CONTRADICT_EMBEDDING_URL"),
            entailment_url: var("CONTRADICT_ENTAILMENT_URL"),
        }
    }
}

/// Find config file by searching `start` and its parents
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge defaults, an optional config file and environment overrides
pub fn resolve(
    default_home: PathBuf,
    file: Option<(PathBuf, ConfigFile)>,
    env: &EnvOverrides,
) -> ResolvedConfig {
    let (config_file, parsed) = match file {
        Some((path, parsed)) => (Some(path), parsed),
        None => (None, ConfigFile::default()),
    };

    // Relative paths in the file hang off the .contradict/ directory
    let config_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);

    let home = match (&env.home, &parsed.paths.home, &config_dir) {
        (Some(env_home), _, _) => PathBuf::from(env_home),
        (None, Some(file_home), Some(dir)) => resolve_path(dir, file_home),
        _ => default_home,
    };

    let claims_dir = match (&env.claims_dir, &parsed.paths.claims_dir, &config_dir) {
        (Some(env_claims), _, _) => PathBuf::from(env_claims),
        (None, Some(file_claims), Some(dir)) => resolve_path(dir, file_claims),
        _ => home.join("claims"),
    };

    let mut engine = EngineConfig {
        reader: parsed.reader,
        extraction: parsed.extraction,
        detection: parsed.detection,
        providers: parsed.providers,
        limits: parsed.limits,
    };
    if let Some(url) = &env.embedding_url {
        engine.providers.embedding_endpoint = Some(url.clone());
    }
    if let Some(url) = &env.entailment_url {
        engine.providers.entailment_endpoint = Some(url.clone());
    }

    ResolvedConfig {
        home,
        claims_dir,
        config_file,
        engine,
    }
}

/// Load configuration from all sources
pub fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR);

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let file = match find_config_file(&cwd) {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            Some((path, parsed))
        }
        None => None,
    };

    Ok(resolve(default_home, file, &EnvOverrides::from_env()))
}
