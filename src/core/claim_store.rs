//! JSONL persistence for extracted claims.
//!
//! One file per source document, named after a hash of the document path,
//! one [`Claim`] object per line. Saving replaces the whole file.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::domain::Claim;

/// Errors that can occur in the claim store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed claim on line {line}: {source}")]
    Serialization {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory of per-document claim files
#[derive(Debug, Clone)]
pub struct ClaimStore {
    dir: PathBuf,
}

impl ClaimStore {
    /// Open the store, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// File holding the claims of `document`
    pub fn claims_path(&self, document: &Path) -> PathBuf {
        self.dir.join(format!("{}.jsonl", document_key(document)))
    }

    /// Replace the stored claims of `document`
    pub fn save_claims(&self, claims: &[Claim], document: &Path) -> Result<PathBuf, StoreError> {
        let path = self.claims_path(document);

        // Truncate only once the lock is held
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        file.lock_exclusive().map_err(|source| StoreError::Lock {
            path: path.clone(),
            source,
        })?;
        file.set_len(0)?;

        let mut writer = BufWriter::new(&file);
        for (idx, claim) in claims.iter().enumerate() {
            let json = serde_json::to_string(claim).map_err(|source| StoreError::Serialization {
                line: idx + 1,
                source,
            })?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;

        // Lock is released when file is dropped
        info!(claims = claims.len(), path = %path.display(), "Saved claims");
        Ok(path)
    }

    /// Stored claims of `document`; empty when nothing has been saved
    pub async fn load_claims(&self, document: &Path) -> Result<Vec<Claim>, StoreError> {
        let path = self.claims_path(document);
        if !path.exists() {
            warn!(path = %path.display(), "No stored claims");
            return Ok(Vec::new());
        }
        read_jsonl(&path).await
    }
}

/// First 16 hex characters of the SHA-256 of the document path
pub fn document_key(document: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

/// Read any claims JSONL file, skipping blank lines
pub async fn read_jsonl(path: &Path) -> Result<Vec<Claim>, StoreError> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut claims = Vec::new();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let claim: Claim = serde_json::from_str(&line).map_err(|source| {
            StoreError::Serialization {
                line: line_no,
                source,
            }
        })?;
        claims.push(claim);
    }

    debug!(claims = claims.len(), path = %path.display(), "Loaded claims");
    Ok(claims)
}
