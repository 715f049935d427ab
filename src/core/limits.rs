//! Input validation for documents handed to the engine.
//!
//! Checks run against file metadata only; the document is never read here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits on accepted input documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputLimits {
    /// Maximum document size in bytes (default: 5MB)
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,

    /// Accepted file extensions, without the dot (default: txt)
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_max_input_bytes() -> u64 {
    5 * 1024 * 1024
} // 5MB

fn default_allowed_extensions() -> Vec<String> {
    vec!["txt".to_string()]
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl InputLimits {
    pub fn is_extension_allowed(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Validate a document path; returns its size in bytes
    pub fn validate_path(&self, path: &Path) -> Result<u64, InputViolation> {
        let metadata = std::fs::metadata(path)
            .ok()
            .filter(|m| m.is_file())
            .ok_or_else(|| InputViolation::NotFound {
                path: path.to_path_buf(),
            })?;

        if !self.is_extension_allowed(path) {
            return Err(InputViolation::ExtensionNotAllowed {
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_default(),
            });
        }

        let size = metadata.len();
        if size > self.max_input_bytes {
            return Err(InputViolation::TooLarge {
                actual: size,
                limit: self.max_input_bytes,
            });
        }

        Ok(size)
    }
}

/// Input validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputViolation {
    #[error("Input too large: {actual} bytes (limit: {limit})")]
    TooLarge { actual: u64, limit: u64 },

    #[error("File extension not allowed: '{extension}'")]
    ExtensionNotAllowed { extension: String },

    #[error("Input file not found: {}", path.display())]
    NotFound { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_accepts_small_text_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("novel.TXT");
        std::fs::write(&path, "Lord Edmund was dead.").unwrap();

        let size = InputLimits::default().validate_path(&path).unwrap();
        assert_eq!(size, 21);
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("novel.pdf");
        std::fs::write(&path, "x").unwrap();

        assert_eq!(
            InputLimits::default().validate_path(&path),
            Err(InputViolation::ExtensionNotAllowed {
                extension: "pdf".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_oversized_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("novel.txt");
        std::fs::write(&path, vec![b'a'; 64]).unwrap();

        let limits = InputLimits {
            max_input_bytes: 32,
            ..Default::default()
        };
        assert_eq!(
            limits.validate_path(&path),
            Err(InputViolation::TooLarge {
                actual: 64,
                limit: 32
            })
        );
    }

    #[test]
    fn test_missing_file_and_directory() {
        let temp = TempDir::new().unwrap();
        let limits = InputLimits::default();

        assert!(matches!(
            limits.validate_path(&temp.path().join("absent.txt")),
            Err(InputViolation::NotFound { .. })
        ));
        assert!(matches!(
            limits.validate_path(temp.path()),
            Err(InputViolation::NotFound { .. })
        ));
    }
}
