//! Engine plumbing around the two core stages.
//!
//! This module contains:
//! - Pipeline: document-level extraction entry points
//! - ClaimStore: JSONL claim persistence
//! - Limits: input document validation

pub mod claim_store;
pub mod limits;
pub mod pipeline;

// Re-export commonly used types
pub use claim_store::{document_key, read_jsonl, ClaimStore, StoreError};
pub use limits::{InputLimits, InputViolation};
pub use pipeline::{extract_document, extract_file};
