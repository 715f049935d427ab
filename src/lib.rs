//! contradict - Narrative contradiction detection
//!
//! Finds places where a long-form narrative asserts mutually incompatible
//! facts about the same character or object.
//!
//! # Architecture
//!
//! The engine is a strictly staged pipeline:
//! - Read: stream the document into sentence-aligned chunks
//! - Extract: turn each chunk into atomic claims, threading the
//!   narrative time context from chunk to chunk
//! - Detect: compare claims about the same entity, either with a fixed
//!   opposition table or with an embedding pre-filter and an NLI juror
//!
//! # Modules
//!
//! - `ingest`: Streaming chunk reader
//! - `extract`: Claim extraction strategies
//! - `detect`: Contradiction detectors
//! - `adapters`: Embedding and entailment providers
//! - `core`: Document pipeline, claim store, input limits
//! - `domain`: Data structures (Claim, ContradictionVerdict)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Analyze a manuscript with the rule-based detector
//! contradict analyze --input novel.txt --output pretty
//!
//! # Store claims, then run the scored detector over them
//! contradict extract --input novel.txt
//! CONTRADICT_ENTAILMENT_URL=http://localhost:8081 \
//!     contradict detect --claims ~/.contradict/claims/<key>.jsonl --strategy scored
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod detect;
pub mod domain;
pub mod extract;
pub mod ingest;

// Re-export main types at crate root for convenience
pub use crate::core::{extract_document, extract_file, ClaimStore};
pub use detect::{detect, ContradictionDetector, DetectError, Strategy};
pub use domain::{Claim, ContradictionVerdict, TimeContext, Verdict};
pub use extract::{ClaimExtractor, ExtractionConfig};
pub use ingest::{ChunkReader, ReaderConfig};
