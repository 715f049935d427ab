//! Streaming text ingestion.
//!
//! Turns an arbitrarily large byte stream into bounded, sentence-aligned
//! text chunks:
//!
//! ```text
//! bytes → blocks → UTF-8 text → sentences → buffered chunks
//!                     ↑                         │
//!               carry-over  ←───────────────────┘
//! ```

pub mod reader;
pub mod sentences;

// Re-export key types
pub use reader::{estimated_blocks, ChunkReader, ReaderConfig};
pub use sentences::{ends_with_abbreviation, ABBREVIATIONS};
