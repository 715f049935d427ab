//! Document-level extraction: chunk reader feeding the claim extractor.
//!
//! Chunks are processed strictly in order because each one inherits the
//! time context left by the previous one. Independent documents share no
//! state and may run in parallel.

use std::io::{self, Read};
use std::path::Path;

use tracing::info;

use crate::domain::{Claim, TimeContext};
use crate::extract::ClaimExtractor;
use crate::ingest::{estimated_blocks, ChunkReader, ReaderConfig};

/// Extract every claim from a byte source.
///
/// Chunk ids count from zero in emission order and the time context starts
/// out unknown. Decode problems are absorbed by the reader; I/O failures of
/// the source are returned.
pub fn extract_document<R: Read>(
    source: R,
    reader: &ReaderConfig,
    extractor: &ClaimExtractor,
) -> io::Result<Vec<Claim>> {
    extract_chunks(ChunkReader::new(source, reader), extractor)
}

/// Extract every claim from a file on disk
pub fn extract_file(
    path: &Path,
    reader: &ReaderConfig,
    extractor: &ClaimExtractor,
) -> io::Result<Vec<Claim>> {
    let file_size = std::fs::metadata(path)?.len();
    info!(
        path = %path.display(),
        file_size,
        estimated_blocks = estimated_blocks(file_size, reader.chunk_size),
        "Reading document"
    );

    extract_chunks(ChunkReader::open(path, reader)?, extractor)
}

fn extract_chunks<R: Read>(
    mut chunks: ChunkReader<R>,
    extractor: &ClaimExtractor,
) -> io::Result<Vec<Claim>> {
    let mut context = TimeContext::default();
    let mut claims = Vec::new();
    let mut chunk_id: u64 = 0;

    for chunk in chunks.by_ref() {
        let chunk = chunk?;
        let extraction = extractor.extract(&chunk, chunk_id, context, None);
        claims.extend(extraction.claims);
        context = extraction.context;
        chunk_id += 1;
    }

    info!(
        chunks = chunks.chunks_emitted(),
        claims = claims.len(),
        strategy = extractor.strategy_name(),
        "Extraction complete"
    );
    Ok(claims)
}
