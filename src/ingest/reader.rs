//! Streaming, sentence-aligned chunk reader.
//!
//! Reads a byte source in fixed-size blocks and yields text chunks made of
//! whole sentences, without ever holding the full document in memory.
//!
//! # Algorithm
//!
//! 1. Read one block of `chunk_size` bytes
//! 2. Decode as UTF-8 (a sequence split by the block edge waits for the
//!    next block; invalid bytes are skipped with a warning)
//! 3. Prepend the unterminated sentence carried from the previous block
//! 4. Scan sentences, holding back the unterminated tail (or the last
//!    sentence, when it ends right on the block edge)
//! 5. Once the buffer holds `sentence_buffer` sentences, emit all of them
//!    as one chunk and reset the buffer
//! 6. At end of input, flush the buffer plus any carry-over

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::sentences;

/// Settings for the chunk reader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Bytes per physical read (default: 4096)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Sentences to accumulate before emitting a chunk (default: 5)
    #[serde(default = "default_sentence_buffer")]
    pub sentence_buffer: usize,
}

fn default_chunk_size() -> usize {
    4096
}
fn default_sentence_buffer() -> usize {
    5
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            sentence_buffer: default_sentence_buffer(),
        }
    }
}

/// Lazy iterator of sentence-aligned text chunks over a byte source.
///
/// Yields `Err` at most once, for an I/O failure of the source, and ends
/// afterwards. Decode problems are never surfaced.
pub struct ChunkReader<R> {
    source: R,
    chunk_size: usize,
    sentence_buffer: usize,

    /// Completed sentences not yet emitted
    buffer: Vec<String>,
    /// Unterminated sentence carried into the next block
    carry: String,
    /// Bytes of a UTF-8 sequence split by the block edge
    pending: Vec<u8>,

    blocks_read: u64,
    chunks_emitted: u64,
    finished: bool,
}

impl ChunkReader<File> {
    /// Open a file for streaming
    pub fn open(path: &Path, config: &ReaderConfig) -> io::Result<Self> {
        let file = File::open(path)?;
        info!(
            path = %path.display(),
            chunk_size = config.chunk_size,
            "Initialized streaming reader"
        );
        Ok(Self::new(file, config))
    }
}

impl<R: Read> ChunkReader<R> {
    /// Wrap any byte source
    pub fn new(source: R, config: &ReaderConfig) -> Self {
        Self {
            source,
            chunk_size: config.chunk_size.max(1),
            sentence_buffer: config.sentence_buffer.max(1),
            buffer: Vec::new(),
            carry: String::new(),
            pending: Vec::new(),
            blocks_read: 0,
            chunks_emitted: 0,
            finished: false,
        }
    }

    /// Number of chunks yielded so far
    pub fn chunks_emitted(&self) -> u64 {
        self.chunks_emitted
    }

    /// Read the next block, retrying on interruption. Returns 0 at EOF.
    fn read_block(&mut self, block: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.source.read(block) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Decode a block, keeping a trailing partial sequence for later
    fn decode(&mut self, block: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(block);

        let mut text = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // Safe: from_utf8 vouched for this prefix
                    text.push_str(std::str::from_utf8(valid).unwrap_or_default());

                    match e.error_len() {
                        Some(len) => {
                            warn!(
                                block = self.blocks_read,
                                skipped = len,
                                "UTF-8 decode error, skipping malformed bytes"
                            );
                            rest = &after[len..];
                        }
                        None => {
                            // Sequence continues in the next block
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        text
    }

    /// Fold one decoded block into the buffer and carry-over
    fn absorb(&mut self, decoded: String) {
        let mut text = std::mem::take(&mut self.carry);
        text.push_str(&decoded);

        let mut scan = sentences::scan(&text);

        // A break on the block edge is provisional: the next block may glue
        // more text to it ("i." + "e. Smith", "left." + "\"")
        if scan.tail.is_empty() {
            if let Some(last) = scan.sentences.pop() {
                scan.tail = last;
            }
        }

        self.buffer.extend(scan.sentences);
        self.carry = scan.tail;
    }

    /// Join the buffered sentences into one chunk
    fn take_buffer(&mut self) -> String {
        let chunk = self.buffer.join(" ");
        self.buffer.clear();
        chunk
    }

    /// Final chunk at end of input, if anything non-blank is left
    fn flush(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            warn!(
                skipped = self.pending.len(),
                "Input ends inside a UTF-8 sequence, skipping trailing bytes"
            );
            self.pending.clear();
        }

        let mut chunk = self.take_buffer();
        let carry = std::mem::take(&mut self.carry);
        let carry = carry.trim();
        if !carry.is_empty() {
            if !chunk.is_empty() {
                chunk.push(' ');
            }
            chunk.push_str(carry);
        }

        if chunk.trim().is_empty() {
            None
        } else {
            Some(chunk)
        }
    }

    fn emit(&mut self, chunk: String) -> Option<io::Result<String>> {
        self.chunks_emitted += 1;
        debug!(
            chunk = self.chunks_emitted - 1,
            chars = chunk.len(),
            "Emitting chunk"
        );
        Some(Ok(chunk))
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut block = vec![0u8; self.chunk_size];

        loop {
            let n = match self.read_block(&mut block) {
                Ok(n) => n,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };

            if n == 0 {
                self.finished = true;
                let last = self.flush();
                info!(
                    blocks = self.blocks_read,
                    chunks = self.chunks_emitted + u64::from(last.is_some()),
                    "Streaming complete"
                );
                return match last {
                    Some(chunk) => self.emit(chunk),
                    None => None,
                };
            }

            self.blocks_read += 1;
            let decoded = self.decode(&block[..n]);
            self.absorb(decoded);

            if self.buffer.len() >= self.sentence_buffer {
                let chunk = self.take_buffer();
                return self.emit(chunk);
            }
        }
    }
}

/// Estimate the number of blocks a file of `file_size` bytes needs
pub fn estimated_blocks(file_size: u64, chunk_size: usize) -> u64 {
    file_size / chunk_size.max(1) as u64 + 1
}
