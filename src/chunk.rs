//! Fixed-size chunking of the source text
//!
//! The reader hands out byte-exact slices of the source. Chunk boundaries
//! are not aligned to characters or sentences, so a multi-byte UTF-8
//! sequence may be split between two chunks.

use crate::{ChunkerError, Result};
use log::debug;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Upper bound on the buffer reserved before a chunk is read
const READ_RESERVE: usize = 64 * 1024;

/// One contiguous slice of the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position in the sequence, starting at 0
    pub index: usize,
    /// Raw bytes exactly as read from the source
    pub bytes: Vec<u8>,
}

impl TextChunk {
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    /// Text handed to the synthesizer.
    ///
    /// A UTF-8 sequence cut at a chunk boundary becomes U+FFFD.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Lazy, single-pass partition of a text source into [`TextChunk`]s
///
/// Every chunk but the last holds exactly `chunk_size` bytes. After the
/// source is exhausted, or after the first read error, the iterator ends.
pub struct ChunkReader<R> {
    source: R,
    path: PathBuf,
    chunk_size: usize,
    next_index: usize,
    source_len: Option<u64>,
    done: bool,
}

impl ChunkReader<BufReader<File>> {
    /// Open a file for chunked reading
    ///
    /// The file handle is owned by the reader and closed when it drops.
    pub fn open(path: impl AsRef<Path>, chunk_size: usize) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening source text {:?}", path);

        let file = File::open(path).map_err(|source| ChunkerError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        let source_len = file.metadata().ok().map(|m| m.len());

        let mut reader = Self::with_path(BufReader::new(file), path, chunk_size)?;
        reader.source_len = source_len;
        Ok(reader)
    }
}

impl<R: Read> ChunkReader<R> {
    /// Wrap an arbitrary reader
    pub fn new(source: R, chunk_size: usize) -> Result<Self> {
        Self::with_path(source, Path::new("<reader>"), chunk_size)
    }

    fn with_path(source: R, path: &Path, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ChunkerError::Config(
                "chunk size must be at least 1 byte".to_string(),
            ));
        }

        Ok(Self {
            source,
            path: path.to_path_buf(),
            chunk_size,
            next_index: 0,
            source_len: None,
            done: false,
        })
    }

    /// Total size of the source in bytes, when known up front
    pub fn source_len(&self) -> Option<u64> {
        self.source_len
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Read up to `chunk_size` bytes, retrying short reads until full or EOF
    ///
    /// The buffer grows with the data actually read, so a huge chunk size
    /// over a small source costs no more than the source itself.
    fn fill(&mut self) -> io::Result<Vec<u8>> {
        let limit = u64::try_from(self.chunk_size).unwrap_or(u64::MAX);
        let reserve = match self.source_len {
            Some(len) => usize::try_from(len).unwrap_or(READ_RESERVE).min(READ_RESERVE),
            None => READ_RESERVE,
        };

        let mut buf = Vec::with_capacity(self.chunk_size.min(reserve));
        (&mut self.source).take(limit).read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<TextChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let bytes = match self.fill() {
            Ok(bytes) => bytes,
            Err(source) => {
                self.done = true;
                return Some(Err(ChunkerError::SourceRead {
                    path: self.path.clone(),
                    source,
                }));
            }
        };

        if bytes.is_empty() {
            self.done = true;
            return None;
        }

        // A short chunk can only be the last one
        if bytes.len() < self.chunk_size {
            self.done = true;
        }

        let index = self.next_index;
        self.next_index += 1;
        debug!("Read chunk {} ({} bytes)", index, bytes.len());

        Some(Ok(TextChunk { index, bytes }))
    }
}
