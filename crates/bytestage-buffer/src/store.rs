use std::fs;
use std::path::Path;

use crate::error::{BufferError, BufferResult};
use crate::traits::{Delimited, SeekableBuffer};

/// Growable in-memory byte buffer with a single read/write cursor.
///
/// The store exclusively owns its byte sequence. Writes always land at the
/// end; the cursor only governs where reads happen. Intended for
/// single-threaded use -- see [`SharedSeekBuffer`](crate::SharedSeekBuffer)
/// for the mutex-guarded variant.
pub struct SeekBuffer {
    content: Vec<u8>,
    cursor: usize,
}

impl SeekBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self {
            content: Vec::new(),
            cursor: 0,
        }
    }

    /// Create a buffer holding a copy of `src`, cursor at the start.
    pub fn from_bytes(src: &[u8]) -> Self {
        Self {
            content: src.to_vec(),
            cursor: 0,
        }
    }

    /// Create a buffer holding the contents of the file at `path`, cursor
    /// at the start.
    pub fn from_file(path: &Path) -> BufferResult<Self> {
        Ok(Self {
            content: fs::read(path)?,
            cursor: 0,
        })
    }

    /// Total content length in bytes, regardless of the cursor.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Current cursor position. May sit past the end after a far seek.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn content(&self) -> &[u8] {
        &self.content
    }

    pub(crate) fn replace_content(&mut self, content: Vec<u8>) {
        self.content = content;
        self.cursor = 0;
    }
}

impl Default for SeekBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SeekableBuffer for SeekBuffer {
    fn write(&mut self, src: &[u8]) -> BufferResult<usize> {
        self.content.extend_from_slice(src);
        Ok(src.len())
    }

    fn append(&mut self, src: &[u8]) -> BufferResult<()> {
        self.content.extend_from_slice(src);
        Ok(())
    }

    fn read(&mut self, dst: &mut [u8]) -> BufferResult<usize> {
        if self.cursor >= self.content.len() {
            return Err(BufferError::EndOfData);
        }
        let n = dst.len().min(self.content.len() - self.cursor);
        dst[..n].copy_from_slice(&self.content[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }

    fn read_until(&mut self, delim: u8) -> Delimited {
        let start = self.cursor.min(self.content.len());
        let tail = &self.content[start..];
        match tail.iter().position(|&b| b == delim) {
            Some(i) => {
                let bytes = tail[..=i].to_vec();
                self.cursor = start + i + 1;
                Delimited { bytes, found: true }
            }
            None => {
                let bytes = tail.to_vec();
                self.cursor = self.content.len();
                Delimited {
                    bytes,
                    found: false,
                }
            }
        }
    }

    fn seek(&mut self, offset: usize) {
        self.cursor = offset;
    }

    fn rewind(&mut self) {
        self.cursor = 0;
    }

    fn remaining(&self) -> usize {
        self.content.len().saturating_sub(self.cursor)
    }

    fn snapshot(&self) -> Vec<u8> {
        self.content.clone()
    }

    fn close(&mut self) -> BufferResult<()> {
        self.content = Vec::new();
        self.cursor = 0;
        Ok(())
    }
}

impl std::fmt::Debug for SeekBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeekBuffer")
            .field("len", &self.content.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
