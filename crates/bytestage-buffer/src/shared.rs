use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::BufferResult;
use crate::store::SeekBuffer;
use crate::traits::{Delimited, SeekableBuffer};

/// Thread-safe handle around a [`SeekBuffer`].
///
/// Every operation, including pure reads, takes a single mutex scoped to
/// that one call. There is no atomicity across calls: a seek followed by a
/// read from two different threads may interleave. Callers that need a
/// multi-step critical section must coordinate externally.
///
/// The handle is cheap to clone; clones share the same underlying buffer.
#[derive(Clone)]
pub struct SharedSeekBuffer {
    inner: Arc<Mutex<SeekBuffer>>,
}

impl SharedSeekBuffer {
    /// Create a new empty shared buffer.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SeekBuffer::new())),
        }
    }

    /// Create a shared buffer holding a copy of `src`.
    pub fn from_bytes(src: &[u8]) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SeekBuffer::from_bytes(src))),
        }
    }

    /// Total content length in bytes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, SeekBuffer> {
        self.inner.lock().expect("buffer mutex poisoned")
    }
}

impl Default for SharedSeekBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SeekableBuffer for SharedSeekBuffer {
    fn write(&mut self, src: &[u8]) -> BufferResult<usize> {
        self.lock().write(src)
    }

    fn append(&mut self, src: &[u8]) -> BufferResult<()> {
        self.lock().append(src)
    }

    fn read(&mut self, dst: &mut [u8]) -> BufferResult<usize> {
        self.lock().read(dst)
    }

    fn read_until(&mut self, delim: u8) -> Delimited {
        self.lock().read_until(delim)
    }

    fn seek(&mut self, offset: usize) {
        self.lock().seek(offset);
    }

    fn rewind(&mut self) {
        self.lock().rewind();
    }

    fn remaining(&self) -> usize {
        self.lock().remaining()
    }

    fn snapshot(&self) -> Vec<u8> {
        self.lock().snapshot()
    }

    fn close(&mut self) -> BufferResult<()> {
        self.lock().close()
    }
}

impl std::fmt::Debug for SharedSeekBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.lock();
        f.debug_struct("SharedSeekBuffer")
            .field("len", &guard.len())
            .field("cursor", &guard.cursor())
            .finish()
    }
}
