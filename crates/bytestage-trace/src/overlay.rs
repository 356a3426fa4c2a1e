use std::time::Instant;

use bytestage_buffer::{BufferResult, Delimited, SeekableBuffer};
use tracing::debug;

/// Point-in-time totals for a wrapped buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferSummary {
    /// Total content length in bytes.
    pub total: usize,
    /// Bytes before the cursor (already read).
    pub read: usize,
    /// Bytes at or after the cursor (still unread).
    pub unread: usize,
}

/// Pass-through instrumentation overlay over any [`SeekableBuffer`]
/// implementer.
///
/// Every operation is timed with [`Instant`] and logged at `debug` level
/// with the instance's name, then forwarded untouched. Stack it anywhere:
/// outermost to observe what callers do, or inner to observe what another
/// overlay forwards.
pub struct TracedBuffer<B: SeekableBuffer> {
    inner: B,
    name: String,
}

impl<B: SeekableBuffer> TracedBuffer<B> {
    /// Wrap `inner` with the default instance name.
    pub fn new(inner: B) -> Self {
        Self::with_name(inner, "buffer")
    }

    /// Wrap `inner` under a custom name, for telling instances apart in
    /// the logs.
    pub fn with_name(inner: B, name: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
        }
    }

    /// The instance name used in log events.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared access to the wrapped buffer.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Exclusive access to the wrapped buffer, e.g. for driving a wrapped
    /// overlay's own controls.
    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    /// Consume the overlay and return the wrapped buffer.
    pub fn into_inner(self) -> B {
        self.inner
    }

    /// Compute and log the current totals of the wrapped buffer.
    pub fn summary(&self) -> BufferSummary {
        let total = self.inner.snapshot().len();
        let unread = self.inner.remaining().min(total);
        let summary = BufferSummary {
            total,
            read: total - unread,
            unread,
        };
        debug!(
            name = %self.name,
            total = summary.total,
            read = summary.read,
            unread = summary.unread,
            "buffer summary"
        );
        summary
    }

    fn elapsed_us(start: Instant) -> u64 {
        start.elapsed().as_micros() as u64
    }
}

impl<B: SeekableBuffer> SeekableBuffer for TracedBuffer<B> {
    fn write(&mut self, src: &[u8]) -> BufferResult<usize> {
        let start = Instant::now();
        let result = self.inner.write(src);
        let elapsed_us = Self::elapsed_us(start);
        match &result {
            Ok(n) => debug!(name = %self.name, bytes = n, elapsed_us, "write"),
            Err(e) => debug!(name = %self.name, error = %e, elapsed_us, "write failed"),
        }
        result
    }

    fn append(&mut self, src: &[u8]) -> BufferResult<()> {
        let start = Instant::now();
        let result = self.inner.append(src);
        let elapsed_us = Self::elapsed_us(start);
        match &result {
            Ok(()) => debug!(name = %self.name, bytes = src.len(), elapsed_us, "append"),
            Err(e) => debug!(name = %self.name, error = %e, elapsed_us, "append failed"),
        }
        result
    }

    fn read(&mut self, dst: &mut [u8]) -> BufferResult<usize> {
        let start = Instant::now();
        let result = self.inner.read(dst);
        let elapsed_us = Self::elapsed_us(start);
        match &result {
            Ok(n) => debug!(name = %self.name, bytes = n, elapsed_us, "read"),
            Err(e) if e.is_end_of_data() => {
                debug!(name = %self.name, elapsed_us, "read at end of data");
            }
            Err(e) => debug!(name = %self.name, error = %e, elapsed_us, "read failed"),
        }
        result
    }

    fn read_until(&mut self, delim: u8) -> Delimited {
        let start = Instant::now();
        let scan = self.inner.read_until(delim);
        let elapsed_us = Self::elapsed_us(start);
        debug!(
            name = %self.name,
            delim,
            bytes = scan.bytes.len(),
            found = scan.found,
            elapsed_us,
            "read_until"
        );
        scan
    }

    fn seek(&mut self, offset: usize) {
        let start = Instant::now();
        self.inner.seek(offset);
        debug!(name = %self.name, offset, elapsed_us = Self::elapsed_us(start), "seek");
    }

    fn rewind(&mut self) {
        let start = Instant::now();
        self.inner.rewind();
        debug!(name = %self.name, elapsed_us = Self::elapsed_us(start), "rewind");
    }

    fn remaining(&self) -> usize {
        let remaining = self.inner.remaining();
        debug!(name = %self.name, remaining, "remaining");
        remaining
    }

    fn snapshot(&self) -> Vec<u8> {
        let start = Instant::now();
        let snapshot = self.inner.snapshot();
        debug!(
            name = %self.name,
            bytes = snapshot.len(),
            elapsed_us = Self::elapsed_us(start),
            "snapshot"
        );
        snapshot
    }

    fn close(&mut self) -> BufferResult<()> {
        let start = Instant::now();
        let result = self.inner.close();
        let elapsed_us = Self::elapsed_us(start);
        match &result {
            Ok(()) => debug!(name = %self.name, elapsed_us, "close"),
            Err(e) => debug!(name = %self.name, error = %e, elapsed_us, "close failed"),
        }
        result
    }
}

impl<B: SeekableBuffer + std::fmt::Debug> std::fmt::Debug for TracedBuffer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracedBuffer")
            .field("name", &self.name)
            .field("inner", &self.inner)
            .finish()
    }
}
