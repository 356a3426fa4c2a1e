use crate::error::BufferResult;

/// Result of a delimiter scan.
///
/// The consumed bytes travel together with the end-of-data signal, so the
/// unread tail is never lost when the delimiter is missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delimited {
    /// Bytes consumed from the cursor, including the delimiter when found.
    pub bytes: Vec<u8>,
    /// `true` if the delimiter was found before end-of-data. `false` means
    /// the scan hit the end: `bytes` holds the whole unread tail and the
    /// cursor now sits at the end of the content.
    pub found: bool,
}

/// Seekable byte buffer capability contract.
///
/// Implemented by the base store and by every overlay, so an overlay can
/// wrap any other implementer -- the base store, or another overlay -- and
/// the stack stays polymorphic. Overlays own their wrapped buffer by value;
/// nothing aliases the content except through this contract.
///
/// All implementations must satisfy these invariants:
/// - Content grows only via `write`/`append`; nothing removes bytes except
///   `close`.
/// - `read` with the cursor at or past the end returns `Err(EndOfData)`;
///   a short read (fewer bytes than requested) is normal, not an error.
/// - `seek` past the end is a legal pending position; the next read
///   reports end-of-data.
/// - `remaining()` never underflows.
/// - `snapshot()` returns the full content from index 0 regardless of the
///   cursor.
pub trait SeekableBuffer {
    /// Append bytes to the end of the content.
    ///
    /// Returns the number of bytes accepted. The base store accepts the
    /// whole slice and cannot fail; overlays that mirror to a file report
    /// mirror failures here (the in-memory mutation stands regardless).
    fn write(&mut self, src: &[u8]) -> BufferResult<usize>;

    /// Append bytes to the end of the content, side-effect only.
    ///
    /// Identical effect to [`write`](Self::write); exists for API symmetry.
    fn append(&mut self, src: &[u8]) -> BufferResult<()>;

    /// Copy up to `dst.len()` bytes starting at the cursor into `dst` and
    /// advance the cursor by the number copied.
    ///
    /// Returns `Err(BufferError::EndOfData)` iff the cursor is at or past
    /// the end when called; otherwise `Ok(n)` with `n > 0` unless `dst`
    /// is empty.
    fn read(&mut self, dst: &mut [u8]) -> BufferResult<usize>;

    /// Scan forward from the cursor for the first occurrence of `delim`.
    ///
    /// When found, the returned bytes include the delimiter and the cursor
    /// advances past it. When not found, all remaining bytes are returned
    /// and the cursor moves to the end of the content, mirroring
    /// [`read`](Self::read)'s end-of-data convention via
    /// [`Delimited::found`].
    fn read_until(&mut self, delim: u8) -> Delimited;

    /// Set the cursor to an absolute offset, unconditionally.
    ///
    /// Offsets past the end are legal; negative offsets are unrepresentable
    /// at this boundary.
    fn seek(&mut self, offset: usize);

    /// Reset the cursor to the start. Equivalent to `seek(0)`.
    fn rewind(&mut self);

    /// Number of unread bytes between the cursor and the end of the content.
    fn remaining(&self) -> usize;

    /// Copy of the full content from index 0, regardless of the cursor.
    fn snapshot(&self) -> Vec<u8>;

    /// Discard all state.
    ///
    /// Callers must not keep using a buffer they have closed; the one
    /// sanctioned exception is the transaction overlay, whose outermost
    /// commit is defined as close-then-rewrite of its wrapped buffer.
    fn close(&mut self) -> BufferResult<()>;
}
