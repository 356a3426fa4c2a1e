//! File-mirroring overlay for bytestage buffers.
//!
//! [`FileSyncBuffer`] wraps any [`SeekableBuffer`] implementer and keeps a
//! backing file byte-for-byte identical to the buffer's content. Mirroring
//! is incremental: a sync frontier records how many leading bytes have
//! already reached the file, and each sync appends exactly the unsynced
//! tail instead of rewriting the whole file. Seeks reposition the file's
//! own cursor so it tracks the logical read position.
//!
//! The backing file has no header or framing. At any quiescent point its
//! bytes equal `content[..synced_len]`, and immediately after a successful
//! sync they equal the full content.
//!
//! # Stacking order matters
//!
//! The overlay composes with the transaction overlay in either order, and
//! the orders behave differently on purpose:
//!
//! - `TransactionBuffer<FileSyncBuffer<_>>`: transactional writes stay
//!   invisible to the file until the outermost commit. The commit's
//!   close-then-rewrite closes the sync overlay -- file handle included --
//!   so mirroring must be re-enabled afterward.
//! - `FileSyncBuffer<TransactionBuffer<_>>`: uncommitted bytes stream to
//!   the file as they are written; a rollback shrinks the content beneath
//!   the frontier and the file keeps the rolled-back tail until the
//!   content grows past it again.
//!
//! Neither order is canonical; pick the durability/isolation trade-off the
//! caller needs.
//!
//! [`SeekableBuffer`]: bytestage_buffer::SeekableBuffer

pub mod overlay;

pub use overlay::FileSyncBuffer;
