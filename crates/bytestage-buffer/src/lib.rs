//! Seekable in-memory byte buffer for staging data before it is persisted
//! or transmitted.
//!
//! The buffer behaves like a tiny single-writer file: bytes are appended at
//! the end, read from a movable cursor, scanned up to a delimiter, and the
//! cursor can be repositioned freely. Orthogonal behaviors -- transactions,
//! file mirroring, instrumentation -- are layered on top as overlays in the
//! sibling crates; they all speak the [`SeekableBuffer`] contract defined
//! here, so any overlay can wrap the base store or another overlay.
//!
//! # Components
//!
//! - [`SeekableBuffer`] -- the capability contract every layer implements
//! - [`SeekBuffer`] -- the base in-memory store (single-threaded)
//! - [`SharedSeekBuffer`] -- mutex-guarded handle for multi-threaded use
//!
//! Whole-buffer file conveniences (`save_to_file`, `append_to_file`,
//! `append_unread_to_file`, `load_from_file`) live on [`SeekBuffer`]
//! directly; they operate on the content wholesale and do not participate
//! in the overlay protocols.
//!
//! # Design Rules
//!
//! 1. Content grows only through `write`/`append`; only `close` discards bytes.
//! 2. End-of-data is a signal, not a failure: `read` reports it, the caller
//!    decides what it means.
//! 3. A short read is normal; the buffer never partially writes.
//! 4. Seeking past the end is legal and degrades to end-of-data on read.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod shared;
pub mod store;
pub mod traits;

mod fileops;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{BufferError, BufferResult};
pub use shared::SharedSeekBuffer;
pub use store::SeekBuffer;
pub use traits::{Delimited, SeekableBuffer};
