//! Instrumentation overlay for bytestage buffers.
//!
//! [`TracedBuffer`] wraps any [`SeekableBuffer`] implementer and emits a
//! `tracing` event for every operation -- operation name, byte counts,
//! outcome, and elapsed time -- while forwarding it unchanged. Pure
//! pass-through: wrapping never alters what the buffer does, only what it
//! tells you about it.
//!
//! [`SeekableBuffer`]: bytestage_buffer::SeekableBuffer

pub mod overlay;

pub use overlay::{BufferSummary, TracedBuffer};
