use std::io;

/// Errors from buffer operations.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// The cursor was at or past the end of the content when a read was
    /// issued. The normal terminal signal for sequential reads, not a
    /// hard failure.
    #[error("end of data")]
    EndOfData,

    /// I/O error from a backing file or a whole-buffer file operation.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BufferError {
    /// Returns `true` for the end-of-data signal.
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Self::EndOfData)
    }
}

/// Result alias for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;
