use bytestage_buffer::BufferError;

/// Errors from transaction control operations.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    /// Commit or rollback was called while no transaction was open.
    #[error("no transaction in progress")]
    NoActiveTransaction,

    /// The wrapped buffer failed while the outermost commit rewrote it.
    ///
    /// The transaction is already closed at this point; the wrapped buffer
    /// may hold a partial rewrite.
    #[error("commit failed against the wrapped buffer: {0}")]
    Commit(#[from] BufferError),
}

/// Result alias for transaction operations.
pub type TxResult<T> = Result<T, TxError>;
