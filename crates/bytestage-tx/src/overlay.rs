use bytestage_buffer::{BufferResult, Delimited, SeekBuffer, SeekableBuffer};
use tracing::debug;

use crate::error::{TxError, TxResult};
use crate::savepoint::{Savepoint, SavepointStack};

/// Live transaction bookkeeping; present only while a transaction is open.
///
/// The working copy is itself a [`SeekBuffer`], so in-transaction
/// operations reuse the base store's semantics instead of reimplementing
/// them.
struct TxState {
    /// Current nesting depth, >= 1.
    level: u32,
    /// The buffer as seen inside the transaction.
    working: SeekBuffer,
    /// One savepoint per nested `begin` beyond the first.
    savepoints: SavepointStack,
}

impl TxState {
    fn working_from(content: &[u8], cursor: usize) -> SeekBuffer {
        let mut working = SeekBuffer::from_bytes(content);
        working.seek(cursor);
        working
    }
}

/// Transactional overlay over any [`SeekableBuffer`] implementer.
///
/// Operations forward to the wrapped buffer while idle. `begin` snapshots
/// the wrapped state into a working copy that every subsequent operation
/// targets; the wrapped buffer stays untouched until the matching
/// outermost `commit` rewrites it (close, write the working copy, seek to
/// the working cursor). `rollback` restores the nearest savepoint, or the
/// outermost base snapshot when the last level unwinds.
///
/// Nesting is unbounded: each `begin` must be matched by a `commit` or
/// `rollback`. A nested commit merely accepts the child's edits into the
/// parent's view; only the outermost commit touches the wrapped buffer.
pub struct TransactionBuffer<B: SeekableBuffer> {
    inner: B,
    tx: Option<TxState>,
}

impl<B: SeekableBuffer> TransactionBuffer<B> {
    /// Wrap `inner` with transaction support.
    pub fn new(inner: B) -> Self {
        Self { inner, tx: None }
    }

    /// Shared access to the wrapped buffer.
    ///
    /// Useful for observing what is visible *outside* the transaction,
    /// e.g. `tx.inner().snapshot()` while a transaction is open.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Exclusive access to the wrapped buffer.
    ///
    /// Intended for driving a wrapped overlay's own controls (e.g.
    /// re-enabling a wrapped file mirror after a commit closed it).
    /// Mutations made through this reference while a transaction is open
    /// are NOT covered by the transaction.
    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    /// Consume the overlay and return the wrapped buffer.
    ///
    /// Any open transaction is discarded, as with [`close`](SeekableBuffer::close).
    pub fn into_inner(self) -> B {
        self.inner
    }

    /// Open a transaction, or nest one inside the current transaction.
    ///
    /// The first `begin` snapshots the wrapped buffer's content and cursor;
    /// a nested `begin` pushes the current working state as a savepoint.
    /// Never fails.
    pub fn begin(&mut self) {
        match &mut self.tx {
            None => {
                let content = self.inner.snapshot();
                // The contract exposes no cursor observer; derive it from
                // what has not been read yet.
                let cursor = content.len() - self.inner.remaining();
                self.tx = Some(TxState {
                    level: 1,
                    working: TxState::working_from(&content, cursor),
                    savepoints: SavepointStack::new(),
                });
                debug!(level = 1, "transaction begun");
            }
            Some(tx) => {
                tx.savepoints.push(Savepoint {
                    content: tx.working.snapshot(),
                    cursor: tx.working.cursor(),
                    level: tx.level,
                });
                tx.level += 1;
                debug_assert_eq!(tx.savepoints.len(), (tx.level - 1) as usize);
                debug!(level = tx.level, "nested transaction begun");
            }
        }
    }

    /// Commit the current transaction level.
    ///
    /// A nested commit discards the top savepoint and accepts the child's
    /// edits into the parent's view. The outermost commit rewrites the
    /// wrapped buffer with the working copy and seeks it to the working
    /// cursor.
    pub fn commit(&mut self) -> TxResult<()> {
        let mut tx = self.tx.take().ok_or(TxError::NoActiveTransaction)?;

        if tx.level > 1 {
            tx.savepoints.pop();
            tx.level -= 1;
            debug!(level = tx.level, "nested transaction committed");
            self.tx = Some(tx);
            return Ok(());
        }

        // Outermost commit: replace the wrapped content wholesale rather
        // than patching in place.
        let content = tx.working.snapshot();
        let cursor = tx.working.cursor();
        self.inner.close()?;
        if !content.is_empty() {
            self.inner.write(&content)?;
        }
        self.inner.seek(cursor);
        debug!(bytes = content.len(), cursor, "transaction committed");
        Ok(())
    }

    /// Roll back the current transaction level.
    ///
    /// A nested rollback restores the matching savepoint; the outermost
    /// rollback discards the working copy entirely, leaving the wrapped
    /// buffer exactly as it was before the outermost `begin`.
    pub fn rollback(&mut self) -> TxResult<()> {
        let tx = self.tx.as_mut().ok_or(TxError::NoActiveTransaction)?;

        if tx.level > 1 {
            if let Some(sp) = tx.savepoints.pop() {
                debug!(savepoint_level = sp.level, "nested transaction rolled back");
                tx.working = TxState::working_from(&sp.content, sp.cursor);
            }
            tx.level -= 1;
            return Ok(());
        }

        // Outermost rollback: the wrapped buffer was never touched, so
        // dropping the transaction state restores the pre-begin view.
        self.tx = None;
        debug!("transaction rolled back");
        Ok(())
    }

    /// Returns `true` while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    /// Current nesting depth; 0 while idle.
    pub fn transaction_level(&self) -> u32 {
        self.tx.as_ref().map_or(0, |tx| tx.level)
    }
}

impl<B: SeekableBuffer> SeekableBuffer for TransactionBuffer<B> {
    fn write(&mut self, src: &[u8]) -> BufferResult<usize> {
        match &mut self.tx {
            Some(tx) => tx.working.write(src),
            None => self.inner.write(src),
        }
    }

    fn append(&mut self, src: &[u8]) -> BufferResult<()> {
        match &mut self.tx {
            Some(tx) => tx.working.append(src),
            None => self.inner.append(src),
        }
    }

    fn read(&mut self, dst: &mut [u8]) -> BufferResult<usize> {
        match &mut self.tx {
            Some(tx) => tx.working.read(dst),
            None => self.inner.read(dst),
        }
    }

    fn read_until(&mut self, delim: u8) -> Delimited {
        match &mut self.tx {
            Some(tx) => tx.working.read_until(delim),
            None => self.inner.read_until(delim),
        }
    }

    fn seek(&mut self, offset: usize) {
        match &mut self.tx {
            Some(tx) => tx.working.seek(offset),
            None => self.inner.seek(offset),
        }
    }

    fn rewind(&mut self) {
        match &mut self.tx {
            Some(tx) => tx.working.rewind(),
            None => self.inner.rewind(),
        }
    }

    fn remaining(&self) -> usize {
        match &self.tx {
            Some(tx) => tx.working.remaining(),
            None => self.inner.remaining(),
        }
    }

    fn snapshot(&self) -> Vec<u8> {
        match &self.tx {
            Some(tx) => tx.working.snapshot(),
            None => self.inner.snapshot(),
        }
    }

    /// Close the overlay.
    ///
    /// An open transaction is fully rolled back (all levels, back to the
    /// outermost base snapshot). The wrapped buffer is NOT closed; its
    /// owner constructed the wrap and remains responsible for its lifetime.
    fn close(&mut self) -> BufferResult<()> {
        if self.tx.take().is_some() {
            debug!("open transaction discarded on close");
        }
        Ok(())
    }
}

impl<B: SeekableBuffer + std::fmt::Debug> std::fmt::Debug for TransactionBuffer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionBuffer")
            .field("inner", &self.inner)
            .field("level", &self.transaction_level())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wrap(content: &[u8]) -> TransactionBuffer<SeekBuffer> {
        TransactionBuffer::new(SeekBuffer::from_bytes(content))
    }

    // -----------------------------------------------------------------------
    // Idle forwarding
    // -----------------------------------------------------------------------

    #[test]
    fn idle_operations_hit_the_wrapped_buffer() {
        let mut tx = wrap(b"base");
        tx.write(b" more").unwrap();
        assert_eq!(tx.inner().snapshot(), b"base more".to_vec());

        let mut dst = [0u8; 4];
        let n = tx.read(&mut dst).unwrap();
        assert_eq!(&dst[..n], b"base");
    }

    // -----------------------------------------------------------------------
    // Isolation and rollback
    // -----------------------------------------------------------------------

    #[test]
    fn writes_are_invisible_to_the_wrapped_buffer_until_commit() {
        let mut tx = wrap(b"committed state");
        tx.begin();
        tx.write(b" + pending").unwrap();

        assert_eq!(tx.snapshot(), b"committed state + pending".to_vec());
        assert_eq!(tx.inner().snapshot(), b"committed state".to_vec());

        tx.commit().unwrap();
        assert_eq!(tx.inner().snapshot(), b"committed state + pending".to_vec());
    }

    #[test]
    fn rollback_restores_the_pre_begin_view() {
        // Scenario: an account balance amended inside a transaction that
        // is then abandoned.
        let mut tx = wrap(b"Account Balance: $1000");
        tx.begin();
        tx.write(b" -> $1500").unwrap();

        assert_eq!(tx.snapshot(), b"Account Balance: $1000 -> $1500".to_vec());
        assert_eq!(tx.inner().snapshot(), b"Account Balance: $1000".to_vec());

        tx.rollback().unwrap();
        assert_eq!(tx.snapshot(), b"Account Balance: $1000".to_vec());
        assert_eq!(tx.inner().snapshot(), b"Account Balance: $1000".to_vec());
        assert!(!tx.in_transaction());
    }

    #[test]
    fn rollback_restores_the_wrapped_cursor_too() {
        let mut tx = wrap(b"0123456789");
        tx.seek(4);
        tx.begin();
        tx.seek(9);
        tx.write(b"extra").unwrap();
        tx.rollback().unwrap();

        assert_eq!(tx.remaining(), 6);
        let mut dst = [0u8; 1];
        tx.read(&mut dst).unwrap();
        assert_eq!(dst[0], b'4');
    }

    #[test]
    fn commit_seeks_the_wrapped_buffer_to_the_working_cursor() {
        let mut tx = wrap(b"abcdef");
        tx.begin();
        let mut dst = [0u8; 2];
        tx.read(&mut dst).unwrap();
        tx.commit().unwrap();

        // Reading resumes where the transaction left off.
        let mut dst = [0u8; 1];
        tx.read(&mut dst).unwrap();
        assert_eq!(dst[0], b'c');
    }

    // -----------------------------------------------------------------------
    // Nesting
    // -----------------------------------------------------------------------

    #[test]
    fn nested_commit_accepts_child_edits_into_the_parent() {
        let mut tx = wrap(b"L0");
        tx.begin();
        tx.write(b"-L1").unwrap();
        tx.begin();
        tx.write(b"-L2").unwrap();

        tx.commit().unwrap(); // child
        assert_eq!(tx.transaction_level(), 1);
        assert_eq!(tx.snapshot(), b"L0-L1-L2".to_vec());
        assert_eq!(tx.inner().snapshot(), b"L0".to_vec());

        tx.commit().unwrap(); // outermost
        assert_eq!(tx.inner().snapshot(), b"L0-L1-L2".to_vec());
        assert!(!tx.in_transaction());
    }

    #[test]
    fn nested_rollback_restores_the_matching_savepoint_only() {
        let mut tx = wrap(b"L0");
        tx.begin();
        tx.write(b"-L1").unwrap();
        tx.begin();
        tx.write(b"-L2").unwrap();

        tx.rollback().unwrap(); // child only
        assert_eq!(tx.transaction_level(), 1);
        assert_eq!(tx.snapshot(), b"L0-L1".to_vec());

        tx.commit().unwrap();
        assert_eq!(tx.inner().snapshot(), b"L0-L1".to_vec());
    }

    #[test]
    fn nesting_arithmetic() {
        let mut tx = wrap(b"");
        assert_eq!(tx.transaction_level(), 0);
        assert!(!tx.in_transaction());

        for k in 1u32..=5 {
            tx.begin();
            assert_eq!(tx.transaction_level(), k);
        }
        tx.commit().unwrap();
        tx.rollback().unwrap();
        assert_eq!(tx.transaction_level(), 3);
        assert!(tx.in_transaction());

        tx.rollback().unwrap();
        tx.rollback().unwrap();
        tx.rollback().unwrap();
        assert_eq!(tx.transaction_level(), 0);
        assert!(!tx.in_transaction());
    }

    #[test]
    fn savepoint_depth_tracks_level() {
        let mut tx = wrap(b"x");
        tx.begin();
        tx.begin();
        tx.begin();
        let state = tx.tx.as_ref().unwrap();
        assert_eq!(state.level, 3);
        assert_eq!(state.savepoints.len(), 2);

        tx.rollback().unwrap();
        let state = tx.tx.as_ref().unwrap();
        assert_eq!(state.savepoints.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Control errors / close
    // -----------------------------------------------------------------------

    #[test]
    fn commit_and_rollback_require_an_open_transaction() {
        let mut tx = wrap(b"idle");
        assert!(matches!(
            tx.commit().unwrap_err(),
            TxError::NoActiveTransaction
        ));
        assert!(matches!(
            tx.rollback().unwrap_err(),
            TxError::NoActiveTransaction
        ));
    }

    #[test]
    fn close_discards_all_levels_and_spares_the_wrapped_buffer() {
        let mut tx = wrap(b"keep me");
        tx.begin();
        tx.begin();
        tx.write(b" doomed").unwrap();

        tx.close().unwrap();
        assert!(!tx.in_transaction());
        assert_eq!(tx.transaction_level(), 0);
        // The wrapped buffer survives untouched and open.
        assert_eq!(tx.inner().snapshot(), b"keep me".to_vec());
    }

    // -----------------------------------------------------------------------
    // In-transaction reads
    // -----------------------------------------------------------------------

    #[test]
    fn reads_inside_a_transaction_use_the_working_copy() {
        let mut tx = wrap(b"head|tail");
        tx.begin();
        tx.write(b"|appended").unwrap();

        let scan = tx.read_until(b'|');
        assert!(scan.found);
        assert_eq!(scan.bytes, b"head|".to_vec());

        let scan = tx.read_until(b'|');
        assert_eq!(scan.bytes, b"tail|".to_vec());

        let scan = tx.read_until(b'|');
        assert!(!scan.found);
        assert_eq!(scan.bytes, b"appended".to_vec());

        // None of that moved the wrapped cursor.
        assert_eq!(tx.inner().remaining(), 9);
        tx.rollback().unwrap();
    }

    #[test]
    fn end_of_data_inside_a_transaction() {
        let mut tx = wrap(b"ab");
        tx.begin();
        tx.seek(2);
        let mut dst = [0u8; 1];
        assert!(tx.read(&mut dst).unwrap_err().is_end_of_data());
        tx.rollback().unwrap();
    }

    // -----------------------------------------------------------------------
    // Rollback exactness (property)
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn fully_unwound_rollbacks_leave_the_wrapped_buffer_untouched(
            content in proptest::collection::vec(any::<u8>(), 0..64),
            cursor in 0usize..64,
            ops in proptest::collection::vec((0u8..3, proptest::collection::vec(any::<u8>(), 0..8)), 1..12),
        ) {
            let mut inner = SeekBuffer::from_bytes(&content);
            inner.seek(cursor.min(content.len()));
            let expected_content = inner.snapshot();
            let expected_remaining = inner.remaining();

            let mut tx = TransactionBuffer::new(inner);
            tx.begin();
            for (op, data) in ops {
                match op {
                    0 => { tx.write(&data).unwrap(); }
                    1 => tx.begin(),
                    2 => {
                        // Only roll back nested levels here; the outermost
                        // rollback happens after the loop.
                        if tx.transaction_level() > 1 {
                            tx.rollback().unwrap();
                        }
                    }
                    _ => unreachable!(),
                }
            }
            while tx.transaction_level() > 0 {
                tx.rollback().unwrap();
            }

            prop_assert_eq!(tx.inner().snapshot(), expected_content);
            prop_assert_eq!(tx.inner().remaining(), expected_remaining);
        }
    }
}
