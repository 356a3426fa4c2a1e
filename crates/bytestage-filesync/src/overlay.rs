use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytestage_buffer::{BufferError, BufferResult, Delimited, SeekableBuffer};
use tracing::{debug, warn};

/// Open mirror target: the backing file plus the path it was opened at.
struct Mirror {
    file: File,
    path: PathBuf,
}

/// File-mirroring overlay over any [`SeekableBuffer`] implementer.
///
/// While sync is enabled, every write is followed by a catch-up sync that
/// appends the unsynced tail of the wrapped buffer's content to the
/// backing file, and every seek repositions the file's cursor to the same
/// absolute offset. Reads never consult the file.
///
/// The overlay exclusively owns the file handle it opened; no other writer
/// may touch that path while sync is enabled, or the sync frontier stops
/// describing the file.
pub struct FileSyncBuffer<B: SeekableBuffer> {
    inner: B,
    mirror: Option<Mirror>,
    /// Number of leading content bytes already written to the file.
    synced_len: usize,
}

impl<B: SeekableBuffer> FileSyncBuffer<B> {
    /// Wrap `inner` with file-sync support. Sync starts disabled.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            mirror: None,
            synced_len: 0,
        }
    }

    /// Shared access to the wrapped buffer.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Exclusive access to the wrapped buffer.
    ///
    /// Intended for driving a wrapped overlay's own controls (e.g. the
    /// transaction overlay's `begin`/`commit`/`rollback`). Mutating the
    /// content through this reference bypasses the mirror: the file stays
    /// behind until the next synced write.
    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    /// Consume the overlay and return the wrapped buffer. The file handle,
    /// if open, is dropped without a final flush.
    pub fn into_inner(self) -> B {
        self.inner
    }

    /// Start mirroring to the file at `path`.
    ///
    /// If already syncing to a different path the old handle is closed
    /// first. The target is opened read-write (created if absent),
    /// truncated to zero, and caught up with the wrapped buffer's current
    /// content -- enabling against a non-empty buffer mirrors all of it.
    pub fn enable_sync(&mut self, path: &Path) -> BufferResult<()> {
        // Switching targets closes the old handle; the new file starts
        // from the buffer's current content, not the old file's bytes.
        let mirror = match self.mirror.take() {
            Some(m) if m.path == path => m,
            _ => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .open(path)?;
                Mirror {
                    file,
                    path: path.to_path_buf(),
                }
            }
        };
        let mirror = self.mirror.insert(mirror);

        mirror.file.set_len(0)?;
        mirror.file.seek(SeekFrom::Start(0))?;
        self.synced_len = 0;
        self.sync_new_data()?;
        debug!(path = %path.display(), "file sync enabled");
        Ok(())
    }

    /// Stop mirroring and close the file handle.
    ///
    /// The wrapped buffer's in-memory content is untouched. Idempotent:
    /// calling while already disabled is a no-op success.
    pub fn disable_sync(&mut self) -> BufferResult<()> {
        if let Some(mirror) = self.mirror.take() {
            self.synced_len = 0;
            mirror.file.sync_all()?;
            debug!(path = %mirror.path.display(), "file sync disabled");
        }
        Ok(())
    }

    /// Returns `true` while a backing file is attached.
    pub fn is_sync_enabled(&self) -> bool {
        self.mirror.is_some()
    }

    /// Path of the backing file, or `None` while sync is disabled.
    pub fn sync_path(&self) -> Option<&Path> {
        self.mirror.as_ref().map(|m| m.path.as_path())
    }

    /// Append the unsynced tail of the wrapped content to the file.
    ///
    /// The file's current cursor is saved and restored around the tail
    /// write, so the logical position set by the last seek/rewind
    /// survives. Advances the frontier by the bytes written.
    fn sync_new_data(&mut self) -> BufferResult<()> {
        let Some(mirror) = self.mirror.as_mut() else {
            return Ok(());
        };
        let content = self.inner.snapshot();
        if self.synced_len >= content.len() {
            return Ok(());
        }

        let saved = mirror.file.stream_position()?;
        mirror.file.seek(SeekFrom::Start(self.synced_len as u64))?;
        let tail = &content[self.synced_len..];
        mirror.file.write_all(tail)?;
        self.synced_len = content.len();
        mirror.file.seek(SeekFrom::Start(saved))?;

        debug!(bytes = tail.len(), frontier = self.synced_len, "mirrored tail");
        Ok(())
    }

    /// Move the file cursor to `offset`.
    ///
    /// The contract's `seek` cannot report I/O failures; a reposition
    /// failure is logged and the frontier is left alone, so the next
    /// catch-up sync still writes from the right place.
    fn position_file(&mut self, offset: usize) {
        if let Some(mirror) = self.mirror.as_mut() {
            if let Err(e) = mirror.file.seek(SeekFrom::Start(offset as u64)) {
                warn!(offset, error = %e, "failed to reposition mirror file");
            }
        }
    }
}

impl<B: SeekableBuffer> SeekableBuffer for FileSyncBuffer<B> {
    /// Write to the wrapped buffer, then mirror the new bytes.
    ///
    /// On a mirror failure the in-memory write already happened and
    /// stands; the error reports that the file is now behind the buffer,
    /// not that bytes were lost.
    fn write(&mut self, src: &[u8]) -> BufferResult<usize> {
        let n = self.inner.write(src)?;
        self.sync_new_data()?;
        Ok(n)
    }

    /// Append to the wrapped buffer, then mirror the new bytes.
    ///
    /// Mirror failures are reported exactly as for [`write`](Self::write).
    fn append(&mut self, src: &[u8]) -> BufferResult<()> {
        self.inner.append(src)?;
        self.sync_new_data()
    }

    fn read(&mut self, dst: &mut [u8]) -> BufferResult<usize> {
        self.inner.read(dst)
    }

    fn read_until(&mut self, delim: u8) -> Delimited {
        self.inner.read_until(delim)
    }

    fn seek(&mut self, offset: usize) {
        self.inner.seek(offset);
        self.position_file(offset);
    }

    fn rewind(&mut self) {
        self.inner.rewind();
        self.position_file(0);
    }

    fn remaining(&self) -> usize {
        self.inner.remaining()
    }

    fn snapshot(&self) -> Vec<u8> {
        self.inner.snapshot()
    }

    /// Close the wrapped buffer AND the backing file, clearing sync state.
    ///
    /// The file-close error wins over the wrapped-close error.
    fn close(&mut self) -> BufferResult<()> {
        let buffer_result = self.inner.close();
        let mut file_result = Ok(());
        if let Some(mirror) = self.mirror.take() {
            self.synced_len = 0;
            file_result = mirror.file.sync_all().map_err(BufferError::from);
        }
        file_result.and(buffer_result)
    }
}

impl<B: SeekableBuffer + std::fmt::Debug> std::fmt::Debug for FileSyncBuffer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSyncBuffer")
            .field("inner", &self.inner)
            .field("path", &self.sync_path())
            .field("synced_len", &self.synced_len)
            .finish()
    }
}
