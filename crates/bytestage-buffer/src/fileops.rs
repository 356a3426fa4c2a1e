//! Whole-buffer file conveniences on [`SeekBuffer`].
//!
//! These operate on the content wholesale and sit outside the overlay
//! protocols: they do not consult transaction state and they bypass the
//! file-sync frontier. Calling them on a buffer that participates in an
//! active file sync is unspecified.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::BufferResult;
use crate::store::SeekBuffer;

impl SeekBuffer {
    /// Write the full content to `path`, creating or truncating the file.
    pub fn save_to_file(&self, path: &Path) -> BufferResult<()> {
        fs::write(path, self.content())?;
        debug!(path = %path.display(), bytes = self.len(), "buffer saved");
        Ok(())
    }

    /// Append the full content to the end of `path`, creating the file if
    /// it does not exist.
    pub fn append_to_file(&self, path: &Path) -> BufferResult<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(self.content())?;
        debug!(path = %path.display(), bytes = self.len(), "buffer appended");
        Ok(())
    }

    /// Append only the unread portion (`content[cursor..]`) to the end of
    /// `path`, creating the file if it does not exist. The cursor is not
    /// moved.
    pub fn append_unread_to_file(&self, path: &Path) -> BufferResult<()> {
        let start = self.cursor().min(self.len());
        let tail = &self.content()[start..];
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(tail)?;
        debug!(path = %path.display(), bytes = tail.len(), "unread tail appended");
        Ok(())
    }

    /// Replace the content with the bytes of the file at `path` and reset
    /// the cursor to the start.
    pub fn load_from_file(&mut self, path: &Path) -> BufferResult<()> {
        let content = fs::read(path)?;
        debug!(path = %path.display(), bytes = content.len(), "buffer loaded");
        self.replace_content(content);
        Ok(())
    }
}
