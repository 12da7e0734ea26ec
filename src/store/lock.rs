//! Advisory per-file write locks.
//!
//! Writers to the same entry file take an exclusive `flock`-style lock for the
//! duration of the write. Readers never lock, so a reader may see a file
//! mid-write. Acquisition never waits: contention is reported immediately as
//! [`LockError::FileBusy`].

use crate::errors::{AppResult, LockError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An open entry file holding an exclusive advisory lock.
///
/// The lock is released when the guard is dropped.
#[derive(Debug)]
pub struct WriteLock {
    file: File,
    path: PathBuf,
}

impl WriteLock {
    /// Opens (creating if needed) and locks `path` without truncating it.
    ///
    /// # Errors
    ///
    /// - `LockError::FileBusy` if another writer holds the lock
    /// - `LockError::AcquisitionFailed` if the file cannot be opened or locked
    pub fn acquire(path: &Path) -> AppResult<Self> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(false);
        #[cfg(unix)]
        options.mode(crate::constants::DEFAULT_FILE_PERMISSIONS);

        let file = options.open(path).map_err(|source| LockError::AcquisitionFailed {
            path: path.to_path_buf(),
            source,
        })?;

        if let Err(e) = FileExt::try_lock_exclusive(&file) {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                debug!("Lock contended: {:?}", path);
                return Err(LockError::FileBusy {
                    path: path.to_path_buf(),
                }
                .into());
            }
            return Err(LockError::AcquisitionFailed {
                path: path.to_path_buf(),
                source: e,
            }
            .into());
        }

        debug!("Acquired write lock: {:?}", path);
        Ok(WriteLock {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Replaces the file's contents while the lock is held.
    pub fn replace_contents(&mut self, contents: &[u8]) -> AppResult<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(contents)?;
        self.file.sync_data()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to release lock on {:?}: {}", self.path, e);
        } else {
            debug!("Released write lock: {:?}", self.path);
        }
    }
}
