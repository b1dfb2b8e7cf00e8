//! A sentinel-file lock that keeps `index` and `clear` mutually
//! exclusive for a single index directory, matching the
//! single-writer concurrency model: SQLite's own WAL mode already
//! serializes writers, but a sentinel lets a contending invocation
//! fail fast with a clear message instead of blocking on
//! `busy_timeout`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::MawError;

pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    pub fn acquire(index_dir: &Path) -> Result<Self, MawError> {
        fs::create_dir_all(index_dir).map_err(|source| MawError::FileRead {
            path: index_dir.to_path_buf(),
            source,
        })?;

        let lock_path = index_dir.join(".lock");
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|source| {
                let source = if source.kind() == io::ErrorKind::AlreadyExists {
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "another maw index/clear operation is already running",
                    )
                } else {
                    source
                };
                MawError::FileRead {
                    path: lock_path.clone(),
                    source,
                }
            })?;

        Ok(LockGuard { path: lock_path })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
