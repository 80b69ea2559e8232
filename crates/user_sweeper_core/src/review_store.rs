//! On-disk review snapshot.
//!
//! The snapshot is the hand-off between the fetch and delete phases: a pretty-printed
//! JSON array of account records that the operator can read (and trim) before anything
//! is deleted. Writes go to a temporary file in the same directory which is then
//! renamed over the snapshot, so a reader sees either the previous snapshot or the new
//! one, never a truncated file.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use jira_client::Account;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::errors::StoreError;

/// Default snapshot file name, relative to the working directory.
pub const DEFAULT_SNAPSHOT_FILENAME: &str = "non_active_users.json";

#[cfg(test)]
#[path = "review_store_tests.rs"]
mod tests;

/// Reads and writes the review snapshot at a fixed path.
#[derive(Debug, Clone)]
pub struct ReviewStore {
    path: PathBuf,
}

impl ReviewStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a snapshot file is present. Never fails.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the accounts from the snapshot, in the order they were saved.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if no snapshot has been written
    /// - `StoreError::Format` if the file is not a JSON array of account records
    /// - `StoreError::ActiveAccount` if a record has `active: true`
    /// - `StoreError::Io` for other read failures
    pub fn load(&self) -> Result<Vec<Account>, StoreError> {
        debug!("Loading review snapshot from {:?}", self.path);

        let content = fs::read(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(self.path.clone()),
            _ => StoreError::Io {
                path: self.path.clone(),
                source: e,
            },
        })?;

        let accounts: Vec<Account> =
            serde_json::from_slice(&content).map_err(|e| StoreError::Format {
                path: self.path.clone(),
                source: e,
            })?;

        if let Some(active) = accounts.iter().find(|a| a.active) {
            return Err(StoreError::ActiveAccount {
                path: self.path.clone(),
                account_id: active.account_id.clone(),
            });
        }

        debug!(count = accounts.len(), "Loaded review snapshot");
        Ok(accounts)
    }

    /// Replaces the snapshot with `accounts`.
    ///
    /// Either the whole new snapshot becomes visible or the previous file (or its
    /// absence) is left untouched.
    pub fn save(&self, accounts: &[Account]) -> Result<(), StoreError> {
        self.stage(accounts)?.commit()
    }

    /// Writes `accounts` to a temporary file next to the snapshot without replacing it.
    ///
    /// The snapshot only changes once [`StagedSnapshot::commit`] is called. Dropping the
    /// staged snapshot removes the temporary file.
    pub fn stage(&self, accounts: &[Account]) -> Result<StagedSnapshot, StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let mut file = NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        serde_json::to_writer_pretty(&mut file, accounts)
            .map_err(|e| self.io_error(io::Error::other(e)))?;
        file.write_all(b"\n").map_err(|e| self.io_error(e))?;
        file.flush().map_err(|e| self.io_error(e))?;
        file.as_file().sync_all().map_err(|e| self.io_error(e))?;

        debug!(
            count = accounts.len(),
            temp_path = ?file.path(),
            "Staged review snapshot"
        );
        Ok(StagedSnapshot {
            file,
            target: self.path.clone(),
            count: accounts.len(),
        })
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// A fully written snapshot waiting to replace the current one.
#[derive(Debug)]
pub struct StagedSnapshot {
    file: NamedTempFile,
    target: PathBuf,
    count: usize,
}

impl StagedSnapshot {
    /// Atomically renames the staged file over the snapshot path.
    pub fn commit(self) -> Result<(), StoreError> {
        let target = self.target;
        self.file.persist(&target).map_err(|e| StoreError::Io {
            path: target.clone(),
            source: e.error,
        })?;

        info!(count = self.count, "Review snapshot saved to {:?}", target);
        Ok(())
    }
}
