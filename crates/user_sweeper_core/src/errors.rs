use std::{io, path::PathBuf};

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors raised while reading or writing the review snapshot.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No snapshot has been written yet.
    #[error("No review snapshot found at {}. Fetch non-active users first.", .0.display())]
    NotFound(PathBuf),

    /// The snapshot is not a JSON array of account records.
    #[error("Review snapshot {} is not valid: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot lists an account that is still active.
    ///
    /// Snapshots only ever contain non-active accounts, so an active record means the
    /// file was edited by hand or written by something else.
    #[error("Review snapshot {} lists active account {account_id}", .path.display())]
    ActiveAccount { path: PathBuf, account_id: String },

    /// Reading, writing or replacing the snapshot file failed.
    #[error("Failed to access review snapshot {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
