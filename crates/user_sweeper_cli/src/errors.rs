use std::io;

use thiserror::Error;
use user_sweeper_core::StoreError;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the user sweeper CLI.
///
/// This enum covers startup failures (configuration, credentials), failures
/// reported by the Jira API and the review snapshot, and terminal I/O problems.
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials are missing or were rejected.
    ///
    /// Fatal at startup. Mid-session the operator is offered to re-enter them.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration error occurred while loading or validating settings.
    ///
    /// This error is returned when the configuration file, environment or
    /// command line leaves a required value unset or sets an invalid one.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A call to the Jira API failed.
    #[error("Jira request failed: {0}")]
    Jira(#[from] jira_client::Error),

    /// Reading or writing the review snapshot failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failed to load a file from the filesystem.
    ///
    /// This error wraps underlying I/O errors that occur when reading files,
    /// such as permission issues or missing files.
    #[error("Failed to load file.")]
    LoadFile(#[source] io::Error),

    /// Failed to parse a TOML configuration file.
    ///
    /// This error is returned when the TOML configuration file contains
    /// invalid syntax or structure that cannot be parsed.
    #[error("Failed to parse TOML configuration file.")]
    ParseTomlFile(#[source] toml::de::Error),

    /// Reading an answer from the operator failed.
    #[error("Failed to read input: {0}")]
    Prompt(String),

    /// Writing to the terminal failed.
    #[error("Failed to write output: {0}")]
    Output(#[source] io::Error),
}

impl Error {
    /// Whether this error means the service no longer accepts the session's credentials.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, Error::Jira(jira_client::Error::Auth(_)))
    }
}
