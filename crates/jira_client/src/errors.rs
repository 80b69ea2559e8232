//! Error types for Jira client operations.
//!
//! This module defines the error types that can occur when talking to the Jira Cloud
//! REST API through the jira_client crate. Every error maps onto an [`ErrorKind`] so
//! callers can report failures per account without matching on every variant.

use std::time::Duration;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during Jira client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use jira_client::Error;
///
/// match client.delete_user("5b10ac8d82e05b22cc7d4ef5").await {
///     Ok(status) => println!("Deleted: {status:?}"),
///     Err(Error::Permission(msg)) => eprintln!("Not allowed: {msg}"),
///     Err(Error::RateLimited { retry_after }) => eprintln!("Throttled: {retry_after:?}"),
///     Err(err) => eprintln!("Other error: {err}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The service rejected the email/API token pair.
    ///
    /// Returned for HTTP 401 responses, and for 403 responses on the connection
    /// check where the credentials are valid but carry no API access.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The request could not be delivered or no response arrived in time.
    #[error("Network error: {0}")]
    Network(String),

    /// The service is throttling requests (HTTP 429).
    ///
    /// `retry_after` holds the `Retry-After` hint when the service sent one.
    /// The client never retries on its own.
    #[error("Rate limit exceeded{}", format_retry_after(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// The service refused the operation for this specific resource, for example
    /// deleting an organization administrator.
    #[error("Permission denied: {0}")]
    Permission(String),

    /// The service answered with an unexpected non-success status.
    #[error("Service returned HTTP {status}: {message}")]
    Service { status: u16, message: String },

    /// A success response whose body does not match the expected shape.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// The request could not be built from the given arguments.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// The coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Auth(_) => ErrorKind::Auth,
            Error::Network(_) => ErrorKind::Network,
            Error::RateLimited { .. } => ErrorKind::RateLimit,
            Error::Permission(_) => ErrorKind::Permission,
            Error::Service { .. } | Error::InvalidResponse(_) | Error::InvalidRequest(_) => {
                ErrorKind::Service
            }
        }
    }
}

/// Coarse classification of a failed API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Auth,
    Network,
    RateLimit,
    Permission,
    Service,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Auth => "auth",
            ErrorKind::Network => "network",
            ErrorKind::RateLimit => "rate-limit",
            ErrorKind::Permission => "permission",
            ErrorKind::Service => "service",
        };
        f.write_str(name)
    }
}

fn format_retry_after(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(", retry after {}s", d.as_secs()),
        None => String::new(),
    }
}
