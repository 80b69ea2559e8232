//! Crate for interacting with the Jira Cloud REST API.
//!
//! This crate provides a client for making authenticated requests to a Jira Cloud site,
//! authenticating with an account email and API token (HTTP Basic). It covers the user
//! directory operations needed to sweep inactive accounts: a connection check, paginated
//! user listing and single-account deletion.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

pub mod account;
pub use account::{Account, AccountType, CurrentUser};

pub mod errors;
pub use errors::{Error, ErrorKind};

mod pagination;
pub use pagination::{list_all_users, UserPages, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

const USER_AGENT: &str = concat!("user-sweeper/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The email/API token pair used for HTTP Basic authentication.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub api_token: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_token: SecretString::from(api_token.into()),
        }
    }
}

/// Result of a single-account deletion.
///
/// Both variants are successes: an account the service no longer knows about is
/// treated as already deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// The service removed the account
    Deleted,
    /// The service reported the account as absent (HTTP 404)
    AlreadyAbsent,
}

/// Trait for user directory operations against the remote service.
///
/// The sweeper core depends on this trait rather than on [`JiraClient`] so that the
/// workflow can run against an in-memory directory in tests.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Verifies that the credentials are valid and the service is reachable.
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` for rejected credentials, `Error::Network` when the
    /// service cannot be reached, and `Error::Service` for other failures.
    async fn test_connection(&self) -> Result<CurrentUser, Error>;

    /// Fetches one page of user accounts, starting at the zero-based `start_at` index.
    ///
    /// Use [`list_all_users`] or [`UserPages`] to walk every page.
    async fn list_users_page(
        &self,
        start_at: usize,
        max_results: usize,
    ) -> Result<Vec<Account>, Error>;

    /// Deletes a single account.
    ///
    /// # Errors
    ///
    /// Returns `Error::Permission` when the service refuses to delete this account,
    /// `Error::Auth` for rejected credentials, `Error::RateLimited` when throttled.
    async fn delete_user(&self, account_id: &str) -> Result<DeleteStatus, Error>;
}

/// A client for the Jira Cloud REST API, authenticated with an email and API token.
#[derive(Debug)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl JiraClient {
    /// Creates a new client for the given base URL.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The site root, e.g. `https://example.atlassian.net`.
    /// * `credentials` - The email and API token used for every request.
    ///
    /// # Errors
    /// Returns `Error::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(base_url: Url, credentials: Credentials) -> Result<Self, Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::InvalidRequest(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Creates a client for a Jira Cloud site given by its domain.
    ///
    /// `example` resolves to `https://example.atlassian.net`. A full host name or URL
    /// is used as given.
    ///
    /// # Example
    ///
    /// ```rust
    /// use jira_client::{Credentials, JiraClient};
    ///
    /// let client = JiraClient::for_domain(
    ///     "example",
    ///     Credentials::new("admin@example.com", "api-token"),
    /// ).unwrap();
    ///
    /// assert_eq!(client.base_url().as_str(), "https://example.atlassian.net/");
    /// ```
    pub fn for_domain(domain: &str, credentials: Credentials) -> Result<Self, Error> {
        Self::new(site_url_for_domain(domain)?, credentials)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|e| Error::InvalidRequest(format!("Invalid endpoint '{path}': {e}")))
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http.request(method, url).basic_auth(
            &self.credentials.email,
            Some(self.credentials.api_token.expose_secret()),
        )
    }
}

#[async_trait]
impl UserDirectory for JiraClient {
    #[instrument(skip(self))]
    async fn test_connection(&self) -> Result<CurrentUser, Error> {
        let url = self.endpoint("/rest/api/3/myself")?;
        info!(base_url = %self.base_url, "Checking connection to Jira");

        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = error_message(response).await;
            error!(status = status.as_u16(), "Connection check rejected the credentials");
            return Err(Error::Auth(message));
        }

        let response = check_status(response, "Connection check failed").await?;
        let user: CurrentUser = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        info!(
            account_id = %user.account_id,
            display_name = %user.display_name,
            "Connected to Jira"
        );
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list_users_page(
        &self,
        start_at: usize,
        max_results: usize,
    ) -> Result<Vec<Account>, Error> {
        let mut url = self.endpoint("/rest/api/3/users")?;
        url.query_pairs_mut()
            .append_pair("startAt", &start_at.to_string())
            .append_pair("maxResults", &max_results.to_string());
        debug!("Making API call to: {}", url);

        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response, "Failed to list users").await?;
        let page: Vec<Account> = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        debug!(count = page.len(), "Received page of users");
        Ok(page)
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn delete_user(&self, account_id: &str) -> Result<DeleteStatus, Error> {
        if account_id.is_empty() {
            return Err(Error::InvalidRequest("account id is empty".to_string()));
        }

        let mut url = self.endpoint("/rest/api/3/user")?;
        url.query_pairs_mut().append_pair("accountId", account_id);

        let response = self
            .request(reqwest::Method::DELETE, url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        match status {
            StatusCode::NO_CONTENT | StatusCode::OK => {
                info!("Deleted user");
                Ok(DeleteStatus::Deleted)
            }
            StatusCode::NOT_FOUND => {
                info!("User already absent");
                Ok(DeleteStatus::AlreadyAbsent)
            }
            // Jira answers 400 for accounts it will not delete (site admins, managed accounts).
            StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN => {
                let message = error_message(response).await;
                warn!(
                    status = status.as_u16(),
                    error_message = %message,
                    "Deletion refused"
                );
                Err(Error::Permission(message))
            }
            _ => {
                check_status(response, "Failed to delete user").await?;
                Ok(DeleteStatus::Deleted)
            }
        }
    }
}

/// Builds the site root URL for a Jira Cloud domain.
///
/// A bare site name gets the `.atlassian.net` suffix; a host name or URL is kept.
pub fn site_url_for_domain(domain: &str) -> Result<Url, Error> {
    let trimmed = domain.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::InvalidRequest("domain is empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else if trimmed.contains('.') {
        format!("https://{trimmed}")
    } else {
        format!("https://{trimmed}.atlassian.net")
    };

    Url::parse(&candidate)
        .map_err(|e| Error::InvalidRequest(format!("Invalid domain '{domain}': {e}")))
}

/// Jira's standard error body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: std::collections::BTreeMap<String, String>,
}

impl JiraErrorBody {
    fn into_message(self) -> Option<String> {
        let mut parts = self.error_messages;
        parts.extend(self.errors.into_iter().map(|(k, v)| format!("{k}: {v}")));
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        error!(error_message = e.to_string(), "Request timed out");
    } else {
        error!(error_message = e.to_string(), "Request failed to reach Jira");
    }
    Error::Network(e.to_string())
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Reads the response body into a human-readable message.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    serde_json::from_str::<JiraErrorBody>(&text)
        .ok()
        .and_then(JiraErrorBody::into_message)
        .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        })
}

/// Passes success responses through and maps everything else onto an [`Error`].
async fn check_status(response: Response, context: &str) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = retry_after(&response);
        warn!(retry_after = ?retry_after, "{}. Jira is throttling requests", context);
        return Err(Error::RateLimited { retry_after });
    }

    let message = error_message(response).await;
    error!(
        status = status.as_u16(),
        error_message = %message,
        "{}. Received an error from Jira",
        context
    );

    match status {
        StatusCode::UNAUTHORIZED => Err(Error::Auth(message)),
        StatusCode::FORBIDDEN => Err(Error::Permission(message)),
        _ => Err(Error::Service {
            status: status.as_u16(),
            message,
        }),
    }
}
