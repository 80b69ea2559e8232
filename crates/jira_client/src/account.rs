//! Account domain types.
//!
//! This module contains the user account records returned by the Jira Cloud user
//! endpoints. Field names follow the wire format (camelCase) so that a record can be
//! written to disk and read back without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;

/// A Jira Cloud user account.
///
/// Only the fields the sweeper acts on are typed. Everything else the service sends
/// (`self`, `avatarUrls`, `timeZone`, ...) is kept in `extra` and serialized back
/// unchanged, so records survive a round trip through the review snapshot.
///
/// # Examples
///
/// ```rust
/// use jira_client::{Account, AccountType};
///
/// let account: Account = serde_json::from_str(
///     r#"{"accountId": "5b10a2844c20165700ede21g", "displayName": "Mia Krystof",
///         "active": false, "accountType": "atlassian", "locale": "en_US"}"#,
/// ).unwrap();
///
/// assert!(!account.active);
/// assert_eq!(account.account_type, AccountType::Atlassian);
/// assert_eq!(account.extra["locale"], "en_US");
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// The service-assigned identifier, stable across calls
    pub account_id: String,

    /// The name shown in the Jira UI
    #[serde(default)]
    pub display_name: String,

    /// Email address, hidden for some account types and privacy settings
    #[serde(default)]
    pub email_address: Option<String>,

    /// Whether the account can currently log in
    pub active: bool,

    /// The service's classification of the account
    pub account_type: AccountType,

    /// Fields not modelled above, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    /// The email address, or a placeholder when the service hides it.
    pub fn email_or_placeholder(&self) -> &str {
        self.email_address.as_deref().unwrap_or("No email")
    }

    /// The display name, or a placeholder when the service sent none.
    pub fn name_or_placeholder(&self) -> &str {
        if self.display_name.is_empty() {
            "Unknown"
        } else {
            &self.display_name
        }
    }
}

/// The account classification reported in the `accountType` field.
///
/// Values the crate does not know about are kept as [`AccountType::Other`] with the
/// original string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum AccountType {
    /// A regular Atlassian account
    Atlassian,
    /// An app or integration account
    App,
    /// A Jira Service Management customer (portal-only) account
    Customer,
    /// An account that has already been deleted
    Former,
    Other(String),
}

impl AccountType {
    pub fn as_str(&self) -> &str {
        match self {
            AccountType::Atlassian => "atlassian",
            AccountType::App => "app",
            AccountType::Customer => "customer",
            AccountType::Former => "former",
            AccountType::Other(value) => value,
        }
    }
}

impl From<String> for AccountType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "atlassian" => AccountType::Atlassian,
            "app" => AccountType::App,
            "customer" => AccountType::Customer,
            "former" => AccountType::Former,
            _ => AccountType::Other(value),
        }
    }
}

impl From<AccountType> for String {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The account the client is authenticated as, returned by the connection check.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub account_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
}
