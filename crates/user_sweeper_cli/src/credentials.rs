//! Resolution of the email and API token used to talk to Jira.
//!
//! Stored values (environment variables, the configuration file for the email, the
//! OS keyring for the token) are offered to the operator before being used. Anything
//! missing or declined is asked for interactively. Tokens are kept in [`SecretString`]
//! and never logged.

use std::fmt;

use jira_client::Credentials;
use keyring::Entry;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

use crate::{config::Settings, errors::Error};

pub const KEY_RING_SERVICE_NAME: &str = "user_sweeper_cli";

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;

/// Free-text and yes/no questions asked while setting up a session.
pub trait Prompter {
    fn input_text(&self, prompt: &str) -> Result<String, Error>;

    /// Reads a value without echoing it.
    fn input_secret(&self, prompt: &str) -> Result<String, Error>;

    fn yes_no(&self, prompt: &str, default: bool) -> Result<bool, Error>;
}

/// Persistent storage for API tokens, keyed by account email.
pub trait TokenStore {
    /// Returns the stored token, or `None` if there is none or it cannot be read.
    fn get(&self, email: &str) -> Option<SecretString>;

    fn set(&self, email: &str, token: &SecretString) -> Result<(), Error>;
}

/// Token storage in the operating system keyring.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringTokenStore;

impl TokenStore for KeyringTokenStore {
    fn get(&self, email: &str) -> Option<SecretString> {
        let entry = match Entry::new(KEY_RING_SERVICE_NAME, email) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to open keyring entry: {}", e);
                return None;
            }
        };

        match entry.get_password() {
            Ok(token) => Some(SecretString::from(token)),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!("Failed to read API token from keyring: {}", e);
                None
            }
        }
    }

    fn set(&self, email: &str, token: &SecretString) -> Result<(), Error> {
        let entry = Entry::new(KEY_RING_SERVICE_NAME, email)
            .map_err(|e| Error::Auth(format!("Failed to open keyring entry: {e}")))?;
        entry
            .set_password(token.expose_secret())
            .map_err(|e| Error::Auth(format!("Failed to store API token in keyring: {e}")))?;

        info!("API token stored in keyring");
        Ok(())
    }
}

/// Where the API token of a session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    Keyring,
    Prompt,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Environment => write!(f, "environment"),
            TokenSource::Keyring => write!(f, "keyring"),
            TokenSource::Prompt => write!(f, "prompt"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub credentials: Credentials,
    pub token_source: TokenSource,
}

/// Determines the email and API token for a session.
///
/// With `force_prompt` set, stored values are skipped and both are asked for; this is
/// used after the service rejected the previous credentials.
///
/// # Errors
///
/// `Error::Auth` if the operator leaves the email or token empty; `Error::Prompt` if
/// reading the terminal fails.
#[instrument(skip(settings, prompter, store))]
pub fn resolve_credentials(
    settings: &Settings,
    prompter: &dyn Prompter,
    store: &dyn TokenStore,
    force_prompt: bool,
) -> Result<ResolvedCredentials, Error> {
    let email = resolve_email(settings, prompter, force_prompt)?;

    let stored_token = if force_prompt {
        None
    } else {
        settings
            .env_api_token
            .clone()
            .map(|token| (token, TokenSource::Environment))
            .or_else(|| store.get(&email).map(|token| (token, TokenSource::Keyring)))
    };

    let offered = match stored_token {
        Some((token, source)) => {
            if prompter.yes_no(&format!("Use stored API token (from {source})?"), true)? {
                Some((token, source))
            } else {
                None
            }
        }
        None => None,
    };

    let (api_token, token_source) = match offered {
        Some(pair) => pair,
        None => {
            let typed = prompter.input_secret("Jira API token")?;
            let typed = typed.trim();
            if typed.is_empty() {
                return Err(Error::Auth("API token is required".to_string()));
            }
            (SecretString::from(typed.to_string()), TokenSource::Prompt)
        }
    };

    debug!(token_source = %token_source, "Credentials resolved");
    Ok(ResolvedCredentials {
        credentials: Credentials { email, api_token },
        token_source,
    })
}

fn resolve_email(
    settings: &Settings,
    prompter: &dyn Prompter,
    force_prompt: bool,
) -> Result<String, Error> {
    if !force_prompt {
        if let Some(email) = &settings.stored_email {
            if prompter.yes_no(&format!("Use stored email ({email})?"), true)? {
                return Ok(email.clone());
            }
        }
    }

    let typed = prompter.input_text("Jira account email")?;
    let typed = typed.trim();
    if typed.is_empty() {
        return Err(Error::Auth("Email is required".to_string()));
    }
    Ok(typed.to_string())
}

/// Offers to keep a freshly typed token in the keyring. Call only after the
/// service accepted it.
///
/// Failing to store the token is logged and otherwise ignored.
pub fn offer_to_store_token(
    resolved: &ResolvedCredentials,
    prompter: &dyn Prompter,
    store: &dyn TokenStore,
) -> Result<bool, Error> {
    if resolved.token_source != TokenSource::Prompt {
        return Ok(false);
    }

    if !prompter.yes_no("Save the API token to the system keyring?", false)? {
        return Ok(false);
    }

    let credentials = &resolved.credentials;
    match store.set(&credentials.email, &credentials.api_token) {
        Ok(()) => Ok(true),
        Err(e) => {
            warn!("{}", e);
            Ok(false)
        }
    }
}
