//! Configuration for the user sweeper CLI.
//!
//! Settings come from three layers. An optional TOML file provides defaults, the
//! `JIRA_*` environment variables override the file, and command line flags override
//! both. The API token is never read from the file; it comes from the environment,
//! the OS keyring or an interactive prompt (see [`crate::credentials`]).

use std::{
    fs,
    path::{Path, PathBuf},
};

use jira_client::{site_url_for_domain, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;
use user_sweeper_core::DEFAULT_SNAPSHOT_FILENAME;

use crate::errors::Error;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = "user-sweeper.toml";

pub const ENV_DOMAIN: &str = "JIRA_DOMAIN";
pub const ENV_EMAIL: &str = "JIRA_EMAIL";
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Contents of the configuration file. Every field is optional.
///
/// # Example TOML Configuration
///
/// ```toml
/// domain = "mycompany"
/// email = "admin@mycompany.com"
/// snapshot_path = "non_active_users.json"
/// page_size = 100
/// include_former_accounts = false
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Site name; `mycompany` means `https://mycompany.atlassian.net`.
    #[serde(default)]
    pub domain: Option<String>,

    /// Email of the administrator the API token belongs to.
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    #[serde(default)]
    pub page_size: Option<usize>,

    /// Keep accounts the service reports as `former` in the snapshot.
    #[serde(default)]
    pub include_former_accounts: Option<bool>,

    /// Replaces the site URL derived from `domain`.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl AppConfig {
    /// Loads the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the file does not exist
    /// - `Error::LoadFile` if it cannot be read
    /// - `Error::ParseTomlFile` if it is not a valid configuration
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(Error::LoadFile)?;
        let config: AppConfig = toml::from_str(&content).map_err(Error::ParseTomlFile)?;

        info!("Configuration loaded successfully from {:?}", path);
        Ok(config)
    }

    /// Loads the file named on the command line, or the default file if it exists.
    ///
    /// An explicitly named file must exist. A missing default file yields an empty
    /// configuration.
    pub fn load_optional(explicit: Option<&Path>) -> Result<Self, Error> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    debug!("No configuration file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Values given on the command line. They win over the environment and the file.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub domain: Option<String>,
    pub snapshot_path: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub include_former_accounts: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub domain: String,
    pub base_url: Url,
    pub snapshot_path: PathBuf,
    pub page_size: usize,
    pub include_former_accounts: bool,
    /// Email from the environment or the file, offered to the operator at startup.
    pub stored_email: Option<String>,
    /// Token from the environment, offered to the operator at startup.
    pub env_api_token: Option<SecretString>,
}

impl Settings {
    /// Merges the file, the environment and the command line.
    ///
    /// `env` looks up an environment variable; blank values count as unset.
    ///
    /// # Errors
    ///
    /// `Error::Config` if no domain is set anywhere, the page size is out of range
    /// or a URL cannot be built.
    pub fn resolve(
        file: AppConfig,
        env: &dyn Fn(&str) -> Option<String>,
        overrides: CliOverrides,
    ) -> Result<Self, Error> {
        let env_value = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let domain = overrides
            .domain
            .or_else(|| env_value(ENV_DOMAIN))
            .or(file.domain)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "Jira domain is not configured. Set {ENV_DOMAIN}, pass --domain or add `domain` to {DEFAULT_CONFIG_FILENAME}"
                ))
            })?;

        let base_url = match file.base_url {
            Some(raw) => Url::parse(&raw)
                .map_err(|e| Error::Config(format!("Invalid base_url '{raw}': {e}")))?,
            None => site_url_for_domain(&domain).map_err(|e| Error::Config(e.to_string()))?,
        };

        let page_size = overrides
            .page_size
            .or(file.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(Error::Config(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        let snapshot_path = overrides
            .snapshot_path
            .or(file.snapshot_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_FILENAME));

        let include_former_accounts =
            overrides.include_former_accounts || file.include_former_accounts.unwrap_or(false);

        let stored_email = env_value(ENV_EMAIL).or(file.email.filter(|e| !e.trim().is_empty()));
        let env_api_token = env_value(ENV_API_TOKEN).map(SecretString::from);

        debug!(
            domain = %domain,
            base_url = %base_url,
            page_size,
            include_former_accounts,
            "Settings resolved"
        );

        Ok(Self {
            domain,
            base_url,
            snapshot_path,
            page_size,
            include_former_accounts,
            stored_email,
            env_api_token,
        })
    }

    /// Resolves settings against the process environment.
    pub fn from_process_env(file: AppConfig, overrides: CliOverrides) -> Result<Self, Error> {
        Self::resolve(file, &|name| std::env::var(name).ok(), overrides)
    }
}
