//! Classification of fetched accounts.
//!
//! Both filters are stable: the output keeps the relative order of the input, so a
//! deterministic listing order produces a deterministic snapshot.

use jira_client::{Account, AccountType};

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;

/// Keeps the accounts whose `active` flag is false.
pub fn filter_inactive<I>(accounts: I) -> Vec<Account>
where
    I: IntoIterator<Item = Account>,
{
    accounts.into_iter().filter(|a| !a.active).collect()
}

/// Drops accounts the service has already deleted (`accountType == "former"`).
pub fn exclude_former<I>(accounts: I) -> Vec<Account>
where
    I: IntoIterator<Item = Account>,
{
    accounts
        .into_iter()
        .filter(|a| a.account_type != AccountType::Former)
        .collect()
}
