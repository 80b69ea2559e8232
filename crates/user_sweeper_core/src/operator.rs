//! The human in the loop.
//!
//! The deletion run never reads the terminal itself. Every decision it needs from the
//! operator goes through [`Operator`], so the CLI can back it with interactive prompts
//! and tests can back it with scripted answers.

use std::collections::HashSet;

use jira_client::Account;

use crate::deletion::DeletionOutcome;

/// Which snapshot accounts the operator chose to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every account in the snapshot
    All,
    /// Only the accounts with these ids; the rest are skipped
    Only(HashSet<String>),
}

impl Selection {
    pub fn includes(&self, account_id: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(ids) => ids.contains(account_id),
        }
    }

    /// Number of `accounts` covered by this selection that will be sent to the
    /// service. Records without an account id are never sent.
    pub fn deletable_in(&self, accounts: &[Account]) -> usize {
        accounts
            .iter()
            .filter(|a| !a.account_id.is_empty() && self.includes(&a.account_id))
            .count()
    }
}

/// Confirmation and selection capability injected into the deletion run.
pub trait Operator {
    /// Asks a yes/no question. `false` means no, or that the question was dismissed.
    fn confirm(&self, prompt: &str) -> bool;

    /// Asks the operator to type `phrase` exactly.
    fn confirm_phrase(&self, prompt: &str, phrase: &str) -> bool;

    /// Lets the operator pick which accounts to delete.
    fn select(&self, _accounts: &[Account]) -> Selection {
        Selection::All
    }

    /// Called once per account as soon as its outcome is known.
    fn on_outcome(&self, _outcome: &DeletionOutcome) {}
}
