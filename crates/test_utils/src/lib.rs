//! Test utilities shared by the sweeper crates.
//!
//! This crate provides in-memory stand-ins for the two outside parties of a sweep:
//! the remote user directory ([`FakeDirectory`]) and the human operator
//! ([`ScriptedOperator`]), plus builders for account records.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use jira_client::{
    Account, AccountType, CurrentUser, DeleteStatus, Error, ErrorKind, UserDirectory,
};
use user_sweeper_core::{DeletionOutcome, Operator, Selection, CONFIRMATION_PHRASE};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Builds an account record with the given id and state.
pub fn account(id: &str, active: bool, account_type: AccountType) -> Account {
    Account {
        account_id: id.to_string(),
        display_name: format!("User {id}"),
        email_address: Some(format!("{id}@example.com")),
        active,
        account_type,
        extra: Default::default(),
    }
}

/// A non-active Atlassian account.
pub fn inactive_account(id: &str) -> Account {
    account(id, false, AccountType::Atlassian)
}

/// An active Atlassian account.
pub fn active_account(id: &str) -> Account {
    account(id, true, AccountType::Atlassian)
}

/// Builds the error a real client would return for `kind`.
pub fn error_of_kind(kind: ErrorKind, context: &str) -> Error {
    match kind {
        ErrorKind::Auth => Error::Auth(format!("{context}: bad credentials")),
        ErrorKind::Network => Error::Network(format!("{context}: connection reset")),
        ErrorKind::RateLimit => Error::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        },
        ErrorKind::Permission => Error::Permission(format!("{context}: not allowed")),
        ErrorKind::Service => Error::Service {
            status: 500,
            message: format!("{context}: internal error"),
        },
    }
}

/// A request received by a [`FakeDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    TestConnection,
    ListPage { start_at: usize, max_results: usize },
    Delete(String),
}

/// In-memory user directory that serves a fixed account list in pages.
///
/// Failures are configured per operation; every request is recorded so tests can
/// assert on exactly which calls were made.
#[derive(Debug, Default)]
pub struct FakeDirectory {
    accounts: Vec<Account>,
    connection_failure: Option<ErrorKind>,
    page_failure: Option<(usize, ErrorKind)>,
    delete_failures: HashMap<String, ErrorKind>,
    absent: HashSet<String>,
    calls: Mutex<Vec<DirectoryCall>>,
}

impl FakeDirectory {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts,
            ..Default::default()
        }
    }

    /// Makes the connection check fail with `kind`.
    pub fn with_connection_failure(mut self, kind: ErrorKind) -> Self {
        self.connection_failure = Some(kind);
        self
    }

    /// Makes the page request starting at `start_at` fail with `kind`.
    pub fn failing_page_at(mut self, start_at: usize, kind: ErrorKind) -> Self {
        self.page_failure = Some((start_at, kind));
        self
    }

    /// Makes deleting `account_id` fail with `kind`.
    pub fn failing_delete(mut self, account_id: &str, kind: ErrorKind) -> Self {
        self.delete_failures.insert(account_id.to_string(), kind);
        self
    }

    /// Makes the directory report `account_id` as already deleted.
    pub fn absent(mut self, account_id: &str) -> Self {
        self.absent.insert(account_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Account ids passed to `delete_user`, in call order.
    pub fn delete_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DirectoryCall::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, DirectoryCall::ListPage { .. }))
            .count()
    }

    fn record(&self, call: DirectoryCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn test_connection(&self) -> Result<CurrentUser, Error> {
        self.record(DirectoryCall::TestConnection);
        if let Some(kind) = self.connection_failure {
            return Err(error_of_kind(kind, "myself"));
        }

        Ok(CurrentUser {
            account_id: "admin".to_string(),
            display_name: "Site Admin".to_string(),
            email_address: Some("admin@example.com".to_string()),
        })
    }

    async fn list_users_page(
        &self,
        start_at: usize,
        max_results: usize,
    ) -> Result<Vec<Account>, Error> {
        self.record(DirectoryCall::ListPage {
            start_at,
            max_results,
        });
        if let Some((failing_start, kind)) = self.page_failure {
            if failing_start == start_at {
                return Err(error_of_kind(kind, "users"));
            }
        }

        Ok(self
            .accounts
            .iter()
            .skip(start_at)
            .take(max_results)
            .cloned()
            .collect())
    }

    async fn delete_user(&self, account_id: &str) -> Result<DeleteStatus, Error> {
        self.record(DirectoryCall::Delete(account_id.to_string()));
        if let Some(kind) = self.delete_failures.get(account_id) {
            return Err(error_of_kind(*kind, account_id));
        }
        if self.absent.contains(account_id) {
            return Ok(DeleteStatus::AlreadyAbsent);
        }
        Ok(DeleteStatus::Deleted)
    }
}

/// Operator double that answers prompts from a script and records what it was asked.
#[derive(Debug)]
pub struct ScriptedOperator {
    typed_phrase: String,
    confirm_answers: Mutex<VecDeque<bool>>,
    default_confirm: bool,
    selection: Option<HashSet<String>>,
    prompts: Mutex<Vec<String>>,
    outcomes: Mutex<Vec<DeletionOutcome>>,
}

impl ScriptedOperator {
    fn with_answers(typed_phrase: &str, default_confirm: bool) -> Self {
        Self {
            typed_phrase: typed_phrase.to_string(),
            confirm_answers: Mutex::new(VecDeque::new()),
            default_confirm,
            selection: None,
            prompts: Mutex::new(Vec::new()),
            outcomes: Mutex::new(Vec::new()),
        }
    }

    /// Types the confirmation phrase and answers yes to every question.
    pub fn approving() -> Self {
        Self::with_answers(CONFIRMATION_PHRASE, true)
    }

    /// Types something other than the confirmation phrase.
    pub fn declining_phrase() -> Self {
        Self::with_answers("delete", true)
    }

    /// Types the phrase but answers no to every yes/no question.
    pub fn declining_final() -> Self {
        Self::with_answers(CONFIRMATION_PHRASE, false)
    }

    /// Answers the next yes/no questions with `answers`, then falls back to the default.
    pub fn answering(self, answers: &[bool]) -> Self {
        self.confirm_answers
            .lock()
            .unwrap()
            .extend(answers.iter().copied());
        self
    }

    /// Selects only the given account ids.
    pub fn selecting(mut self, ids: &[&str]) -> Self {
        self.selection = Some(ids.iter().map(|id| id.to_string()).collect());
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Outcomes reported through `on_outcome`, in order.
    pub fn reported_outcomes(&self) -> Vec<DeletionOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl Operator for ScriptedOperator {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.confirm_answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_confirm)
    }

    fn confirm_phrase(&self, prompt: &str, phrase: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.typed_phrase == phrase
    }

    fn select(&self, _accounts: &[Account]) -> Selection {
        match &self.selection {
            Some(ids) => Selection::Only(ids.clone()),
            None => Selection::All,
        }
    }

    fn on_outcome(&self, outcome: &DeletionOutcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }
}
