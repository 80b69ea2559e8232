//! Deletion of the accounts listed in the review snapshot.
//!
//! A run moves through `Idle → Loaded → Confirmed → Running → Completed`, or ends in
//! `Aborted` before any account is touched. Deletions are issued one at a time in
//! snapshot order, and a failed deletion never stops the batch: every account in the
//! snapshot ends up with exactly one [`DeletionOutcome`] in the ledger.

use jira_client::{Account, DeleteStatus, ErrorKind, UserDirectory};
use tracing::{debug, info, warn};

use crate::{
    errors::StoreError,
    operator::{Operator, Selection},
    review_store::ReviewStore,
};

/// The text the operator must type to approve a deletion run.
pub const CONFIRMATION_PHRASE: &str = "DELETE";

#[cfg(test)]
#[path = "deletion_tests.rs"]
mod tests;

/// Where a deletion run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loaded,
    Confirmed,
    Running,
    Completed,
    Aborted,
}

/// Why an account was not sent to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The operator left the account out of the selection
    Deselected,
    /// The snapshot record has an empty account id
    MissingAccountId,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Deselected => f.write_str("not selected"),
            SkipReason::MissingAccountId => f.write_str("no account id"),
        }
    }
}

/// What happened to one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Deleted,
    /// The service no longer knew the account; counted as a success.
    AlreadyAbsent,
    Failed {
        kind: ErrorKind,
        message: String,
    },
    Skipped(SkipReason),
}

impl OutcomeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Deleted | OutcomeStatus::AlreadyAbsent)
    }
}

/// The result of one deletion attempt (or of deciding not to attempt it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub account_id: String,
    pub display_name: String,
    pub status: OutcomeStatus,
}

/// Per-run record of every outcome, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeLedger {
    outcomes: Vec<DeletionOutcome>,
}

/// Counts over an [`OutcomeLedger`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    pub deleted: usize,
    pub already_absent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total: usize,
}

impl OutcomeLedger {
    fn record(&mut self, outcome: DeletionOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[DeletionOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcomes whose deletion was attempted and failed.
    pub fn failures(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed { .. }))
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut summary = LedgerSummary {
            total: self.outcomes.len(),
            ..Default::default()
        };
        for outcome in &self.outcomes {
            match outcome.status {
                OutcomeStatus::Deleted => summary.deleted += 1,
                OutcomeStatus::AlreadyAbsent => summary.already_absent += 1,
                OutcomeStatus::Failed { .. } => summary.failed += 1,
                OutcomeStatus::Skipped(_) => summary.skipped += 1,
            }
        }
        summary
    }
}

/// Why a run ended without deleting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The operator selected no accounts
    NothingSelected,
    /// The operator declined one of the confirmations
    Declined,
}

/// Terminal state of a deletion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    Completed(OutcomeLedger),
    Aborted(AbortReason),
}

impl RunReport {
    /// The state the run finished in.
    pub fn state(&self) -> RunState {
        match self {
            RunReport::Completed(_) => RunState::Completed,
            RunReport::Aborted(_) => RunState::Aborted,
        }
    }
}

/// Drives one deletion run over the review snapshot.
///
/// The orchestrator is consumed by [`DeletionOrchestrator::run`]; nothing survives the
/// run except the returned report.
pub struct DeletionOrchestrator<'a, D: UserDirectory + ?Sized, O: Operator + ?Sized> {
    store: &'a ReviewStore,
    directory: &'a D,
    operator: &'a O,
    state: RunState,
}

impl<'a, D: UserDirectory + ?Sized, O: Operator + ?Sized> DeletionOrchestrator<'a, D, O> {
    pub fn new(store: &'a ReviewStore, directory: &'a D, operator: &'a O) -> Self {
        Self {
            store,
            directory,
            operator,
            state: RunState::Idle,
        }
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "Deletion run state change");
        self.state = next;
    }

    /// Loads the snapshot, asks for confirmation and deletes the selected accounts.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] from loading the snapshot; `StoreError::NotFound`
    /// means there is nothing to delete. Failures of individual deletions are not
    /// errors; they are recorded in the ledger of the `Completed` report.
    pub async fn run(mut self) -> Result<RunReport, StoreError> {
        let accounts = self.store.load()?;
        self.transition(RunState::Loaded);
        info!(count = accounts.len(), "Loaded accounts for deletion");

        if accounts.is_empty() {
            self.transition(RunState::Completed);
            return Ok(RunReport::Completed(OutcomeLedger::default()));
        }

        let selection = self.operator.select(&accounts);
        let selected = selection.deletable_in(&accounts);
        if selected == 0 {
            info!("No accounts selected, aborting deletion run");
            self.transition(RunState::Aborted);
            return Ok(RunReport::Aborted(AbortReason::NothingSelected));
        }

        if !self.confirm(selected) {
            info!("Deletion declined by operator");
            self.transition(RunState::Aborted);
            return Ok(RunReport::Aborted(AbortReason::Declined));
        }
        self.transition(RunState::Confirmed);

        self.transition(RunState::Running);
        let ledger = self.delete_all(&accounts, &selection).await;

        let summary = ledger.summary();
        info!(
            deleted = summary.deleted,
            already_absent = summary.already_absent,
            failed = summary.failed,
            skipped = summary.skipped,
            "Deletion run completed"
        );
        self.transition(RunState::Completed);
        Ok(RunReport::Completed(ledger))
    }

    fn confirm(&self, selected: usize) -> bool {
        let phrase_prompt = format!(
            "Type '{CONFIRMATION_PHRASE}' to permanently delete {selected} account(s)"
        );
        if !self
            .operator
            .confirm_phrase(&phrase_prompt, CONFIRMATION_PHRASE)
        {
            return false;
        }

        self.operator.confirm(&format!(
            "Are you absolutely sure you want to delete {selected} account(s)?"
        ))
    }

    async fn delete_all(&self, accounts: &[Account], selection: &Selection) -> OutcomeLedger {
        let mut ledger = OutcomeLedger::default();

        for account in accounts {
            let status = if !selection.includes(&account.account_id) {
                OutcomeStatus::Skipped(SkipReason::Deselected)
            } else if account.account_id.is_empty() {
                warn!(
                    display_name = %account.display_name,
                    "Skipping account without an id"
                );
                OutcomeStatus::Skipped(SkipReason::MissingAccountId)
            } else {
                self.delete_one(&account.account_id).await
            };

            let outcome = DeletionOutcome {
                account_id: account.account_id.clone(),
                display_name: account.display_name.clone(),
                status,
            };
            self.operator.on_outcome(&outcome);
            ledger.record(outcome);
        }

        ledger
    }

    async fn delete_one(&self, account_id: &str) -> OutcomeStatus {
        match self.directory.delete_user(account_id).await {
            Ok(DeleteStatus::Deleted) => OutcomeStatus::Deleted,
            Ok(DeleteStatus::AlreadyAbsent) => OutcomeStatus::AlreadyAbsent,
            Err(e) => {
                warn!(
                    account_id = account_id,
                    kind = %e.kind(),
                    error_message = %e,
                    "Failed to delete account"
                );
                OutcomeStatus::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        }
    }
}
