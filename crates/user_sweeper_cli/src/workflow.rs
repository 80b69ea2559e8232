//! The fetch → review → delete menu.
//!
//! A [`Workflow`] can only be built from a [`Session`], and a session only exists
//! once the service has accepted the credentials, so no menu option runs against an
//! unverified connection.

use std::{io::Write, path::PathBuf, str::FromStr};

use colored::Colorize;
use jira_client::{Account, CurrentUser, ErrorKind, UserDirectory, UserPages};
use tracing::{debug, info, instrument};
use user_sweeper_core::{
    exclude_former, filter_inactive, DeletionOrchestrator, Operator, OutcomeStatus,
    ReviewStore, RunReport,
};

use crate::{
    config::Settings,
    errors::Error,
    terminal::{
        format_abort, format_account_table, format_fetch_progress, format_fetch_report,
        format_ledger, format_menu,
    },
};

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;

/// One entry of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Fetch,
    Review,
    Delete,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "fetch" => Ok(MenuChoice::Fetch),
            "2" | "review" => Ok(MenuChoice::Review),
            "3" | "delete" => Ok(MenuChoice::Delete),
            "4" | "exit" | "quit" => Ok(MenuChoice::Exit),
            other => Err(format!(
                "Invalid choice '{other}'. Enter a number from 1 to 4."
            )),
        }
    }
}

/// Counts from one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    /// Accounts returned by the service
    pub scanned: usize,
    /// Of those, accounts that are not active
    pub inactive: usize,
    /// Non-active accounts left out because the service already deleted them
    pub former_excluded: usize,
    /// Accounts written to the snapshot
    pub saved: usize,
    pub snapshot_path: PathBuf,
}

/// How a menu loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The operator chose to exit, or input ended
    Exit,
    /// The service rejected the credentials and the operator wants to enter new ones
    Reauthenticate,
}

/// A verified connection to the service plus the settings it was made with.
#[derive(Debug)]
pub struct Session<D> {
    directory: D,
    settings: Settings,
    current_user: CurrentUser,
}

impl<D: UserDirectory> Session<D> {
    /// Checks the credentials against the service.
    ///
    /// # Errors
    ///
    /// Returns the client error when the connection check fails.
    #[instrument(skip(directory, settings), fields(domain = %settings.domain))]
    pub async fn connect(directory: D, settings: Settings) -> Result<Self, Error> {
        let current_user = directory.test_connection().await?;
        info!(account_id = %current_user.account_id, "Connected to Jira");

        Ok(Self {
            directory,
            settings,
            current_user,
        })
    }

    pub fn current_user(&self) -> &CurrentUser {
        &self.current_user
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }
}

/// Runs the menu options against one session.
pub struct Workflow<D, O> {
    session: Session<D>,
    store: ReviewStore,
    operator: O,
}

impl<D: UserDirectory, O: Operator> Workflow<D, O> {
    pub fn new(session: Session<D>, operator: O) -> Self {
        let store = ReviewStore::new(session.settings.snapshot_path.clone());
        Self {
            session,
            store,
            operator,
        }
    }

    pub fn store(&self) -> &ReviewStore {
        &self.store
    }

    pub fn session(&self) -> &Session<D> {
        &self.session
    }

    /// Lists every account, keeps the non-active ones and replaces the snapshot.
    ///
    /// A progress line is written to `out` after each page. The snapshot is written
    /// even when nothing was found. If listing fails no snapshot is written and the
    /// previous one stays in place.
    #[instrument(skip(self, out))]
    pub async fn fetch(&self, out: &mut dyn Write) -> Result<FetchReport, Error> {
        let settings = &self.session.settings;
        let mut pages = UserPages::new(&self.session.directory, settings.page_size)?;

        let mut inactive = Vec::new();
        while let Some(page) = pages.next_page().await? {
            inactive.extend(filter_inactive(page));
            emit(out, &format_fetch_progress(pages.fetched(), inactive.len()))?;
        }
        let scanned = pages.fetched();
        let inactive_count = inactive.len();
        let kept = if settings.include_former_accounts {
            inactive
        } else {
            exclude_former(inactive)
        };

        self.store.save(&kept)?;

        let report = FetchReport {
            scanned,
            inactive: inactive_count,
            former_excluded: inactive_count - kept.len(),
            saved: kept.len(),
            snapshot_path: self.store.path().to_path_buf(),
        };
        info!(
            scanned = report.scanned,
            inactive = report.inactive,
            saved = report.saved,
            "Fetch completed"
        );
        Ok(report)
    }

    /// Loads the snapshot for display.
    pub fn review(&self) -> Result<Vec<Account>, Error> {
        Ok(self.store.load()?)
    }

    /// Runs a confirmation-gated deletion over the snapshot.
    pub async fn delete(&self) -> Result<RunReport, Error> {
        let report =
            DeletionOrchestrator::new(&self.store, &self.session.directory, &self.operator)
                .run()
                .await?;
        Ok(report)
    }

    /// Shows the menu and dispatches choices until the operator exits or input ends.
    ///
    /// Failures of individual options are printed and the loop continues. When the
    /// service rejects the credentials the operator is asked whether to re-enter
    /// them, which ends the loop with [`SessionEnd::Reauthenticate`].
    ///
    /// # Errors
    ///
    /// Only failures to read the next choice or to write output end the loop early.
    pub async fn run(
        &self,
        read_choice: &mut dyn FnMut() -> Result<Option<String>, Error>,
        out: &mut dyn Write,
    ) -> Result<SessionEnd, Error> {
        loop {
            emit(out, &format_menu())?;

            let Some(line) = read_choice()? else {
                emit(out, "\n")?;
                return Ok(SessionEnd::Exit);
            };

            let choice = match line.parse::<MenuChoice>() {
                Ok(choice) => choice,
                Err(hint) => {
                    emit(out, &format!("{}\n", hint.yellow()))?;
                    continue;
                }
            };

            let credentials_rejected = match choice {
                MenuChoice::Exit => {
                    emit(out, "Goodbye.\n")?;
                    return Ok(SessionEnd::Exit);
                }
                MenuChoice::Fetch => match self.fetch(out).await {
                    Ok(report) => {
                        emit(out, &format_fetch_report(&report))?;
                        false
                    }
                    Err(e) => report_error(out, "Fetch failed", &e)?,
                },
                MenuChoice::Review => match self.review() {
                    Ok(accounts) => {
                        let source = self.store.path().display().to_string();
                        emit(out, &format_account_table(&accounts, &source))?;
                        false
                    }
                    Err(e) => report_error(out, "Review failed", &e)?,
                },
                MenuChoice::Delete => match self.delete().await {
                    Ok(RunReport::Completed(ledger)) => {
                        emit(out, &format_ledger(&ledger))?;
                        ledger.failures().any(|o| {
                            matches!(
                                o.status,
                                OutcomeStatus::Failed {
                                    kind: ErrorKind::Auth,
                                    ..
                                }
                            )
                        })
                    }
                    Ok(RunReport::Aborted(reason)) => {
                        emit(out, &format!("{}\n", format_abort(reason)))?;
                        false
                    }
                    Err(e) => report_error(out, "Delete failed", &e)?,
                },
            };

            if credentials_rejected
                && self
                    .operator
                    .confirm("Jira rejected the credentials. Re-enter them?")
            {
                return Ok(SessionEnd::Reauthenticate);
            }
        }
    }
}

fn emit(out: &mut dyn Write, text: &str) -> Result<(), Error> {
    out.write_all(text.as_bytes()).map_err(Error::Output)?;
    out.flush().map_err(Error::Output)
}

/// Prints a failed option. Returns whether the failure was a credential rejection.
fn report_error(out: &mut dyn Write, context: &str, e: &Error) -> Result<bool, Error> {
    debug!(context, error = %e, "Menu option failed");
    emit(out, &format!("{} {}: {}\n", "✗".red(), context, e))?;
    Ok(e.is_credential_rejection())
}
