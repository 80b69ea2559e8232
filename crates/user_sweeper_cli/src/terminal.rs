//! Terminal rendering and interactive prompts.
//!
//! The `format_*` functions build the text shown to the operator and have no side
//! effects. [`TerminalOperator`] reads answers from the terminal with `dialoguer`.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use dialoguer::{Confirm, Input, MultiSelect, Password};
use jira_client::Account;
use tracing::warn;
use user_sweeper_core::{
    AbortReason, DeletionOutcome, OutcomeLedger, OutcomeStatus, Operator, Selection,
};

use crate::{credentials::Prompter, errors::Error, workflow::FetchReport};

/// Number of accounts listed before a deletion is confirmed.
pub const PREVIEW_LIMIT: usize = 10;

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;

pub fn format_menu() -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Jira inactive user sweeper".bold().bright_cyan()));
    output.push_str("  1. Fetch non-active users\n");
    output.push_str("  2. Review saved non-active users\n");
    output.push_str("  3. Delete saved non-active users\n");
    output.push_str("  4. Exit\n");
    output
}

pub fn format_fetch_report(report: &FetchReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{} Scanned {} account(s), {} non-active\n",
        "✓".green(),
        report.scanned,
        report.inactive
    ));
    if report.former_excluded > 0 {
        output.push_str(&format!(
            "  {} already-deleted (former) account(s) left out\n",
            report.former_excluded
        ));
    }
    output.push_str(&format!(
        "  Saved {} account(s) to {}\n",
        report.saved.to_string().bold(),
        report.snapshot_path.display()
    ));
    if report.saved > 0 {
        output.push_str("  Review the file before deleting.\n");
    }
    output
}

/// One line per fetched page.
pub fn format_fetch_progress(scanned: usize, inactive: usize) -> String {
    format!("  Processed {scanned} user(s), found {inactive} non-active so far...\n")
}

/// Renders the snapshot as a numbered table.
pub fn format_account_table(accounts: &[Account], source: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{} {} ({})\n\n",
        accounts.len().to_string().bold(),
        "non-active account(s)".bold(),
        source
    ));

    if accounts.is_empty() {
        output.push_str(&format!("  {}\n", "(none)".dimmed()));
        return output;
    }

    output.push_str(&format!(
        "  {:>4}  {:<30}  {:<35}  {:<10}  {}\n",
        "#", "Name", "Email", "Type", "Account ID"
    ));
    for (i, account) in accounts.iter().enumerate() {
        output.push_str(&format!(
            "  {:>4}  {:<30}  {:<35}  {:<10}  {}\n",
            i + 1,
            account.name_or_placeholder(),
            account.email_or_placeholder(),
            account.account_type.as_str(),
            account.account_id
        ));
    }
    output
}

/// Short list of the snapshot, shown before the operator picks accounts.
pub fn format_deletion_preview(accounts: &[Account]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{} account(s) in the snapshot:\n",
        accounts.len().to_string().bold()
    ));
    for (i, account) in accounts.iter().take(PREVIEW_LIMIT).enumerate() {
        output.push_str(&format!(
            "  {:2}. {} ({})\n",
            i + 1,
            account.name_or_placeholder(),
            account.email_or_placeholder()
        ));
    }
    if accounts.len() > PREVIEW_LIMIT {
        output.push_str(&format!(
            "  ... and {} more\n",
            accounts.len() - PREVIEW_LIMIT
        ));
    }
    output.push_str(&format!(
        "\n{}\n",
        "WARNING: Deleted accounts cannot be restored.".red().bold()
    ));
    output
}

pub fn format_outcome(outcome: &DeletionOutcome) -> String {
    let name = if outcome.display_name.is_empty() {
        "Unknown"
    } else {
        outcome.display_name.as_str()
    };

    match &outcome.status {
        OutcomeStatus::Deleted => {
            format!("{} Deleted {} ({})", "✓".green(), name, outcome.account_id)
        }
        OutcomeStatus::AlreadyAbsent => format!(
            "{} {} ({}) was already deleted",
            "✓".green(),
            name,
            outcome.account_id
        ),
        OutcomeStatus::Failed { kind, message } => format!(
            "{} Failed to delete {} ({}): [{}] {}",
            "✗".red(),
            name,
            outcome.account_id,
            kind,
            message
        ),
        OutcomeStatus::Skipped(reason) => format!(
            "{} Skipped {} ({}): {}",
            "-".dimmed(),
            name,
            outcome.account_id,
            reason
        ),
    }
}

/// Summary counts followed by every failure.
pub fn format_ledger(ledger: &OutcomeLedger) -> String {
    let summary = ledger.summary();
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", "Deletion summary".bold()));
    output.push_str(&format!("  Deleted:         {}\n", summary.deleted));
    output.push_str(&format!("  Already deleted: {}\n", summary.already_absent));
    output.push_str(&format!("  Skipped:         {}\n", summary.skipped));
    let failed = format!("  Failed:          {}\n", summary.failed);
    if summary.failed > 0 {
        output.push_str(&failed.red().to_string());
    } else {
        output.push_str(&failed);
    }
    output.push_str(&format!("  Total:           {}\n", summary.total));

    if summary.failed > 0 {
        output.push_str(&format!("\n{}\n", "Failures".red().bold()));
        for outcome in ledger.failures() {
            output.push_str(&format!("  {}\n", format_outcome(outcome)));
        }
    }
    output
}

pub fn format_abort(reason: AbortReason) -> String {
    match reason {
        AbortReason::NothingSelected => "No accounts selected. Nothing was deleted.".to_string(),
        AbortReason::Declined => "Deletion cancelled. Nothing was deleted.".to_string(),
    }
}

/// Reads one menu choice from standard input. `None` at end of input.
pub fn read_menu_choice() -> Result<Option<String>, Error> {
    print!("Enter your choice (1-4): ");
    io::stdout().flush().map_err(Error::Output)?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| Error::Prompt(e.to_string()))?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Operator backed by the interactive terminal.
///
/// A dismissed or failed prompt counts as "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalOperator;

impl Operator for TerminalOperator {
    fn confirm(&self, prompt: &str) -> bool {
        match Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact_opt()
        {
            Ok(answer) => answer.unwrap_or(false),
            Err(e) => {
                warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }

    fn confirm_phrase(&self, prompt: &str, phrase: &str) -> bool {
        match Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
        {
            Ok(typed) => typed.trim() == phrase,
            Err(e) => {
                warn!("Failed to read confirmation phrase: {}", e);
                false
            }
        }
    }

    fn select(&self, accounts: &[Account]) -> Selection {
        println!("{}", format_deletion_preview(accounts));

        if accounts.len() < 2 || !self.confirm("Pick individual accounts instead of all of them?")
        {
            return Selection::All;
        }

        let items: Vec<String> = accounts
            .iter()
            .map(|a| {
                format!(
                    "{} ({}) {}",
                    a.name_or_placeholder(),
                    a.email_or_placeholder(),
                    a.account_id
                )
            })
            .collect();
        let defaults = vec![true; items.len()];

        match MultiSelect::new()
            .with_prompt("Select the accounts to delete (space toggles, enter accepts)")
            .items(&items)
            .defaults(&defaults)
            .interact_opt()
        {
            Ok(Some(chosen)) => Selection::Only(
                chosen
                    .into_iter()
                    .filter_map(|i| accounts.get(i))
                    .map(|a| a.account_id.clone())
                    .collect(),
            ),
            Ok(None) => Selection::Only(Default::default()),
            Err(e) => {
                warn!("Failed to read account selection: {}", e);
                Selection::Only(Default::default())
            }
        }
    }

    fn on_outcome(&self, outcome: &DeletionOutcome) {
        println!("{}", format_outcome(outcome));
    }
}

impl Prompter for TerminalOperator {
    fn input_text(&self, prompt: &str) -> Result<String, Error> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Prompt(e.to_string()))
    }

    fn input_secret(&self, prompt: &str) -> Result<String, Error> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| Error::Prompt(e.to_string()))
    }

    fn yes_no(&self, prompt: &str, default: bool) -> Result<bool, Error> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| Error::Prompt(e.to_string()))
    }
}
