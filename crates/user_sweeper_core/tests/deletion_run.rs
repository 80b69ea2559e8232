//! Deletion run scenarios against an in-memory directory and a scripted operator.

use jira_client::ErrorKind;
use tempfile::TempDir;
use test_utils::{inactive_account, FakeDirectory, ScriptedOperator};
use user_sweeper_core::{
    AbortReason, DeletionOrchestrator, OutcomeStatus, ReviewStore, RunReport, RunState,
    SkipReason, StoreError,
};

fn store_with(temp_dir: &TempDir, ids: &[&str]) -> ReviewStore {
    let store = ReviewStore::new(temp_dir.path().join("non_active_users.json"));
    let accounts: Vec<_> = ids.iter().map(|id| inactive_account(id)).collect();
    store.save(&accounts).expect("Failed to save snapshot");
    store
}

fn completed(report: RunReport) -> user_sweeper_core::OutcomeLedger {
    match report {
        RunReport::Completed(ledger) => ledger,
        other => panic!("Expected a completed run, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_continues_after_a_failed_deletion() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_with(&temp_dir, &["a1", "a2", "a3", "a4", "a5"]);
    let directory = FakeDirectory::new(vec![]).failing_delete("a3", ErrorKind::Permission);
    let operator = ScriptedOperator::approving();

    let report = DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await
        .unwrap();

    let ledger = completed(report);
    assert_eq!(directory.delete_calls(), vec!["a1", "a2", "a3", "a4", "a5"]);
    assert_eq!(ledger.len(), 5);
    let ids: Vec<_> = ledger
        .outcomes()
        .iter()
        .map(|o| o.account_id.as_str())
        .collect();
    assert_eq!(ids, vec!["a1", "a2", "a3", "a4", "a5"]);

    let summary = ledger.summary();
    assert_eq!(summary.deleted, 4);
    assert_eq!(summary.failed, 1);
    match &ledger.outcomes()[2].status {
        OutcomeStatus::Failed { kind, message } => {
            assert_eq!(*kind, ErrorKind::Permission);
            assert!(message.contains("a3"));
        }
        other => panic!("Expected a failure for a3, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_declined_phrase_makes_no_calls() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_with(&temp_dir, &["a1", "a2"]);
    let directory = FakeDirectory::new(vec![]);
    let operator = ScriptedOperator::declining_phrase();

    let report = DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await
        .unwrap();

    assert_eq!(report, RunReport::Aborted(AbortReason::Declined));
    assert_eq!(report.state(), RunState::Aborted);
    assert!(directory.calls().is_empty());
    // The final yes/no question is never reached.
    assert_eq!(operator.prompts().len(), 1);
}

#[tokio::test]
async fn test_run_declined_final_confirmation_makes_no_calls() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_with(&temp_dir, &["a1", "a2"]);
    let directory = FakeDirectory::new(vec![]);
    let operator = ScriptedOperator::declining_final();

    let report = DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await
        .unwrap();

    assert_eq!(report, RunReport::Aborted(AbortReason::Declined));
    assert!(directory.calls().is_empty());
    let prompts = operator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("'DELETE'"));
    assert!(prompts[1].contains("2 account(s)"));
}

#[tokio::test]
async fn test_run_without_snapshot_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store = ReviewStore::new(temp_dir.path().join("non_active_users.json"));
    let directory = FakeDirectory::new(vec![]);
    let operator = ScriptedOperator::approving();

    let result = DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await;

    assert!(matches!(result, Err(StoreError::NotFound(_))));
    assert!(operator.prompts().is_empty());
    assert!(directory.calls().is_empty());
}

#[tokio::test]
async fn test_run_with_empty_snapshot_completes_without_prompts() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_with(&temp_dir, &[]);
    let directory = FakeDirectory::new(vec![]);
    let operator = ScriptedOperator::approving();

    let report = DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await
        .unwrap();

    assert!(completed(report).is_empty());
    assert!(operator.prompts().is_empty());
}

#[tokio::test]
async fn test_run_skips_deselected_accounts() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_with(&temp_dir, &["a1", "a2", "a3"]);
    let directory = FakeDirectory::new(vec![]);
    let operator = ScriptedOperator::approving().selecting(&["a1", "a3"]);

    let report = DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await
        .unwrap();

    let ledger = completed(report);
    assert_eq!(directory.delete_calls(), vec!["a1", "a3"]);
    assert_eq!(ledger.len(), 3);
    assert_eq!(
        ledger.outcomes()[1].status,
        OutcomeStatus::Skipped(SkipReason::Deselected)
    );
    // Confirmation names the selected count, not the snapshot size.
    assert!(operator.prompts()[1].contains("2 account(s)"));
}

#[tokio::test]
async fn test_run_with_empty_selection_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_with(&temp_dir, &["a1"]);
    let directory = FakeDirectory::new(vec![]);
    let operator = ScriptedOperator::approving().selecting(&[]);

    let report = DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await
        .unwrap();

    assert_eq!(report, RunReport::Aborted(AbortReason::NothingSelected));
    assert!(operator.prompts().is_empty());
    assert!(directory.calls().is_empty());
}

#[tokio::test]
async fn test_run_records_already_absent_and_missing_ids() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_with(&temp_dir, &["gone", "", "a1"]);
    let directory = FakeDirectory::new(vec![]).absent("gone");
    let operator = ScriptedOperator::approving();

    let report = DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await
        .unwrap();

    let ledger = completed(report);
    let statuses: Vec<_> = ledger.outcomes().iter().map(|o| o.status.clone()).collect();
    assert_eq!(
        statuses,
        vec![
            OutcomeStatus::AlreadyAbsent,
            OutcomeStatus::Skipped(SkipReason::MissingAccountId),
            OutcomeStatus::Deleted,
        ]
    );
    assert_eq!(directory.delete_calls(), vec!["gone", "a1"]);
}

#[tokio::test]
async fn test_run_reports_each_outcome_to_operator() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_with(&temp_dir, &["a1", "a2"]);
    let directory = FakeDirectory::new(vec![]).failing_delete("a1", ErrorKind::RateLimit);
    let operator = ScriptedOperator::approving();

    let report = DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await
        .unwrap();

    let ledger = completed(report);
    assert_eq!(operator.reported_outcomes(), ledger.outcomes().to_vec());
}

#[tokio::test]
async fn test_run_leaves_snapshot_in_place() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_with(&temp_dir, &["a1"]);
    let directory = FakeDirectory::new(vec![]);
    let operator = ScriptedOperator::approving();

    DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await
        .unwrap();

    assert!(store.exists());
    assert_eq!(store.load().unwrap().len(), 1);
}

#[tokio::test]
async fn test_confirmation_counts_only_accounts_with_an_id() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_with(&temp_dir, &["", "a1"]);
    let directory = FakeDirectory::new(vec![]);
    let operator = ScriptedOperator::approving();

    let report = DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await
        .unwrap();

    assert_eq!(report.state(), RunState::Completed);
    assert_eq!(directory.delete_calls(), vec!["a1"]);
    let prompts = operator.prompts();
    assert!(prompts[0].contains("delete 1 account(s)"));
    assert!(prompts[1].contains("delete 1 account(s)"));
}

#[tokio::test]
async fn test_snapshot_without_any_account_id_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_with(&temp_dir, &["", ""]);
    let directory = FakeDirectory::new(vec![]);
    let operator = ScriptedOperator::approving();

    let report = DeletionOrchestrator::new(&store, &directory, &operator)
        .run()
        .await
        .unwrap();

    assert_eq!(report, RunReport::Aborted(AbortReason::NothingSelected));
    assert!(operator.prompts().is_empty());
    assert!(directory.calls().is_empty());
}
