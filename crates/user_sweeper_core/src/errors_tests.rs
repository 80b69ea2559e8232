use super::*;
use std::error::Error as StdError;

#[test]
fn test_not_found_display() {
    let error = StoreError::NotFound(PathBuf::from("non_active_users.json"));

    assert_eq!(
        error.to_string(),
        "No review snapshot found at non_active_users.json. Fetch non-active users first."
    );
}

#[test]
fn test_format_error_keeps_source() {
    let parse_error = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
    let error = StoreError::Format {
        path: PathBuf::from("snapshot.json"),
        source: parse_error,
    };

    assert!(error.to_string().starts_with("Review snapshot snapshot.json is not valid"));
    assert!(error.source().is_some());
}

#[test]
fn test_active_account_display() {
    let error = StoreError::ActiveAccount {
        path: PathBuf::from("snapshot.json"),
        account_id: "acc-7".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "Review snapshot snapshot.json lists active account acc-7"
    );
}

#[test]
fn test_error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StoreError>();
}
