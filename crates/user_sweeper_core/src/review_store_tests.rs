use super::*;
use jira_client::AccountType;
use serde_json::json;
use tempfile::TempDir;

fn inactive(id: &str, email: Option<&str>) -> Account {
    let mut extra = serde_json::Map::new();
    extra.insert("timeZone".to_string(), json!("Europe/Amsterdam"));
    Account {
        account_id: id.to_string(),
        display_name: format!("User {id}"),
        email_address: email.map(str::to_string),
        active: false,
        account_type: AccountType::Atlassian,
        extra,
    }
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

#[test]
fn test_save_then_load_round_trips() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = ReviewStore::new(temp_dir.path().join(DEFAULT_SNAPSHOT_FILENAME));
    let accounts = vec![
        inactive("a", Some("a@example.com")),
        inactive("b", None),
        inactive("c", Some("c@example.com")),
    ];

    store.save(&accounts).expect("Failed to save snapshot");
    let loaded = store.load().expect("Failed to load snapshot");

    assert_eq!(loaded, accounts);
}

#[test]
fn test_load_then_save_keeps_file_contents() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = ReviewStore::new(temp_dir.path().join("snapshot.json"));
    store.save(&[inactive("a", None)]).unwrap();
    let first = fs::read_to_string(store.path()).unwrap();

    let loaded = store.load().unwrap();
    store.save(&loaded).unwrap();

    assert_eq!(fs::read_to_string(store.path()).unwrap(), first);
}

#[test]
fn test_snapshot_uses_wire_field_names() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = ReviewStore::new(temp_dir.path().join("snapshot.json"));

    store.save(&[inactive("a", None)]).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(
        raw,
        json!([{
            "accountId": "a",
            "displayName": "User a",
            "emailAddress": null,
            "active": false,
            "accountType": "atlassian",
            "timeZone": "Europe/Amsterdam"
        }])
    );
}

#[test]
fn test_save_replaces_previous_snapshot() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = ReviewStore::new(temp_dir.path().join("snapshot.json"));

    store.save(&[inactive("old-1", None), inactive("old-2", None)]).unwrap();
    store.save(&[inactive("new", None)]).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].account_id, "new");
    assert_eq!(files_in(temp_dir.path()), vec![store.path().to_path_buf()]);
}

#[test]
fn test_save_empty_list() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = ReviewStore::new(temp_dir.path().join("snapshot.json"));

    store.save(&[]).unwrap();

    assert!(store.exists());
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn test_save_creates_missing_directories() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = ReviewStore::new(temp_dir.path().join("reviews/2026").join("snapshot.json"));

    store.save(&[inactive("a", None)]).unwrap();

    assert!(store.exists());
}

#[test]
fn test_uncommitted_stage_leaves_previous_snapshot_intact() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = ReviewStore::new(temp_dir.path().join("snapshot.json"));
    store.save(&[inactive("kept", None)]).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    let staged = store
        .stage(&[inactive("x", None), inactive("y", None)])
        .unwrap();
    // The new content is fully written but not yet visible.
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    drop(staged);

    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    assert_eq!(store.load().unwrap()[0].account_id, "kept");
    assert_eq!(files_in(temp_dir.path()), vec![store.path().to_path_buf()]);
}

#[test]
fn test_uncommitted_stage_without_previous_snapshot_leaves_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = ReviewStore::new(temp_dir.path().join("snapshot.json"));

    let staged = store.stage(&[inactive("x", None)]).unwrap();
    drop(staged);

    assert!(!store.exists());
    assert!(matches!(store.load(), Err(StoreError::NotFound(_))));
    assert!(files_in(temp_dir.path()).is_empty());
}

#[test]
fn test_load_missing_snapshot() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = ReviewStore::new(temp_dir.path().join("missing.json"));

    assert!(!store.exists());
    match store.load() {
        Err(StoreError::NotFound(path)) => assert_eq!(path, store.path()),
        other => panic!("Expected NotFound error, got {other:?}"),
    }
}

#[test]
fn test_load_invalid_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("snapshot.json");
    fs::write(&path, "[{\"accountId\": \"a\",").unwrap();
    let store = ReviewStore::new(&path);

    assert!(matches!(store.load(), Err(StoreError::Format { .. })));
}

#[test]
fn test_load_record_missing_required_field() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("snapshot.json");
    fs::write(&path, r#"[{"accountId": "a", "displayName": "A"}]"#).unwrap();
    let store = ReviewStore::new(&path);

    assert!(matches!(store.load(), Err(StoreError::Format { .. })));
}

#[test]
fn test_load_wrong_field_type() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("snapshot.json");
    fs::write(
        &path,
        r#"[{"accountId": "a", "active": "no", "accountType": "atlassian"}]"#,
    )
    .unwrap();
    let store = ReviewStore::new(&path);

    assert!(matches!(store.load(), Err(StoreError::Format { .. })));
}

#[test]
fn test_load_tolerates_unknown_fields() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("snapshot.json");
    fs::write(
        &path,
        r#"[{"accountId": "a", "active": false, "accountType": "app", "reviewNote": "keep?"}]"#,
    )
    .unwrap();
    let store = ReviewStore::new(&path);

    let loaded = store.load().unwrap();

    assert_eq!(loaded[0].extra["reviewNote"], "keep?");
    assert!(loaded[0].email_address.is_none());
}

#[test]
fn test_load_rejects_active_accounts() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("snapshot.json");
    fs::write(
        &path,
        r#"[{"accountId": "a", "active": false, "accountType": "atlassian"},
            {"accountId": "b", "active": true, "accountType": "atlassian"}]"#,
    )
    .unwrap();
    let store = ReviewStore::new(&path);

    match store.load() {
        Err(StoreError::ActiveAccount { account_id, .. }) => assert_eq!(account_id, "b"),
        other => panic!("Expected ActiveAccount error, got {other:?}"),
    }
}
