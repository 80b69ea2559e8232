use super::*;

fn account(id: &str, active: bool, account_type: AccountType) -> Account {
    Account {
        account_id: id.to_string(),
        display_name: format!("User {id}"),
        email_address: None,
        active,
        account_type,
        extra: Default::default(),
    }
}

fn ids(accounts: &[Account]) -> Vec<&str> {
    accounts.iter().map(|a| a.account_id.as_str()).collect()
}

#[test]
fn test_filter_inactive_keeps_order_and_only_inactive() {
    let accounts = vec![
        account("1", true, AccountType::Atlassian),
        account("2", false, AccountType::Atlassian),
        account("3", false, AccountType::App),
        account("4", true, AccountType::Customer),
        account("5", false, AccountType::Customer),
    ];

    let inactive = filter_inactive(accounts);

    assert_eq!(ids(&inactive), vec!["2", "3", "5"]);
    assert!(inactive.iter().all(|a| !a.active));
}

#[test]
fn test_filter_inactive_is_idempotent() {
    let accounts = vec![
        account("1", false, AccountType::Atlassian),
        account("2", true, AccountType::Atlassian),
        account("3", false, AccountType::Former),
    ];

    let once = filter_inactive(accounts);
    let twice = filter_inactive(once.clone());

    assert_eq!(once, twice);
}

#[test]
fn test_filter_inactive_of_all_active_is_empty() {
    let accounts = vec![
        account("1", true, AccountType::Atlassian),
        account("2", true, AccountType::App),
    ];

    assert!(filter_inactive(accounts).is_empty());
}

#[test]
fn test_exclude_former_drops_deleted_accounts() {
    let accounts = vec![
        account("1", false, AccountType::Atlassian),
        account("2", false, AccountType::Former),
        account("3", false, AccountType::Other("unknown".to_string())),
    ];

    let remaining = exclude_former(accounts);

    assert_eq!(ids(&remaining), vec!["1", "3"]);
}
