use super::*;

#[test]
fn test_cli_without_arguments() {
    let cli = Cli::try_parse_from(["user-sweeper"]).unwrap();

    let overrides = cli.overrides();
    assert!(cli.config.is_none());
    assert!(overrides.domain.is_none());
    assert!(overrides.snapshot_path.is_none());
    assert!(overrides.page_size.is_none());
    assert!(!overrides.include_former_accounts);
}

#[test]
fn test_cli_flags_become_overrides() {
    let cli = Cli::try_parse_from([
        "user-sweeper",
        "--config",
        "ops.toml",
        "--domain",
        "acme",
        "--snapshot",
        "out/review.json",
        "--page-size",
        "200",
        "--include-former",
    ])
    .unwrap();

    let overrides = cli.overrides();
    assert_eq!(cli.config, Some(PathBuf::from("ops.toml")));
    assert_eq!(overrides.domain.as_deref(), Some("acme"));
    assert_eq!(
        overrides.snapshot_path,
        Some(PathBuf::from("out/review.json"))
    );
    assert_eq!(overrides.page_size, Some(200));
    assert!(overrides.include_former_accounts);
}

#[test]
fn test_cli_rejects_non_numeric_page_size() {
    assert!(Cli::try_parse_from(["user-sweeper", "--page-size", "many"]).is_err());
}
