use mailsift_core::RolesConfig;
use mailsift_roles::{RoleFilter, RoleRules};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_configured_rules_file_drives_filter() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("roles.toml");
    fs::write(
        &path,
        r#"
local_parts = ["sales", "ops"]
patterns = ["^team[0-9]+$"]
"#,
    )
    .expect("write rules");

    let config = RolesConfig {
        rules_path: Some(path),
    };
    let filter = RoleFilter::new(RoleRules::from_config(&config));

    let report = filter.filter([
        "Sales@shop.io",
        "eu-ops@shop.io",
        "team42@shop.io",
        "admin@shop.io",
        "broken-address",
    ]);

    assert_eq!(report.rejected, vec!["Sales@shop.io", "eu-ops@shop.io", "team42@shop.io"]);
    assert_eq!(report.kept, vec!["admin@shop.io", "broken-address"]);

    let reasons: Vec<&str> = report.details.iter().map(|d| d.reason.as_str()).collect();
    assert_eq!(
        reasons,
        vec!["exact: sales", "token: ops", "pattern: ^team[0-9]+$", "no-match", "no-at"]
    );
}

#[test]
fn test_malformed_rules_file_disables_filtering() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("roles.toml");
    fs::write(&path, "patterns = [\"[unclosed\"]").expect("write rules");

    let config = RolesConfig {
        rules_path: Some(path),
    };
    let filter = RoleFilter::new(RoleRules::from_config(&config));

    assert!(filter.rules().is_empty());
    assert!(!filter.classify("admin@shop.io").role_based);
}
