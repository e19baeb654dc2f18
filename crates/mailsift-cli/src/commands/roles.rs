use anyhow::Result;
use mailsift_core::AppConfig;
use mailsift_roles::{RoleFilter, RoleRules};

/// Execute the `roles` command: classify each address with the configured rules.
pub fn execute(config: &AppConfig, emails: &[String], json: bool) -> Result<()> {
    let filter = RoleFilter::new(RoleRules::from_config(&config.roles));
    let report = filter.filter(emails);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for detail in &report.details {
        let tag = if detail.role_based { "role" } else { "keep" };
        println!("{tag:5} {:40} {}", detail.email, detail.reason);
    }
    println!(
        "\n{} kept, {} role-based",
        report.kept.len(),
        report.rejected.len()
    );
    Ok(())
}
