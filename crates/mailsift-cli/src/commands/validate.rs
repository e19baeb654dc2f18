use anyhow::Result;
use mailsift_core::{AppConfig, MxStatus};
use mailsift_validator::Validator;

/// Execute the `validate` command: validate each address independently.
pub async fn execute(config: &AppConfig, emails: &[String], json: bool) -> Result<()> {
    let validator = Validator::from_config(&config.validation);
    let verdicts = validator.validate_all(emails).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&verdicts)?);
        return Ok(());
    }

    for v in &verdicts {
        let mx = match v.mx {
            MxStatus::Present => "mx",
            MxStatus::Absent => "no-mx",
            MxStatus::Unknown => "mx?",
        };
        println!(
            "{:8} {:40} format={} allowlisted={} disposable={} {mx}",
            if v.is_valid() { "valid" } else { "invalid" },
            v.email,
            v.valid_format,
            v.allowlisted,
            v.disposable,
        );
    }

    let valid = verdicts.iter().filter(|v| v.is_valid()).count();
    println!("\n{valid} valid, {} invalid", verdicts.len() - valid);
    Ok(())
}
