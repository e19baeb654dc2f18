mod commands;
mod logging;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use mailsift_core::ListKind;

#[derive(Parser)]
#[command(
    name = "mailsift",
    version,
    about = "Clean email lists: dedup, drop role mailboxes, validate the rest"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to the per-user config location)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a bulk classification job and report its progress
    Check {
        /// Addresses to check, each one item
        emails: Vec<String>,
        /// Stream candidate addresses out of a file ("-" reads stdin)
        #[arg(long, value_name = "PATH", conflicts_with_all = ["text", "emails"])]
        file: Option<PathBuf>,
        /// Extract candidate addresses from a file read into memory
        #[arg(long, value_name = "PATH", conflicts_with = "emails")]
        text: Option<PathBuf>,
        /// Print one result list when the job ends (valid, invalid, role, duplicates)
        #[arg(long, value_name = "KIND")]
        dump: Option<ListKind>,
        /// Progress poll interval in milliseconds
        #[arg(long, default_value_t = 500)]
        poll_ms: u64,
    },
    /// Classify addresses as role mailboxes or not
    Roles {
        /// Addresses to classify
        #[arg(required = true)]
        emails: Vec<String>,
    },
    /// Validate addresses without deduplication or role filtering
    Validate {
        /// Addresses to validate
        #[arg(required = true)]
        emails: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);
    tracing::debug!("Starting mailsift v{}", env!("CARGO_PKG_VERSION"));

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            emails,
            file,
            text,
            dump,
            poll_ms,
        } => {
            let args = commands::check::CheckArgs {
                emails,
                file,
                text,
                dump,
                poll_ms,
                json: cli.json,
            };
            commands::check::execute(&config, args).await
        }
        Commands::Roles { emails } => commands::roles::execute(&config, &emails, cli.json),
        Commands::Validate { emails } => {
            commands::validate::execute(&config, &emails, cli.json).await
        }
    }
}
