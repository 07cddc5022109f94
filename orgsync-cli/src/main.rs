//! orgsync: keep organization-wide files in sync across repositories.
//!
//! # Usage
//!
//! ```text
//! orgsync sync --org <org> --what <category/name> --secrets <json>
//!              [--process-deletion] [--dry-run] [--concurrency N] [--json]
//! orgsync find-secret --repo <name> --purpose <issue-manage|workflow-manage|repo-write>
//! ```
//!
//! Every `sync` parameter can also come from the GitHub Actions `INPUT_*`
//! environment variables, and the workspace from `GITHUB_WORKSPACE`.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::{find_secret::FindSecretArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "orgsync",
    version,
    about = "Synchronize workflow, issue-template and config files across an organization",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create, update or delete one synced file on every active repository.
    Sync(SyncArgs),

    /// Print the organization secret a repository uses for a purpose.
    FindSecret(FindSecretArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Sync(args) => args.run().await,
        Commands::FindSecret(args) => args.run().map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            println!("::error::one or more repositories could not be synchronized");
            ExitCode::FAILURE
        }
        Err(e) => {
            // Workflow command: shows up as an annotation on the run.
            println!("::error::{e:#}");
            ExitCode::FAILURE
        }
    }
}
