//! `orgsync sync`: push one synced file to every active repository.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use orgsync_github::{ApiConfig, Committer, FileChange, HttpConnector};
use orgsync_sync::{
    parse_deletion_flag, pipeline,
    settings::{DEFAULT_READ_SECRET, DEFAULT_VARS_READ_SECRET},
    RunReport, SecretValues, SyncSettings, WriteResult,
};

/// Arguments for `orgsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Organization whose repositories are synchronized.
    #[arg(long, env = "INPUT_ORG")]
    pub org: String,

    /// Synced file to process, e.g. `workflow/phpcs.yml`.
    #[arg(long, env = "INPUT_WHAT")]
    pub what: String,

    /// JSON object mapping organization secret names to values.
    #[arg(long, env = "INPUT_SECRETS", default_value = "", hide_env_values = true)]
    pub secrets: String,

    /// Delete the file where it no longer applies (`true`/`1`).
    #[arg(
        long,
        env = "INPUT_PROCESS_DELETION",
        default_value = "false",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub process_deletion: String,

    /// Root holding `defs/teams-config.yml` and `.github/templates/`.
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    /// Team definitions file; defaults to `<workspace>/defs/teams-config.yml`.
    #[arg(long)]
    pub teams_config: Option<PathBuf>,

    /// Report what would be written without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Repositories processed at once.
    #[arg(long, env = "INPUT_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    /// Organization secret with the listing and probing token.
    #[arg(long, default_value = DEFAULT_READ_SECRET)]
    pub read_secret: String,

    /// Organization secret with the variable-reading token.
    #[arg(long, default_value = DEFAULT_VARS_READ_SECRET)]
    pub vars_read_secret: String,

    /// REST API root.
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// Committer name recorded on file writes.
    #[arg(long, requires = "committer_email")]
    pub committer_name: Option<String>,

    /// Committer email recorded on file writes.
    #[arg(long, requires = "committer_name")]
    pub committer_email: Option<String>,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    /// Run the sync; `Ok(false)` when any repository failed.
    pub async fn run(self) -> Result<bool> {
        let settings = self.settings()?;
        let connector = HttpConnector::new(
            ApiConfig {
                base_url: self.api_url.clone(),
                ..ApiConfig::default()
            },
            self.committer(),
        );

        let report = pipeline::run(&settings, connector)
            .await
            .with_context(|| format!("sync of '{}' failed", self.what))?;
        tracing::info!(
            "'{}' done: {} repositories, {} failed",
            report.target,
            report.results.len(),
            report.failed()
        );

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
        } else {
            print_report(&report, self.dry_run);
        }
        Ok(report.is_success())
    }

    fn settings(&self) -> Result<SyncSettings> {
        let mut settings = SyncSettings::new(&self.org, &self.what, &self.workspace);
        settings.secrets =
            SecretValues::from_json(&self.secrets).context("failed to parse --secrets")?;
        settings.process_deletion = parse_deletion_flag(&self.process_deletion);
        settings.dry_run = self.dry_run;
        settings.concurrency = self.concurrency.max(1);
        settings.read_secret = self.read_secret.as_str().into();
        settings.vars_read_secret = self.vars_read_secret.as_str().into();
        settings.teams_config = self.teams_config.clone();
        Ok(settings)
    }

    fn committer(&self) -> Option<Committer> {
        match (&self.committer_name, &self.committer_email) {
            (Some(name), Some(email)) => Some(Committer {
                name: name.clone(),
                email: email.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "repository")]
    repo: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "outcome")]
    outcome: String,
}

fn outcome_label(result: &WriteResult) -> String {
    match result {
        WriteResult::Changed { change } => match change {
            FileChange::Created => "created".to_string(),
            FileChange::Updated => "updated".to_string(),
            FileChange::Deleted => "deleted".to_string(),
            FileChange::Unchanged => "unchanged".to_string(),
            FileChange::Absent => "already absent".to_string(),
        },
        WriteResult::WouldWrite { action } => format!("would: {action}"),
        WriteResult::Skipped { reason } => format!("skipped: {reason}"),
        WriteResult::Failed { error } => format!("FAILED: {error}"),
    }
}

fn print_report(report: &RunReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let headline = format!(
        "{prefix}'{}' on {} repositories ({} written, {} deleted, {} unchanged, {} skipped, {} failed)",
        report.target,
        report.results.len(),
        report.written() + report.would_write(),
        report.deleted(),
        report.unchanged(),
        report.skipped(),
        report.failed(),
    );
    if report.is_success() {
        println!("{} {headline}", "✓".green());
    } else {
        println!("{} {headline}", "✗".red());
    }

    if report.results.is_empty() {
        return;
    }
    let rows: Vec<ResultRow> = report
        .results
        .iter()
        .map(|r| ResultRow {
            repo: r.repo.to_string(),
            path: r.path.clone(),
            outcome: outcome_label(&r.result),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: SyncArgs,
    }

    #[test]
    fn bare_deletion_flag_enables_deletion() {
        let h = Harness::parse_from(["t", "--org", "acme", "--what", "workflow/phpcs.yml", "--process-deletion"]);
        assert!(h.args.settings().unwrap().process_deletion);
    }

    #[test]
    fn deletion_defaults_off_and_concurrency_to_one() {
        let h = Harness::parse_from(["t", "--org", "acme", "--what", "workflow/phpcs.yml"]);
        let settings = h.args.settings().unwrap();
        assert!(!settings.process_deletion);
        assert_eq!(settings.concurrency, 1);
        assert_eq!(settings.read_secret.as_str(), "CSPF_REPO_READ_PAT");
    }

    #[test]
    fn committer_needs_both_parts() {
        let only_name = Harness::try_parse_from([
            "t", "--org", "acme", "--what", "workflow/phpcs.yml", "--committer-name", "bot",
        ]);
        assert!(only_name.is_err());
    }

    #[test]
    fn labels_describe_outcomes() {
        assert_eq!(
            outcome_label(&WriteResult::Changed { change: FileChange::Absent }),
            "already absent"
        );
        assert!(outcome_label(&WriteResult::Failed { error: "boom".into() }).starts_with("FAILED"));
    }
}
