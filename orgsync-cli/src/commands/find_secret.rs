//! `orgsync find-secret`: which organization secret a repository writes with.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use orgsync_core::{teams, RepoName, SecretPurpose};

/// Arguments for `orgsync find-secret`.
#[derive(Args, Debug)]
pub struct FindSecretArgs {
    /// Repository name.
    #[arg(long, env = "INPUT_REPO")]
    pub repo: String,

    /// Secret purpose: issue-manage, workflow-manage or repo-write.
    #[arg(long, env = "INPUT_PURPOSE")]
    pub purpose: SecretPurpose,

    /// Team definitions file; defaults to `<workspace>/defs/teams-config.yml`.
    #[arg(long)]
    pub teams_config: Option<PathBuf>,

    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,
}

impl FindSecretArgs {
    pub fn run(self) -> Result<()> {
        let path = self
            .teams_config
            .clone()
            .unwrap_or_else(|| teams::default_path(&self.workspace));
        let defs = teams::load_at(&path)
            .with_context(|| format!("failed to load team definitions from {}", path.display()))?;

        let secret = teams::find_repo_secret(&defs, &RepoName::from(self.repo.as_str()), self.purpose)?;
        tracing::debug!("{} uses {secret} for {}", self.repo, self.purpose);
        println!("{secret}");
        Ok(())
    }
}
