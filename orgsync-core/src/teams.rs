//! Team-definitions document.
//!
//! # Layout
//!
//! ```text
//! <workspace>/
//!   defs/
//!     teams-config.yml
//! ```
//!
//! ```yaml
//! core:
//!   project: 7
//!   owner: core-leads
//!   repos: [api, web]
//!   secrets:
//!     issue-manage: CORE_ISSUE_PAT
//!     workflow-manage: CORE_WORKFLOW_PAT
//!     repo-write: CORE_WRITE_PAT
//!   synced-files:
//!     workflow/release.yml: [api]
//! ```
//!
//! Loading is all-or-nothing: a malformed document fails the run before any
//! credential is resolved.

use std::path::{Path, PathBuf};

use crate::credentials;
use crate::error::ConfigError;
use crate::types::{OrgSecretName, RepoName, SecretPurpose, TeamDefinitions};

/// `<workspace>/defs/teams-config.yml`: pure, no I/O.
pub fn default_path(workspace: &Path) -> PathBuf {
    workspace.join("defs").join("teams-config.yml")
}

/// Load team definitions from `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with
/// path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<TeamDefinitions, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let defs = parse_from(&contents, path)?;
    tracing::debug!("loaded {} team(s) from {}", defs.len(), path.display());
    Ok(defs)
}

/// Parse team definitions from a YAML string.
pub fn parse(yaml: &str) -> Result<TeamDefinitions, ConfigError> {
    parse_from(yaml, Path::new("<inline>"))
}

fn parse_from(yaml: &str, path: &Path) -> Result<TeamDefinitions, ConfigError> {
    // An empty document is an empty organization, not an error.
    if yaml.trim().is_empty() {
        return Ok(TeamDefinitions::default());
    }
    serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Organization secret name `repo` must use for `purpose`.
///
/// The first team (in team-name order) listing `repo` wins.
pub fn find_repo_secret(
    defs: &TeamDefinitions,
    repo: &RepoName,
    purpose: SecretPurpose,
) -> Result<OrgSecretName, ConfigError> {
    let (team, def, position) = defs
        .iter()
        .find_map(|(team, def)| def.position_of(repo).map(|pos| (team, def, pos)))
        .ok_or_else(|| ConfigError::RepoNotInAnyTeam { repo: repo.clone() })?;

    credentials::resolve_at(&def.secrets, position)
        .remove(&purpose)
        .ok_or_else(|| ConfigError::MissingPurpose {
            team: team.clone(),
            repo: repo.clone(),
            purpose,
        })
}
