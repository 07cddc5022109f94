//! Whether a gated sync leaves a repository alone.

use std::fmt;

use orgsync_core::{RepoName, RepositoryConfig};
use orgsync_github::RemoteError;
use serde::Serialize;

use crate::context::SyncContext;
use crate::error::SyncError;

/// A repository variable that opts a repository out, optionally narrowed to
/// one entry of a list-valued variable (`VAR.subkey`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipVariable {
    pub name: String,
    pub subkey: Option<String>,
}

impl SkipVariable {
    pub fn new(name: &str, subkey: Option<&str>) -> Self {
        Self {
            name: name.to_owned(),
            subkey: subkey.map(str::to_owned),
        }
    }

    /// `VAR` or `VAR.subkey`; everything after the first dot is the subkey.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('.') {
            Some((name, subkey)) if !subkey.is_empty() => Self::new(name, Some(subkey)),
            Some((name, _)) => Self::new(name, None),
            None => Self::new(raw, None),
        }
    }

    /// Whether the variable's `value` asks for this repository to be skipped.
    ///
    /// Without a subkey only the literal `true` skips. With a subkey the
    /// value lists the entries that stay synchronized: the repository is
    /// skipped unless the subkey is listed. An empty value counts as unset.
    pub fn requires_skip(&self, value: &str) -> bool {
        let value = value.trim();
        let Some(subkey) = self.subkey.as_deref() else {
            return value == "true";
        };
        if value.is_empty() {
            return false;
        }
        match parse_list(value) {
            Some(entries) => !entries.iter().any(|e| e.eq_ignore_ascii_case(subkey)),
            None => true,
        }
    }
}

impl fmt::Display for SkipVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subkey {
            Some(subkey) => write!(f, "{}.{subkey}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// `["a", "b"]` or `a, b`. `None` for a malformed JSON array.
fn parse_list(value: &str) -> Option<Vec<String>> {
    if value.starts_with('[') {
        return serde_json::from_str::<Vec<String>>(value)
            .ok()
            .map(|entries| entries.into_iter().map(|e| e.trim().to_owned()).collect());
    }
    Some(
        value
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

/// Why a repository was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// No owning team and deletions are disabled.
    Unowned,
    /// The skip variable asked for it (or could not be read).
    OptedOut { variable: String },
    /// None of the marker files exist.
    MissingMarkers,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unowned => {
                f.write_str("the repository is not owned by any team and deletion is disabled")
            }
            SkipReason::OptedOut { variable } => {
                write!(f, "the repository opted out via the {variable} variable")
            }
            SkipReason::MissingMarkers => f.write_str("the repository misses the required files"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipDecision {
    Proceed,
    Skip(SkipReason),
}

impl SkipDecision {
    pub fn is_skip(&self) -> bool {
        matches!(self, SkipDecision::Skip(_))
    }
}

/// Decide whether `repo` is skipped.
///
/// Checks run in order and stop at the first that skips: ownership, the
/// skip variable, then the marker files. A forbidden variable read is fatal.
pub async fn should_skip(
    ctx: &SyncContext,
    repo: &RepoName,
    config: &RepositoryConfig,
    skip_var: Option<&SkipVariable>,
    markers: Option<&[&str]>,
) -> Result<SkipDecision, SyncError> {
    if !config.is_owned() && !ctx.process_deletion {
        return Ok(SkipDecision::Skip(SkipReason::Unowned));
    }

    if let Some(var) = skip_var {
        if variable_requires_skip(ctx, repo, var).await? {
            return Ok(SkipDecision::Skip(SkipReason::OptedOut {
                variable: var.to_string(),
            }));
        }
    }

    if let Some(markers) = markers {
        if !any_marker_exists(ctx, repo, markers).await {
            return Ok(SkipDecision::Skip(SkipReason::MissingMarkers));
        }
    }

    Ok(SkipDecision::Proceed)
}

async fn variable_requires_skip(
    ctx: &SyncContext,
    repo: &RepoName,
    var: &SkipVariable,
) -> Result<bool, SyncError> {
    let host = ctx.variable_reader()?;
    match host.get_variable(&ctx.org, &repo.0, &var.name).await {
        Ok(value) => {
            let skip = var.requires_skip(&value);
            tracing::debug!("{repo}: {} = {value:?} -> skip={skip}", var.name);
            Ok(skip)
        }
        Err(RemoteError::NotFound) => Ok(false),
        Err(source) if source.is_forbidden() => Err(SyncError::VariableForbidden {
            repo: repo.clone(),
            variable: var.name.clone(),
            source,
        }),
        Err(e) => {
            tracing::warn!("{repo}: reading {} failed, skipping: {e}", var.name);
            Ok(true)
        }
    }
}

/// Sequential probes; the first hit wins. Probe errors count as absent.
async fn any_marker_exists(ctx: &SyncContext, repo: &RepoName, markers: &[&str]) -> bool {
    for path in markers {
        match ctx.reader().get_content(&ctx.org, &repo.0, path).await {
            Ok(Some(_)) => return true,
            Ok(None) => {}
            Err(e) => tracing::debug!("{repo}: probing {path} failed: {e}"),
        }
    }
    false
}
