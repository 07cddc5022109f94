//! Error types for orgsync-sync.
//!
//! Every variant aborts the run. Per-repository write failures are not
//! errors: they are recorded as [`crate::WriteResult::Failed`] and the run
//! carries on.

use thiserror::Error;

use orgsync_core::{ConfigError, OrgSecretName, RepoName, SecretPurpose};
use orgsync_github::RemoteError;
use orgsync_renderer::RenderError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Team definitions unreadable, malformed or inconsistent.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The template could not be read.
    #[error("template error: {0}")]
    Render(#[from] RenderError),

    /// A remote call the whole run depends on failed (e.g. repository listing).
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// `what` names no known synced file.
    #[error("unknown sync target '{what}'")]
    UnknownTarget { what: String },

    /// The organization secrets input is not a JSON object of strings.
    #[error("invalid secrets JSON: {0}")]
    InvalidSecrets(#[source] serde_json::Error),

    #[error("cannot find the secrets for the \"{repo}\" repository in the team definitions")]
    MissingRepoSecrets { repo: RepoName },

    #[error("cannot find the secret key \"{purpose}\" for the \"{repo}\" repository in the team definitions")]
    MissingSecretPurpose { repo: RepoName, purpose: SecretPurpose },

    #[error("cannot find the organization secret \"{secret}\" (needed by {needed_by}) among the organization action secrets")]
    MissingOrgSecret {
        secret: OrgSecretName,
        needed_by: String,
    },

    /// The variable-read credential was refused.
    #[error("not authorized to read variable {variable} on {repo}: {source}")]
    VariableForbidden {
        repo: RepoName,
        variable: String,
        #[source]
        source: RemoteError,
    },
}
