//! Error types for orgsync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{RepoName, SecretPurpose, TeamName};

/// Errors raised while loading team definitions or building the
/// per-repository configuration. All of them abort the run before any
/// remote write happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading the team definitions.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The team-definitions file did not exist at the expected path.
    #[error("team definitions not found at {path}")]
    NotFound { path: PathBuf },

    /// YAML parse error: includes file path and line context from serde_yaml.
    #[error("failed to parse team definitions at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A synced-file identifier is not of the form `<category>/<name>`.
    #[error("invalid synced file identifier '{id}'; expected <category>/<name>")]
    InvalidSyncedFileId { id: String },

    /// Two teams claim the same repository.
    #[error("repository '{repo}' is listed by both team '{first}' and team '{second}'")]
    DuplicateOwnership {
        repo: RepoName,
        first: TeamName,
        second: TeamName,
    },

    /// Lookup of a repository that no team lists.
    #[error("repository '{repo}' not found in any team")]
    RepoNotInAnyTeam { repo: RepoName },

    /// The owning team declares no secret for the requested purpose.
    #[error("team '{team}' has no '{purpose}' secret (needed by repository '{repo}')")]
    MissingPurpose {
        team: TeamName,
        repo: RepoName,
        purpose: SecretPurpose,
    },
}
