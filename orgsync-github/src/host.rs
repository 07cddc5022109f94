//! The remote host seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// A repository as returned by the organization listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepo {
    pub name: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
}

impl RemoteRepo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            archived: false,
            disabled: false,
        }
    }

    /// Archived or disabled repositories are never sync targets.
    pub fn is_active(&self) -> bool {
        !self.archived && !self.disabled
    }
}

/// What lives at a path in a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteContent {
    /// `text` is `None` when the blob is not valid UTF-8.
    File { sha: String, text: Option<String> },
    Directory,
}

/// Outcome of [`write_text_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChange {
    Created,
    Updated,
    Deleted,
    /// Remote content already matches; no commit made.
    Unchanged,
    /// Deletion requested but the file does not exist.
    Absent,
}

/// Remote operations needed by the synchronizer.
///
/// One instance is bound to one credential.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Every repository of `org`, all pages.
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RemoteRepo>, RemoteError>;

    /// Value of a repository-level actions variable.
    async fn get_variable(&self, org: &str, repo: &str, name: &str) -> Result<String, RemoteError>;

    /// `Ok(None)` when nothing exists at `path`.
    async fn get_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<RemoteContent>, RemoteError>;

    /// Create (`sha = None`) or replace a file.
    async fn put_file(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        content: &str,
        sha: Option<&str>,
        message: &str,
    ) -> Result<(), RemoteError>;

    async fn delete_file(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        sha: &str,
        message: &str,
    ) -> Result<(), RemoteError>;
}

/// Create, update or delete (`content = None`) the text file at `path`.
///
/// Idempotent: identical content and deleting a missing file are no-ops that
/// produce no commit.
pub async fn write_text_file(
    host: &dyn RepoHost,
    org: &str,
    repo: &str,
    path: &str,
    content: Option<&str>,
    message: &str,
) -> Result<FileChange, RemoteError> {
    let (sha, current) = match host.get_content(org, repo, path).await? {
        Some(RemoteContent::File { sha, text }) => (Some(sha), text),
        Some(RemoteContent::Directory) => {
            return Err(RemoteError::NotAFile {
                path: path.to_owned(),
            })
        }
        None => (None, None),
    };

    match (content, sha) {
        (None, None) => Ok(FileChange::Absent),
        (None, Some(sha)) => {
            host.delete_file(org, repo, path, &sha, message).await?;
            Ok(FileChange::Deleted)
        }
        (Some(text), sha) => {
            if current.as_deref() == Some(text) {
                return Ok(FileChange::Unchanged);
            }
            host.put_file(org, repo, path, text, sha.as_deref(), message)
                .await?;
            Ok(if sha.is_some() {
                FileChange::Updated
            } else {
                FileChange::Created
            })
        }
    }
}
