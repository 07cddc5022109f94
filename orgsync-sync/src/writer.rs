//! Remote write adapter.
//!
//! ## `write`: order of checks
//!
//! 1. No content and deletion disabled → skipped, nothing is read.
//! 2. The repository has no secret map → fatal.
//! 3. The map has no entry for the purpose → fatal.
//! 4. The organization has no secret under that name → fatal.
//! 5. Dry run → report what would happen.
//! 6. Create, update or delete through the cached write client.
//!
//! A failed remote write is reported, not raised: the run moves on to the
//! next repository and ends unsuccessful.

use std::fmt;

use serde::Serialize;

use orgsync_core::{RepoName, RepositoryConfig, SecretPurpose};
use orgsync_github::{write_text_file, FileChange};

use crate::context::SyncContext;
use crate::error::SyncError;

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// What a write does to the remote file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    CreateOrUpdate,
    Delete,
}

impl WriteAction {
    pub fn for_content(content: Option<&str>) -> Self {
        if content.is_some() {
            WriteAction::CreateOrUpdate
        } else {
            WriteAction::Delete
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WriteAction::CreateOrUpdate => "Creating/Updating",
            WriteAction::Delete => "Deleting",
        }
    }

    /// Commit message for `path`; `[skip ci]` keeps the commit from
    /// triggering workflows in the target repository.
    pub fn commit_message(self, path: &str) -> String {
        format!("{} {path} [skip ci]", self.as_str())
    }
}

impl fmt::Display for WriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one repository's write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum WriteResult {
    /// The remote call went through.
    Changed { change: FileChange },
    /// Dry run: this is what would have been attempted.
    WouldWrite { action: WriteAction },
    /// Nothing attempted.
    Skipped { reason: String },
    /// The remote call failed.
    Failed { error: String },
}

impl WriteResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, WriteResult::Failed { .. })
    }
}

// ---------------------------------------------------------------------------
// write
// ---------------------------------------------------------------------------

const DEFAULT_SKIP_REASON: &str =
    "The repository is not associated to any team, and deletion is disabled: see the process-deletion parameter.";

/// Create, update or delete (`content = None`) `path` on `repo` with the
/// credential `config` holds for `purpose`.
///
/// `skip_reason` is reported when there is no content and deletions are
/// disabled.
pub async fn write(
    ctx: &SyncContext,
    repo: &RepoName,
    config: &RepositoryConfig,
    purpose: SecretPurpose,
    path: &str,
    content: Option<&str>,
    skip_reason: Option<String>,
) -> Result<WriteResult, SyncError> {
    if content.is_none() && !ctx.process_deletion {
        let reason = skip_reason.unwrap_or_else(|| DEFAULT_SKIP_REASON.to_owned());
        tracing::info!("skipping {repo}: {reason}");
        return Ok(WriteResult::Skipped { reason });
    }

    if config.secrets.is_empty() {
        return Err(SyncError::MissingRepoSecrets { repo: repo.clone() });
    }
    let secret = config
        .secret(purpose)
        .ok_or_else(|| SyncError::MissingSecretPurpose {
            repo: repo.clone(),
            purpose,
        })?;
    let token = ctx
        .secrets()
        .require(secret, &format!("the \"{repo}\" repository"))?;

    let action = WriteAction::for_content(content);
    let file = file_name(path);
    if ctx.dry_run {
        tracing::info!("[dry-run] {action} the \"{file}\" file on {repo}");
        return Ok(WriteResult::WouldWrite { action });
    }
    tracing::info!("{action} the \"{file}\" file on {repo}");

    let host = ctx.writer_for(token)?;
    let message = action.commit_message(path);
    match write_text_file(host.as_ref(), &ctx.org, &repo.0, path, content, &message).await {
        Ok(change) => {
            tracing::debug!("{repo}: {path} {change:?}");
            Ok(WriteResult::Changed { change })
        }
        Err(e) => {
            tracing::error!(
                "an error occurred while {} the \"{file}\" file on \"{repo}\" with the secret \"{secret}\": {e}",
                action.as_str().to_lowercase()
            );
            Ok(WriteResult::Failed {
                error: e.to_string(),
            })
        }
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use orgsync_core::{OrgSecretName, SecretMap};
    use orgsync_github::{ClientCache, ClientKind, MemoryConnector, MemoryHost};

    use super::*;
    use crate::settings::{SecretValues, SyncSettings};

    const PATH: &str = ".github/workflows/phpcs.yml";

    fn context(connector: &MemoryConnector, process_deletion: bool, dry_run: bool) -> SyncContext {
        let mut settings = SyncSettings::new("acme", "workflow/phpcs.yml", "/ws");
        settings.process_deletion = process_deletion;
        settings.dry_run = dry_run;
        settings.secrets = SecretValues::from_iter([
            ("CSPF_REPO_READ_PAT", "read"),
            ("ORG_PAT", "token-0"),
            ("ORG_PAT_1", "token-1"),
        ]);
        SyncContext::new(&settings, ClientCache::new(connector.clone())).unwrap()
    }

    fn config(secret: &str) -> RepositoryConfig {
        RepositoryConfig {
            owner: Some("alice".into()),
            secrets: SecretMap::from([(SecretPurpose::WorkflowManage, OrgSecretName::from(secret))]),
            ..RepositoryConfig::default()
        }
    }

    #[test]
    fn commit_messages_name_the_action() {
        assert_eq!(
            WriteAction::CreateOrUpdate.commit_message(PATH),
            "Creating/Updating .github/workflows/phpcs.yml [skip ci]"
        );
        assert_eq!(
            WriteAction::Delete.commit_message("README.md"),
            "Deleting README.md [skip ci]"
        );
    }

    #[tokio::test]
    async fn writes_with_the_resolved_token() {
        let connector = MemoryConnector::new(MemoryHost::new());
        let ctx = context(&connector, false, false);

        let result = write(&ctx, &"api".into(), &config("ORG_PAT_1"), SecretPurpose::WorkflowManage, PATH, Some("body"), None)
            .await
            .unwrap();

        assert_eq!(result, WriteResult::Changed { change: FileChange::Created });
        let writes = connector.host().writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].token, "token-1");
        assert_eq!(writes[0].message, "Creating/Updating .github/workflows/phpcs.yml [skip ci]");
        assert!(connector.connects().contains(&("token-1".to_string(), ClientKind::Write)));
    }

    #[tokio::test]
    async fn null_content_without_deletion_is_skipped_before_credential_checks() {
        let connector = MemoryConnector::new(MemoryHost::new());
        let ctx = context(&connector, false, false);

        let result = write(&ctx, &"api".into(), &RepositoryConfig::default(), SecretPurpose::RepoWrite, PATH, None, Some("not enabled".into()))
            .await
            .unwrap();

        assert_eq!(result, WriteResult::Skipped { reason: "not enabled".into() });
        assert!(connector.host().writes().is_empty());
    }

    #[tokio::test]
    async fn deletion_removes_the_file() {
        let connector = MemoryConnector::new(MemoryHost::new());
        connector.host().set_file("api", PATH, "old");
        let ctx = context(&connector, true, false);

        let result = write(&ctx, &"api".into(), &config("ORG_PAT"), SecretPurpose::WorkflowManage, PATH, None, None)
            .await
            .unwrap();

        assert_eq!(result, WriteResult::Changed { change: FileChange::Deleted });
        assert_eq!(connector.host().writes()[0].message, "Deleting .github/workflows/phpcs.yml [skip ci]");
        assert!(connector.host().file("api", PATH).is_none());
    }

    #[tokio::test]
    async fn credential_checks_are_fatal_in_order() {
        let connector = MemoryConnector::new(MemoryHost::new());
        let ctx = context(&connector, true, false);
        let repo = RepoName::from("api");

        let no_secrets = write(&ctx, &repo, &RepositoryConfig::default(), SecretPurpose::WorkflowManage, PATH, Some("x"), None).await;
        assert!(matches!(no_secrets, Err(SyncError::MissingRepoSecrets { .. })));

        let no_purpose = write(&ctx, &repo, &config("ORG_PAT"), SecretPurpose::RepoWrite, PATH, Some("x"), None).await;
        assert!(matches!(
            no_purpose,
            Err(SyncError::MissingSecretPurpose { purpose: SecretPurpose::RepoWrite, .. })
        ));

        let no_org_secret = write(&ctx, &repo, &config("ORG_PAT_2"), SecretPurpose::WorkflowManage, PATH, Some("x"), None).await;
        match no_org_secret {
            Err(SyncError::MissingOrgSecret { secret, .. }) => assert_eq!(secret.as_str(), "ORG_PAT_2"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(connector.host().writes().is_empty());
    }

    #[tokio::test]
    async fn dry_run_reports_without_writing() {
        let connector = MemoryConnector::new(MemoryHost::new());
        let ctx = context(&connector, true, true);

        let result = write(&ctx, &"api".into(), &config("ORG_PAT"), SecretPurpose::WorkflowManage, PATH, None, None)
            .await
            .unwrap();

        assert_eq!(result, WriteResult::WouldWrite { action: WriteAction::Delete });
        assert!(connector.host().writes().is_empty());
    }

    #[tokio::test]
    async fn remote_failure_is_reported_not_raised() {
        let connector = MemoryConnector::new(MemoryHost::new());
        connector.host().fail_writes_to("api");
        let ctx = context(&connector, false, false);

        let result = write(&ctx, &"api".into(), &config("ORG_PAT"), SecretPurpose::WorkflowManage, PATH, Some("x"), None)
            .await
            .unwrap();

        assert!(result.is_failed());
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(file_name(".github/workflows/ci.yml"), "ci.yml");
        assert_eq!(file_name("README.md"), "README.md");
    }
}
