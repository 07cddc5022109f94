//! The three per-repository sync operations.
//!
//! Each walks the [`RepoConfigMap`] in order, decides the content for every
//! repository and hands it to [`writer::write`]. Up to
//! `ctx.concurrency` repositories are in flight at once; results keep map
//! order. The first fatal error stops the operation.

use std::future::Future;

use futures::{stream, StreamExt};

use orgsync_core::{RepoConfigMap, RepoName, RepositoryConfig, SecretPurpose};
use orgsync_renderer::{Placeholder, Template, TemplateContext};

use crate::context::SyncContext;
use crate::error::SyncError;
use crate::report::RepoResult;
use crate::skip::{self, SkipDecision, SkipVariable};
use crate::target::SyncTarget;
use crate::writer::{self, WriteResult};

/// Run the operation `target` selects with an already-loaded template.
pub async fn reconcile(
    ctx: &SyncContext,
    target: &SyncTarget,
    template: &Template,
    configs: &RepoConfigMap,
) -> Result<Vec<RepoResult>, SyncError> {
    match target {
        SyncTarget::ProjectAutomation { .. } => project_automation(ctx, template, configs).await,
        SyncTarget::Gated {
            skip_variable,
            markers,
            ..
        } => gated(ctx, template, configs, skip_variable, *markers).await,
        SyncTarget::OptIn { .. } => opt_in(ctx, template, configs).await,
    }
}

/// Render the template for repositories with a project; delete it elsewhere.
pub async fn project_automation(
    ctx: &SyncContext,
    template: &Template,
    configs: &RepoConfigMap,
) -> Result<Vec<RepoResult>, SyncError> {
    let path = template.id.destination_path();
    let purpose = template.id.secret_purpose();

    each_repo(ctx, configs, |repo, config| {
        let path = path.clone();
        async move {
            let content = config
                .project
                .as_deref()
                .filter(|project| !project.is_empty())
                .map(|project| {
                    let owner = config.owner.as_deref().unwrap_or_default();
                    let issue_pat = config
                        .secret(SecretPurpose::IssueManage)
                        .map(|s| s.as_str())
                        .unwrap_or_default();
                    template.render(&TemplateContext::project_automation(
                        &ctx.org, project, owner, issue_pat,
                    ))
                });
            let result =
                writer::write(ctx, repo, config, purpose, &path, content.as_deref(), None).await?;
            Ok(repo_result(repo, path, result))
        }
    })
    .await
}

/// Write the template verbatim unless the repository is skipped.
pub async fn gated(
    ctx: &SyncContext,
    template: &Template,
    configs: &RepoConfigMap,
    skip_variable: &SkipVariable,
    markers: Option<&[&str]>,
) -> Result<Vec<RepoResult>, SyncError> {
    let path = template.id.destination_path();
    let purpose = template.id.secret_purpose();

    each_repo(ctx, configs, |repo, config| {
        let path = path.clone();
        async move {
            let result =
                match skip::should_skip(ctx, repo, config, Some(skip_variable), markers).await? {
                    SkipDecision::Skip(reason) => {
                        tracing::info!("skipping {repo}: {reason}");
                        WriteResult::Skipped {
                            reason: reason.to_string(),
                        }
                    }
                    SkipDecision::Proceed => {
                        writer::write(ctx, repo, config, purpose, &path, Some(template.body.as_str()), None)
                            .await?
                    }
                };
            Ok(repo_result(repo, path, result))
        }
    })
    .await
}

/// Write the template to repositories whose team enabled it; delete it
/// elsewhere.
pub async fn opt_in(
    ctx: &SyncContext,
    template: &Template,
    configs: &RepoConfigMap,
) -> Result<Vec<RepoResult>, SyncError> {
    let id = &template.id;
    let path = id.destination_path();
    let purpose = id.secret_purpose();

    each_repo(ctx, configs, |repo, config| {
        let path = path.clone();
        async move {
            let content = config.syncs(id).then(|| {
                let repo_write = config
                    .secret(SecretPurpose::RepoWrite)
                    .map(|s| s.as_str())
                    .unwrap_or_default();
                template.render(&TemplateContext::new().bind(Placeholder::RepoWritePat, repo_write))
            });
            let reason = format!(
                "The repository {repo} does not have the {id} associated, and deletion is disabled: see the process-deletion parameter."
            );
            let result =
                writer::write(ctx, repo, config, purpose, &path, content.as_deref(), Some(reason))
                    .await?;
            Ok(repo_result(repo, path, result))
        }
    })
    .await
}

fn repo_result(repo: &RepoName, path: String, result: WriteResult) -> RepoResult {
    RepoResult {
        repo: repo.clone(),
        path,
        result,
    }
}

/// Run `op` for every repository, `ctx.concurrency` at a time, in map order.
async fn each_repo<'a, F, Fut>(
    ctx: &SyncContext,
    configs: &'a RepoConfigMap,
    op: F,
) -> Result<Vec<RepoResult>, SyncError>
where
    F: Fn(&'a RepoName, &'a RepositoryConfig) -> Fut,
    Fut: Future<Output = Result<RepoResult, SyncError>> + 'a,
{
    let mut results = Vec::with_capacity(configs.len());
    let mut pending = stream::iter(configs.iter())
        .map(|(repo, config)| op(repo, config))
        .buffered(ctx.concurrency.max(1));
    while let Some(result) = pending.next().await {
        results.push(result?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use orgsync_core::{repo_config, teams, FileCategory, SyncedFileId};
    use orgsync_github::{ClientCache, FileChange, MemoryConnector, MemoryHost};

    use super::*;
    use crate::settings::{SecretValues, SyncSettings};

    const TEAMS: &str = r#"
core:
  project: 7
  owner: alice
  repos: [api, web]
  secrets:
    issue-manage: ISSUE_PAT
    workflow-manage: ORG_PAT
    repo-write: WRITE_PAT
  synced-files:
    config/.editorconfig: [api]
"#;

    fn context(connector: &MemoryConnector, process_deletion: bool, concurrency: usize) -> SyncContext {
        let mut settings = SyncSettings::new("acme", "workflow/phpcs.yml", "/ws");
        settings.process_deletion = process_deletion;
        settings.concurrency = concurrency;
        settings.secrets = SecretValues::from_iter([
            ("CSPF_REPO_READ_PAT", "read"),
            ("CSPF_REPO_VARS_READ_PAT", "vars"),
            ("ORG_PAT", "workflow-token"),
            ("WRITE_PAT", "write-token"),
        ]);
        SyncContext::new(&settings, ClientCache::new(connector.clone())).unwrap()
    }

    fn configs(active: &[&str]) -> RepoConfigMap {
        let defs = teams::parse(TEAMS).unwrap();
        repo_config::build(&defs, active.iter().map(|r| RepoName::from(*r))).unwrap()
    }

    fn template(id: &str, body: &str) -> Template {
        Template::new(SyncedFileId::parse(id).unwrap(), body)
    }

    #[tokio::test]
    async fn project_automation_renders_per_repository() {
        let connector = MemoryConnector::new(MemoryHost::new());
        let ctx = context(&connector, false, 1);
        let tpl = template(
            "workflow/project-automation.yml",
            "org: {{{PROJECT_ORG}}}\nid: {{{PROJECT_ID}}}\nowner: {{{PRIMARY_CODEOWNER}}}\npat: {{{ISSUE_MANAGE_PAT}}}\n",
        );

        let results = project_automation(&ctx, &tpl, &configs(&["api", "stray"])).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].result, WriteResult::Changed { change: FileChange::Created });
        assert!(matches!(results[1].result, WriteResult::Skipped { .. }));
        assert_eq!(
            connector.host().file("api", ".github/workflows/project-automation.yml").as_deref(),
            Some("org: acme\nid: 7\nowner: \"@alice\"\npat: ISSUE_PAT\n")
        );
    }

    #[tokio::test]
    async fn gated_writes_verbatim_and_skips_opted_out() {
        let connector = MemoryConnector::new(MemoryHost::new());
        connector
            .host()
            .set_variable("api", "ORG_ISSUE_TEMPLATES_SKIP", r#"["Bug_Report"]"#);
        connector
            .host()
            .set_variable("web", "ORG_ISSUE_TEMPLATES_SKIP", r#"["feature_request"]"#);
        let ctx = context(&connector, false, 1);
        let tpl = template("issue/bug_report.md", "{{{REPO_WRITE_PAT}}} stays");
        let var = SkipVariable::new("ORG_ISSUE_TEMPLATES_SKIP", Some("bug_report"));

        let results = gated(&ctx, &tpl, &configs(&["api", "web"]), &var, None).await.unwrap();

        assert_eq!(results[0].path, ".github/ISSUE_TEMPLATE/bug_report.md");
        assert!(matches!(results[0].result, WriteResult::Changed { .. }));
        assert!(matches!(results[1].result, WriteResult::Skipped { .. }));
        assert_eq!(
            connector.host().file("api", ".github/ISSUE_TEMPLATE/bug_report.md").as_deref(),
            Some("{{{REPO_WRITE_PAT}}} stays")
        );
        assert_eq!(connector.host().writes().len(), 1);
    }

    #[tokio::test]
    async fn opt_in_substitutes_the_write_credential_reference() {
        let connector = MemoryConnector::new(MemoryHost::new());
        connector.host().set_file("web", ".editorconfig", "stale");
        let ctx = context(&connector, true, 1);
        let tpl = template("config/.editorconfig", "token: {{{REPO_WRITE_PAT}}}");
        assert_eq!(tpl.id.category(), FileCategory::Other("config".into()));

        let results = opt_in(&ctx, &tpl, &configs(&["api", "web"])).await.unwrap();

        assert_eq!(results[0].result, WriteResult::Changed { change: FileChange::Created });
        assert_eq!(results[1].result, WriteResult::Changed { change: FileChange::Deleted });
        assert_eq!(connector.host().file("api", ".editorconfig").as_deref(), Some("token: WRITE_PAT"));
        assert!(connector.host().file("web", ".editorconfig").is_none());
        assert!(connector.host().writes().iter().all(|w| w.token == "write-token"));
    }

    #[tokio::test]
    async fn opt_in_without_deletion_explains_the_skip() {
        let connector = MemoryConnector::new(MemoryHost::new());
        let ctx = context(&connector, false, 1);
        let tpl = template("config/.editorconfig", "x");

        let results = opt_in(&ctx, &tpl, &configs(&["web"])).await.unwrap();

        match &results[0].result {
            WriteResult::Skipped { reason } => {
                assert!(reason.contains("does not have the config/.editorconfig associated"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_runs_keep_map_order() {
        let connector = MemoryConnector::new(MemoryHost::new());
        let ctx = context(&connector, true, 4);
        let tpl = template("config/.editorconfig", "x");

        let results = opt_in(&ctx, &tpl, &configs(&["web", "api"])).await.unwrap();

        let repos: Vec<_> = results.iter().map(|r| r.repo.0.as_str()).collect();
        assert_eq!(repos, ["web", "api"]);
    }
}
