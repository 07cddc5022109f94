//! Run entrypoint shared by the CLI and tests.

use chrono::Utc;

use orgsync_core::{repo_config, teams, RepoName};
use orgsync_github::{ClientCache, Connector};
use orgsync_renderer::engine;

use crate::context::SyncContext;
use crate::error::SyncError;
use crate::reconcile;
use crate::report::RunReport;
use crate::settings::SyncSettings;
use crate::target::SyncTarget;

/// Synchronize `settings.what` across the organization.
///
/// Local inputs (target, team definitions, template, read credentials) are
/// all checked before the first remote call. Archived and disabled
/// repositories are never touched.
pub async fn run(
    settings: &SyncSettings,
    connector: impl Connector + 'static,
) -> Result<RunReport, SyncError> {
    let started_at = Utc::now();
    let target = SyncTarget::parse(&settings.what)?;

    let teams_path = settings.teams_config_path();
    let defs = teams::load_at(&teams_path)?;
    tracing::info!("loaded {} team(s) from {}", defs.len(), teams_path.display());

    let templates = engine::templates_dir(&settings.workspace);
    let template = engine::load_at(&templates, target.id())?;

    let ctx = SyncContext::new(settings, ClientCache::new(connector))?;
    if target.reads_variables() {
        ctx.variable_reader()?;
    }

    let repos = ctx.reader().list_org_repos(&settings.org).await?;
    let listed = repos.len();
    let active: Vec<RepoName> = repos
        .into_iter()
        .filter(|r| r.is_active())
        .map(|r| RepoName::from(r.name))
        .collect();
    tracing::info!(
        "{} of {listed} repositories in {} are active",
        active.len(),
        settings.org
    );

    let configs = repo_config::build(&defs, active)?;

    let results = match template {
        Some(template) => reconcile::reconcile(&ctx, &target, &template, &configs).await?,
        None => Vec::new(),
    };

    Ok(RunReport {
        target: target.id().to_string(),
        started_at,
        finished_at: Utc::now(),
        results,
    })
}
