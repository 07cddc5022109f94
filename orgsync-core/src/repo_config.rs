//! Per-repository configuration builder.
//!
//! Every active repository of the organization gets exactly one entry, in
//! the order the organization listing returned them. Teams then claim their
//! repositories: the entry takes the team's project, owner, sharded secrets
//! and the synced files the team enabled for that repository.

use std::collections::HashMap;

use crate::credentials;
use crate::error::ConfigError;
use crate::types::{RepoConfigMap, RepoName, RepositoryConfig, TeamDefinitions, TeamName};

/// Build the configuration map for `active_repos`.
///
/// An active repository claimed by more than one team is rejected with
/// [`ConfigError::DuplicateOwnership`]. Team entries naming repositories that
/// are not active (archived, disabled or absent) are ignored, even when
/// several teams list them.
pub fn build<I>(defs: &TeamDefinitions, active_repos: I) -> Result<RepoConfigMap, ConfigError>
where
    I: IntoIterator<Item = RepoName>,
{
    let mut map = RepoConfigMap::default();
    for repo in active_repos {
        map.insert_default(repo);
    }

    let mut owners: HashMap<&RepoName, &TeamName> = HashMap::new();
    for (team, def) in defs.iter() {
        for (position, repo) in def.repos.iter().enumerate() {
            if map.get(repo).is_none() {
                tracing::debug!("team '{team}' lists '{repo}', which is not an active repository");
                continue;
            }
            if let Some(first) = owners.insert(repo, team) {
                if first != team {
                    return Err(ConfigError::DuplicateOwnership {
                        repo: repo.clone(),
                        first: first.clone(),
                        second: team.clone(),
                    });
                }
                // Listed twice by the same team: the first position decides the shard.
                continue;
            }

            let Some(entry) = map.get_mut(repo) else {
                continue;
            };
            *entry = RepositoryConfig {
                team: Some(team.clone()),
                project: def.project.clone(),
                owner: def.owner.clone(),
                secrets: credentials::resolve_at(&def.secrets, position),
                synced_files: def.synced_files_for(repo),
            };
        }
    }

    let owned = map.iter().filter(|(_, cfg)| cfg.team.is_some()).count();
    tracing::info!(
        "built configuration for {} repositories ({} owned by a team)",
        map.len(),
        owned
    );
    Ok(map)
}
