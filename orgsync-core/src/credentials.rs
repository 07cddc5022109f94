//! Credential sharding.
//!
//! A single personal access token may authorize at most [`SHARD_SIZE`]
//! repositories, so teams with more repositories register one organization
//! secret per block of 50: `ORG_PAT` for positions 0–49, `ORG_PAT_1` for
//! 50–99, `ORG_PAT_2` for 100–149 and so on.
//!
//! Sharding depends only on a repository's position in its team's declared
//! `repos` list, never on the order repositories are processed in.

use crate::types::{OrgSecretName, RepoName, SecretMap};

/// Repositories one credential can authorize.
pub const SHARD_SIZE: usize = 50;

/// Shard number for a position in a team's repository list.
pub fn shard_index(position: usize) -> usize {
    position / SHARD_SIZE
}

/// Suffix appended to every secret name at `position` (empty for shard 0).
pub fn shard_suffix(position: usize) -> String {
    match shard_index(position) {
        0 => String::new(),
        shard => format!("_{shard}"),
    }
}

/// Resolve the secret map `repo` must use, given its team's `repos` list.
///
/// Callers guarantee `repo` is a member of `repos`; a non-member is treated
/// as position 0 and receives the unsharded map.
pub fn resolve(secrets: &SecretMap, repos: &[RepoName], repo: &RepoName) -> SecretMap {
    let position = repos.iter().position(|r| r == repo).unwrap_or(0);
    resolve_at(secrets, position)
}

/// Resolve the secret map for a known position.
pub fn resolve_at(secrets: &SecretMap, position: usize) -> SecretMap {
    let suffix = shard_suffix(position);
    if suffix.is_empty() {
        return secrets.clone();
    }
    secrets
        .iter()
        .map(|(purpose, name)| (*purpose, OrgSecretName(format!("{}{suffix}", name.0))))
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::types::SecretPurpose;

    fn team_repos(n: usize) -> Vec<RepoName> {
        (0..n).map(|i| RepoName(format!("r{i}"))).collect()
    }

    fn secrets() -> SecretMap {
        SecretMap::from([
            (SecretPurpose::IssueManage, OrgSecretName::from("ORG_PAT")),
            (SecretPurpose::RepoWrite, OrgSecretName::from("WRITE_PAT")),
        ])
    }

    #[rstest]
    #[case(0, "")]
    #[case(49, "")]
    #[case(50, "_1")]
    #[case(99, "_1")]
    #[case(100, "_2")]
    #[case(149, "_2")]
    #[case(150, "_3")]
    fn suffix_boundaries(#[case] position: usize, #[case] expected: &str) {
        assert_eq!(shard_suffix(position), expected);
    }

    #[test]
    fn first_block_is_returned_unchanged() {
        let repos = team_repos(61);
        let resolved = resolve(&secrets(), &repos, &RepoName::from("r49"));
        assert_eq!(resolved, secrets());
    }

    #[test]
    fn every_purpose_gets_the_suffix() {
        let repos = team_repos(61);
        let resolved = resolve(&secrets(), &repos, &RepoName::from("r60"));
        assert_eq!(resolved[&SecretPurpose::IssueManage].as_str(), "ORG_PAT_1");
        assert_eq!(resolved[&SecretPurpose::RepoWrite].as_str(), "WRITE_PAT_1");
    }

    #[test]
    fn position_follows_team_order_not_name() {
        let repos = vec![RepoName::from("zeta"), RepoName::from("alpha")];
        let resolved = resolve_at(&secrets(), 1);
        assert_eq!(resolve(&secrets(), &repos, &RepoName::from("alpha")), resolved);
    }

    #[test]
    fn empty_secret_map_stays_empty() {
        let repos = team_repos(120);
        assert!(resolve(&SecretMap::new(), &repos, &RepoName::from("r110")).is_empty());
    }
}
