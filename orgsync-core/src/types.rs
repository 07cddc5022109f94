//! Domain types for organization-wide file synchronization.
//!
//! Team definitions are loaded once per run and never mutated; the
//! per-repository [`RepoConfigMap`] is built from them and is read-only
//! afterwards.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of a repository inside the organization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoName(pub String);

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Key of a team in the team-definitions document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamName(pub String);

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TeamName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TeamName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Name under which a secret is registered at organization level.
///
/// This is a *reference* to a secret, never the secret value itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgSecretName(pub String);

impl OrgSecretName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgSecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for OrgSecretName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrgSecretName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Secret purposes
// ---------------------------------------------------------------------------

/// What a team secret is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretPurpose {
    /// Managing issues and project boards (project-automation workflow).
    IssueManage,
    /// Writing workflow and issue-template files.
    WorkflowManage,
    /// Writing any other synced file.
    RepoWrite,
}

impl SecretPurpose {
    pub const ALL: [SecretPurpose; 3] = [
        SecretPurpose::IssueManage,
        SecretPurpose::WorkflowManage,
        SecretPurpose::RepoWrite,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SecretPurpose::IssueManage => "issue-manage",
            SecretPurpose::WorkflowManage => "workflow-manage",
            SecretPurpose::RepoWrite => "repo-write",
        }
    }
}

impl fmt::Display for SecretPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SecretPurpose::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| {
                format!(
                    "unknown secret purpose '{s}'; expected: issue-manage, workflow-manage, repo-write"
                )
            })
    }
}

/// Purpose → organization secret name.
pub type SecretMap = BTreeMap<SecretPurpose, OrgSecretName>;

// ---------------------------------------------------------------------------
// Synced file identifiers
// ---------------------------------------------------------------------------

/// Category of a synced file: the first segment of its identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileCategory {
    Workflow,
    Issue,
    Other(String),
}

impl FileCategory {
    fn from_segment(segment: &str) -> Self {
        match segment {
            "workflow" => FileCategory::Workflow,
            "issue" => FileCategory::Issue,
            other => FileCategory::Other(other.to_owned()),
        }
    }

    /// Directory the file lands in on the target repository (`None` = root).
    pub fn destination_dir(&self) -> Option<&'static str> {
        match self {
            FileCategory::Workflow => Some(".github/workflows"),
            FileCategory::Issue => Some(".github/ISSUE_TEMPLATE"),
            FileCategory::Other(_) => None,
        }
    }

    /// Which team secret authorizes writes of this category.
    pub fn secret_purpose(&self) -> SecretPurpose {
        match self {
            FileCategory::Workflow | FileCategory::Issue => SecretPurpose::WorkflowManage,
            FileCategory::Other(_) => SecretPurpose::RepoWrite,
        }
    }
}

/// A `<category>/<name>` identifier of a synced template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SyncedFileId {
    raw: String,
    split: usize,
}

impl SyncedFileId {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidSyncedFileId { id: raw.to_owned() };
        let split = raw.find('/').ok_or_else(invalid)?;
        if split == 0 || split + 1 == raw.len() {
            return Err(invalid());
        }
        Ok(Self {
            raw: raw.to_owned(),
            split,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn category(&self) -> FileCategory {
        FileCategory::from_segment(&self.raw[..self.split])
    }

    /// Everything after the first `/`.
    pub fn name(&self) -> &str {
        &self.raw[self.split + 1..]
    }

    /// Path of the file on the target repository.
    pub fn destination_path(&self) -> String {
        match self.category().destination_dir() {
            Some(dir) => format!("{dir}/{}", self.name()),
            None => self.name().to_owned(),
        }
    }

    pub fn secret_purpose(&self) -> SecretPurpose {
        self.category().secret_purpose()
    }
}

impl fmt::Display for SyncedFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for SyncedFileId {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<SyncedFileId> for String {
    fn from(id: SyncedFileId) -> Self {
        id.raw
    }
}

// ---------------------------------------------------------------------------
// Team definitions
// ---------------------------------------------------------------------------

/// One team entry of the team-definitions document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamDefinition {
    /// Project board number; YAML may spell it as a number or a string.
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Order matters: credential sharding is computed from positions here.
    #[serde(default)]
    pub repos: Vec<RepoName>,
    #[serde(default)]
    pub secrets: SecretMap,
    #[serde(default, rename = "synced-files")]
    pub synced_files: BTreeMap<SyncedFileId, Vec<RepoName>>,
}

impl TeamDefinition {
    pub fn position_of(&self, repo: &RepoName) -> Option<usize> {
        self.repos.iter().position(|r| r == repo)
    }

    /// Synced-file identifiers whose eligibility list names `repo`.
    pub fn synced_files_for(&self, repo: &RepoName) -> BTreeSet<SyncedFileId> {
        self.synced_files
            .iter()
            .filter(|(_, repos)| repos.contains(repo))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|s| match s {
        Scalar::Text(t) => t,
        Scalar::Int(n) => n.to_string(),
    }))
}

/// The whole team-definitions document, iterated in team-name order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamDefinitions(pub BTreeMap<TeamName, TeamDefinition>);

impl TeamDefinitions {
    pub fn iter(&self) -> impl Iterator<Item = (&TeamName, &TeamDefinition)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Repository configuration
// ---------------------------------------------------------------------------

/// Effective sync configuration of one repository.
///
/// Repositories owned by no team keep the default (all empty) value and are
/// only ever candidates for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RepositoryConfig {
    pub team: Option<TeamName>,
    pub project: Option<String>,
    pub owner: Option<String>,
    /// Post-sharding secret references.
    pub secrets: SecretMap,
    pub synced_files: BTreeSet<SyncedFileId>,
}

impl RepositoryConfig {
    pub fn is_owned(&self) -> bool {
        self.owner.as_deref().is_some_and(|o| !o.is_empty())
    }

    pub fn secret(&self, purpose: SecretPurpose) -> Option<&OrgSecretName> {
        self.secrets.get(&purpose)
    }

    pub fn syncs(&self, id: &SyncedFileId) -> bool {
        self.synced_files.contains(id)
    }
}

/// Insertion-ordered repository → configuration map.
#[derive(Debug, Clone, Default)]
pub struct RepoConfigMap {
    entries: Vec<(RepoName, RepositoryConfig)>,
    index: HashMap<RepoName, usize>,
}

impl RepoConfigMap {
    /// Add `repo` with a default entry; keeps the existing entry and position
    /// if the repository is already present.
    pub(crate) fn insert_default(&mut self, repo: RepoName) {
        if self.index.contains_key(&repo) {
            return;
        }
        self.index.insert(repo.clone(), self.entries.len());
        self.entries.push((repo, RepositoryConfig::default()));
    }

    pub(crate) fn get_mut(&mut self, repo: &RepoName) -> Option<&mut RepositoryConfig> {
        let idx = *self.index.get(repo)?;
        Some(&mut self.entries[idx].1)
    }

    pub fn get(&self, repo: &RepoName) -> Option<&RepositoryConfig> {
        self.index.get(repo).map(|&idx| &self.entries[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RepoName, &RepositoryConfig)> {
        self.entries.iter().map(|(name, cfg)| (name, cfg))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(RepoName::from("api").to_string(), "api");
        assert_eq!(TeamName::from("core").to_string(), "core");
        assert_eq!(OrgSecretName::from("ORG_PAT").to_string(), "ORG_PAT");
    }

    #[test]
    fn secret_purpose_parses_kebab_case() {
        assert_eq!("repo-write".parse::<SecretPurpose>(), Ok(SecretPurpose::RepoWrite));
        assert!("repo_write".parse::<SecretPurpose>().is_err());
        assert_eq!(SecretPurpose::IssueManage.to_string(), "issue-manage");
    }

    #[test]
    fn synced_file_id_destinations() {
        let wf = SyncedFileId::parse("workflow/lint.yml").unwrap();
        assert_eq!(wf.category(), FileCategory::Workflow);
        assert_eq!(wf.destination_path(), ".github/workflows/lint.yml");
        assert_eq!(wf.secret_purpose(), SecretPurpose::WorkflowManage);

        let issue = SyncedFileId::parse("issue/bug_report.md").unwrap();
        assert_eq!(issue.destination_path(), ".github/ISSUE_TEMPLATE/bug_report.md");
        assert_eq!(issue.secret_purpose(), SecretPurpose::WorkflowManage);

        let other = SyncedFileId::parse("config/.editorconfig").unwrap();
        assert_eq!(other.category(), FileCategory::Other("config".into()));
        assert_eq!(other.destination_path(), ".editorconfig");
        assert_eq!(other.secret_purpose(), SecretPurpose::RepoWrite);
    }

    #[test]
    fn synced_file_id_rejects_malformed() {
        for raw in ["", "nofolder", "/name", "workflow/"] {
            assert!(SyncedFileId::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn numeric_project_is_read_as_string() {
        let team: TeamDefinition = serde_yaml::from_str("project: 12\nrepos: [a]\n").unwrap();
        assert_eq!(team.project.as_deref(), Some("12"));
    }

    #[test]
    fn unowned_config_is_default() {
        let cfg = RepositoryConfig::default();
        assert!(!cfg.is_owned());
        assert!(cfg.secrets.is_empty());
        assert!(cfg.synced_files.is_empty());
    }

    #[test]
    fn repo_config_map_keeps_insertion_order() {
        let mut map = RepoConfigMap::default();
        for name in ["zeta", "alpha", "mid", "alpha"] {
            map.insert_default(RepoName::from(name));
        }
        let names: Vec<_> = map.iter().map(|(n, _)| n.0.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert!(map.get(&RepoName::from("mid")).is_some());
    }
}
