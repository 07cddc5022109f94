//! Run settings: the trigger parameters of one synchronization.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use orgsync_core::OrgSecretName;

use crate::error::SyncError;

/// Organization secret holding the token used to list repositories and
/// probe file existence.
pub const DEFAULT_READ_SECRET: &str = "CSPF_REPO_READ_PAT";
/// Organization secret holding the token used to read repository variables.
pub const DEFAULT_VARS_READ_SECRET: &str = "CSPF_REPO_VARS_READ_PAT";

/// Organization secret name → secret value.
///
/// `Debug` lists names only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretValues(HashMap<String, String>);

impl SecretValues {
    /// Parse the `{"NAME": "value", ...}` document passed by the trigger.
    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
            .map(Self)
            .map_err(SyncError::InvalidSecrets)
    }

    /// Value of `name`; empty values count as missing.
    pub fn get(&self, name: &OrgSecretName) -> Option<&str> {
        self.0
            .get(name.as_str())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Value of `name` or [`SyncError::MissingOrgSecret`].
    pub fn require(&self, name: &OrgSecretName, needed_by: &str) -> Result<&str, SyncError> {
        self.get(name).ok_or_else(|| SyncError::MissingOrgSecret {
            secret: name.clone(),
            needed_by: needed_by.to_owned(),
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SecretValues {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Debug for SecretValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.0.keys().collect();
        names.sort();
        f.debug_struct("SecretValues").field("names", &names).finish()
    }
}

/// Interpret the deletion-processing trigger parameter.
///
/// `true` and `1` (any case, surrounding whitespace ignored) enable deletion;
/// everything else disables it.
pub fn parse_deletion_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1")
}

/// Everything one run needs to know.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub org: String,
    /// Synced-file identifier to process, e.g. `workflow/phpcs.yml`.
    pub what: String,
    pub secrets: SecretValues,
    pub process_deletion: bool,
    pub dry_run: bool,
    /// Repositories processed at once; 1 keeps strict listing order.
    pub concurrency: usize,
    pub read_secret: OrgSecretName,
    pub vars_read_secret: OrgSecretName,
    /// Root holding `defs/` and `.github/templates/`.
    pub workspace: PathBuf,
    /// Overrides `<workspace>/defs/teams-config.yml`.
    pub teams_config: Option<PathBuf>,
}

impl SyncSettings {
    pub fn new(org: impl Into<String>, what: impl Into<String>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            org: org.into(),
            what: what.into(),
            secrets: SecretValues::default(),
            process_deletion: false,
            dry_run: false,
            concurrency: 1,
            read_secret: OrgSecretName::from(DEFAULT_READ_SECRET),
            vars_read_secret: OrgSecretName::from(DEFAULT_VARS_READ_SECRET),
            workspace: workspace.into(),
            teams_config: None,
        }
    }

    pub fn teams_config_path(&self) -> PathBuf {
        self.teams_config
            .clone()
            .unwrap_or_else(|| orgsync_core::teams::default_path(&self.workspace))
    }
}
