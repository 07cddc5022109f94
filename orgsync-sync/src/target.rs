//! Which synced file a run processes, and how.

use orgsync_core::{FileCategory, SyncedFileId};

use crate::error::SyncError;
use crate::skip::SkipVariable;

pub const PROJECT_AUTOMATION: &str = "workflow/project-automation.yml";

const PHPCS_MARKERS: &[&str] = &[".phpcs.xml.dist", "phpcs.xml", "phpcs.xml.dist", "phpcs.ruleset.xml"];
const PHPUNIT_MARKERS: &[&str] = &["phpunit.xml", ".phpunit.xml.dist", "phpunit.xml.dist", "phpunit.ruleset.xml"];

/// The operation a `what` parameter selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
    /// Rendered per repository from its team's project; deleted where the
    /// repository has no project. Never gated.
    ProjectAutomation { id: SyncedFileId },
    /// Same content everywhere, unless the repository opts out through a
    /// variable or lacks every marker file.
    Gated {
        id: SyncedFileId,
        skip_variable: SkipVariable,
        markers: Option<&'static [&'static str]>,
    },
    /// Written only to repositories whose team enabled it; deleted elsewhere.
    OptIn { id: SyncedFileId },
}

impl SyncTarget {
    pub fn parse(what: &str) -> Result<Self, SyncError> {
        let unknown = || SyncError::UnknownTarget { what: what.to_owned() };
        let id = SyncedFileId::parse(what.trim()).map_err(|_| unknown())?;

        let (category, name) = (id.category(), id.name().to_owned());
        let target = match (category, name.as_str()) {
            (FileCategory::Workflow, _) if id.as_str() == PROJECT_AUTOMATION => {
                SyncTarget::ProjectAutomation { id }
            }
            (FileCategory::Workflow, "phpcs.yml") => SyncTarget::Gated {
                id,
                skip_variable: SkipVariable::new("ORG_PHPCS_SKIP", None),
                markers: Some(PHPCS_MARKERS),
            },
            (FileCategory::Workflow, "phpunit.yml") => SyncTarget::Gated {
                id,
                skip_variable: SkipVariable::new("ORG_PHPUNIT_SKIP", None),
                markers: Some(PHPUNIT_MARKERS),
            },
            (FileCategory::Workflow, name) if name.ends_with(".yml") || name.ends_with(".yaml") => {
                SyncTarget::OptIn { id }
            }
            (FileCategory::Workflow, _) => return Err(unknown()),
            (FileCategory::Issue, name) => {
                let stem = name
                    .strip_suffix(".md")
                    .or_else(|| name.strip_suffix(".yml"))
                    .filter(|stem| !stem.is_empty())
                    .ok_or_else(unknown)?;
                SyncTarget::Gated {
                    skip_variable: SkipVariable::new("ORG_ISSUE_TEMPLATES_SKIP", Some(stem)),
                    id,
                    markers: None,
                }
            }
            (FileCategory::Other(_), _) => SyncTarget::OptIn { id },
        };
        Ok(target)
    }

    pub fn id(&self) -> &SyncedFileId {
        match self {
            SyncTarget::ProjectAutomation { id }
            | SyncTarget::Gated { id, .. }
            | SyncTarget::OptIn { id } => id,
        }
    }

    /// Whether evaluating this target reads repository variables.
    pub fn reads_variables(&self) -> bool {
        matches!(self, SyncTarget::Gated { .. })
    }
}
