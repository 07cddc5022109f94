//! Template context: the placeholder values bound for one repository.

use std::collections::BTreeMap;
use std::fmt;

/// Tokens recognised inside synced templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    ProjectOrg,
    ProjectId,
    PrimaryCodeowner,
    IssueManagePat,
    RepoWritePat,
}

impl Placeholder {
    pub const ALL: [Placeholder; 5] = [
        Placeholder::ProjectOrg,
        Placeholder::ProjectId,
        Placeholder::PrimaryCodeowner,
        Placeholder::IssueManagePat,
        Placeholder::RepoWritePat,
    ];

    /// Literal text replaced in the template, e.g. `{{{PROJECT_ID}}}`.
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::ProjectOrg => "{{{PROJECT_ORG}}}",
            Placeholder::ProjectId => "{{{PROJECT_ID}}}",
            Placeholder::PrimaryCodeowner => "{{{PRIMARY_CODEOWNER}}}",
            Placeholder::IssueManagePat => "{{{ISSUE_MANAGE_PAT}}}",
            Placeholder::RepoWritePat => "{{{REPO_WRITE_PAT}}}",
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Placeholder → replacement text.
///
/// Placeholders that are never bound stay in the rendered output verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: BTreeMap<Placeholder, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, placeholder: Placeholder, value: impl Into<String>) -> Self {
        self.values.insert(placeholder, value.into());
        self
    }

    /// Context for the project-automation workflow.
    ///
    /// The owner is wrapped as a quoted mention (`"@owner"`) so the YAML
    /// stays valid.
    pub fn project_automation(org: &str, project: &str, owner: &str, issue_pat: &str) -> Self {
        Self::new()
            .bind(Placeholder::ProjectOrg, org)
            .bind(Placeholder::ProjectId, project)
            .bind(Placeholder::PrimaryCodeowner, format!("\"@{owner}\""))
            .bind(Placeholder::IssueManagePat, issue_pat)
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.values.get(&placeholder).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Placeholder, &str)> {
        self.values.iter().map(|(p, v)| (*p, v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_use_triple_braces() {
        for p in Placeholder::ALL {
            let token = p.token();
            assert!(token.starts_with("{{{") && token.ends_with("}}}"), "{token}");
        }
    }

    #[test]
    fn project_automation_quotes_owner() {
        let ctx = TemplateContext::project_automation("acme", "12", "core-leads", "PAT");
        assert_eq!(ctx.get(Placeholder::PrimaryCodeowner), Some("\"@core-leads\""));
        assert_eq!(ctx.get(Placeholder::ProjectOrg), Some("acme"));
        assert_eq!(ctx.get(Placeholder::RepoWritePat), None);
    }

    #[test]
    fn rebinding_replaces_value() {
        let ctx = TemplateContext::new()
            .bind(Placeholder::ProjectId, "1")
            .bind(Placeholder::ProjectId, "2");
        assert_eq!(ctx.get(Placeholder::ProjectId), Some("2"));
    }
}
