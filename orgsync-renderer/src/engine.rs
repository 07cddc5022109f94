//! Template loading and placeholder substitution.
//!
//! # Layout
//!
//! | Identifier                    | Template file                                    |
//! |-------------------------------|--------------------------------------------------|
//! | `workflow/<name>`             | `<workspace>/.github/templates/workflow/<name>`  |
//! | `issue/<name>`                | `<workspace>/.github/templates/issue/<name>`     |
//! | `<category>/<name>`           | `<workspace>/.github/templates/<category>/<name>`|
//!
//! A template is read once per operation and rendered per repository.

use std::path::{Path, PathBuf};

use orgsync_core::SyncedFileId;

use crate::context::TemplateContext;
use crate::error::RenderError;

/// `<workspace>/.github/templates`: pure, no I/O.
pub fn templates_dir(workspace: &Path) -> PathBuf {
    workspace.join(".github").join("templates")
}

/// Path of the template for `id` inside `dir`.
pub fn template_path(dir: &Path, id: &SyncedFileId) -> PathBuf {
    id.as_str().split('/').fold(dir.to_path_buf(), |p, seg| p.join(seg))
}

/// A loaded, non-empty template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: SyncedFileId,
    pub body: String,
}

impl Template {
    pub fn new(id: SyncedFileId, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
        }
    }

    /// Replace every occurrence of every bound placeholder.
    pub fn render(&self, ctx: &TemplateContext) -> String {
        ctx.iter()
            .fold(self.body.clone(), |acc, (placeholder, value)| {
                acc.replace(placeholder.token(), value)
            })
    }
}

/// Load the template for `id` from `dir`.
///
/// Returns `Ok(None)` for an empty file: there is nothing to sync.
pub fn load_at(dir: &Path, id: &SyncedFileId) -> Result<Option<Template>, RenderError> {
    let path = template_path(dir, id);
    if !path.exists() {
        return Err(RenderError::NotFound { path });
    }
    let body = std::fs::read_to_string(&path).map_err(|source| RenderError::Io {
        path: path.clone(),
        source,
    })?;
    if body.is_empty() {
        tracing::info!("template {} is empty; nothing to sync", path.display());
        return Ok(None);
    }
    Ok(Some(Template::new(id.clone(), body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Placeholder;
    use tempfile::TempDir;

    fn id(raw: &str) -> SyncedFileId {
        SyncedFileId::parse(raw).unwrap()
    }

    #[test]
    fn template_path_nests_category() {
        let path = template_path(Path::new("/t"), &id("issue/bug.md"));
        assert!(path.ends_with("issue/bug.md"));
    }

    #[test]
    fn render_replaces_all_occurrences() {
        let tpl = Template::new(id("workflow/x.yml"), "a: {{{REPO_WRITE_PAT}}}\nb: {{{REPO_WRITE_PAT}}}\n");
        let ctx = TemplateContext::new().bind(Placeholder::RepoWritePat, "W_1");
        assert_eq!(tpl.render(&ctx), "a: W_1\nb: W_1\n");
    }

    #[test]
    fn unbound_placeholders_are_left_alone() {
        let tpl = Template::new(id("workflow/x.yml"), "org: {{{PROJECT_ORG}}}");
        assert_eq!(tpl.render(&TemplateContext::new()), "org: {{{PROJECT_ORG}}}");
    }

    #[test]
    fn empty_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("workflow")).unwrap();
        std::fs::write(dir.path().join("workflow/empty.yml"), "").unwrap();
        assert!(load_at(dir.path(), &id("workflow/empty.yml")).unwrap().is_none());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_at(dir.path(), &id("workflow/nope.yml")).unwrap_err();
        assert!(matches!(err, RenderError::NotFound { .. }));
    }
}
