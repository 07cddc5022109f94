use std::fs;
use std::path::Path;

use orgsync_core::SyncedFileId;
use orgsync_renderer::{engine, Placeholder, TemplateContext};
use rstest::rstest;
use tempfile::TempDir;

const PROJECT_AUTOMATION: &str = r#"name: Project automation
on:
  issues:
    types: [opened]
jobs:
  add:
    uses: {{{PROJECT_ORG}}}/.github/.github/workflows/add-to-project.yml@main
    with:
      project: {{{PROJECT_ID}}}
      assignee: {{{PRIMARY_CODEOWNER}}}
    secrets:
      token: ${{ secrets.{{{ISSUE_MANAGE_PAT}}} }}
"#;

fn workspace_with(id: &str, body: &str) -> TempDir {
    let ws = TempDir::new().expect("workspace");
    let path = engine::template_path(&engine::templates_dir(ws.path()), &SyncedFileId::parse(id).unwrap());
    fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
    fs::write(&path, body).expect("write template");
    ws
}

fn load(ws: &Path, id: &str) -> Option<orgsync_renderer::Template> {
    engine::load_at(&engine::templates_dir(ws), &SyncedFileId::parse(id).unwrap()).expect("load")
}

#[test]
fn project_automation_substitutes_every_placeholder() {
    let ws = workspace_with("workflow/project-automation.yml", PROJECT_AUTOMATION);
    let template = load(ws.path(), "workflow/project-automation.yml").expect("non-empty");

    let ctx = TemplateContext::project_automation("acme", "7", "core-leads", "ORG_PAT_1");
    let rendered = template.render(&ctx);

    assert!(rendered.contains("uses: acme/.github/"));
    assert!(rendered.contains("project: 7"));
    assert!(rendered.contains("assignee: \"@core-leads\""));
    assert!(rendered.contains("secrets.ORG_PAT_1 }}"));
    assert!(!rendered.contains("{{{"), "no placeholder may survive: {rendered}");
    // GitHub expressions are not placeholders.
    assert!(rendered.contains("${{ secrets."));
}

#[rstest]
#[case("", true)]
#[case("\n", false)]
#[case("name: ci\n", false)]
fn only_zero_length_templates_are_skipped(#[case] body: &str, #[case] skipped: bool) {
    let ws = workspace_with("workflow/phpcs.yml", body);
    assert_eq!(load(ws.path(), "workflow/phpcs.yml").is_none(), skipped);
}

#[test]
fn issue_templates_render_verbatim_without_bindings() {
    let body = "---\nname: Bug report\nabout: {{{PROJECT_ORG}}} stays\n---\n";
    let ws = workspace_with("issue/bug_report.md", body);
    let template = load(ws.path(), "issue/bug_report.md").expect("non-empty");
    assert_eq!(template.render(&TemplateContext::new()), body);
}

#[test]
fn repo_write_pat_is_substituted_in_opt_in_files() {
    let ws = workspace_with("workflow/release.yml", "token: ${{ secrets.{{{REPO_WRITE_PAT}}} }}\n");
    let template = load(ws.path(), "workflow/release.yml").expect("non-empty");
    let ctx = TemplateContext::new().bind(Placeholder::RepoWritePat, "CORE_WRITE_PAT");
    assert_eq!(template.render(&ctx), "token: ${{ secrets.CORE_WRITE_PAT }}\n");
}
