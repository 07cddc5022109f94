//! # orgsync-renderer
//!
//! Loads synced-file templates from the workspace and fills in their
//! `{{{PLACEHOLDER}}}` tokens.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use orgsync_core::SyncedFileId;
//! use orgsync_renderer::{engine, Placeholder, TemplateContext};
//!
//! fn render(workspace: &Path) {
//!     let id = SyncedFileId::parse("workflow/release.yml").unwrap();
//!     let dir = engine::templates_dir(workspace);
//!     if let Ok(Some(template)) = engine::load_at(&dir, &id) {
//!         let ctx = TemplateContext::new().bind(Placeholder::RepoWritePat, "WRITE_PAT");
//!         println!("{}", template.render(&ctx));
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{Placeholder, TemplateContext};
pub use engine::Template;
pub use error::RenderError;
