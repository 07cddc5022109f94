//! Error types for orgsync-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading templates.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Filesystem error while reading a template.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template does not exist in the templates directory.
    #[error("template not found at {path}")]
    NotFound { path: PathBuf },
}
