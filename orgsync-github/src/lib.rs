//! # orgsync-github
//!
//! Remote repository host used by the synchronizer.
//!
//! - [`host`]: the [`RepoHost`] seam and the idempotent [`write_text_file`]
//! - [`client`]: REST implementation over `reqwest`
//! - [`memory`]: in-memory implementation for tests and offline runs
//! - [`cache`]: per-credential client cache

pub mod cache;
pub mod client;
pub mod error;
pub mod host;
pub mod memory;

pub use cache::{ClientCache, ClientKind, Connector, HttpConnector};
pub use client::{ApiConfig, Committer, GitHubClient};
pub use error::RemoteError;
pub use host::{write_text_file, FileChange, RemoteContent, RemoteRepo, RepoHost};
pub use memory::{MemoryConnector, MemoryHost, WriteRecord};
