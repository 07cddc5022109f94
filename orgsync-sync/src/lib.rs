//! # orgsync-sync
//!
//! Per-repository decision and reconciliation engine.
//!
//! Call [`pipeline::run`] with [`SyncSettings`] and a
//! [`orgsync_github::Connector`]: it builds the repository configuration,
//! then creates, updates or deletes the requested file on every active
//! repository of the organization and returns a [`RunReport`].

pub mod context;
pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod settings;
pub mod skip;
pub mod target;
pub mod writer;

pub use context::SyncContext;
pub use error::SyncError;
pub use report::{RepoResult, RunReport};
pub use settings::{parse_deletion_flag, SecretValues, SyncSettings};
pub use target::SyncTarget;
pub use writer::{WriteAction, WriteResult};
