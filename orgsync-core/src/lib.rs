//! orgsync core library: domain types, team definitions, credential
//! sharding and the per-repository configuration builder.
//!
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`ConfigError`]
//! - [`teams`]: load the team-definitions document
//! - [`credentials`]: resolve sharded secret references
//! - [`repo_config`]: build the [`RepoConfigMap`]

pub mod credentials;
pub mod error;
pub mod repo_config;
pub mod teams;
pub mod types;

pub use error::ConfigError;
pub use types::{
    FileCategory, OrgSecretName, RepoConfigMap, RepoName, RepositoryConfig, SecretMap,
    SecretPurpose, SyncedFileId, TeamDefinition, TeamDefinitions, TeamName,
};
