//! Shared, read-only state of one run.

use std::sync::Arc;

use orgsync_core::OrgSecretName;
use orgsync_github::{ClientCache, ClientKind, RepoHost};

use crate::error::SyncError;
use crate::settings::{SecretValues, SyncSettings};

/// Everything the per-repository steps share.
///
/// Built once per run; the client cache is the only interior mutability.
pub struct SyncContext {
    pub org: String,
    pub process_deletion: bool,
    pub dry_run: bool,
    pub concurrency: usize,
    secrets: SecretValues,
    clients: ClientCache,
    read: Arc<dyn RepoHost>,
    vars_read_secret: OrgSecretName,
}

impl SyncContext {
    /// Resolve the read credential and bind the cache.
    ///
    /// Fails with [`SyncError::MissingOrgSecret`] when the read secret is
    /// absent from `settings.secrets`.
    pub fn new(settings: &SyncSettings, clients: ClientCache) -> Result<Self, SyncError> {
        let token = settings
            .secrets
            .require(&settings.read_secret, "repository listing")?;
        let read = clients.client(token, ClientKind::Read)?;
        Ok(Self {
            org: settings.org.clone(),
            process_deletion: settings.process_deletion,
            dry_run: settings.dry_run,
            concurrency: settings.concurrency.max(1),
            secrets: settings.secrets.clone(),
            clients,
            read,
            vars_read_secret: settings.vars_read_secret.clone(),
        })
    }

    /// Client for listings and existence probes.
    pub fn reader(&self) -> &dyn RepoHost {
        self.read.as_ref()
    }

    /// Client for repository-variable reads.
    pub fn variable_reader(&self) -> Result<Arc<dyn RepoHost>, SyncError> {
        let token = self
            .secrets
            .require(&self.vars_read_secret, "repository variable reads")?;
        Ok(self.clients.client(token, ClientKind::Read)?)
    }

    /// Write client acting with `token`.
    pub(crate) fn writer_for(&self, token: &str) -> Result<Arc<dyn RepoHost>, SyncError> {
        Ok(self.clients.client(token, ClientKind::Write)?)
    }

    pub(crate) fn secrets(&self) -> &SecretValues {
        &self.secrets
    }
}
