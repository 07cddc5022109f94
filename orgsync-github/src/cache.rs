//! Per-credential client cache.
//!
//! Building an authenticated client is not free, and a run reuses the same
//! handful of tokens across hundreds of repositories. Clients are created on
//! first use and shared for the rest of the run, keyed by token and kind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::client::{ApiConfig, Committer, GitHubClient};
use crate::error::RemoteError;
use crate::host::RepoHost;

/// What a client is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKind {
    /// Listings, variable reads, existence probes.
    Read,
    /// File create/update/delete; carries the committer identity.
    Write,
}

/// Builds [`RepoHost`] clients for a credential.
pub trait Connector: Send + Sync {
    fn connect(&self, token: &str, kind: ClientKind) -> Result<Arc<dyn RepoHost>, RemoteError>;
}

/// [`Connector`] producing [`GitHubClient`]s.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    config: ApiConfig,
    committer: Option<Committer>,
}

impl HttpConnector {
    pub fn new(config: ApiConfig, committer: Option<Committer>) -> Self {
        Self { config, committer }
    }
}

impl Connector for HttpConnector {
    fn connect(&self, token: &str, kind: ClientKind) -> Result<Arc<dyn RepoHost>, RemoteError> {
        let committer = match kind {
            ClientKind::Read => None,
            ClientKind::Write => self.committer.clone(),
        };
        Ok(Arc::new(GitHubClient::new(token, &self.config, committer)?))
    }
}

type ClientKey = (String, ClientKind);

/// Caches one client per `(token, kind)`.
pub struct ClientCache {
    connector: Box<dyn Connector>,
    clients: Mutex<HashMap<ClientKey, Arc<dyn RepoHost>>>,
}

impl ClientCache {
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Box::new(connector),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Cached client for `token`, building it on first use.
    pub fn client(&self, token: &str, kind: ClientKind) -> Result<Arc<dyn RepoHost>, RemoteError> {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let key = (token.to_owned(), kind);
        if let Some(client) = clients.get(&key) {
            return Ok(Arc::clone(client));
        }
        let client = self.connector.connect(token, kind)?;
        clients.insert(key, Arc::clone(&client));
        tracing::debug!("created {kind:?} client ({} cached)", clients.len());
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
