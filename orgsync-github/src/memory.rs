//! In-memory [`RepoHost`].
//!
//! Holds one organization's repositories, variables and files. Every
//! mutating call is recorded together with the credential it was made with,
//! which lets callers check that each repository was written with the
//! right (sharded) token. Failures can be injected per repository.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::cache::{ClientKind, Connector};
use crate::error::RemoteError;
use crate::host::{RemoteContent, RemoteRepo, RepoHost};

/// A recorded create/update/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub token: String,
    pub repo: String,
    pub path: String,
    /// `None` for deletions.
    pub content: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
enum VariableState {
    Value(String),
    Forbidden,
    Broken,
}

#[derive(Debug, Default)]
struct MemoryState {
    repos: Vec<RemoteRepo>,
    variables: HashMap<(String, String), VariableState>,
    files: HashMap<(String, String), String>,
    failing_writes: HashSet<String>,
    writes: Vec<WriteRecord>,
    probes: Vec<(String, String)>,
}

/// Shared in-memory organization. Cloning shares the state.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_repo(&self, repo: RemoteRepo) -> &Self {
        self.state().repos.push(repo);
        self
    }

    pub fn set_variable(&self, repo: &str, name: &str, value: &str) -> &Self {
        self.state().variables.insert(
            (repo.to_owned(), name.to_owned()),
            VariableState::Value(value.to_owned()),
        );
        self
    }

    /// Reading `name` on `repo` answers 403.
    pub fn forbid_variable(&self, repo: &str, name: &str) -> &Self {
        self.state()
            .variables
            .insert((repo.to_owned(), name.to_owned()), VariableState::Forbidden);
        self
    }

    /// Reading `name` on `repo` answers 500.
    pub fn break_variable(&self, repo: &str, name: &str) -> &Self {
        self.state()
            .variables
            .insert((repo.to_owned(), name.to_owned()), VariableState::Broken);
        self
    }

    pub fn set_file(&self, repo: &str, path: &str, content: &str) -> &Self {
        self.state()
            .files
            .insert((repo.to_owned(), path.to_owned()), content.to_owned());
        self
    }

    /// Every write to `repo` fails with a 500.
    pub fn fail_writes_to(&self, repo: &str) -> &Self {
        self.state().failing_writes.insert(repo.to_owned());
        self
    }

    pub fn file(&self, repo: &str, path: &str) -> Option<String> {
        self.state()
            .files
            .get(&(repo.to_owned(), path.to_owned()))
            .cloned()
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.state().writes.clone()
    }

    /// `(repo, path)` of every content read, in call order.
    pub fn probes(&self) -> Vec<(String, String)> {
        self.state().probes.clone()
    }

    /// A client acting with `token`.
    pub fn client(&self, token: &str) -> MemoryClient {
        MemoryClient {
            token: token.to_owned(),
            host: self.clone(),
        }
    }

    fn record_write(
        &self,
        token: &str,
        repo: &str,
        path: &str,
        content: Option<&str>,
        message: &str,
    ) -> Result<(), RemoteError> {
        let mut state = self.state();
        if state.failing_writes.contains(repo) {
            return Err(RemoteError::Api {
                status: 500,
                message: format!("injected write failure for {repo}"),
            });
        }
        let key = (repo.to_owned(), path.to_owned());
        match content {
            Some(text) => {
                state.files.insert(key, text.to_owned());
            }
            None => {
                state.files.remove(&key);
            }
        }
        state.writes.push(WriteRecord {
            token: token.to_owned(),
            repo: repo.to_owned(),
            path: path.to_owned(),
            content: content.map(str::to_owned),
            message: message.to_owned(),
        });
        Ok(())
    }
}

/// [`MemoryHost`] bound to one credential.
#[derive(Debug, Clone)]
pub struct MemoryClient {
    token: String,
    host: MemoryHost,
}

#[async_trait]
impl RepoHost for MemoryClient {
    async fn list_org_repos(&self, _org: &str) -> Result<Vec<RemoteRepo>, RemoteError> {
        Ok(self.host.state().repos.clone())
    }

    async fn get_variable(&self, _org: &str, repo: &str, name: &str) -> Result<String, RemoteError> {
        let state = self.host.state();
        match state.variables.get(&(repo.to_owned(), name.to_owned())) {
            Some(VariableState::Value(v)) => Ok(v.clone()),
            Some(VariableState::Forbidden) => Err(RemoteError::Forbidden {
                status: 403,
                message: "Resource not accessible by personal access token".into(),
            }),
            Some(VariableState::Broken) => Err(RemoteError::Api {
                status: 500,
                message: "server error".into(),
            }),
            None => Err(RemoteError::NotFound),
        }
    }

    async fn get_content(
        &self,
        _org: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<RemoteContent>, RemoteError> {
        let mut state = self.host.state();
        state.probes.push((repo.to_owned(), path.to_owned()));
        Ok(state
            .files
            .get(&(repo.to_owned(), path.to_owned()))
            .map(|text| RemoteContent::File {
                sha: format!("{:x}", text.len()),
                text: Some(text.clone()),
            }))
    }

    async fn put_file(
        &self,
        _org: &str,
        repo: &str,
        path: &str,
        content: &str,
        _sha: Option<&str>,
        message: &str,
    ) -> Result<(), RemoteError> {
        self.host
            .record_write(&self.token, repo, path, Some(content), message)
    }

    async fn delete_file(
        &self,
        _org: &str,
        repo: &str,
        path: &str,
        _sha: &str,
        message: &str,
    ) -> Result<(), RemoteError> {
        self.host.record_write(&self.token, repo, path, None, message)
    }
}

/// [`Connector`] handing out [`MemoryClient`]s over one shared host.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    host: MemoryHost,
    connects: Arc<Mutex<Vec<(String, ClientKind)>>>,
}

impl MemoryConnector {
    pub fn new(host: MemoryHost) -> Self {
        Self {
            host,
            connects: Arc::default(),
        }
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    /// Every `(token, kind)` a client was built for.
    pub fn connects(&self) -> Vec<(String, ClientKind)> {
        self.connects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, token: &str, kind: ClientKind) -> Result<Arc<dyn RepoHost>, RemoteError> {
        self.connects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((token.to_owned(), kind));
        Ok(Arc::new(self.host.client(token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn variables_distinguish_outcomes() {
        let host = MemoryHost::new();
        host.set_variable("api", "SKIP", "true")
            .forbid_variable("api", "SECRET")
            .break_variable("api", "FLAKY");
        let client = host.client("t");

        assert_eq!(client.get_variable("o", "api", "SKIP").await.unwrap(), "true");
        assert!(client.get_variable("o", "api", "SECRET").await.unwrap_err().is_forbidden());
        assert!(client.get_variable("o", "api", "MISSING").await.unwrap_err().is_not_found());
        assert!(matches!(
            client.get_variable("o", "api", "FLAKY").await,
            Err(RemoteError::Api { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn writes_record_the_token() {
        let host = MemoryHost::new();
        host.client("PAT_1")
            .put_file("o", "api", "a.txt", "x", None, "msg")
            .await
            .unwrap();
        let writes = host.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].token, "PAT_1");
        assert_eq!(writes[0].content.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn injected_failure_leaves_files_untouched() {
        let host = MemoryHost::new();
        host.fail_writes_to("api");
        let err = host
            .client("t")
            .put_file("o", "api", "a.txt", "x", None, "msg")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Api { status: 500, .. }));
        assert!(host.file("api", "a.txt").is_none());
        assert!(host.writes().is_empty());
    }
}
