//! REST client for the GitHub API.
//!
//! | Operation          | Endpoint                                              |
//! |--------------------|-------------------------------------------------------|
//! | list repositories  | `GET /orgs/{org}/repos` (Link-header pagination)      |
//! | read variable      | `GET /repos/{org}/{repo}/actions/variables/{name}`    |
//! | read content       | `GET /repos/{org}/{repo}/contents/{path}`             |
//! | create / update    | `PUT /repos/{org}/{repo}/contents/{path}`             |
//! | delete             | `DELETE /repos/{org}/{repo}/contents/{path}`          |

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RemoteError;
use crate::host::{RemoteContent, RemoteRepo, RepoHost};

const API_VERSION: &str = "2022-11-28";
const PER_PAGE: u32 = 100;

/// Endpoint and transport settings shared by every client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            user_agent: concat!("orgsync/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Identity recorded as committer on file writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

/// A GitHub API client bound to one token.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    committer: Option<Committer>,
}

#[derive(Debug, Deserialize)]
struct VariableBody {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    committer: Option<&'a Committer>,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    message: &'a str,
    sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    committer: Option<&'a Committer>,
}

impl GitHubClient {
    pub fn new(
        token: &str,
        config: &ApiConfig,
        committer: Option<Committer>,
    ) -> Result<Self, RemoteError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| RemoteError::Config("token contains invalid header characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|_| RemoteError::Config("invalid user agent".into()))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            committer,
        })
    }

    fn contents_url(&self, org: &str, repo: &str, path: &str) -> String {
        format!(
            "{}/repos/{org}/{repo}/contents/{}",
            self.base_url,
            path.trim_start_matches('/')
        )
    }
}

/// Map non-success statuses onto [`RemoteError`].
async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| {
            serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
                .or(Some(body))
        })
        .unwrap_or_default();
    Err(match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Forbidden {
            status: status.as_u16(),
            message,
        },
        _ => RemoteError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

/// URL of the `rel="next"` page in a `Link` header, if any.
pub(crate) fn next_page(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let (url, rel) = part.split_once(';')?;
        if !rel.contains("rel=\"next\"") {
            return None;
        }
        let url = url.trim();
        let start = url.find('<')?;
        let end = url.find('>')?;
        Some(url[start + 1..end].to_string())
    })
}

fn decode_content(body: &ContentBody) -> Result<Option<String>, RemoteError> {
    let Some(raw) = body.content.as_deref() else {
        return Ok(None);
    };
    match body.encoding.as_deref() {
        Some("base64") | None => {
            let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = STANDARD
                .decode(compact)
                .map_err(|e| RemoteError::Decode(format!("invalid base64 content: {e}")))?;
            Ok(String::from_utf8(bytes).ok())
        }
        // Large blobs come back with encoding "none" and no inline content.
        Some(_) => Ok(None),
    }
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RemoteRepo>, RemoteError> {
        let mut url = Some(format!(
            "{}/orgs/{org}/repos?per_page={PER_PAGE}",
            self.base_url
        ));
        let mut repos = Vec::new();
        while let Some(current) = url.take() {
            let response = check(self.http.get(&current).send().await?).await?;
            url = response
                .headers()
                .get(reqwest::header::LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page);
            let page: Vec<RemoteRepo> = response.json().await?;
            tracing::debug!("listed {} repositories from {current}", page.len());
            repos.extend(page);
        }
        Ok(repos)
    }

    async fn get_variable(&self, org: &str, repo: &str, name: &str) -> Result<String, RemoteError> {
        let url = format!(
            "{}/repos/{org}/{repo}/actions/variables/{name}",
            self.base_url
        );
        let response = check(self.http.get(url).send().await?).await?;
        let body: VariableBody = response.json().await?;
        Ok(body.value)
    }

    async fn get_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<RemoteContent>, RemoteError> {
        let response = match check(self.http.get(self.contents_url(org, repo, path)).send().await?).await {
            Ok(response) => response,
            Err(RemoteError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };
        let value: Value = response.json().await?;
        if value.is_array() {
            return Ok(Some(RemoteContent::Directory));
        }
        let body: ContentBody = serde_json::from_value(value)?;
        let text = decode_content(&body)?;
        Ok(Some(RemoteContent::File {
            sha: body.sha,
            text,
        }))
    }

    async fn put_file(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        content: &str,
        sha: Option<&str>,
        message: &str,
    ) -> Result<(), RemoteError> {
        let body = PutBody {
            message,
            content: STANDARD.encode(content),
            sha,
            committer: self.committer.as_ref(),
        };
        check(
            self.http
                .put(self.contents_url(org, repo, path))
                .json(&body)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn delete_file(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        sha: &str,
        message: &str,
    ) -> Result<(), RemoteError> {
        let body = DeleteBody {
            message,
            sha,
            committer: self.committer.as_ref(),
        };
        check(
            self.http
                .delete(self.contents_url(org, repo, path))
                .json(&body)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }
}
