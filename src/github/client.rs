//! Thin authenticated wrapper over GitHub's REST v3 API.
//!
//! Seven operations, each mapped to one endpoint and one failure variant:
//! repository lookup, ref lookup, ref creation, content lookup, content
//! upsert, pull-request lookup, and pull-request creation. Status codes
//! outside each endpoint's success set become the matching [`MirrorError`]
//! variant; transport failures surface as [`MirrorError::Transport`].

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;

use crate::errors::MirrorError;

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = "confab-mirror";

/// Repository metadata subset.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub default_branch: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

/// Content lookup result; `sha` is GitHub's optimistic-concurrency token.
#[derive(Debug, Deserialize)]
struct ContentInfo {
    sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullBase {
    #[serde(rename = "ref")]
    pub branch: String,
}

/// Pull request subset: enough to navigate to it and to branch off its base.
#[derive(Debug, Clone, Deserialize)]
pub struct PullInfo {
    pub html_url: String,
    pub base: PullBase,
}

/// One create-or-update file write against the contents API.
///
/// `sha` present means "update the file that currently has this hash";
/// absent means "create".
#[derive(Debug, Clone)]
pub struct FileUpsert {
    pub message: String,
    pub content: String,
    pub branch: String,
    pub sha: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPull {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

/// Remote code-hosting capability consumed by the mirror orchestrator.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// GET /repos/{owner}/{repo}. Non-200 is `RemoteNotFound`.
    async fn get_repo(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> Result<RepoInfo, MirrorError>;

    /// GET /repos/{owner}/{repo}/git/ref/heads/{branch}. Non-200 is `RemoteRef`.
    async fn get_branch_sha(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        token: Option<&str>,
    ) -> Result<String, MirrorError>;

    /// POST /repos/{owner}/{repo}/git/refs. Non-201 is `BranchCreate`,
    /// including the name-already-exists case.
    async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
        token: Option<&str>,
    ) -> Result<(), MirrorError>;

    /// GET /repos/{owner}/{repo}/contents/{path}. 200 yields the current
    /// sha; any other status is treated as "absent".
    async fn get_content_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        token: Option<&str>,
    ) -> Result<Option<String>, MirrorError>;

    /// PUT /repos/{owner}/{repo}/contents/{path}. Success is 200 or 201;
    /// anything else is `FileWrite` naming the path.
    async fn put_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        upsert: FileUpsert,
        token: Option<&str>,
    ) -> Result<(), MirrorError>;

    /// GET /repos/{owner}/{repo}/pulls/{number}. Non-200 is `PullRequestLookup`.
    async fn get_pull(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        token: Option<&str>,
    ) -> Result<PullInfo, MirrorError>;

    /// POST /repos/{owner}/{repo}/pulls. Non-201 is `PullRequest`.
    async fn create_pull(
        &self,
        owner: &str,
        repo: &str,
        pull: NewPull,
        token: Option<&str>,
    ) -> Result<PullInfo, MirrorError>;
}

/// reqwest-backed [`RepoHost`] against api.github.com.
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new() -> Self {
        Self::with_base_url(GITHUB_API_BASE)
    }

    /// Point the client at a different API root (test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn request(&self, method: Method, url: String, token: Option<&str>) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, url)
            .header("Accept", GITHUB_ACCEPT)
            .header("User-Agent", USER_AGENT);
        if let Some(token) = token {
            req = req.header("Authorization", format!("token {token}"));
        }
        req
    }
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire body for a content upsert; `sha` is only sent when updating.
fn upsert_body(upsert: &FileUpsert) -> serde_json::Value {
    let mut body = serde_json::json!({
        "message": upsert.message,
        "content": BASE64.encode(upsert.content.as_bytes()),
        "branch": upsert.branch,
    });
    if let Some(sha) = &upsert.sha {
        body["sha"] = serde_json::Value::String(sha.clone());
    }
    body
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn get_repo(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> Result<RepoInfo, MirrorError> {
        let url = format!("{}/repos/{owner}/{repo}", self.base_url);
        let resp = self.request(Method::GET, url, token).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(MirrorError::RemoteNotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.json::<RepoInfo>().await?)
    }

    async fn get_branch_sha(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        token: Option<&str>,
    ) -> Result<String, MirrorError> {
        let url = format!("{}/repos/{owner}/{repo}/git/ref/heads/{branch}", self.base_url);
        let resp = self.request(Method::GET, url, token).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(MirrorError::RemoteRef {
                branch: branch.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.json::<GitRef>().await?.object.sha)
    }

    async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
        token: Option<&str>,
    ) -> Result<(), MirrorError> {
        let url = format!("{}/repos/{owner}/{repo}/git/refs", self.base_url);
        let body = serde_json::json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": sha,
        });
        let resp = self
            .request(Method::POST, url, token)
            .json(&body)
            .send()
            .await?;
        if resp.status() != StatusCode::CREATED {
            return Err(MirrorError::BranchCreate {
                branch: branch.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn get_content_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        token: Option<&str>,
    ) -> Result<Option<String>, MirrorError> {
        let url = format!("{}/repos/{owner}/{repo}/contents/{path}", self.base_url);
        let resp = self.request(Method::GET, url, token).send().await?;
        if resp.status() != StatusCode::OK {
            // 404 means the file does not exist yet; any other non-200 is
            // treated the same way and the upsert proceeds as a create.
            return Ok(None);
        }
        Ok(Some(resp.json::<ContentInfo>().await?.sha))
    }

    async fn put_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        upsert: FileUpsert,
        token: Option<&str>,
    ) -> Result<(), MirrorError> {
        let url = format!("{}/repos/{owner}/{repo}/contents/{path}", self.base_url);
        let resp = self
            .request(Method::PUT, url, token)
            .json(&upsert_body(&upsert))
            .send()
            .await?;
        if resp.status() != StatusCode::OK && resp.status() != StatusCode::CREATED {
            return Err(MirrorError::FileWrite {
                path: path.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn get_pull(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        token: Option<&str>,
    ) -> Result<PullInfo, MirrorError> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{number}", self.base_url);
        let resp = self.request(Method::GET, url, token).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(MirrorError::PullRequestLookup {
                number,
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.json::<PullInfo>().await?)
    }

    async fn create_pull(
        &self,
        owner: &str,
        repo: &str,
        pull: NewPull,
        token: Option<&str>,
    ) -> Result<PullInfo, MirrorError> {
        let url = format!("{}/repos/{owner}/{repo}/pulls", self.base_url);
        let body = serde_json::json!({
            "title": pull.title,
            "body": pull.body,
            "head": pull.head,
            "base": pull.base,
        });
        let resp = self
            .request(Method::POST, url, token)
            .json(&body)
            .send()
            .await?;
        if resp.status() != StatusCode::CREATED {
            return Err(MirrorError::PullRequest {
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.json::<PullInfo>().await?)
    }
}
