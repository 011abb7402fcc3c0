//! HTTP implementation of the client contract.
//!
//! Talks to the Bitbucket Server REST API 1.0
//! (`/rest/api/1.0/projects/{key}/repos/{slug}/…`). Wire types are private
//! serde structs converted into the domain model at the boundary; non-2xx
//! responses are decoded from Bitbucket's `{"errors": [{"message": …}]}`
//! envelope into [`RemoteFailure`] messages.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::client::BitbucketClient;
use crate::models::{Commit, MergeRequestInfo, PullRequest, PullRequestInfo, Repository};
use crate::outcome::{Outcome, RemoteFailure};

/// Connection settings for [`HttpBitbucketClient`].
#[derive(Debug, Clone)]
pub struct BitbucketClientConfig {
    /// Base URL of the Bitbucket instance (e.g. `https://bitbucket.example.com`).
    pub base_url: String,
    /// Credentials sent with every request.
    pub auth: ClientAuth,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Credentials for the REST API.
#[derive(Debug, Clone)]
pub enum ClientAuth {
    /// HTTP basic auth with username and password.
    Basic { username: String, password: String },
    /// Personal access token sent as a bearer token.
    Token(String),
}

/// Client against a live Bitbucket server.
#[derive(Debug, Clone)]
pub struct HttpBitbucketClient {
    client: Client,
    config: BitbucketClientConfig,
}

impl HttpBitbucketClient {
    pub fn new(config: BitbucketClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// `{base}/rest/api/1.0/projects/{key}/repos/{slug}`
    fn repo_url(&self, project_key: &str, slug: &str) -> String {
        format!(
            "{}/rest/api/1.0/projects/{}/repos/{}",
            self.config.base_url.trim_end_matches('/'),
            project_key,
            slug
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.config.auth {
            ClientAuth::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            ClientAuth::Token(token) => request.bearer_auth(token),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Outcome<T> {
        let response = self
            .request(Method::GET, url)
            .query(query)
            .send()
            .await
            .map_err(transport_failure)?;
        Self::decode(response).await
    }

    async fn post_expecting_ok<B: Serialize>(
        &self,
        url: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Outcome<()> {
        let mut request = self.request(Method::POST, url).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(transport_failure)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::failure_from_response(response).await)
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Outcome<T> {
        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|err| RemoteFailure::new(format!("Malformed server response: {err}")))
        } else {
            Err(Self::failure_from_response(response).await)
        }
    }

    async fn failure_from_response(response: Response) -> RemoteFailure {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        failure_from_body(status, &body)
    }
}

fn transport_failure(err: reqwest::Error) -> RemoteFailure {
    if err.is_timeout() {
        RemoteFailure::new("Request timed out")
    } else if err.is_connect() {
        RemoteFailure::new("Failed to connect to server")
    } else {
        RemoteFailure::new(err.to_string())
    }
}

/// Extract the server's error messages from a non-2xx body, falling back to
/// the bare status when the body is not the usual envelope.
fn failure_from_body(status: StatusCode, body: &str) -> RemoteFailure {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let messages: Vec<String> = envelope
            .errors
            .into_iter()
            .map(|error| error.message)
            .collect();
        if !messages.is_empty() {
            return RemoteFailure::from_messages(messages);
        }
    }
    RemoteFailure::new(format!("HTTP {status}"))
}

#[async_trait]
impl BitbucketClient for HttpBitbucketClient {
    async fn get_repository(&self, project_key: &str, slug: &str) -> Outcome<Repository> {
        let wire: RepositoryWire = self
            .get_json(&self.repo_url(project_key, slug), &[])
            .await?;
        Ok(wire.into())
    }

    async fn get_branches(&self, repo: &Repository) -> Outcome<Vec<String>> {
        let url = format!("{}/branches", self.repo_url(&repo.project_key, &repo.slug));
        let page: Page<BranchWire> = self
            .get_json(&url, &[("limit", "100".to_string())])
            .await?;
        Ok(page
            .values
            .into_iter()
            .map(|branch| branch.display_id)
            .collect())
    }

    async fn get_head_commit(&self, repo: &Repository, branch: &str) -> Outcome<Commit> {
        let url = format!("{}/commits", self.repo_url(&repo.project_key, &repo.slug));
        let query = [
            ("until", format!("refs/heads/{branch}")),
            ("limit", "1".to_string()),
        ];
        let page: Page<CommitWire> = self.get_json(&url, &query).await?;
        page.values
            .into_iter()
            .next()
            .map(Commit::from)
            .ok_or_else(|| RemoteFailure::new(format!("No commits found on branch {branch}")))
    }

    async fn get_commits_between(
        &self,
        source_repo: &Repository,
        target_repo: &Repository,
        source: &Commit,
        target: &Commit,
    ) -> Outcome<Vec<Commit>> {
        if source_repo != target_repo {
            log::debug!(
                "Commit range across forks: {} -> {}",
                source_repo.display_name(),
                target_repo.display_name()
            );
        }
        let url = format!(
            "{}/commits",
            self.repo_url(&source_repo.project_key, &source_repo.slug)
        );
        let query = [
            ("since", target.id.clone()),
            ("until", source.id.clone()),
            ("limit", "100".to_string()),
        ];
        let page: Page<CommitWire> = self.get_json(&url, &query).await?;
        Ok(page.values.into_iter().map(Commit::from).collect())
    }

    async fn create_pull_request(&self, info: &PullRequestInfo) -> Outcome<()> {
        let url = format!(
            "{}/pull-requests",
            self.repo_url(&info.target_repo.project_key, &info.target_repo.slug)
        );
        let payload = CreatePullRequestPayload::from(info);
        self.post_expecting_ok(&url, &[], Some(&payload)).await
    }

    async fn list_pull_requests(
        &self,
        project_key: &str,
        slug: &str,
    ) -> Outcome<Vec<PullRequest>> {
        let url = format!("{}/pull-requests", self.repo_url(project_key, slug));
        let query = [
            ("state", "OPEN".to_string()),
            ("limit", "50".to_string()),
        ];
        let page: Page<PullRequestWire> = self.get_json(&url, &query).await?;
        Ok(page.values.into_iter().map(PullRequest::from).collect())
    }

    async fn approve_pull_request(&self, info: &MergeRequestInfo) -> Outcome<()> {
        let url = format!(
            "{}/pull-requests/{}/approve",
            self.repo_url(&info.project_key, &info.repo_slug),
            info.id
        );
        let query = [("version", info.version.to_string())];
        self.post_expecting_ok::<()>(&url, &query, None).await
    }

    async fn merge_pull_request(&self, info: &MergeRequestInfo) -> Outcome<()> {
        let url = format!(
            "{}/pull-requests/{}/merge",
            self.repo_url(&info.project_key, &info.repo_slug),
            info.id
        );
        let query = [("version", info.version.to_string())];
        self.post_expecting_ok::<()>(&url, &query, None).await
    }
}

//
// Wire types
//

#[derive(Debug, Deserialize)]
struct Page<T> {
    values: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ProjectWire {
    key: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryWire {
    slug: String,
    name: Option<String>,
    project: ProjectWire,
}

impl From<RepositoryWire> for Repository {
    fn from(wire: RepositoryWire) -> Self {
        let repo = Repository::new(wire.project.key, wire.slug);
        match wire.name {
            Some(name) => repo.with_name(name),
            None => repo,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BranchWire {
    display_id: String,
}

#[derive(Debug, Deserialize)]
struct AuthorWire {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ParentWire {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitWire {
    id: String,
    #[serde(default)]
    message: Option<String>,
    author: AuthorWire,
    author_timestamp: i64,
    #[serde(default)]
    parents: Vec<ParentWire>,
}

impl From<CommitWire> for Commit {
    fn from(wire: CommitWire) -> Self {
        Self {
            id: wire.id,
            author_name: wire.author.name,
            message: wire.message.unwrap_or_default(),
            is_merge: wire.parents.len() > 1,
            authored_at: DateTime::from_timestamp_millis(wire.author_timestamp)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserWire {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl UserWire {
    fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize)]
struct ParticipantWire {
    user: UserWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefWire {
    display_id: String,
    repository: RepositoryWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestWire {
    id: u64,
    version: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    state: String,
    author: ParticipantWire,
    #[serde(default)]
    reviewers: Vec<ParticipantWire>,
    from_ref: RefWire,
    to_ref: RefWire,
    created_date: i64,
    updated_date: i64,
}

impl From<PullRequestWire> for PullRequest {
    fn from(wire: PullRequestWire) -> Self {
        let reviewers = wire
            .reviewers
            .iter()
            .map(|participant| participant.user.label().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let src_repo = Repository::from(wire.from_ref.repository);
        let dest_repo = Repository::from(wire.to_ref.repository);
        Self {
            id: wire.id,
            version: wire.version,
            title: wire.title,
            description: wire.description.unwrap_or_default(),
            author: wire.author.user.label().to_string(),
            state: wire.state,
            reviewers,
            src_display_name: src_repo.name,
            src_branch: wire.from_ref.display_id,
            dest_display_name: dest_repo.name.clone(),
            dest_branch: wire.to_ref.display_id,
            dest_project_key: dest_repo.project_key,
            dest_repo_slug: dest_repo.slug,
            created_at: DateTime::from_timestamp_millis(wire.created_date).unwrap_or_default(),
            updated_at: DateTime::from_timestamp_millis(wire.updated_date).unwrap_or_default(),
        }
    }
}

//
// Create payload
//

#[derive(Debug, Serialize)]
struct ProjectPayload {
    key: String,
}

#[derive(Debug, Serialize)]
struct RepositoryPayload {
    slug: String,
    project: ProjectPayload,
}

#[derive(Debug, Serialize)]
struct RefPayload {
    /// Full ref path, e.g. "refs/heads/feature-x".
    id: String,
    repository: RepositoryPayload,
}

impl RefPayload {
    fn new(branch: &str, repo: &Repository) -> Self {
        Self {
            id: format!("refs/heads/{branch}"),
            repository: RepositoryPayload {
                slug: repo.slug.clone(),
                project: ProjectPayload {
                    key: repo.project_key.clone(),
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct UserPayload {
    name: String,
}

#[derive(Debug, Serialize)]
struct ReviewerPayload {
    user: UserPayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePullRequestPayload {
    title: String,
    description: String,
    from_ref: RefPayload,
    to_ref: RefPayload,
    reviewers: Vec<ReviewerPayload>,
}

impl From<&PullRequestInfo> for CreatePullRequestPayload {
    fn from(info: &PullRequestInfo) -> Self {
        Self {
            title: info.title.clone(),
            description: info.description.clone(),
            from_ref: RefPayload::new(&info.source_branch, &info.source_repo),
            to_ref: RefPayload::new(&info.target_branch, &info.target_repo),
            reviewers: info
                .reviewers
                .iter()
                .map(|name| ReviewerPayload {
                    user: UserPayload { name: name.clone() },
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_yields_server_messages() {
        let body = r#"{"errors": [
            {"context": null, "message": "Pull request is out of date", "exceptionName": null},
            {"message": "Fetch the latest version and retry"}
        ]}"#;
        let failure = failure_from_body(StatusCode::CONFLICT, body);
        assert_eq!(
            failure.messages,
            vec![
                "Pull request is out of date".to_string(),
                "Fetch the latest version and retry".to_string(),
            ]
        );
    }

    #[test]
    fn unexpected_error_body_falls_back_to_status() {
        let failure = failure_from_body(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(failure.messages, vec!["HTTP 502 Bad Gateway".to_string()]);
    }

    #[test]
    fn commit_with_two_parents_is_a_merge() {
        let body = r#"{
            "id": "abc123",
            "message": "Merge branch 'feature-x'",
            "author": {"name": "alice"},
            "authorTimestamp": 1700000000000,
            "parents": [{"id": "p1"}, {"id": "p2"}]
        }"#;
        let commit: Commit = serde_json::from_str::<CommitWire>(body).unwrap().into();
        assert!(commit.is_merge);
        assert_eq!(commit.author_name, "alice");
    }

    #[test]
    fn commit_with_one_parent_is_not_a_merge() {
        let body = r#"{
            "id": "def456",
            "message": "Fix bug",
            "author": {"name": "bob"},
            "authorTimestamp": 1700000000000,
            "parents": [{"id": "p1"}]
        }"#;
        let commit: Commit = serde_json::from_str::<CommitWire>(body).unwrap().into();
        assert!(!commit.is_merge);
    }

    #[test]
    fn pull_request_wire_maps_destination_coordinates() {
        let body = r#"{
            "id": 42,
            "version": 3,
            "title": "feature x",
            "description": "adds the widget",
            "state": "OPEN",
            "author": {"user": {"name": "alice", "displayName": "Alice"}},
            "reviewers": [
                {"user": {"name": "bob", "displayName": "Bob"}},
                {"user": {"name": "carol"}}
            ],
            "fromRef": {
                "displayId": "feature-x",
                "repository": {"slug": "widget", "name": "Widget", "project": {"key": "PROJ"}}
            },
            "toRef": {
                "displayId": "main",
                "repository": {"slug": "widget", "name": "Widget", "project": {"key": "PROJ"}}
            },
            "createdDate": 1700000000000,
            "updatedDate": 1700000300000
        }"#;
        let pr: PullRequest = serde_json::from_str::<PullRequestWire>(body).unwrap().into();
        assert_eq!(pr.id, 42);
        assert_eq!(pr.version, 3);
        assert_eq!(pr.author, "Alice");
        assert_eq!(pr.reviewers, "Bob, carol");
        assert_eq!(pr.src_branch, "feature-x");
        assert_eq!(pr.dest_branch, "main");
        assert_eq!(pr.dest_project_key, "PROJ");
        assert_eq!(pr.dest_repo_slug, "widget");
    }

    #[test]
    fn create_payload_uses_full_ref_paths() {
        let info = PullRequestInfo {
            title: "feature x".to_string(),
            description: "\n* Fix bug\n".to_string(),
            source_branch: "feature-x".to_string(),
            target_branch: "main".to_string(),
            source_repo: Repository::new("PROJ", "widget"),
            target_repo: Repository::new("PROJ", "widget"),
            reviewers: vec!["bob".to_string()],
        };
        let json = serde_json::to_value(CreatePullRequestPayload::from(&info)).unwrap();
        assert_eq!(json["fromRef"]["id"], "refs/heads/feature-x");
        assert_eq!(json["toRef"]["id"], "refs/heads/main");
        assert_eq!(json["toRef"]["repository"]["project"]["key"], "PROJ");
        assert_eq!(json["reviewers"][0]["user"]["name"], "bob");
    }
}
