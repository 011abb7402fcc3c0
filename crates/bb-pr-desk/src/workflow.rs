//! Pull-request workflow orchestration.
//!
//! [`PullRequestWorkflow`] is the session facade the middleware (and any
//! other host) talks to: it owns the remote client handle, the settings, the
//! branch cache and the commit range resolver. List operations degrade to an
//! empty list on failure; mutations return the failure messages for display.

use std::sync::Arc;

use bb_client::{
    BitbucketClient, BitbucketClientConfig, ClientAuth, Commit, HttpBitbucketClient,
    MergeRequestInfo, Outcome, PullRequest, PullRequestInfo, Repository,
};
use bb_pr_config::{Auth, Settings};

use crate::branch_cache::BranchCache;
use crate::commit_range::CommitRangeResolver;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build a workflow talking to the live server described by `settings`.
pub fn connect(settings: Settings) -> anyhow::Result<PullRequestWorkflow> {
    let auth = match &settings.auth {
        Auth::Token(token) => ClientAuth::Token(token.clone()),
        Auth::Basic { username, password } => ClientAuth::Basic {
            username: username.clone(),
            password: password.clone(),
        },
    };
    let client = HttpBitbucketClient::new(BitbucketClientConfig {
        base_url: settings.base_url.clone(),
        auth,
        timeout_secs: REQUEST_TIMEOUT_SECS,
    })?;
    Ok(PullRequestWorkflow::new(settings, Arc::new(client)))
}

pub struct PullRequestWorkflow {
    client: Arc<dyn BitbucketClient>,
    settings: Settings,
    branches: BranchCache,
    commits: CommitRangeResolver,
}

impl PullRequestWorkflow {
    pub fn new(settings: Settings, client: Arc<dyn BitbucketClient>) -> Self {
        Self {
            branches: BranchCache::new(client.clone()),
            commits: CommitRangeResolver::new(client.clone()),
            client,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Repositories available to the pull-request pickers.
    ///
    /// Currently at most the single repository the session is configured
    /// for; a failed lookup yields an empty list rather than an error.
    pub async fn list_repositories(&self) -> Vec<Repository> {
        match self
            .client
            .get_repository(&self.settings.project_key, &self.settings.repo_slug)
            .await
        {
            Ok(repository) => vec![repository],
            Err(failure) => {
                log::warn!(
                    "Repository lookup failed for {}/{}: {}",
                    self.settings.project_key,
                    self.settings.repo_slug,
                    failure
                );
                Vec::new()
            }
        }
    }

    /// Open pull requests for the configured repository; empty on failure.
    pub async fn list_pull_requests(&self) -> Vec<PullRequest> {
        match self
            .client
            .list_pull_requests(&self.settings.project_key, &self.settings.repo_slug)
            .await
        {
            Ok(pull_requests) => pull_requests,
            Err(failure) => {
                log::warn!("Pull request listing failed: {}", failure);
                Vec::new()
            }
        }
    }

    /// Submit a new pull request. Validating the inputs (non-empty branches
    /// and repositories) is the caller's job.
    pub async fn create(&self, info: &PullRequestInfo) -> Outcome<()> {
        self.client.create_pull_request(info).await
    }

    /// Approve a pull request. The server rejects stale versions; the
    /// rejection messages come back verbatim.
    pub async fn approve(&self, info: &MergeRequestInfo) -> Outcome<()> {
        self.client.approve_pull_request(info).await
    }

    /// Merge a pull request. The server rejects stale versions; the
    /// rejection messages come back verbatim.
    pub async fn merge(&self, info: &MergeRequestInfo) -> Outcome<()> {
        self.client.merge_pull_request(info).await
    }

    /// Branch names for `repo`, memoized for the session.
    pub async fn get_branches(&self, repo: &Repository) -> Vec<String> {
        self.branches.get_branches(repo).await
    }

    /// Head commit of `branch`, or `None` on failure or incomplete input.
    pub async fn resolve_head_commit(
        &self,
        repo: Option<&Repository>,
        branch: &str,
    ) -> Option<Commit> {
        self.commits.resolve_head_commit(repo, branch).await
    }

    /// Description drafted from the commit range, or `None` to leave the
    /// current text untouched.
    pub async fn draft_description(
        &self,
        source_repo: Option<&Repository>,
        target_repo: Option<&Repository>,
        source: Option<&Commit>,
        target: Option<&Commit>,
    ) -> Option<String> {
        self.commits
            .draft_description(source_repo, target_repo, source, target)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bb_client::RemoteFailure;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        repository_failure: Option<RemoteFailure>,
        approved: Mutex<Vec<MergeRequestInfo>>,
        merged: Mutex<Vec<MergeRequestInfo>>,
        created: Mutex<Vec<PullRequestInfo>>,
    }

    #[async_trait]
    impl BitbucketClient for RecordingClient {
        async fn get_repository(&self, project_key: &str, slug: &str) -> Outcome<Repository> {
            match &self.repository_failure {
                Some(failure) => Err(failure.clone()),
                None => Ok(Repository::new(project_key, slug)),
            }
        }

        async fn get_branches(&self, _repo: &Repository) -> Outcome<Vec<String>> {
            Ok(Vec::new())
        }

        async fn get_head_commit(&self, _repo: &Repository, _branch: &str) -> Outcome<Commit> {
            Err(RemoteFailure::new("no commits"))
        }

        async fn get_commits_between(
            &self,
            _source_repo: &Repository,
            _target_repo: &Repository,
            _source: &Commit,
            _target: &Commit,
        ) -> Outcome<Vec<Commit>> {
            Ok(Vec::new())
        }

        async fn create_pull_request(&self, info: &PullRequestInfo) -> Outcome<()> {
            self.created.lock().unwrap().push(info.clone());
            Ok(())
        }

        async fn list_pull_requests(
            &self,
            _project_key: &str,
            _slug: &str,
        ) -> Outcome<Vec<PullRequest>> {
            Ok(Vec::new())
        }

        async fn approve_pull_request(&self, info: &MergeRequestInfo) -> Outcome<()> {
            self.approved.lock().unwrap().push(info.clone());
            Ok(())
        }

        async fn merge_pull_request(&self, info: &MergeRequestInfo) -> Outcome<()> {
            self.merged.lock().unwrap().push(info.clone());
            Ok(())
        }
    }

    fn workflow_with(client: Arc<RecordingClient>) -> PullRequestWorkflow {
        let settings = Settings::new(
            "https://stash.example.com",
            "PROJ",
            "widget",
            Auth::Token("t".to_string()),
        );
        PullRequestWorkflow::new(settings, client)
    }

    fn merge_info(version: u64) -> MergeRequestInfo {
        MergeRequestInfo {
            id: 42,
            version,
            project_key: "PROJ".to_string(),
            repo_slug: "widget".to_string(),
        }
    }

    #[tokio::test]
    async fn list_repositories_returns_the_configured_repository() {
        let client = Arc::new(RecordingClient::default());
        let workflow = workflow_with(client);

        let repositories = workflow.list_repositories().await;

        assert_eq!(repositories, vec![Repository::new("PROJ", "widget")]);
    }

    #[tokio::test]
    async fn failed_repository_lookup_yields_an_empty_list() {
        let client = Arc::new(RecordingClient {
            repository_failure: Some(RemoteFailure::new("HTTP 404 Not Found")),
            ..RecordingClient::default()
        });
        let workflow = workflow_with(client);

        assert!(workflow.list_repositories().await.is_empty());
    }

    #[tokio::test]
    async fn approve_passes_the_merge_info_through_unchanged() {
        let client = Arc::new(RecordingClient::default());
        let workflow = workflow_with(client.clone());

        workflow.approve(&merge_info(3)).await.unwrap();

        let recorded = client.approved.lock().unwrap();
        assert_eq!(*recorded, vec![merge_info(3)]);
    }

    #[tokio::test]
    async fn changing_the_version_changes_only_the_version() {
        let client = Arc::new(RecordingClient::default());
        let workflow = workflow_with(client.clone());

        workflow.merge(&merge_info(3)).await.unwrap();
        workflow.merge(&merge_info(4)).await.unwrap();

        let recorded = client.merged.lock().unwrap();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0], merge_info(3));
        assert_eq!(recorded[1], merge_info(4));
        assert_eq!(recorded[0].id, recorded[1].id);
        assert_eq!(recorded[0].project_key, recorded[1].project_key);
        assert_eq!(recorded[0].repo_slug, recorded[1].repo_slug);
        assert_ne!(recorded[0].version, recorded[1].version);
    }

    #[tokio::test]
    async fn create_forwards_the_payload() {
        let client = Arc::new(RecordingClient::default());
        let workflow = workflow_with(client.clone());
        let info = PullRequestInfo {
            title: "feature x".to_string(),
            description: "\n* Fix bug\n".to_string(),
            source_branch: "feature-x".to_string(),
            target_branch: "main".to_string(),
            source_repo: Repository::new("PROJ", "widget"),
            target_repo: Repository::new("PROJ", "widget"),
            reviewers: vec!["bob".to_string()],
        };

        workflow.create(&info).await.unwrap();

        let recorded = client.created.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].title, "feature x");
        assert_eq!(recorded[0].reviewers, vec!["bob"]);
    }
}
