//! Remote client contract consumed by the pull-request orchestrator.

use async_trait::async_trait;

use crate::models::{Commit, MergeRequestInfo, PullRequest, PullRequestInfo, Repository};
use crate::outcome::Outcome;

/// Contract for talking to a Bitbucket server.
///
/// Connection settings (base URL, credentials, timeouts) are captured by the
/// implementation at construction time; the orchestrator only sees these
/// operations. All of them resolve to [`Outcome`] so remote failures arrive
/// as data rather than panics.
#[async_trait]
pub trait BitbucketClient: Send + Sync {
    /// Look up a repository by project key and slug.
    async fn get_repository(&self, project_key: &str, slug: &str) -> Outcome<Repository>;

    /// List branch display names for `repo`, in server order.
    async fn get_branches(&self, repo: &Repository) -> Outcome<Vec<String>>;

    /// Fetch the most recent commit on `branch`.
    async fn get_head_commit(&self, repo: &Repository, branch: &str) -> Outcome<Commit>;

    /// List the commits reachable from `source` but not from `target`,
    /// newest first as the server returns them.
    async fn get_commits_between(
        &self,
        source_repo: &Repository,
        target_repo: &Repository,
        source: &Commit,
        target: &Commit,
    ) -> Outcome<Vec<Commit>>;

    /// Create a pull request.
    async fn create_pull_request(&self, info: &PullRequestInfo) -> Outcome<()>;

    /// List open pull requests for a repository.
    async fn list_pull_requests(&self, project_key: &str, slug: &str)
        -> Outcome<Vec<PullRequest>>;

    /// Approve a pull request, quoting its id and version.
    async fn approve_pull_request(&self, info: &MergeRequestInfo) -> Outcome<()>;

    /// Merge a pull request, quoting its id and version.
    async fn merge_pull_request(&self, info: &MergeRequestInfo) -> Outcome<()>;
}
