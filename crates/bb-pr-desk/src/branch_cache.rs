//! Session-scoped memo of branch lists, one entry per repository.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bb_client::{BitbucketClient, Repository};
use tokio::sync::OnceCell;

/// Memoizes branch-list lookups per [`Repository`].
///
/// The cache lives and dies with the workflow that owns it; entries are
/// never refreshed, so branches created server-side mid-session will not
/// appear until a new session starts. Stored lists keep the raw server
/// order; display ordering is applied in the view models.
pub struct BranchCache {
    client: Arc<dyn BitbucketClient>,
    entries: Mutex<HashMap<Repository, Arc<OnceCell<Vec<String>>>>>,
}

impl BranchCache {
    pub fn new(client: Arc<dyn BitbucketClient>) -> Self {
        Self {
            client,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Branch names for `repo`, in the order the server returned them.
    ///
    /// A failed lookup yields an empty list and caches nothing, so the next
    /// call hits the server again. Concurrent callers for the same
    /// repository share a single in-flight request.
    pub async fn get_branches(&self, repo: &Repository) -> Vec<String> {
        let cell = match self.entries.lock() {
            Ok(mut entries) => entries.entry(repo.clone()).or_default().clone(),
            Err(_) => return Vec::new(),
        };

        let result = cell
            .get_or_try_init(|| async {
                log::debug!("Branch cache miss for {}", repo.display_name());
                self.client.get_branches(repo).await
            })
            .await;

        match result {
            Ok(branches) => branches.clone(),
            Err(failure) => {
                log::warn!(
                    "Branch listing failed for {}: {}",
                    repo.display_name(),
                    failure
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bb_client::{
        Commit, MergeRequestInfo, Outcome, PullRequest, PullRequestInfo, RemoteFailure,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted branch responses, consumed one per underlying call.
    struct ScriptedClient {
        responses: Mutex<Vec<Outcome<Vec<String>>>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Outcome<Vec<String>>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BitbucketClient for ScriptedClient {
        async fn get_repository(&self, _project_key: &str, _slug: &str) -> Outcome<Repository> {
            unimplemented!("not used by the branch cache")
        }

        async fn get_branches(&self, _repo: &Repository) -> Outcome<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(RemoteFailure::new("script exhausted")))
        }

        async fn get_head_commit(&self, _repo: &Repository, _branch: &str) -> Outcome<Commit> {
            unimplemented!("not used by the branch cache")
        }

        async fn get_commits_between(
            &self,
            _source_repo: &Repository,
            _target_repo: &Repository,
            _source: &Commit,
            _target: &Commit,
        ) -> Outcome<Vec<Commit>> {
            unimplemented!("not used by the branch cache")
        }

        async fn create_pull_request(&self, _info: &PullRequestInfo) -> Outcome<()> {
            unimplemented!("not used by the branch cache")
        }

        async fn list_pull_requests(
            &self,
            _project_key: &str,
            _slug: &str,
        ) -> Outcome<Vec<PullRequest>> {
            unimplemented!("not used by the branch cache")
        }

        async fn approve_pull_request(&self, _info: &MergeRequestInfo) -> Outcome<()> {
            unimplemented!("not used by the branch cache")
        }

        async fn merge_pull_request(&self, _info: &MergeRequestInfo) -> Outcome<()> {
            unimplemented!("not used by the branch cache")
        }
    }

    fn branches(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_the_cache() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(branches(&[
            "main",
            "feature-x",
        ]))]));
        let cache = BranchCache::new(client.clone());
        let repo = Repository::new("PROJ", "widget");

        let first = cache.get_branches(&repo).await;
        let second = cache.get_branches(&repo).await;

        assert_eq!(first, branches(&["main", "feature-x"]));
        assert_eq!(first, second);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn failure_returns_empty_and_is_not_cached() {
        // Responses pop from the back: first a failure, then a good list.
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(branches(&["main"])),
            Err(RemoteFailure::new("HTTP 500 Internal Server Error")),
        ]));
        let cache = BranchCache::new(client.clone());
        let repo = Repository::new("PROJ", "widget");

        assert!(cache.get_branches(&repo).await.is_empty());
        assert_eq!(cache.get_branches(&repo).await, branches(&["main"]));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn distinct_repositories_get_distinct_entries() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(branches(&["develop"])),
            Ok(branches(&["main"])),
        ]));
        let cache = BranchCache::new(client.clone());

        let widget = cache.get_branches(&Repository::new("PROJ", "widget")).await;
        let gadget = cache.get_branches(&Repository::new("PROJ", "gadget")).await;

        assert_eq!(widget, branches(&["main"]));
        assert_eq!(gadget, branches(&["develop"]));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_populate() {
        let client = Arc::new(
            ScriptedClient::new(vec![Ok(branches(&["main"]))])
                .with_delay(Duration::from_millis(20)),
        );
        let cache = Arc::new(BranchCache::new(client.clone()));
        let repo = Repository::new("PROJ", "widget");

        let (a, b) = tokio::join!(cache.get_branches(&repo), cache.get_branches(&repo));

        assert_eq!(a, branches(&["main"]));
        assert_eq!(a, b);
        assert_eq!(client.call_count(), 1);
    }
}
