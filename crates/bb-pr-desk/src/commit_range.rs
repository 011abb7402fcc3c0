//! Head-commit lookup and description drafting from the commit range.

use std::sync::Arc;

use bb_client::{BitbucketClient, Commit, Repository};

/// Resolves head commits and drafts a pull-request description from the
/// commits between two branches.
///
/// Everything here is fail-soft: a missing input or a remote failure yields
/// `None`, which the caller treats as "leave the current text alone". The
/// user is still filling in the form, and half-complete input is not an error.
pub struct CommitRangeResolver {
    client: Arc<dyn BitbucketClient>,
}

impl CommitRangeResolver {
    pub fn new(client: Arc<dyn BitbucketClient>) -> Self {
        Self { client }
    }

    /// Head commit of `branch`, or `None` when no repository is picked, the
    /// branch name is blank, or the lookup fails.
    pub async fn resolve_head_commit(
        &self,
        repo: Option<&Repository>,
        branch: &str,
    ) -> Option<Commit> {
        let repo = repo?;
        if branch.trim().is_empty() {
            return None;
        }
        match self.client.get_head_commit(repo, branch).await {
            Ok(commit) => Some(commit),
            Err(failure) => {
                log::warn!(
                    "Head commit lookup failed for {}@{}: {}",
                    repo.display_name(),
                    branch,
                    failure
                );
                None
            }
        }
    }

    /// Draft a description from the commits reachable from `source` but not
    /// from `target`: a leading blank line, then one `* <message>` bullet per
    /// non-merge commit in server order (newest first).
    ///
    /// Returns `None` (leave the existing description untouched) when any
    /// input is missing or the remote call fails. The remote client is not
    /// called unless all four inputs are present.
    pub async fn draft_description(
        &self,
        source_repo: Option<&Repository>,
        target_repo: Option<&Repository>,
        source: Option<&Commit>,
        target: Option<&Commit>,
    ) -> Option<String> {
        let source_repo = source_repo?;
        let target_repo = target_repo?;
        let source = source?;
        let target = target?;

        match self
            .client
            .get_commits_between(source_repo, target_repo, source, target)
            .await
        {
            Ok(commits) => Some(render_description(&commits)),
            Err(failure) => {
                log::warn!("Commit range lookup failed: {}", failure);
                None
            }
        }
    }
}

fn render_description(commits: &[Commit]) -> String {
    let mut text = String::from("\n");
    for commit in commits.iter().filter(|commit| !commit.is_merge) {
        text.push_str("* ");
        text.push_str(&commit.message);
        text.push('\n');
    }
    text
}
