//! Pull Request models
//!
//! The query result ([`PullRequest`]), the creation payload
//! ([`PullRequestInfo`]), and the minimal subset needed to act on an
//! existing pull request ([`MergeRequestInfo`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Repository;

/// An open pull request fetched from the server. Read-only once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// Unique numeric identifier.
    pub id: u64,
    /// Server-maintained modification counter; approve/merge must quote it
    /// so the server can reject actions taken on stale state.
    pub version: u64,
    pub title: String,
    pub description: String,
    /// Author display name.
    pub author: String,
    /// "OPEN", "MERGED" or "DECLINED".
    pub state: String,
    /// Reviewer names joined for display.
    pub reviewers: String,
    /// Display name of the source repository.
    pub src_display_name: String,
    pub src_branch: String,
    /// Display name of the destination repository.
    pub dest_display_name: String,
    pub dest_branch: String,
    /// Project key of the destination repository.
    pub dest_project_key: String,
    /// Slug of the destination repository.
    pub dest_repo_slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PullRequest {
    /// The data needed to approve or merge this pull request.
    pub fn merge_info(&self) -> MergeRequestInfo {
        MergeRequestInfo {
            id: self.id,
            version: self.version,
            project_key: self.dest_project_key.clone(),
            repo_slug: self.dest_repo_slug.clone(),
        }
    }
}

/// Payload for creating a pull request. Constructed once per create action,
/// never persisted.
#[derive(Debug, Clone)]
pub struct PullRequestInfo {
    pub title: String,
    pub description: String,
    pub source_branch: String,
    pub target_branch: String,
    pub source_repo: Repository,
    pub target_repo: Repository,
    /// Reviewer usernames, in the order they were added.
    pub reviewers: Vec<String>,
}

/// Identifies a pull request for approve/merge calls.
///
/// `version` must reflect the last-fetched [`PullRequest`]; the server is
/// the authority on conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestInfo {
    pub id: u64,
    pub version: u64,
    pub project_key: String,
    pub repo_slug: String,
}
