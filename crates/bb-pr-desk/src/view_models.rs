//! Presentation helpers for the host form.
//!
//! Pre-computes display text from the domain model; no widget types leak in
//! here, so everything stays testable without a display surface.

use bb_client::{Commit, PullRequest};
use bb_pr_config::{BranchOrdering, Settings};

/// Text for the head-commit label next to a branch picker; empty while no
/// commit is resolved.
pub fn commit_info_text(commit: Option<&Commit>) -> String {
    match commit {
        Some(commit) => format!("{} committed\n{}", commit.author_name, commit.message),
        None => String::new(),
    }
}

/// Branch names ready for a picker: ordered per `ordering`, with a leading
/// blank placeholder entry so "nothing picked" is representable.
pub fn branch_choices(names: &[String], ordering: BranchOrdering) -> Vec<String> {
    let mut choices = names.to_vec();
    if ordering == BranchOrdering::Alphabetical {
        choices.sort();
    }
    choices.insert(0, String::new());
    choices
}

/// Read-only field set for the pull-request detail pane.
#[derive(Debug, Clone)]
pub struct PullRequestDetails {
    pub title: String,
    pub description: String,
    pub author: String,
    pub state: String,
    pub reviewers: String,
    pub source_repo: String,
    pub source_branch: String,
    pub destination_repo: String,
    pub destination_branch: String,
    pub created_at: String,
    /// Link to the pull request's overview page in the web UI.
    pub overview_url: String,
}

impl PullRequestDetails {
    pub fn from_pull_request(pr: &PullRequest, settings: &Settings) -> Self {
        Self {
            title: pr.title.clone(),
            description: pr.description.clone(),
            author: pr.author.clone(),
            state: pr.state.clone(),
            reviewers: pr.reviewers.clone(),
            source_repo: pr.src_display_name.clone(),
            source_branch: pr.src_branch.clone(),
            destination_repo: pr.dest_display_name.clone(),
            destination_branch: pr.dest_branch.clone(),
            created_at: pr.created_at.format("%Y-%m-%d %H:%M").to_string(),
            overview_url: settings.pull_request_overview_url(pr.id),
        }
    }
}
