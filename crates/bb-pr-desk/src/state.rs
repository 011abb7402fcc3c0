//! Form state owned by the store.

use bb_client::{Commit, PullRequest, PullRequestInfo, Repository};

use crate::actions::Side;

/// Loading state of a remote-backed list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

/// One side (source or target) of the pull request being drafted.
#[derive(Debug, Clone, Default)]
pub struct BranchSelection {
    pub repo: Option<Repository>,
    /// Branch names in raw server order; ordering for display happens in the
    /// view models.
    pub branches: Vec<String>,
    pub branch: Option<String>,
    /// Head commit of the selected branch, re-resolved on every selection
    /// change.
    pub head: Option<Commit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Outcome of the last completed operation, for the host to render.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub messages: Vec<String>,
}

impl Notice {
    pub fn success() -> Self {
        Self {
            kind: NoticeKind::Success,
            messages: vec!["Success".to_string()],
        }
    }

    pub fn error(messages: Vec<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            messages,
        }
    }
}

/// Everything the host form renders.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub repositories: Vec<Repository>,
    pub repositories_loading: LoadingState,
    pub source: BranchSelection,
    pub target: BranchSelection,
    pub title: String,
    pub description: String,
    pub reviewers: Vec<String>,
    pub pull_requests: Vec<PullRequest>,
    pub pull_requests_loading: LoadingState,
    pub selected_pull_request: Option<usize>,
    pub notice: Option<Notice>,
}

impl FormState {
    pub fn selection(&self, side: Side) -> &BranchSelection {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    pub(crate) fn selection_mut(&mut self, side: Side) -> &mut BranchSelection {
        match side {
            Side::Source => &mut self.source,
            Side::Target => &mut self.target,
        }
    }

    /// The currently highlighted pull request, if any.
    pub fn selected_pr(&self) -> Option<&PullRequest> {
        self.selected_pull_request
            .and_then(|index| self.pull_requests.get(index))
    }

    /// Creation payload from the current selections and editable fields.
    ///
    /// `None` until both sides have a repository and a branch picked, which
    /// makes a half-filled form a silent no-op rather than an error.
    pub fn pull_request_info(&self) -> Option<PullRequestInfo> {
        let source_repo = self.source.repo.clone()?;
        let target_repo = self.target.repo.clone()?;
        let source_branch = self.source.branch.clone()?;
        let target_branch = self.target.branch.clone()?;
        Some(PullRequestInfo {
            title: self.title.clone(),
            description: self.description.clone(),
            source_branch,
            target_branch,
            source_repo,
            target_repo,
            reviewers: self.reviewers.clone(),
        })
    }
}
