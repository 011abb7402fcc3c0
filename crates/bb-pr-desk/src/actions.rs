//! Actions represent all state changes flowing through the store.
//!
//! Remote operations follow the request/result pattern: the host dispatches
//! a `…Request` action, a middleware performs the call in the background and
//! dispatches the matching `…Success`/`…Error` (or `…Loaded`) action with
//! the result.

use bb_client::{Commit, PullRequest, Repository};

/// Which side of the pull request a selection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

#[derive(Debug, Clone)]
pub enum Action {
    // Session lifecycle
    SessionStart,
    SessionEnd,

    // Repository pickers
    RepositoriesLoaded(Vec<Repository>),
    RepositorySelected(Side, Repository),
    /// Branch list arrived for a repository; carries the repository so stale
    /// results can be dropped if the picker moved on meanwhile.
    BranchesLoaded(Side, Repository, Vec<String>),

    // Branch selection and description drafting
    BranchSelected(Side, String),
    HeadCommitResolved(Side, Option<Commit>),
    DescriptionDrafted(String),

    // Editable fields (host form input)
    TitleEdited(String),
    DescriptionEdited(String),
    ReviewerAdded(String),
    ReviewerRemoved(String),

    // Pull request list
    PrRefresh,
    PrListLoaded(Vec<PullRequest>),
    PrSelected(usize),

    // Create
    PrCreateRequest,
    PrCreateSuccess,
    PrCreateError(Vec<String>),

    // Approve
    PrApproveRequest,
    PrApproveSuccess,
    PrApproveError(Vec<String>),

    // Merge
    PrMergeRequest,
    PrMergeSuccess,
    PrMergeError(Vec<String>),
}
