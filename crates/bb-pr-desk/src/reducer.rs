//! Pure state transitions. Side effects live in the middleware chain.

use crate::actions::{Action, Side};
use crate::state::{FormState, LoadingState, Notice};

pub fn reduce(mut state: FormState, action: &Action) -> FormState {
    match action {
        Action::SessionStart => {
            state.repositories_loading = LoadingState::Loading;
            state.pull_requests_loading = LoadingState::Loading;
        }
        Action::SessionEnd => {}

        Action::RepositoriesLoaded(repositories) => {
            state.repositories = repositories.clone();
            state.repositories_loading = LoadingState::Loaded;
        }

        Action::RepositorySelected(side, repo) => {
            let selection = state.selection_mut(*side);
            selection.repo = Some(repo.clone());
            selection.branches.clear();
            selection.branch = None;
            selection.head = None;
        }

        Action::BranchesLoaded(side, repo, names) => {
            // Drop the result if the picker moved to another repository while
            // the fetch was in flight.
            let selection = state.selection_mut(*side);
            if selection.repo.as_ref() == Some(repo) {
                selection.branches = names.clone();
            } else {
                log::debug!(
                    "Ignoring stale branch list for {}",
                    repo.display_name()
                );
            }
        }

        Action::BranchSelected(side, name) => {
            // The blank placeholder entry means "nothing picked yet".
            if name.is_empty() {
                return state;
            }
            let selection = state.selection_mut(*side);
            selection.branch = Some(name.clone());
            selection.head = None;
            if *side == Side::Source {
                state.title = name.replace('-', " ");
            }
        }

        Action::HeadCommitResolved(side, commit) => {
            state.selection_mut(*side).head = commit.clone();
        }

        Action::DescriptionDrafted(text) => {
            state.description = text.clone();
        }

        Action::TitleEdited(title) => {
            state.title = title.clone();
        }
        Action::DescriptionEdited(description) => {
            state.description = description.clone();
        }
        Action::ReviewerAdded(name) => {
            if !state.reviewers.contains(name) {
                state.reviewers.push(name.clone());
            }
        }
        Action::ReviewerRemoved(name) => {
            state.reviewers.retain(|reviewer| reviewer != name);
        }

        Action::PrRefresh => {
            state.pull_requests_loading = LoadingState::Loading;
        }
        Action::PrListLoaded(pull_requests) => {
            state.pull_requests = pull_requests.clone();
            state.pull_requests_loading = LoadingState::Loaded;
            // The old selection points into the old list.
            state.selected_pull_request = None;
        }
        Action::PrSelected(index) => {
            if *index < state.pull_requests.len() {
                state.selected_pull_request = Some(*index);
            }
        }

        // Requests are handled by the middleware; results land here.
        Action::PrCreateRequest | Action::PrApproveRequest | Action::PrMergeRequest => {}

        Action::PrCreateSuccess | Action::PrApproveSuccess | Action::PrMergeSuccess => {
            state.notice = Some(Notice::success());
        }
        Action::PrCreateError(messages)
        | Action::PrApproveError(messages)
        | Action::PrMergeError(messages) => {
            state.notice = Some(Notice::error(messages.clone()));
        }
    }
    state
}
