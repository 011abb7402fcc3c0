//! Repository Middleware
//!
//! Side effects for the repository pickers:
//! - loads the repository list when the session starts
//! - loads branch lists (through the session cache) when a repository is
//!   picked, tagging the result with the repository so stale answers can be
//!   dropped

use std::sync::Arc;

use crate::actions::Action;
use crate::dispatcher::Dispatcher;
use crate::middleware::Middleware;
use crate::state::FormState;
use crate::workflow::PullRequestWorkflow;

pub struct RepositoryMiddleware {
    workflow: Arc<PullRequestWorkflow>,
    runtime: tokio::runtime::Handle,
}

impl RepositoryMiddleware {
    pub fn new(workflow: Arc<PullRequestWorkflow>, runtime: tokio::runtime::Handle) -> Self {
        Self { workflow, runtime }
    }
}

impl Middleware for RepositoryMiddleware {
    fn handle(&mut self, action: &Action, _state: &FormState, dispatcher: &Dispatcher) -> bool {
        match action {
            Action::SessionStart => {
                let workflow = self.workflow.clone();
                let dispatcher = dispatcher.clone();

                self.runtime.spawn(async move {
                    let repositories = workflow.list_repositories().await;
                    log::info!("Loaded {} repositories", repositories.len());
                    dispatcher.dispatch(Action::RepositoriesLoaded(repositories));
                });
                true
            }

            Action::RepositorySelected(side, repo) => {
                let workflow = self.workflow.clone();
                let dispatcher = dispatcher.clone();
                let side = *side;
                let repo = repo.clone();

                self.runtime.spawn(async move {
                    let branches = workflow.get_branches(&repo).await;
                    log::info!(
                        "Loaded {} branches for {}",
                        branches.len(),
                        repo.display_name()
                    );
                    dispatcher.dispatch(Action::BranchesLoaded(side, repo, branches));
                });
                true
            }

            _ => true,
        }
    }
}
