//! Description Middleware
//!
//! Resolves head commits when a branch is picked and drafts the pull-request
//! description from the commit range once both heads are known. Both steps
//! are fail-soft: incomplete selections and remote failures leave the form
//! as it is.

use std::sync::Arc;

use crate::actions::{Action, Side};
use crate::dispatcher::Dispatcher;
use crate::middleware::Middleware;
use crate::state::FormState;
use crate::workflow::PullRequestWorkflow;

pub struct DescriptionMiddleware {
    workflow: Arc<PullRequestWorkflow>,
    runtime: tokio::runtime::Handle,
}

impl DescriptionMiddleware {
    pub fn new(workflow: Arc<PullRequestWorkflow>, runtime: tokio::runtime::Handle) -> Self {
        Self { workflow, runtime }
    }
}

impl Middleware for DescriptionMiddleware {
    fn handle(&mut self, action: &Action, state: &FormState, dispatcher: &Dispatcher) -> bool {
        match action {
            Action::BranchSelected(side, name) => {
                // The blank placeholder entry means "nothing picked yet".
                if name.is_empty() {
                    return true;
                }
                let repo = state.selection(*side).repo.clone();
                let workflow = self.workflow.clone();
                let dispatcher = dispatcher.clone();
                let side = *side;
                let name = name.clone();

                self.runtime.spawn(async move {
                    let head = workflow.resolve_head_commit(repo.as_ref(), &name).await;
                    dispatcher.dispatch(Action::HeadCommitResolved(side, head));
                });
                true
            }

            Action::HeadCommitResolved(side, Some(commit)) => {
                // This side's head arrives with the action; the other side's
                // comes from the state as of the previous resolution.
                let source_repo = state.source.repo.clone();
                let target_repo = state.target.repo.clone();
                let (source_head, target_head) = match side {
                    Side::Source => (Some(commit.clone()), state.target.head.clone()),
                    Side::Target => (state.source.head.clone(), Some(commit.clone())),
                };

                let workflow = self.workflow.clone();
                let dispatcher = dispatcher.clone();

                self.runtime.spawn(async move {
                    let draft = workflow
                        .draft_description(
                            source_repo.as_ref(),
                            target_repo.as_ref(),
                            source_head.as_ref(),
                            target_head.as_ref(),
                        )
                        .await;
                    if let Some(text) = draft {
                        dispatcher.dispatch(Action::DescriptionDrafted(text));
                    }
                });
                true
            }

            _ => true,
        }
    }
}
