//! Pull Request Middleware
//!
//! Handles the remote pull-request operations:
//! - loads the open pull-request list on session start and on refresh
//! - create / approve / merge, refreshing the list after a success

use std::sync::Arc;

use bb_client::PullRequest;

use crate::actions::Action;
use crate::dispatcher::Dispatcher;
use crate::middleware::Middleware;
use crate::state::FormState;
use crate::workflow::PullRequestWorkflow;

pub struct PullRequestMiddleware {
    workflow: Arc<PullRequestWorkflow>,
    runtime: tokio::runtime::Handle,
}

impl PullRequestMiddleware {
    pub fn new(workflow: Arc<PullRequestWorkflow>, runtime: tokio::runtime::Handle) -> Self {
        Self { workflow, runtime }
    }

    fn spawn_list_load(&self, dispatcher: &Dispatcher) {
        let workflow = self.workflow.clone();
        let dispatcher = dispatcher.clone();

        self.runtime.spawn(async move {
            let pull_requests = workflow.list_pull_requests().await;
            log::info!("Loaded {} open pull requests", pull_requests.len());
            dispatcher.dispatch(Action::PrListLoaded(pull_requests));
        });
    }
}

impl Middleware for PullRequestMiddleware {
    fn handle(&mut self, action: &Action, state: &FormState, dispatcher: &Dispatcher) -> bool {
        match action {
            Action::SessionStart | Action::PrRefresh => {
                self.spawn_list_load(dispatcher);
                true
            }

            Action::PrCreateRequest => {
                // Mirrors the form-side guard: nothing happens until both
                // repositories and both branches are picked.
                let Some(info) = state.pull_request_info() else {
                    log::debug!("Create ignored: pull-request inputs incomplete");
                    return false;
                };
                let workflow = self.workflow.clone();
                let dispatcher = dispatcher.clone();

                self.runtime.spawn(async move {
                    match workflow.create(&info).await {
                        Ok(()) => {
                            log::info!("Created pull request \"{}\"", info.title);
                            dispatcher.dispatch(Action::PrCreateSuccess);
                            dispatcher.dispatch(Action::PrRefresh);
                        }
                        Err(failure) => {
                            log::error!("Create failed: {}", failure);
                            dispatcher.dispatch(Action::PrCreateError(failure.messages));
                        }
                    }
                });
                false
            }

            Action::PrApproveRequest => {
                let Some(info) = state.selected_pr().map(PullRequest::merge_info) else {
                    log::debug!("Approve ignored: no pull request selected");
                    return false;
                };
                let workflow = self.workflow.clone();
                let dispatcher = dispatcher.clone();

                self.runtime.spawn(async move {
                    match workflow.approve(&info).await {
                        Ok(()) => {
                            log::info!("Approved pull request #{}", info.id);
                            dispatcher.dispatch(Action::PrApproveSuccess);
                            dispatcher.dispatch(Action::PrRefresh);
                        }
                        Err(failure) => {
                            log::error!("Approve failed for #{}: {}", info.id, failure);
                            dispatcher.dispatch(Action::PrApproveError(failure.messages));
                        }
                    }
                });
                false
            }

            Action::PrMergeRequest => {
                let Some(info) = state.selected_pr().map(PullRequest::merge_info) else {
                    log::debug!("Merge ignored: no pull request selected");
                    return false;
                };
                let workflow = self.workflow.clone();
                let dispatcher = dispatcher.clone();

                self.runtime.spawn(async move {
                    match workflow.merge(&info).await {
                        Ok(()) => {
                            log::info!("Merged pull request #{}", info.id);
                            dispatcher.dispatch(Action::PrMergeSuccess);
                            dispatcher.dispatch(Action::PrRefresh);
                        }
                        Err(failure) => {
                            log::error!("Merge failed for #{}: {}", info.id, failure);
                            dispatcher.dispatch(Action::PrMergeError(failure.messages));
                        }
                    }
                });
                false
            }

            _ => true,
        }
    }
}
