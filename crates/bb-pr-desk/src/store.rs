//! Store wiring state, middleware chain, and reducer together.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::actions::Action;
use crate::dispatcher::Dispatcher;
use crate::middleware::{
    DescriptionMiddleware, LoggingMiddleware, Middleware, PullRequestMiddleware,
    RepositoryMiddleware,
};
use crate::reducer::reduce;
use crate::state::FormState;
use crate::workflow::PullRequestWorkflow;

/// Owns the form state, the middleware chain, and the receiving end of the
/// action queue.
///
/// The store lives on the interactive context: the host dispatches actions
/// from its event handlers and calls [`Store::pump`] on its tick to apply
/// results that background tasks queued in the meantime. Dropping the store
/// closes the queue, so late results are discarded rather than delivered to
/// a disposed session.
pub struct Store {
    state: FormState,
    middlewares: Vec<Box<dyn Middleware>>,
    dispatcher: Dispatcher,
    queue: mpsc::UnboundedReceiver<Action>,
}

impl Store {
    pub fn new(state: FormState) -> Self {
        let (tx, queue) = mpsc::unbounded_channel();
        Self {
            state,
            middlewares: Vec::new(),
            dispatcher: Dispatcher::new(tx),
            queue,
        }
    }

    /// Store wired with the full middleware set for one session.
    pub fn for_session(
        workflow: Arc<PullRequestWorkflow>,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let mut store = Self::new(FormState::default());
        store.add_middleware(Box::new(LoggingMiddleware::new()));
        store.add_middleware(Box::new(RepositoryMiddleware::new(
            workflow.clone(),
            runtime.clone(),
        )));
        store.add_middleware(Box::new(DescriptionMiddleware::new(
            workflow.clone(),
            runtime.clone(),
        )));
        store.add_middleware(Box::new(PullRequestMiddleware::new(workflow, runtime)));
        store
    }

    /// Middlewares run in the order they were added.
    pub fn add_middleware(&mut self, middleware: Box<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Run one action through the middleware chain and the reducer.
    pub fn dispatch(&mut self, action: Action) {
        for middleware in &mut self.middlewares {
            if !middleware.handle(&action, &self.state, &self.dispatcher) {
                return;
            }
        }
        self.state = reduce(std::mem::take(&mut self.state), &action);
    }

    /// Drain queued actions on the interactive context, in submission order.
    /// Returns how many actions were processed.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(action) = self.queue.try_recv() {
            self.dispatch(action);
            processed += 1;
        }
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Side;
    use bb_client::Repository;

    struct ConsumingMiddleware;

    impl Middleware for ConsumingMiddleware {
        fn handle(
            &mut self,
            action: &Action,
            _state: &FormState,
            _dispatcher: &Dispatcher,
        ) -> bool {
            !matches!(action, Action::PrRefresh)
        }
    }

    #[test]
    fn queued_actions_are_applied_in_submission_order() {
        let mut store = Store::new(FormState::default());
        let dispatcher = store.dispatcher();

        dispatcher.dispatch(Action::RepositoriesLoaded(vec![Repository::new(
            "PROJ", "widget",
        )]));
        dispatcher.dispatch(Action::RepositorySelected(
            Side::Source,
            Repository::new("PROJ", "widget"),
        ));

        assert_eq!(store.pump(), 2);
        assert_eq!(store.state().repositories.len(), 1);
        assert!(store.state().source.repo.is_some());
    }

    #[test]
    fn consumed_actions_never_reach_the_reducer() {
        let mut store = Store::new(FormState::default());
        store.add_middleware(Box::new(ConsumingMiddleware));

        store.dispatch(Action::PrRefresh);

        // The reducer would have flipped the list into the loading state.
        assert_eq!(
            store.state().pull_requests_loading,
            crate::state::LoadingState::Idle
        );
    }
}
