//! Middleware chain between action dispatch and the reducer.
//!
//! Each middleware can inspect actions and state, dispatch follow-up actions,
//! perform side effects (remote calls on the background runtime), and block
//! actions from reaching the reducer. Remote I/O happens only here; the
//! reducer stays pure.

use crate::actions::Action;
use crate::dispatcher::Dispatcher;
use crate::state::FormState;

pub mod description;
pub mod logging;
pub mod pull_request;
pub mod repository;

pub use self::description::DescriptionMiddleware;
pub use self::logging::LoggingMiddleware;
pub use self::pull_request::PullRequestMiddleware;
pub use self::repository::RepositoryMiddleware;

/// Handles actions before they reach the reducer.
pub trait Middleware: Send {
    /// # Returns
    /// - `true`: continue to the next middleware and the reducer
    /// - `false`: consume the action
    fn handle(&mut self, action: &Action, state: &FormState, dispatcher: &Dispatcher) -> bool;
}
