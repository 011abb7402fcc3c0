//! Pull-request workflow orchestrator for Bitbucket Server.
//!
//! A UI-agnostic store a host desktop form embeds. The host dispatches
//! actions (a repository was picked, the create button was pressed), the
//! middleware chain performs the remote calls on a background runtime, and
//! results come back through the store's queue onto the interactive context.
//! The host only ever reads [`state::FormState`] and renders it.
//!
//! ```text
//! Action → Middleware Chain (remote side effects) → Reducer → FormState
//! ```

pub mod actions;
pub mod branch_cache;
pub mod commit_range;
pub mod dispatcher;
pub mod middleware;
pub mod reducer;
pub mod state;
pub mod store;
pub mod view_models;
pub mod workflow;

pub use actions::{Action, Side};
pub use dispatcher::Dispatcher;
pub use state::FormState;
pub use store::Store;
pub use workflow::PullRequestWorkflow;
