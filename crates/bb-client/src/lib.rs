//! Bitbucket Server API client
//!
//! Defines the [`BitbucketClient`] contract the pull-request orchestrator
//! consumes, the shared domain model, and an HTTP implementation against the
//! Bitbucket Server REST API 1.0.

mod client;
mod http;
mod models;
mod outcome;

pub use client::BitbucketClient;
pub use http::{BitbucketClientConfig, ClientAuth, HttpBitbucketClient};
pub use models::{Commit, MergeRequestInfo, PullRequest, PullRequestInfo, Repository};
pub use outcome::{Outcome, RemoteFailure};
