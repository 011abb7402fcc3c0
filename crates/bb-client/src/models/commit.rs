//! Commit model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single commit as reported by the server.
///
/// Fetched fresh per query; the orchestrator never caches commits across
/// branch selection changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit hash.
    pub id: String,
    /// Name of the commit author.
    pub author_name: String,
    /// Full commit message.
    pub message: String,
    /// True when the commit has more than one parent.
    pub is_merge: bool,
    /// Author timestamp.
    pub authored_at: DateTime<Utc>,
}

impl Commit {
    /// Create a non-merge commit with the given data.
    pub fn new(
        id: impl Into<String>,
        author_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author_name: author_name.into(),
            message: message.into(),
            is_merge: false,
            authored_at: Utc::now(),
        }
    }

    /// Mark the commit as a merge commit.
    pub fn as_merge(mut self) -> Self {
        self.is_merge = true;
        self
    }
}
