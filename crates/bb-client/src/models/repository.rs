//! Repository model
//!
//! A repository on the Bitbucket server, addressed by project key and slug.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A repository on the Bitbucket server.
///
/// Identity is the `(project_key, slug)` pair; `name` is display-only and
/// excluded from equality and hashing so the value can key the branch cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Key of the project the repository belongs to (e.g. "PROJ").
    pub project_key: String,
    /// URL slug of the repository.
    pub slug: String,
    /// Human-readable name as shown in the web UI.
    pub name: String,
}

impl Repository {
    /// Create a repository reference; the display name defaults to the slug.
    pub fn new(project_key: impl Into<String>, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            project_key: project_key.into(),
            name: slug.clone(),
            slug,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// "PROJ/slug", used in log lines and picker labels.
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.project_key, self.slug)
    }
}

impl PartialEq for Repository {
    fn eq(&self, other: &Self) -> bool {
        self.project_key == other.project_key && self.slug == other.slug
    }
}

impl Eq for Repository {}

impl Hash for Repository {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.project_key.hash(state);
        self.slug.hash(state);
    }
}
