//! Connection settings and Bitbucket coordinate detection.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How branch lists are ordered for display.
///
/// Ordering is a presentation decision; the branch cache always stores the
/// raw server order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchOrdering {
    /// Sort branch names alphabetically.
    #[default]
    Alphabetical,
    /// Keep the order the server returned.
    ServerOrder,
}

/// Credentials for the Bitbucket REST API.
#[derive(Debug, Clone)]
pub enum Auth {
    /// Personal access token.
    Token(String),
    /// Username and password for basic auth.
    Basic { username: String, password: String },
}

/// Why settings could not be assembled for this session.
///
/// Both variants are one-shot configuration errors: they are surfaced once
/// at startup and the feature stays disabled for the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Your repository is not hosted in Bitbucket.")]
    NotBitbucket,
    #[error(
        "No Bitbucket credentials configured. Set `token` or `username`/`password` \
         in bb-pr-desk.toml, or export BITBUCKET_TOKEN."
    )]
    MissingCredentials,
}

/// Session settings: where the repository lives and how to authenticate.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the Bitbucket web UI and REST API.
    pub base_url: String,
    pub project_key: String,
    pub repo_slug: String,
    pub auth: Auth,
    pub branch_ordering: BranchOrdering,
}

impl Settings {
    /// Settings for a known set of coordinates.
    pub fn new(
        base_url: impl Into<String>,
        project_key: impl Into<String>,
        repo_slug: impl Into<String>,
        auth: Auth,
    ) -> Self {
        Self {
            base_url: trim_trailing_slash(base_url.into()),
            project_key: project_key.into(),
            repo_slug: repo_slug.into(),
            auth,
            branch_ordering: BranchOrdering::default(),
        }
    }

    /// Derive settings from the workspace's git remote URL, pulling
    /// credentials and overrides from the settings file and environment.
    ///
    /// Recognizes the remote shapes Bitbucket Server hands out:
    /// `https://host/scm/{key}/{slug}.git`, `ssh://git@host:port/{key}/{slug}.git`
    /// and the scp-like `git@host:{key}/{slug}.git`. Anything else yields
    /// [`SettingsError::NotBitbucket`].
    pub fn load_for_remote(remote_url: &str) -> Result<Self, SettingsError> {
        let coords = parse_remote_url(remote_url).ok_or(SettingsError::NotBitbucket)?;
        let file = SettingsFile::load();
        let auth = file.resolve_auth()?;
        Ok(Self {
            base_url: trim_trailing_slash(file.base_url.unwrap_or(coords.base_url)),
            project_key: coords.project_key,
            repo_slug: coords.repo_slug,
            auth,
            branch_ordering: file.branch_ordering.unwrap_or_default(),
        })
    }

    /// Web UI link for composing a pull request.
    pub fn create_pull_request_url(&self) -> String {
        format!(
            "{}/projects/{}/repos/{}/pull-requests?create",
            self.base_url, self.project_key, self.repo_slug
        )
    }

    /// Web UI link for the pull-request list.
    pub fn pull_requests_url(&self) -> String {
        format!(
            "{}/projects/{}/repos/{}/pull-requests",
            self.base_url, self.project_key, self.repo_slug
        )
    }

    /// Web UI link for one pull request's overview page.
    pub fn pull_request_overview_url(&self, id: u64) -> String {
        format!("{}/{}/overview", self.pull_requests_url(), id)
    }
}

fn trim_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

struct RemoteCoordinates {
    base_url: String,
    project_key: String,
    repo_slug: String,
}

fn parse_remote_url(remote_url: &str) -> Option<RemoteCoordinates> {
    let remote_url = remote_url.trim();

    // https://[user@]host[:port]/scm/{key}/{slug}[.git]
    let https = Regex::new(
        r"^(?P<scheme>https?)://(?:[^/@]+@)?(?P<host>[^/]+?)/scm/(?P<key>[^/]+)/(?P<slug>[^/]+?)(?:\.git)?/?$",
    )
    .ok()?;
    if let Some(caps) = https.captures(remote_url) {
        return Some(RemoteCoordinates {
            base_url: format!("{}://{}", &caps["scheme"], &caps["host"]),
            project_key: caps["key"].to_string(),
            repo_slug: caps["slug"].to_string(),
        });
    }

    // ssh://git@host[:port]/{key}/{slug}[.git]. The web UI is assumed to sit
    // on https at the same host; override via `base_url` in bb-pr-desk.toml.
    let ssh = Regex::new(
        r"^ssh://git@(?P<host>[^/:]+)(?::\d+)?/(?P<key>[^/~][^/]*|~[^/]+)/(?P<slug>[^/]+?)(?:\.git)?/?$",
    )
    .ok()?;
    if let Some(caps) = ssh.captures(remote_url) {
        return Some(RemoteCoordinates {
            base_url: format!("https://{}", &caps["host"]),
            project_key: caps["key"].to_string(),
            repo_slug: caps["slug"].to_string(),
        });
    }

    // git@host:{key}/{slug}[.git]
    let scp = Regex::new(r"^git@(?P<host>[^:/]+):(?P<key>[^/]+)/(?P<slug>[^/]+?)(?:\.git)?$").ok()?;
    if let Some(caps) = scp.captures(remote_url) {
        return Some(RemoteCoordinates {
            base_url: format!("https://{}", &caps["host"]),
            project_key: caps["key"].to_string(),
            repo_slug: caps["slug"].to_string(),
        });
    }

    None
}

/// Contents of `bb-pr-desk.toml`. Every field is optional; the environment
/// fills the gaps.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    branch_ordering: Option<BranchOrdering>,
}

impl SettingsFile {
    fn load() -> Self {
        if let Some(content) = crate::load_settings_file() {
            match toml::from_str(&content) {
                Ok(file) => return file,
                Err(err) => {
                    log::warn!("Failed to parse settings file: {}", err);
                }
            }
        }
        Self::default()
    }

    /// Credentials from the file, falling back to the environment
    /// (`BITBUCKET_TOKEN`, or `BITBUCKET_USERNAME` + `BITBUCKET_PASSWORD`).
    fn resolve_auth(&self) -> Result<Auth, SettingsError> {
        if let Some(token) = &self.token {
            return Ok(Auth::Token(token.clone()));
        }
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            return Ok(Auth::Basic {
                username: username.clone(),
                password: password.clone(),
            });
        }

        let _ = dotenvy::dotenv();
        if let Ok(token) = std::env::var("BITBUCKET_TOKEN") {
            return Ok(Auth::Token(token));
        }
        if let (Ok(username), Ok(password)) = (
            std::env::var("BITBUCKET_USERNAME"),
            std::env::var("BITBUCKET_PASSWORD"),
        ) {
            return Ok(Auth::Basic { username, password });
        }

        Err(SettingsError::MissingCredentials)
    }
}
