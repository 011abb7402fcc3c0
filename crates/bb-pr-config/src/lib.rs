//! Settings for the Bitbucket pull-request desk.
//!
//! Detects the Bitbucket coordinates (project key and repository slug) from
//! the workspace's git remote URL, loads credentials from `bb-pr-desk.toml`
//! or the environment, and builds deep links into the Bitbucket web UI.

use std::path::PathBuf;

mod settings;

pub use settings::{Auth, BranchOrdering, Settings, SettingsError};

/// Load the settings file contents from CWD first, then the home config dir.
pub(crate) fn load_settings_file() -> Option<String> {
    for path in settings_file_paths() {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                log::debug!("Loaded settings from {}", path.display());
                return Some(content);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                log::warn!("Failed to read {}: {}", path.display(), err);
            }
        }
    }
    None
}

fn settings_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("bb-pr-desk.toml")];
    if let Ok(home) = std::env::var("HOME") {
        paths.push(
            PathBuf::from(home)
                .join(".config")
                .join("bb-pr-desk")
                .join("bb-pr-desk.toml"),
        );
    }
    paths
}
