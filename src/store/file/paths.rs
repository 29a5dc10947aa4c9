//! Path resolution for mcphost scope directories.
//!
//! Provides XDG-compliant resolution for the user scope and cwd-relative
//! defaults for project and workspace scopes.

use std::env;
use std::path::PathBuf;

use crate::store::models::Scope;

/// Directory layout of the three configuration scopes.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    pub project: PathBuf,
    pub workspace: PathBuf,
    pub user: PathBuf,
}

impl StoreLayout {
    /// Default layout: `./.mcphost/project`, `./.mcphost/workspace`, and the
    /// XDG config directory for the user scope.
    pub fn discover() -> Self {
        Self {
            project: PathBuf::from(".mcphost/project"),
            workspace: PathBuf::from(".mcphost/workspace"),
            user: default_user_dir(),
        }
    }

    pub fn scope_dir(&self, scope: Scope) -> &PathBuf {
        match scope {
            Scope::Project => &self.project,
            Scope::Workspace => &self.workspace,
            Scope::User => &self.user,
        }
    }
}

/// Get the XDG-compliant user configuration directory.
///
/// # Returns
/// `$XDG_CONFIG_HOME/mcphost` or `~/.config/mcphost`.
///
/// # Panics
/// Panics if neither XDG_CONFIG_HOME nor HOME is set.
pub fn default_user_dir() -> PathBuf {
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });

    config_home.join("mcphost")
}
