// ===========================================================================
// util - Small Pure Helpers
// ===========================================================================

pub mod branch_path;

use std::path::{Path, PathBuf};

use directories::BaseDirs;

pub use branch_path::{sanitize, worktree_path};

pub fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|b| b.home_dir().to_path_buf())
}

/// Display `path` with the home directory shortened to `~`.
pub fn shorten_path(path: &Path, home: Option<&Path>) -> String {
    match home.and_then(|h| path.strip_prefix(h).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}
