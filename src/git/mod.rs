// ===========================================================================
// git - Version Control Collaborator
// ===========================================================================
//
// The engines never shell out themselves. Everything they need from git goes
// through the `Repository` and `ConfigStore` traits; `GitCli` is the real
// implementation, `memory::MemoryRepo` the in-memory one used by tests.

mod command;
#[cfg(test)]
pub mod memory;

use std::fmt;
use std::path::{Path, PathBuf};

pub use command::GitCli;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Command(String),

    #[error("not in a git repository")]
    NotInRepo,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Scope of a git configuration entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Local,
    Global,
}

impl Scope {
    pub fn flag(self) -> &'static str {
        match self {
            Scope::Local => "--local",
            Scope::Global => "--global",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Local => f.write_str("local"),
            Scope::Global => f.write_str("global"),
        }
    }
}

/// One entry of `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeInfo {
    pub path: PathBuf,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub is_bare: bool,
}

/// Branch and worktree operations the engines consume.
pub trait Repository {
    /// Directory the invocation started in.
    fn current_dir(&self) -> &Path;

    /// Path of the original checkout (first entry of the worktree list).
    fn main_worktree_path(&self) -> Result<PathBuf>;

    /// Repository-internal directory shared by all worktrees.
    fn git_common_dir(&self) -> Result<PathBuf>;

    /// Branch checked out where the invocation started, `None` when detached.
    fn current_branch(&self) -> Result<Option<String>>;

    fn branch_exists(&self, name: &str) -> Result<bool>;

    fn create_branch(&self, name: &str, base: &str) -> Result<()>;

    /// Whether `name` is reachable from the main worktree's HEAD.
    fn is_branch_merged(&self, name: &str) -> Result<bool>;

    fn delete_branch(&self, name: &str, force: bool) -> Result<()>;

    /// Worktrees in git's native order.
    fn list_worktrees(&self) -> Result<Vec<WorktreeInfo>>;

    fn add_worktree(&self, path: &Path, branch: &str) -> Result<()>;

    fn remove_worktree(&self, path: &Path, force: bool) -> Result<()>;

    fn is_dirty(&self, path: &Path) -> Result<bool>;
}

/// Scoped key/value configuration (git config).
pub trait ConfigStore {
    /// `Ok(None)` when the key is absent; an empty value is `Ok(Some(""))`.
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>>;

    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<()>;

    /// Removing an absent key is not an error.
    fn unset(&self, scope: Scope, key: &str) -> Result<()>;

    /// Local value if present, otherwise global.
    fn get_effective(&self, key: &str) -> Result<Option<String>> {
        match self.get(Scope::Local, key)? {
            Some(value) => Ok(Some(value)),
            None => self.get(Scope::Global, key),
        }
    }
}

/// Clean git stderr to user-friendly message
pub(crate) fn clean_git_error(stderr: &str) -> String {
    let msg = stderr.trim();

    // Only the last line carries the reason; hints come before it
    let msg = msg
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty() && !l.starts_with("hint: "))
        .unwrap_or(msg)
        .trim();

    let msg = msg
        .strip_prefix("fatal: ")
        .or_else(|| msg.strip_prefix("error: "))
        .unwrap_or(msg);

    msg.to_string()
}

/// Parse git worktree list --porcelain output
pub fn parse_worktree_list(content: &str) -> Vec<WorktreeInfo> {
    let mut worktrees = Vec::new();
    let mut current: Option<WorktreeInfo> = None;

    for line in content.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(wt) = current.take() {
                worktrees.push(wt);
            }
            current = Some(WorktreeInfo {
                path: PathBuf::from(path),
                branch: None,
                commit: None,
                is_bare: false,
            });
        } else if let Some(ref mut wt) = current {
            if let Some(branch) = line.strip_prefix("branch refs/heads/") {
                wt.branch = Some(branch.to_string());
            } else if let Some(commit) = line.strip_prefix("HEAD ") {
                wt.commit = Some(commit.to_string());
            } else if line == "bare" {
                wt.is_bare = true;
            }
        }
    }

    if let Some(wt) = current {
        worktrees.push(wt);
    }

    worktrees
}
