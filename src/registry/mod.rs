// ===========================================================================
// registry - Worktree Registry Reader
// ===========================================================================

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::git::{self, Repository};

const SHORT_COMMIT_LEN: usize = 7;

/// A checkout bound to one branch, as seen from this invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Worktree {
    pub path: PathBuf,
    pub branch: Option<String>,
    pub head: String,
    pub is_current: bool,
    pub is_main: bool,
}

impl Worktree {
    pub fn branch_label(&self) -> &str {
        self.branch.as_deref().unwrap_or("(detached)")
    }
}

/// Read-only view over the collaborator's worktree list.
pub struct Registry<'a> {
    repo: &'a dyn Repository,
}

impl<'a> Registry<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }

    /// All worktrees in git's order; bare entries are skipped.
    pub fn list(&self) -> git::Result<Vec<Worktree>> {
        let cwd = normalize(self.repo.current_dir());
        let infos = self.repo.list_worktrees()?;

        // The invocation is inside the deepest worktree containing cwd
        let current = infos
            .iter()
            .filter(|info| !info.is_bare)
            .map(|info| normalize(&info.path))
            .filter(|path| cwd.starts_with(path))
            .max_by_key(|path| path.components().count());

        Ok(infos
            .into_iter()
            .enumerate()
            .filter(|(_, info)| !info.is_bare)
            .map(|(index, info)| {
                let is_current = current.as_deref() == Some(normalize(&info.path).as_path());
                Worktree {
                    head: short_commit(info.commit.as_deref()),
                    is_current,
                    is_main: index == 0,
                    path: info.path,
                    branch: info.branch,
                }
            })
            .collect())
    }

    pub fn find_by_branch(&self, branch: &str) -> git::Result<Option<Worktree>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|wt| wt.branch.as_deref() == Some(branch)))
    }

    pub fn find_by_path(&self, path: &Path) -> git::Result<Option<Worktree>> {
        let path = normalize(path);
        Ok(self
            .list()?
            .into_iter()
            .find(|wt| normalize(&wt.path) == path))
    }

    /// The worktree containing the invocation's working directory.
    pub fn current(&self) -> git::Result<Worktree> {
        self.list()?
            .into_iter()
            .find(|wt| wt.is_current)
            .ok_or(git::Error::NotInRepo)
    }
}

/// Resolve symlinks when the path exists, so `/tmp` and `/private/tmp` compare equal.
pub fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn short_commit(commit: Option<&str>) -> String {
    commit
        .map(|c| c.chars().take(SHORT_COMMIT_LEN).collect())
        .unwrap_or_default()
}
