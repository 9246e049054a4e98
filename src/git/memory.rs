// ===========================================================================
// git/memory - In-memory collaborator for engine tests
// ===========================================================================

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::{ConfigStore, Error, Repository, Result, Scope, WorktreeInfo};

#[derive(Debug, Default)]
struct State {
    /// branch name -> reachable from the main worktree's HEAD
    branches: BTreeMap<String, bool>,
    worktrees: Vec<WorktreeInfo>,
    dirty: BTreeSet<PathBuf>,
    config: BTreeMap<(Scope, String), String>,
    refuse_add: bool,
    refuse_remove: bool,
    next_commit: u32,
}

/// Repository double: branches, worktrees and config live in memory and
/// nothing touches the filesystem.
#[derive(Debug)]
pub struct MemoryRepo {
    cwd: PathBuf,
    common_dir: PathBuf,
    state: RefCell<State>,
}

impl MemoryRepo {
    /// A repository whose main worktree at `main` has `branch` checked out.
    pub fn new(main: &Path, branch: &str) -> Self {
        let repo = Self {
            cwd: main.to_path_buf(),
            common_dir: main.join(".git"),
            state: RefCell::new(State::default()),
        };
        repo.state.borrow_mut().branches.insert(branch.to_string(), true);
        repo.push_worktree(main, branch);
        repo
    }

    /// Add a worktree (and its branch) that existed before the test runs.
    pub fn with_worktree(self, path: &Path, branch: &str) -> Self {
        self.state
            .borrow_mut()
            .branches
            .entry(branch.to_string())
            .or_insert(true);
        self.push_worktree(path, branch);
        self
    }

    pub fn with_branch(self, branch: &str) -> Self {
        self.state.borrow_mut().branches.insert(branch.to_string(), true);
        self
    }

    pub fn with_cwd(mut self, path: &Path) -> Self {
        self.cwd = path.to_path_buf();
        self
    }

    pub fn set_dirty(&self, path: &Path) {
        self.state.borrow_mut().dirty.insert(path.to_path_buf());
    }

    pub fn set_merged(&self, branch: &str, merged: bool) {
        self.state.borrow_mut().branches.insert(branch.to_string(), merged);
    }

    pub fn refuse_add(&self) {
        self.state.borrow_mut().refuse_add = true;
    }

    pub fn refuse_remove(&self) {
        self.state.borrow_mut().refuse_remove = true;
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.state.borrow().branches.contains_key(name)
    }

    pub fn worktree_for(&self, branch: &str) -> Option<PathBuf> {
        self.state
            .borrow()
            .worktrees
            .iter()
            .find(|wt| wt.branch.as_deref() == Some(branch))
            .map(|wt| wt.path.clone())
    }

    fn push_worktree(&self, path: &Path, branch: &str) {
        let mut state = self.state.borrow_mut();
        state.next_commit += 1;
        let commit = format!("{:040x}", state.next_commit);
        state.worktrees.push(WorktreeInfo {
            path: path.to_path_buf(),
            branch: Some(branch.to_string()),
            commit: Some(commit),
            is_bare: false,
        });
    }
}

impl Repository for MemoryRepo {
    fn current_dir(&self) -> &Path {
        &self.cwd
    }

    fn main_worktree_path(&self) -> Result<PathBuf> {
        self.state
            .borrow()
            .worktrees
            .first()
            .map(|wt| wt.path.clone())
            .ok_or(Error::NotInRepo)
    }

    fn git_common_dir(&self) -> Result<PathBuf> {
        Ok(self.common_dir.clone())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let state = self.state.borrow();
        let wt = state
            .worktrees
            .iter()
            .filter(|wt| self.cwd.starts_with(&wt.path))
            .max_by_key(|wt| wt.path.components().count())
            .ok_or(Error::NotInRepo)?;
        Ok(wt.branch.clone())
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.has_branch(name))
    }

    fn create_branch(&self, name: &str, base: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.branches.contains_key(name) {
            return Err(Error::Command(format!(
                "a branch named '{name}' already exists"
            )));
        }
        if base != "HEAD" && !state.branches.contains_key(base) {
            return Err(Error::Command(format!("not a valid object name: '{base}'")));
        }
        state.branches.insert(name.to_string(), true);
        Ok(())
    }

    fn is_branch_merged(&self, name: &str) -> Result<bool> {
        self.state
            .borrow()
            .branches
            .get(name)
            .copied()
            .ok_or_else(|| Error::Command(format!("branch '{name}' not found")))
    }

    fn delete_branch(&self, name: &str, force: bool) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let merged = state
            .branches
            .get(name)
            .copied()
            .ok_or_else(|| Error::Command(format!("branch '{name}' not found")))?;
        if !merged && !force {
            return Err(Error::Command(format!(
                "the branch '{name}' is not fully merged"
            )));
        }
        if state
            .worktrees
            .iter()
            .any(|wt| wt.branch.as_deref() == Some(name))
        {
            return Err(Error::Command(format!(
                "cannot delete branch '{name}' used by worktree"
            )));
        }
        state.branches.remove(name);
        Ok(())
    }

    fn list_worktrees(&self) -> Result<Vec<WorktreeInfo>> {
        Ok(self.state.borrow().worktrees.clone())
    }

    fn add_worktree(&self, path: &Path, branch: &str) -> Result<()> {
        {
            let state = self.state.borrow();
            if state.refuse_add {
                return Err(Error::Command("could not lock worktree config".into()));
            }
            if !state.branches.contains_key(branch) {
                return Err(Error::Command(format!("invalid reference: {branch}")));
            }
            if state.worktrees.iter().any(|wt| wt.path == path) {
                return Err(Error::Command(format!(
                    "'{}' already exists",
                    path.display()
                )));
            }
            if state
                .worktrees
                .iter()
                .any(|wt| wt.branch.as_deref() == Some(branch))
            {
                return Err(Error::Command(format!(
                    "'{branch}' is already checked out"
                )));
            }
        }
        self.push_worktree(path, branch);
        Ok(())
    }

    fn remove_worktree(&self, path: &Path, force: bool) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.refuse_remove {
            return Err(Error::Command(format!(
                "'{}' is locked",
                path.display()
            )));
        }
        if state.dirty.contains(path) && !force {
            return Err(Error::Command(format!(
                "'{}' contains modified or untracked files, use --force to delete it",
                path.display()
            )));
        }
        let before = state.worktrees.len();
        state.worktrees.retain(|wt| wt.path != path);
        if state.worktrees.len() == before {
            return Err(Error::Command(format!(
                "'{}' is not a working tree",
                path.display()
            )));
        }
        state.dirty.remove(path);
        Ok(())
    }

    fn is_dirty(&self, path: &Path) -> Result<bool> {
        Ok(self.state.borrow().dirty.contains(path))
    }
}

impl ConfigStore for MemoryRepo {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>> {
        Ok(self
            .state
            .borrow()
            .config
            .get(&(scope, key.to_string()))
            .cloned())
    }

    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<()> {
        self.state
            .borrow_mut()
            .config
            .insert((scope, key.to_string()), value.to_string());
        Ok(())
    }

    fn unset(&self, scope: Scope, key: &str) -> Result<()> {
        self.state
            .borrow_mut()
            .config
            .remove(&(scope, key.to_string()));
        Ok(())
    }
}
