// ===========================================================================
// engine/remove - Remove Engine
// ===========================================================================

use std::path::PathBuf;

use super::{emit_cd, Error, Result, Session};
use crate::git::Repository;
use crate::registry::Worktree;

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOptions {
    /// Remove even with uncommitted changes
    pub force: bool,
    /// Delete the branch even if unmerged
    pub force_delete: bool,
    /// Keep the branch
    pub no_delete_branch: bool,
}

/// What happened to the removed worktree's branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchDisposition {
    Deleted,
    ForceDeleted,
    /// Kept on request
    Kept,
    /// Kept because it has commits the main worktree's HEAD lacks
    Unmerged,
    /// The worktree had no branch checked out
    Detached,
    /// Deletion was attempted and git refused
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub worktree: Worktree,
    pub branch: BranchDisposition,
    /// Where the shell was sent after removing the worktree it stood in
    pub relocated_to: Option<PathBuf>,
}

impl RemoveOutcome {
    /// Non-fatal problem worth telling the user about.
    pub fn warning(&self) -> Option<String> {
        let branch = self.worktree.branch_label();
        match &self.branch {
            BranchDisposition::Unmerged => Some(format!(
                "could not delete branch '{branch}': not fully merged (use --force-delete)"
            )),
            BranchDisposition::Failed(reason) => {
                Some(format!("could not delete branch '{branch}': {reason}"))
            }
            _ => None,
        }
    }
}

/// Tear down the worktree of `target` (or the current one) and its branch.
///
/// Removing the worktree the invocation stands in sends the shell to the
/// main worktree. The worktree must be gone before its branch is touched.
pub fn remove(session: &Session<'_>, target: Option<&str>, options: RemoveOptions) -> Result<RemoveOutcome> {
    let repo = session.repo;
    let registry = session.registry();

    let worktree = match target {
        Some(branch) => registry
            .find_by_branch(branch)?
            .ok_or_else(|| Error::WorktreeNotFound(branch.to_string()))?,
        None => registry.current()?,
    };

    if worktree.is_main {
        return Err(Error::CannotRemoveMainWorktree);
    }

    let is_self_removal = worktree.is_current;
    let sink = if is_self_removal {
        Some(session.require_shell()?)
    } else {
        None
    };

    let main = repo.main_worktree_path()?;

    if !options.force && repo.is_dirty(&worktree.path)? {
        return Err(Error::UncommittedChanges(worktree.path));
    }

    repo.remove_worktree(&worktree.path, options.force)?;
    log::debug!("removed worktree {}", worktree.path.display());

    let branch = delete_branch(repo, &worktree, options);

    let relocated_to = match sink {
        Some(sink) => {
            emit_cd(sink, &main)?;
            Some(main)
        }
        None => None,
    };

    Ok(RemoveOutcome {
        worktree,
        branch,
        relocated_to,
    })
}

fn delete_branch(repo: &dyn Repository, worktree: &Worktree, options: RemoveOptions) -> BranchDisposition {
    let Some(branch) = worktree.branch.as_deref() else {
        return BranchDisposition::Detached;
    };

    if options.no_delete_branch {
        return BranchDisposition::Kept;
    }

    if options.force_delete {
        return match repo.delete_branch(branch, true) {
            Ok(()) => BranchDisposition::ForceDeleted,
            Err(e) => BranchDisposition::Failed(e.to_string()),
        };
    }

    match repo.is_branch_merged(branch) {
        Ok(true) => match repo.delete_branch(branch, false) {
            Ok(()) => BranchDisposition::Deleted,
            Err(e) => BranchDisposition::Failed(e.to_string()),
        },
        Ok(false) => BranchDisposition::Unmerged,
        Err(e) => BranchDisposition::Failed(e.to_string()),
    }
}
