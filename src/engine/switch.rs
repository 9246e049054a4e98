// ===========================================================================
// engine/switch - Switch Engine
// ===========================================================================

use std::path::PathBuf;

use super::{emit_cd, Error, Result, Session};
use crate::hooks;
use crate::registry::Registry;
use crate::state::PreviousBranch;
use crate::util;

/// Target meaning "the branch switched away from last time"
pub const PREVIOUS: &str = "-";

/// Base for new branches when `--base` is omitted (local, then global)
pub const DEFAULT_BASE_KEY: &str = "gwt.default-base";

#[derive(Debug, Clone, Default)]
pub struct SwitchOptions {
    /// Materialize a worktree (and the branch, if missing)
    pub create: bool,
    /// Branch or commit a new branch starts from
    pub base: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub branch: String,
    pub path: PathBuf,
    pub created_branch: bool,
    pub created_worktree: bool,
    /// Branch recorded as previous, if it changed
    pub previous: Option<String>,
}

/// Land the parent shell in the worktree of `target`.
///
/// Every successful switch ends in a worktree: an existing worktree is
/// reused, otherwise `create` is required to make one. The branch the
/// invocation started on becomes the previous branch, and a `cd` directive
/// is emitted.
pub fn switch_to(session: &Session<'_>, target: &str, options: &SwitchOptions) -> Result<SwitchOutcome> {
    let tracker = PreviousBranch::new(session.config);

    let branch = if target == PREVIOUS {
        tracker.get()?.ok_or(Error::NoPreviousBranch)?
    } else {
        target.to_string()
    };

    if branch.is_empty() {
        return Err(Error::MissingBranchArgument);
    }

    // Checked before anything is created: a worktree nobody can cd into is useless
    let sink = session.require_shell()?;

    let registry = session.registry();
    let from = session.repo.current_branch()?;

    let (path, created_branch, created_worktree) = match registry.find_by_branch(&branch)? {
        Some(wt) => {
            log::debug!("reusing worktree {} for {branch}", wt.path.display());
            (wt.path, false, false)
        }
        None if !options.create => return Err(Error::BranchNotFound(branch)),
        None => {
            let (path, created_branch) =
                create_worktree(session, &registry, &branch, from.as_deref(), options)?;
            (path, created_branch, true)
        }
    };

    let previous = match from {
        Some(from) if from != branch => {
            tracker.set(&from)?;
            Some(from)
        }
        _ => None,
    };

    emit_cd(sink, &path)?;

    Ok(SwitchOutcome {
        branch,
        path,
        created_branch,
        created_worktree,
        previous,
    })
}

fn create_worktree(
    session: &Session<'_>,
    registry: &Registry<'_>,
    branch: &str,
    from: Option<&str>,
    options: &SwitchOptions,
) -> Result<(PathBuf, bool)> {
    let repo = session.repo;
    let failed = |reason: String| Error::WorktreeCreationFailed {
        branch: branch.to_string(),
        reason,
    };

    let main = repo.main_worktree_path()?;
    let path = util::worktree_path(&main, branch);

    // Never reuse a directory silently: `a/b` and `a--b` map to the same path
    if let Some(existing) = registry.find_by_path(&path)? {
        return Err(failed(format!(
            "{} is already the worktree of '{}'",
            path.display(),
            existing.branch_label()
        )));
    }
    if path.exists() {
        return Err(failed(format!(
            "{} already exists and is not a worktree",
            path.display()
        )));
    }

    let created_branch = if repo.branch_exists(branch)? {
        false
    } else {
        let base = resolve_base(session, from, options)?;
        log::debug!("creating branch {branch} from {base}");
        repo.create_branch(branch, &base)
            .map_err(|e| failed(e.to_string()))?;
        true
    };

    if let Err(e) = repo.add_worktree(&path, branch) {
        if created_branch {
            if let Err(cleanup) = repo.delete_branch(branch, true) {
                log::warn!("could not roll back branch {branch}: {cleanup}");
            }
        }
        return Err(failed(e.to_string()));
    }

    match hooks::dispatcher_missing(repo, session.config) {
        Ok(true) => log::warn!(
            "a post-create callback is configured but the hook dispatcher is not installed; run `gwt config hooks install`"
        ),
        Ok(false) => {}
        Err(e) => log::warn!("could not check hook installation: {e}"),
    }

    Ok((path, created_branch))
}

/// `--base`, then the configured default, then the branch being switched from.
fn resolve_base(session: &Session<'_>, from: Option<&str>, options: &SwitchOptions) -> Result<String> {
    if let Some(base) = &options.base {
        return Ok(base.clone());
    }
    if let Some(base) = session.config.get_effective(DEFAULT_BASE_KEY)? {
        if !base.is_empty() {
            return Ok(base);
        }
    }
    Ok(from.unwrap_or("HEAD").to_string())
}
