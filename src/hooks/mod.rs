// ===========================================================================
// hooks - Hook Installer & Post-Create Callbacks
// ===========================================================================
//
// gwt never runs callbacks itself. It installs a fixed post-checkout
// dispatcher into the hooks directory; git fires it on `git worktree add`,
// and the dispatcher forwards to the callbacks configured in each scope.

use std::path::{Path, PathBuf};

use crate::git::{self, ConfigStore, Repository, Scope};
use crate::util;

/// Callback script path, one per scope
pub const POST_CREATE_KEY: &str = "gwt.post-create";

pub const HOOKS_PATH_KEY: &str = "core.hooksPath";

/// Hook file the dispatcher is installed as
pub const HOOK_NAME: &str = "post-checkout";

/// Default global hooks directory, relative to the home directory
pub const GLOBAL_HOOKS_DIR: &str = ".git-hooks";

/// Order the dispatcher runs callbacks in
pub const CALLBACK_ORDER: [Scope; 2] = [Scope::Global, Scope::Local];

const DISPATCHER_MARKER: &str = "# gwt hook dispatcher";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("hook already installed at {}", .0.display())]
    HookAlreadyInstalled(PathBuf),

    #[error("home directory not found")]
    NoHome,

    #[error(transparent)]
    Git(#[from] git::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a successful `install`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub scope: Scope,
    pub hooks_dir: PathBuf,
    pub script: PathBuf,
}

pub fn home_dir() -> Result<PathBuf> {
    util::home_dir().ok_or(Error::NoHome)
}

/// The dispatcher script, running callbacks of `order` one after another.
///
/// Each callback gets the branch name and the new worktree's path. A failing
/// callback is reported on stderr and never fails the checkout.
pub fn dispatcher_script(order: &[Scope]) -> String {
    let calls: String = order
        .iter()
        .map(|scope| format!("run_callback {scope}\n"))
        .collect();

    format!(
        r#"#!/bin/sh
{DISPATCHER_MARKER}
#
# git passes an all-zero previous HEAD only when `git worktree add`
# checks out a new worktree; plain checkouts are ignored.
case "$1" in
  ""|*[!0]*) exit 0 ;;
esac

branch=$(git symbolic-ref --quiet --short HEAD 2>/dev/null)
worktree=$(git rev-parse --show-toplevel 2>/dev/null)

run_callback() {{
  callback=$(git config "--$1" --get {POST_CREATE_KEY} 2>/dev/null) || return 0
  [ -n "$callback" ] || return 0
  "$callback" "$branch" "$worktree"
  status=$?
  if [ "$status" -ne 0 ]; then
    echo "gwt: warning: $1 post-create callback '$callback' exited with status $status" >&2
  fi
  return 0
}}

{calls}exit 0
"#
    )
}

/// Expand a configured hooks path: `~/` is the home directory, relative
/// paths are taken from the main worktree.
fn expand(value: &str, repo: &dyn Repository, home: Option<&Path>) -> git::Result<PathBuf> {
    if let (Some(rest), Some(home)) = (value.strip_prefix("~/"), home) {
        return Ok(home.join(rest));
    }
    let path = PathBuf::from(value);
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(repo.main_worktree_path()?.join(path))
    }
}

fn configured_dir(
    repo: &dyn Repository,
    config: &dyn ConfigStore,
    scope: Scope,
    home: Option<&Path>,
) -> git::Result<Option<PathBuf>> {
    match config.get(scope, HOOKS_PATH_KEY)? {
        Some(value) if !value.is_empty() => expand(&value, repo, home).map(Some),
        _ => Ok(None),
    }
}

/// Directory `install(scope)` writes into.
///
/// Each scope only looks at its own setting: a local install never lands in
/// an inherited global directory.
pub fn resolve_hooks_dir(
    repo: &dyn Repository,
    config: &dyn ConfigStore,
    scope: Scope,
    home: &Path,
) -> Result<PathBuf> {
    if let Some(dir) = configured_dir(repo, config, scope, Some(home))? {
        return Ok(dir);
    }
    Ok(match scope {
        Scope::Local => repo.git_common_dir()?.join("hooks"),
        Scope::Global => home.join(GLOBAL_HOOKS_DIR),
    })
}

/// Directory git actually runs hooks from: local setting, then global,
/// then the repository's own hooks directory.
pub fn effective_hooks_dir(
    repo: &dyn Repository,
    config: &dyn ConfigStore,
    home: Option<&Path>,
) -> git::Result<PathBuf> {
    for scope in [Scope::Local, Scope::Global] {
        if let Some(dir) = configured_dir(repo, config, scope, home)? {
            return Ok(dir);
        }
    }
    Ok(repo.git_common_dir()?.join("hooks"))
}

/// Write the dispatcher for `scope` and point that scope's hooks path at it.
///
/// An existing hook file is never overwritten.
pub fn install(
    repo: &dyn Repository,
    config: &dyn ConfigStore,
    scope: Scope,
    home: &Path,
) -> Result<Installation> {
    let hooks_dir = resolve_hooks_dir(repo, config, scope, home)?;
    let script = hooks_dir.join(HOOK_NAME);

    if script.exists() {
        return Err(Error::HookAlreadyInstalled(script));
    }

    std::fs::create_dir_all(&hooks_dir)?;
    std::fs::write(&script, dispatcher_script(&CALLBACK_ORDER))?;
    make_executable(&script)?;

    config.set(scope, HOOKS_PATH_KEY, &hooks_dir.to_string_lossy())?;
    log::debug!("installed {scope} hook dispatcher at {}", script.display());

    Ok(Installation {
        scope,
        hooks_dir,
        script,
    })
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Store the callback for `scope` as an absolute path.
pub fn set_post_create(
    repo: &dyn Repository,
    config: &dyn ConfigStore,
    scope: Scope,
    callback: &Path,
) -> Result<PathBuf> {
    let callback = if callback.is_absolute() {
        callback.to_path_buf()
    } else {
        repo.current_dir().join(callback)
    };
    config.set(scope, POST_CREATE_KEY, &callback.to_string_lossy())?;
    Ok(callback)
}

/// Configured callbacks in the order the dispatcher runs them.
pub fn callbacks(config: &dyn ConfigStore) -> git::Result<Vec<(Scope, String)>> {
    let mut out = Vec::new();
    for scope in CALLBACK_ORDER {
        if let Some(path) = config.get(scope, POST_CREATE_KEY)? {
            if !path.is_empty() {
                out.push((scope, path));
            }
        }
    }
    Ok(out)
}

pub fn is_dispatcher(script: &Path) -> bool {
    std::fs::read_to_string(script)
        .map(|content| content.contains(DISPATCHER_MARKER))
        .unwrap_or(false)
}

/// True when a callback is configured but git would not reach it.
pub fn dispatcher_missing(repo: &dyn Repository, config: &dyn ConfigStore) -> git::Result<bool> {
    if callbacks(config)?.is_empty() {
        return Ok(false);
    }
    let home = util::home_dir();
    let dir = effective_hooks_dir(repo, config, home.as_deref())?;
    Ok(!is_dispatcher(&dir.join(HOOK_NAME)))
}
