// ===========================================================================
// engine - Switch / Remove State Machine
// ===========================================================================

pub mod remove;
pub mod switch;

use std::path::{Path, PathBuf};

use crate::directive::{self, Directive, DirectiveSink};
use crate::git::{self, ConfigStore, Repository};
use crate::registry::Registry;

pub use remove::{remove, BranchDisposition, RemoveOptions, RemoveOutcome};
pub use switch::{switch_to, SwitchOptions, SwitchOutcome, PREVIOUS};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not in a git repository")]
    NotAGitRepository,

    #[error("missing branch argument")]
    MissingBranchArgument,

    #[error("no worktree for branch '{0}' (use --create to create one)")]
    BranchNotFound(String),

    #[error("worktree '{0}' not found")]
    WorktreeNotFound(String),

    #[error("no previous branch recorded")]
    NoPreviousBranch,

    #[error("worktree '{}' has uncommitted changes (use --force)", .0.display())]
    UncommittedChanges(PathBuf),

    #[error(
        "shell integration required: add `eval \"$(gwt config shell init bash)\"` to your shell rc"
    )]
    ShellIntegrationRequired,

    #[error("cannot create worktree for '{branch}': {reason}")]
    WorktreeCreationFailed { branch: String, reason: String },

    #[error("cannot remove the main worktree")]
    CannotRemoveMainWorktree,

    #[error(transparent)]
    Directive(#[from] directive::Error),

    #[error("git error: {0}")]
    Git(git::Error),
}

impl From<git::Error> for Error {
    fn from(err: git::Error) -> Self {
        match err {
            git::Error::NotInRepo => Error::NotAGitRepository,
            other => Error::Git(other),
        }
    }
}

/// Collaborators an engine operation runs against.
#[derive(Clone, Copy)]
pub struct Session<'a> {
    pub repo: &'a dyn Repository,
    pub config: &'a dyn ConfigStore,
    /// `None` when the shell wrapper is not active
    pub directives: Option<&'a dyn DirectiveSink>,
}

impl<'a> Session<'a> {
    pub fn new(
        repo: &'a dyn Repository,
        config: &'a dyn ConfigStore,
        directives: Option<&'a dyn DirectiveSink>,
    ) -> Self {
        Self {
            repo,
            config,
            directives,
        }
    }

    pub fn registry(&self) -> Registry<'a> {
        Registry::new(self.repo)
    }

    /// The directive channel, or `ShellIntegrationRequired` without one.
    fn require_shell(&self) -> Result<&'a dyn DirectiveSink> {
        self.directives.ok_or(Error::ShellIntegrationRequired)
    }
}

fn emit_cd(sink: &dyn DirectiveSink, path: &Path) -> Result<()> {
    sink.emit(&Directive::Cd(path.to_path_buf()))?;
    Ok(())
}
