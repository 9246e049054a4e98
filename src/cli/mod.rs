// ===========================================================================
// cli - Command Line Interface
// ===========================================================================

mod commands;

use clap::{Parser, Subcommand};

use crate::{config, engine, git, hooks, process, shell};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] engine::Error),

    #[error(transparent)]
    Hooks(#[from] hooks::Error),

    #[error(transparent)]
    Shell(shell::Error),

    #[error(transparent)]
    Config(#[from] config::Error),

    #[error("git error: {0}")]
    Git(git::Error),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("unsupported shell: {0}")]
    UnsupportedShell(String),

    #[error("picker '{0}' not found (install it or set gwt.picker)")]
    PickerUnavailable(String),

    #[error(transparent)]
    Process(process::Error),

    #[error("failed to encode json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<git::Error> for Error {
    fn from(err: git::Error) -> Self {
        match err {
            git::Error::NotInRepo => Error::Engine(engine::Error::NotAGitRepository),
            other => Error::Git(other),
        }
    }
}

impl From<shell::Error> for Error {
    fn from(err: shell::Error) -> Self {
        match err {
            shell::Error::UnsupportedShell(name) => Error::UnsupportedShell(name),
            other => Error::Shell(other),
        }
    }
}

impl From<process::Error> for Error {
    fn from(err: process::Error) -> Self {
        match err {
            process::Error::NotFound(program) => Error::PickerUnavailable(program),
            other => Error::Process(other),
        }
    }
}

#[derive(Parser)]
#[command(
    name = "gwt",
    version,
    about = "Git worktree manager: one worktree per branch, switched like branches",
    after_help = "Run 'gwt config shell install' so switch/remove can change your directory."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print debug logging (git invocations, directives)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Switch to a branch's worktree (`-` for the previous branch)
    Switch(commands::SwitchArgs),

    /// Remove a worktree and delete its branch
    Remove(commands::RemoveArgs),

    /// List worktrees
    List(commands::ListArgs),

    /// Pick a worktree with a fuzzy finder and switch to it
    Select,

    /// Settings, shell integration and hooks
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Switch(args) => commands::switch::run(args),
            Command::Remove(args) => commands::remove::run(args),
            Command::List(args) => commands::list::run(args),
            Command::Select => commands::select::run(),
            Command::Config(command) => commands::config::run(command),
        }
    }
}
