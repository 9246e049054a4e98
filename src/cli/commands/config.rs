// ===========================================================================
// gwt config - Settings, shell integration and hooks
// ===========================================================================

use std::path::PathBuf;

use clap::{Args, CommandFactory, Subcommand};

use crate::cli::{Cli, Error, Result};
use crate::config::Settings;
use crate::git::{ConfigStore, Scope};
use crate::hooks;
use crate::shell::{self, Shell};
use crate::util;

const KEY_PREFIX: &str = "gwt.";

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective settings as TOML
    Show,

    /// Print (or clear) a state entry such as `previous-branch`
    State(StateArgs),

    /// Shell integration
    #[command(subcommand)]
    Shell(ShellCommand),

    /// Print a completion script
    Completion(CompletionArgs),

    /// Post-create hook dispatcher and callbacks
    #[command(subcommand)]
    Hooks(HooksCommand),
}

#[derive(Args)]
pub struct StateArgs {
    /// Key, with or without the `gwt.` prefix
    pub key: String,

    /// Remove the entry instead of printing it
    #[arg(long)]
    pub clear: bool,
}

#[derive(Subcommand)]
pub enum ShellCommand {
    /// Print the wrapper function; eval it from your shell rc
    Init {
        /// bash, zsh or fish
        shell: String,
    },

    /// Add the wrapper function to your shell rc file
    Install {
        /// Shell type (auto-detected if not specified)
        #[arg(long)]
        shell: Option<String>,
    },
}

#[derive(Args)]
pub struct CompletionArgs {
    /// bash, zsh or fish
    pub shell: String,
}

#[derive(Subcommand)]
pub enum HooksCommand {
    /// Install the post-checkout dispatcher
    Install {
        /// Install for all repositories instead of this one
        #[arg(long)]
        global: bool,
    },

    /// Set the script run after a worktree is created
    SetPostCreate {
        /// Set for all repositories instead of this one
        #[arg(long)]
        global: bool,

        /// Script path; receives the branch and the worktree path
        path: PathBuf,
    },
}

fn scope(global: bool) -> Scope {
    if global {
        Scope::Global
    } else {
        Scope::Local
    }
}

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => show(),
        ConfigCommand::State(args) => state(args),
        ConfigCommand::Shell(ShellCommand::Init { shell }) => {
            println!("{}", Shell::parse(&shell)?.init_script());
            Ok(())
        }
        ConfigCommand::Shell(ShellCommand::Install { shell }) => install_shell(shell),
        ConfigCommand::Completion(args) => completion(args),
        ConfigCommand::Hooks(HooksCommand::Install { global }) => install_hooks(scope(global)),
        ConfigCommand::Hooks(HooksCommand::SetPostCreate { global, path }) => {
            set_post_create(scope(global), path)
        }
    }
}

fn show() -> Result<()> {
    let repo = super::open_repo()?;
    let home = util::home_dir();
    let settings = Settings::resolve(&repo, &repo, home.as_deref())?;
    print!("{}", settings.to_toml()?);
    Ok(())
}

fn state_key(key: &str) -> String {
    if key.starts_with(KEY_PREFIX) {
        key.to_string()
    } else {
        format!("{KEY_PREFIX}{key}")
    }
}

fn state(args: StateArgs) -> Result<()> {
    let repo = super::open_repo()?;
    let key = state_key(&args.key);

    if args.clear {
        repo.unset(Scope::Local, &key)?;
        eprintln!("Cleared {key}");
    } else if let Some(value) = repo.get(Scope::Local, &key)? {
        println!("{value}");
    }
    Ok(())
}

fn install_shell(name: Option<String>) -> Result<()> {
    let shell = match name {
        Some(name) => Shell::parse(&name)?,
        None => Shell::detect()
            .ok_or_else(|| Error::Other("cannot detect shell, use --shell to specify".into()))?,
    };
    let home = util::home_dir().ok_or(shell::Error::NoHome)?;

    let config_path = shell::install(shell, &home)?;

    eprintln!("Shell integration installed!");
    eprintln!("Config: {}", config_path.display());
    eprintln!();
    eprintln!("Restart your shell or run:");
    eprintln!("  source {}", config_path.display());
    Ok(())
}

fn completion(args: CompletionArgs) -> Result<()> {
    let generator = match Shell::parse(&args.shell)? {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
    };
    let mut cmd = Cli::command();
    clap_complete::generate(generator, &mut cmd, "gwt", &mut std::io::stdout());
    Ok(())
}

fn install_hooks(scope: Scope) -> Result<()> {
    let repo = super::open_repo()?;
    let home = hooks::home_dir()?;
    let installed = hooks::install(&repo, &repo, scope, &home)?;

    println!(
        "Installed {scope} hook dispatcher: {}",
        installed.script.display()
    );

    // git only reads the global hooks path when no local one is set
    if scope == Scope::Global {
        if let Some(local) = repo.get(Scope::Local, hooks::HOOKS_PATH_KEY)? {
            eprintln!(
                "warning: this repository sets core.hooksPath={local}, which takes precedence"
            );
        }
    }
    Ok(())
}

fn set_post_create(scope: Scope, path: PathBuf) -> Result<()> {
    let repo = super::open_repo()?;
    let stored = hooks::set_post_create(&repo, &repo, scope, &path)?;

    println!("Set {scope} post-create callback: {}", stored.display());
    if !stored.exists() {
        eprintln!("warning: {} does not exist yet", stored.display());
    }
    if hooks::dispatcher_missing(&repo, &repo)? {
        eprintln!("warning: hook dispatcher not installed; run `gwt config hooks install`");
    }
    Ok(())
}
