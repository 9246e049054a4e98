// ===========================================================================
// gwt select - Pick a worktree interactively
// ===========================================================================

use crate::cli::Result;
use crate::config;
use crate::engine::{self, Session, SwitchOptions};
use crate::process;
use crate::registry::{Registry, Worktree};

pub fn run() -> Result<()> {
    let repo = super::open_repo()?;
    let sink = super::directive_sink();
    // Fail before the picker opens, not after a choice was made
    if sink.is_none() {
        return Err(engine::Error::ShellIntegrationRequired.into());
    }

    let candidates = candidates(&Registry::new(&repo).list()?);
    if candidates.is_empty() {
        eprintln!("No worktrees with a branch to select.");
        return Ok(());
    }

    let command = config::picker_command(&repo)?;
    let (program, picker_args): (&str, Vec<&str>) = match command.split_first() {
        Some((program, rest)) => (program.as_str(), rest.iter().map(String::as_str).collect()),
        None => (config::DEFAULT_PICKER, Vec::new()),
    };

    let Some(line) = process::pick(program, &picker_args, &candidates)? else {
        log::debug!("selection cancelled");
        return Ok(());
    };
    let Some(branch) = branch_of(&line) else {
        return Ok(());
    };

    let session = Session::new(&repo, &repo, super::as_sink(&sink));
    let outcome = engine::switch_to(&session, branch, &SwitchOptions::default())?;
    println!("{}", outcome.path.display());

    Ok(())
}

/// One `branch<TAB>path` line per worktree that has a branch.
fn candidates(worktrees: &[Worktree]) -> Vec<String> {
    worktrees
        .iter()
        .filter_map(|wt| {
            wt.branch
                .as_ref()
                .map(|branch| format!("{branch}\t{}", wt.path.display()))
        })
        .collect()
}

fn branch_of(line: &str) -> Option<&str> {
    line.split('\t').next().map(str::trim).filter(|b| !b.is_empty())
}
