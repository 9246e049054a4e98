// ===========================================================================
// gwt switch - Switch to a branch's worktree
// ===========================================================================

use clap::Args;

use crate::cli::Result;
use crate::engine::{self, Session, SwitchOptions};

#[derive(Args)]
pub struct SwitchArgs {
    /// Branch to switch to, or `-` for the previous branch
    pub branch: Option<String>,

    /// Create the worktree (and the branch if it does not exist)
    #[arg(short, long)]
    pub create: bool,

    /// Start a new branch from this ref
    #[arg(long, value_name = "REF")]
    pub base: Option<String>,
}

pub fn run(args: SwitchArgs) -> Result<()> {
    let repo = super::open_repo()?;
    let sink = super::directive_sink();
    let session = Session::new(&repo, &repo, super::as_sink(&sink));

    let options = SwitchOptions {
        create: args.create,
        base: args.base,
    };
    let target = args.branch.unwrap_or_default();
    let outcome = engine::switch_to(&session, &target, &options)?;

    if outcome.created_branch {
        eprintln!("Created branch: {}", outcome.branch);
    }
    if outcome.created_worktree {
        eprintln!("Created worktree: {}", outcome.path.display());
    }
    println!("{}", outcome.path.display());

    Ok(())
}
