// ===========================================================================
// gwt remove - Remove a worktree and its branch
// ===========================================================================

use clap::Args;

use crate::cli::Result;
use crate::engine::{self, BranchDisposition, RemoveOptions, Session};

#[derive(Args)]
pub struct RemoveArgs {
    /// Branch whose worktree to remove (default: the current worktree)
    pub branch: Option<String>,

    /// Remove even with uncommitted changes
    #[arg(short, long)]
    pub force: bool,

    /// Delete the branch even if it is not merged
    #[arg(long)]
    pub force_delete: bool,

    /// Keep the branch (wins over --force-delete)
    #[arg(long)]
    pub no_delete_branch: bool,
}

pub fn run(args: RemoveArgs) -> Result<()> {
    let repo = super::open_repo()?;
    let sink = super::directive_sink();
    let session = Session::new(&repo, &repo, super::as_sink(&sink));

    let options = RemoveOptions {
        force: args.force,
        force_delete: args.force_delete,
        no_delete_branch: args.no_delete_branch,
    };
    let outcome = engine::remove(&session, args.branch.as_deref(), options)?;

    println!("Removed worktree: {}", outcome.worktree.path.display());
    match outcome.branch {
        BranchDisposition::Deleted | BranchDisposition::ForceDeleted => {
            println!("Deleted branch: {}", outcome.worktree.branch_label());
        }
        BranchDisposition::Kept => {
            println!("Kept branch: {}", outcome.worktree.branch_label());
        }
        _ => {}
    }
    if let Some(warning) = outcome.warning() {
        eprintln!("warning: {warning}");
    }

    Ok(())
}
