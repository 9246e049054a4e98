// ===========================================================================
// gwt list - List worktrees
// ===========================================================================

use clap::Args;

use crate::cli::Result;
use crate::registry::{Registry, Worktree};
use crate::util;

#[derive(Args)]
pub struct ListArgs {
    /// Print worktrees as a JSON array
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ListArgs) -> Result<()> {
    let repo = super::open_repo()?;
    let worktrees = Registry::new(&repo).list()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&worktrees)?);
        return Ok(());
    }

    let home = util::home_dir();
    print!("{}", render_table(&worktrees, home.as_deref()));
    Ok(())
}

fn render_table(worktrees: &[Worktree], home: Option<&std::path::Path>) -> String {
    let bw = worktrees
        .iter()
        .map(|wt| wt.branch_label().len())
        .max()
        .unwrap_or(6)
        .max(6);

    let mut out = format!("  {:<bw$}   {:<7}   PATH\n", "BRANCH", "HEAD");
    for wt in worktrees {
        let marker = if wt.is_current { "* " } else { "  " };
        out.push_str(&format!(
            "{marker}{:<bw$}   {:<7}   {}\n",
            wt.branch_label(),
            wt.head,
            util::shorten_path(&wt.path, home),
        ));
    }
    out
}
