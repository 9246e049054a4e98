// ===========================================================================
// cli/commands - Command Implementations
// ===========================================================================

pub mod config;
pub mod list;
pub mod remove;
pub mod select;
pub mod switch;

use crate::cli::Result;
use crate::directive::{DirectiveSink, FileSink};
use crate::git::GitCli;

// Re-export argument types
pub use config::ConfigCommand;
pub use list::ListArgs;
pub use remove::RemoveArgs;
pub use switch::SwitchArgs;

/// Repository around the working directory.
fn open_repo() -> Result<GitCli> {
    Ok(GitCli::discover()?)
}

/// Directive sink from the shell wrapper, if one is active.
fn directive_sink() -> Option<FileSink> {
    let sink = FileSink::from_env();
    if sink.is_none() {
        log::debug!("shell integration inactive");
    }
    sink
}

fn as_sink(sink: &Option<FileSink>) -> Option<&dyn DirectiveSink> {
    sink.as_ref().map(|s| s as &dyn DirectiveSink)
}
