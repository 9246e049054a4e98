// ===========================================================================
// gwt - Git Worktree Manager
// ===========================================================================

pub mod cli;
pub mod config;
pub mod directive;
pub mod engine;
pub mod git;
pub mod hooks;
pub mod process;
pub mod registry;
pub mod shell;
pub mod state;
pub mod util;

pub use config::Settings;
pub use engine::Session;
