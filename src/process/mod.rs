// ===========================================================================
// process - External Filter Processes (fuzzy pickers)
// ===========================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::directive::DIRECTIVE_FILE_ENV_VAR;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("'{0}' not found on PATH")]
    NotFound(String),

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

/// Locate `program`, which may be a bare name or a path.
pub fn locate(program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|_| Error::NotFound(program.to_string()))
}

/// Feed `lines` to a filter program and return the line it printed.
///
/// The filter draws its UI on the terminal, so only stdin and stdout are
/// piped. A non-zero exit (cancelled, nothing matched) or an empty answer
/// is `None`.
pub fn pick(program: &str, args: &[&str], lines: &[String]) -> Result<Option<String>> {
    let path = locate(program)?;
    let spawn_err = |source| Error::Spawn {
        program: program.to_string(),
        source,
    };

    log::debug!("$ {} {}", path.display(), args.join(" "));
    let mut child = Command::new(&path)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .env_remove(DIRECTIVE_FILE_ENV_VAR)
        .spawn()
        .map_err(spawn_err)?;

    if let Some(mut stdin) = child.stdin.take() {
        let input = lines.join("\n") + "\n";
        // A filter may exit before reading everything
        if let Err(e) = stdin.write_all(input.as_bytes()) {
            log::debug!("  picker closed stdin early: {e}");
        }
        // stdin is dropped here, closing the pipe
    }

    let output = child.wait_with_output().map_err(spawn_err)?;
    log::debug!("  exit: {}", output.status);

    if !output.status.success() {
        return Ok(None);
    }

    let selected = String::from_utf8_lossy(&output.stdout);
    Ok(selected
        .lines()
        .next()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(String::from))
}
