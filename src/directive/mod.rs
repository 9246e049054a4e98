// ===========================================================================
// directive - Instructions for the Parent Shell
// ===========================================================================
//
// A child process cannot change its parent shell's directory. The shell
// wrapper (see `shell`) creates a fresh file, exports its path in
// GWT_DIRECTIVE_FILE, and sources the file once the binary exits.

use std::cell::RefCell;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Set by the shell wrapper to the file directives are appended to
pub const DIRECTIVE_FILE_ENV_VAR: &str = "GWT_DIRECTIVE_FILE";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write directive to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Cd(PathBuf),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Cd(path) => {
                let path = path.to_string_lossy();
                write!(f, "cd {}", shell_escape::unix::escape(path))
            }
        }
    }
}

/// Output channel for directives.
pub trait DirectiveSink {
    fn emit(&self, directive: &Directive) -> Result<()>;
}

/// Appends one line per directive to the wrapper's file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `None` when the shell wrapper is not active.
    pub fn from_env() -> Option<Self> {
        std::env::var_os(DIRECTIVE_FILE_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }
}

impl DirectiveSink for FileSink {
    fn emit(&self, directive: &Directive) -> Result<()> {
        let write = || -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            writeln!(file, "{directive}")
        };
        write().map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("directive: {directive}");
        Ok(())
    }
}

/// Records directives for inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    emitted: RefCell<Vec<Directive>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> Vec<Directive> {
        self.emitted.borrow().clone()
    }
}

impl DirectiveSink for MemorySink {
    fn emit(&self, directive: &Directive) -> Result<()> {
        self.emitted.borrow_mut().push(directive.clone());
        Ok(())
    }
}
