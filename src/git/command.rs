// ===========================================================================
// git/command - Collaborator backed by the git CLI
// ===========================================================================

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::{
    clean_git_error, parse_worktree_list, ConfigStore, Error, Repository, Result, Scope,
    WorktreeInfo,
};
use crate::directive::DIRECTIVE_FILE_ENV_VAR;

/// Runs git as a child process per call.
///
/// Repository-level commands run in the main worktree, so they keep working
/// after the worktree the invocation started in has been removed.
#[derive(Debug, Clone)]
pub struct GitCli {
    cwd: PathBuf,
    main: PathBuf,
    common_dir: PathBuf,
}

impl GitCli {
    /// Open the repository containing the process's working directory.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::open(&cwd)
    }

    /// Open the repository containing `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        let output = git_output(dir, ["rev-parse", "--git-common-dir"])?;
        if !output.status.success() {
            return Err(Error::NotInRepo);
        }

        let common_dir = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        let common_dir = if common_dir.is_absolute() {
            common_dir
        } else {
            dir.join(common_dir)
        };
        let common_dir = common_dir.canonicalize().map_err(|_| Error::NotInRepo)?;

        let output = git_output(dir, ["worktree", "list", "--porcelain"])?;
        if !output.status.success() {
            return Err(Error::NotInRepo);
        }
        let main = parse_worktree_list(&String::from_utf8_lossy(&output.stdout))
            .into_iter()
            .next()
            .map(|wt| wt.path)
            .ok_or(Error::NotInRepo)?;

        Ok(Self {
            cwd: dir.to_path_buf(),
            main,
            common_dir,
        })
    }

    /// Run git in the main worktree, failing on non-zero exit.
    fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = git_output(&self.main, args)?;
        if !output.status.success() {
            return Err(Error::Command(extract_error(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Forward captured child output to stderr, keeping stdout for directives and data.
fn relay_to_stderr(output: &Output) {
    for stream in [&output.stdout, &output.stderr] {
        if !stream.is_empty() {
            eprint!("{}", String::from_utf8_lossy(stream));
        }
    }
}

/// Spawn git in `dir` and collect its output.
///
/// The directive variable is stripped so hooks fired by git can never write
/// to the shell's directive file.
fn git_output<I, S>(dir: &Path, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new("git");
    cmd.args(args)
        .current_dir(dir)
        .env_remove(DIRECTIVE_FILE_ENV_VAR);

    let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
    log::debug!("$ git {} [{}]", args.join(" "), dir.display());

    let output = cmd.output()?;
    log::debug!("  exit: {}", output.status);
    Ok(output)
}

/// Extract error message from git command output.
///
/// Some git commands put error info in stdout, not stderr.
fn extract_error(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        clean_git_error(&stderr)
    }
}

impl Repository for GitCli {
    fn current_dir(&self) -> &Path {
        &self.cwd
    }

    fn main_worktree_path(&self) -> Result<PathBuf> {
        Ok(self.main.clone())
    }

    fn git_common_dir(&self) -> Result<PathBuf> {
        Ok(self.common_dir.clone())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let output = git_output(&self.cwd, ["symbolic-ref", "--quiet", "--short", "HEAD"])?;
        match output.status.code() {
            Some(0) => Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            )),
            // exit 1: HEAD is detached
            Some(1) => Ok(None),
            _ => Err(Error::NotInRepo),
        }
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        let output = git_output(
            &self.main,
            ["show-ref", "--verify", "--quiet", &format!("refs/heads/{name}")],
        )?;
        Ok(output.status.success())
    }

    fn create_branch(&self, name: &str, base: &str) -> Result<()> {
        self.run(["branch", name, base]).map(|_| ())
    }

    fn is_branch_merged(&self, name: &str) -> Result<bool> {
        let output = git_output(
            &self.main,
            ["merge-base", "--is-ancestor", &format!("refs/heads/{name}"), "HEAD"],
        )?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(Error::Command(extract_error(&output))),
        }
    }

    fn delete_branch(&self, name: &str, force: bool) -> Result<()> {
        let flag = if force { "-D" } else { "-d" };
        self.run(["branch", flag, name]).map(|_| ())
    }

    fn list_worktrees(&self) -> Result<Vec<WorktreeInfo>> {
        let output = git_output(&self.main, ["worktree", "list", "--porcelain"])?;
        if !output.status.success() {
            return Err(Error::NotInRepo);
        }
        Ok(parse_worktree_list(&String::from_utf8_lossy(&output.stdout)))
    }

    fn add_worktree(&self, path: &Path, branch: &str) -> Result<()> {
        let args: [&OsStr; 4] = [
            "worktree".as_ref(),
            "add".as_ref(),
            path.as_os_str(),
            branch.as_ref(),
        ];
        let output = git_output(&self.main, args)?;
        if !output.status.success() {
            return Err(Error::Command(extract_error(&output)));
        }
        // post-checkout hook output, including callback warnings
        relay_to_stderr(&output);
        Ok(())
    }

    fn remove_worktree(&self, path: &Path, force: bool) -> Result<()> {
        let mut args: Vec<&OsStr> = vec!["worktree".as_ref(), "remove".as_ref()];
        if force {
            args.push("--force".as_ref());
        }
        args.push(path.as_os_str());
        self.run(args).map(|_| ())
    }

    fn is_dirty(&self, path: &Path) -> Result<bool> {
        let output = git_output(path, ["status", "--porcelain"])?;
        if !output.status.success() {
            return Err(Error::Command(extract_error(&output)));
        }
        Ok(!output.stdout.iter().all(u8::is_ascii_whitespace))
    }
}

impl ConfigStore for GitCli {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>> {
        let output = git_output(&self.main, ["config", scope.flag(), "--get", key])?;
        match output.status.code() {
            Some(0) => {
                let value = String::from_utf8_lossy(&output.stdout);
                Ok(Some(value.trim_end_matches('\n').to_string()))
            }
            // exit 1: key not set
            Some(1) => Ok(None),
            _ => Err(Error::Command(extract_error(&output))),
        }
    }

    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<()> {
        self.run(["config", scope.flag(), key, value]).map(|_| ())
    }

    fn unset(&self, scope: Scope, key: &str) -> Result<()> {
        let output = git_output(&self.main, ["config", scope.flag(), "--unset", key])?;
        match output.status.code() {
            // exit 5: key was not set
            Some(0) | Some(5) => Ok(()),
            _ => Err(Error::Command(extract_error(&output))),
        }
    }
}
