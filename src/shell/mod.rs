// ===========================================================================
// shell - Shell Integration
// ===========================================================================
//
// A child process cannot change its parent's directory. The wrapper function
// hands gwt a directive file through GWT_DIRECTIVE_FILE and sources whatever
// gwt wrote there once it exits.

use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("home directory not found")]
    NoHome,

    #[error("unsupported shell: {0}")]
    UnsupportedShell(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    pub const ALL: [Shell; 3] = [Shell::Bash, Shell::Zsh, Shell::Fish];

    /// Shell named by `$SHELL`, if it is one we support.
    pub fn detect() -> Option<Self> {
        std::env::var("SHELL")
            .ok()
            .and_then(|s| Self::from_path(&s))
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path_lower = path.to_lowercase();
        if path_lower.ends_with("bash") {
            Some(Shell::Bash)
        } else if path_lower.ends_with("zsh") {
            Some(Shell::Zsh)
        } else if path_lower.ends_with("fish") {
            Some(Shell::Fish)
        } else {
            None
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "bash" => Some(Shell::Bash),
            "zsh" => Some(Shell::Zsh),
            "fish" => Some(Shell::Fish),
            _ => None,
        }
    }

    /// Like `from_name`, failing with `UnsupportedShell`.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| Error::UnsupportedShell(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
        }
    }

    pub fn config_file(&self, home: &Path) -> PathBuf {
        match self {
            Shell::Bash => {
                // macOS: login shells read .bash_profile, not .bashrc
                #[cfg(target_os = "macos")]
                {
                    let bash_profile = home.join(".bash_profile");
                    if bash_profile.exists() {
                        bash_profile
                    } else {
                        home.join(".bashrc")
                    }
                }
                #[cfg(not(target_os = "macos"))]
                {
                    home.join(".bashrc")
                }
            }
            Shell::Zsh => home.join(".zshrc"),
            Shell::Fish => home.join(".config/fish/config.fish"),
        }
    }

    /// Wrapper function definition, framed by the install markers.
    pub fn init_script(&self) -> &'static str {
        match self {
            Shell::Bash | Shell::Zsh => POSIX_WRAPPER,
            Shell::Fish => FISH_WRAPPER,
        }
    }
}

const MARKER_BEGIN: &str = "# === gwt BEGIN ===";
const MARKER_END: &str = "# === gwt END ===";

// zsh reserves $status and $path, so neither is used as a variable name
const POSIX_WRAPPER: &str = r#"# === gwt BEGIN ===
gwt() {
  local gwt_bin directive_file gwt_status
  if [ -n "$ZSH_VERSION" ]; then
    gwt_bin=$(whence -p gwt 2>/dev/null)
  else
    gwt_bin=$(type -P gwt 2>/dev/null)
  fi
  if [ -z "$gwt_bin" ]; then
    echo "gwt: binary not found on PATH" >&2
    return 1
  fi
  directive_file=$(mktemp "${TMPDIR:-/tmp}/gwt-directive.XXXXXX") || return 1
  GWT_DIRECTIVE_FILE="$directive_file" "$gwt_bin" "$@"
  gwt_status=$?
  if [ -s "$directive_file" ]; then
    . "$directive_file"
  fi
  rm -f "$directive_file"
  return $gwt_status
}
# === gwt END ==="#;

const FISH_WRAPPER: &str = r#"# === gwt BEGIN ===
function gwt
  set -l gwt_bin (type --force-path gwt 2>/dev/null)
  if test -z "$gwt_bin"
    echo "gwt: binary not found on PATH" >&2
    return 1
  end
  set -l directive_file (mktemp)
  GWT_DIRECTIVE_FILE=$directive_file $gwt_bin $argv
  set -l gwt_status $status
  if test -s $directive_file
    source $directive_file
  end
  rm -f $directive_file
  return $gwt_status
end
# === gwt END ==="#;

/// Write the wrapper into the shell's rc file under `home`, replacing an
/// earlier copy. Returns the file written.
pub fn install(shell: Shell, home: &Path) -> Result<PathBuf> {
    let config_path = shell.config_file(home);

    // fish keeps its config in a subdirectory
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = std::fs::read_to_string(&config_path).unwrap_or_default();
    let content = remove_wrapper(&content);
    let new_content = append_wrapper(&content, shell.init_script());

    std::fs::write(&config_path, new_content)?;
    log::debug!("installed {} wrapper in {}", shell.name(), config_path.display());

    Ok(config_path)
}

fn append_wrapper(content: &str, wrapper: &str) -> String {
    if content.is_empty() {
        format!("{wrapper}\n")
    } else if content.ends_with('\n') {
        format!("{content}\n{wrapper}\n")
    } else {
        format!("{content}\n\n{wrapper}\n")
    }
}

/// Strip a previously installed wrapper block.
fn remove_wrapper(content: &str) -> String {
    let mut result = String::new();
    let mut in_wrapper = false;

    for line in content.lines() {
        if line.contains(MARKER_BEGIN) {
            in_wrapper = true;
            continue;
        }
        if line.contains(MARKER_END) {
            in_wrapper = false;
            continue;
        }
        if !in_wrapper {
            result.push_str(line);
            result.push('\n');
        }
    }

    while result.ends_with("\n\n") {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_shell_from_path() {
        assert_eq!(Shell::from_path("/bin/bash"), Some(Shell::Bash));
        assert_eq!(Shell::from_path("/usr/bin/ZSH"), Some(Shell::Zsh));
        assert_eq!(
            Shell::from_path("/opt/homebrew/bin/fish"),
            Some(Shell::Fish)
        );
        assert_eq!(Shell::from_path("/bin/sh"), None);
    }

    #[test]
    fn test_shell_from_name() {
        assert_eq!(Shell::from_name("bash"), Some(Shell::Bash));
        assert_eq!(Shell::from_name("Fish"), Some(Shell::Fish));
        assert_eq!(Shell::from_name("pwsh"), None);
        assert_eq!(Shell::from_name("tcsh"), None);
    }

    #[test]
    fn test_parse_unsupported() {
        let err = Shell::parse("ksh").unwrap_err();
        assert_eq!(err.to_string(), "unsupported shell: ksh");
        assert_eq!(Shell::parse("zsh").unwrap(), Shell::Zsh);
    }

    #[test]
    fn test_config_file() {
        let home = Path::new("/home/me");
        assert_eq!(Shell::Zsh.config_file(home), home.join(".zshrc"));
        assert_eq!(
            Shell::Fish.config_file(home),
            home.join(".config/fish/config.fish")
        );
    }

    #[test]
    fn test_init_script_uses_directive_file() {
        for shell in Shell::ALL {
            let script = shell.init_script();
            assert!(script.starts_with(MARKER_BEGIN));
            assert!(script.ends_with(MARKER_END));
            assert!(script.contains("GWT_DIRECTIVE_FILE="));
            assert!(script.contains("rm -f"));
        }
        assert!(Shell::Bash.init_script().contains("gwt()"));
        assert!(Shell::Fish.init_script().contains("function gwt"));
    }

    #[test]
    fn test_init_script_avoids_zsh_specials() {
        let script = Shell::Zsh.init_script();
        assert!(!script.contains("local status"));
        assert!(!script.contains(" path="));
    }

    #[test]
    fn test_remove_wrapper() {
        let content = "alias ll='ls -la'\n# === gwt BEGIN ===\ngwt() { ... }\n# === gwt END ===\nexport PATH=$PATH:/usr/local/bin\n";
        let result = remove_wrapper(content);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines, vec!["alias ll='ls -la'", "export PATH=$PATH:/usr/local/bin"]);
    }

    #[test]
    fn test_remove_wrapper_no_wrapper() {
        let content = "alias ll='ls -la'\n";
        assert_eq!(remove_wrapper(content), content);
        assert_eq!(remove_wrapper(""), "");
    }

    #[test]
    fn test_append_wrapper_without_trailing_newline() {
        let result = append_wrapper("alias ll='ls -la'", "W");
        assert_eq!(result, "alias ll='ls -la'\n\nW\n");
        assert_eq!(append_wrapper("", "W"), "W\n");
    }

    #[test]
    fn test_install_replaces_existing_wrapper() {
        let dir = tempdir().unwrap();
        let rc = dir.path().join(".zshrc");
        std::fs::write(
            &rc,
            "alias ll='ls -la'\n# === gwt BEGIN ===\nold_gwt() { echo old; }\n# === gwt END ===\n",
        )
        .unwrap();

        let written = install(Shell::Zsh, dir.path()).unwrap();
        assert_eq!(written, rc);

        let result = std::fs::read_to_string(&rc).unwrap();
        assert!(result.contains("alias ll"));
        assert!(!result.contains("old_gwt"));
        assert!(result.contains("gwt()"));
        assert_eq!(result.matches(MARKER_BEGIN).count(), 1);

        install(Shell::Zsh, dir.path()).unwrap();
        let again = std::fs::read_to_string(&rc).unwrap();
        assert_eq!(again, result);
    }

    #[test]
    fn test_install_creates_fish_config_dir() {
        let dir = tempdir().unwrap();
        let written = install(Shell::Fish, dir.path()).unwrap();
        assert!(written.exists());
        let content = std::fs::read_to_string(written).unwrap();
        assert!(content.contains("function gwt"));
    }
}
