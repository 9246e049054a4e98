// ===========================================================================
// config - Effective Settings
// ===========================================================================
//
// Settings live in git config under the `gwt.` namespace. Local entries
// override global ones.

use std::path::Path;

use serde::Serialize;

use crate::engine::switch::DEFAULT_BASE_KEY;
use crate::git::{self, ConfigStore, Repository, Scope};
use crate::hooks;
use crate::state::PreviousBranch;

/// Fuzzy filter used by `select` (local, then global).
///
/// The value is split with shell quoting rules, so `fzf --prompt 'pick > '`
/// passes the prompt as one argument.
pub const PICKER_KEY: &str = "gwt.picker";
pub const DEFAULT_PICKER: &str = "fzf";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Git(#[from] git::Error),

    #[error("cannot parse {PICKER_KEY}: {0}")]
    Picker(String),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub general: GeneralSettings,
    pub hooks: HookSettings,
    pub state: StateSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_base: Option<String>,

    pub picker: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookSettings {
    /// Directory git runs hooks from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_dir: Option<String>,

    pub dispatcher_installed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_create_global: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_create_local: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_branch: Option<String>,
}

fn default_picker() -> String {
    DEFAULT_PICKER.to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Settings {
    /// Read every setting from the store.
    pub fn resolve(
        repo: &dyn Repository,
        config: &dyn ConfigStore,
        home: Option<&Path>,
    ) -> Result<Self> {
        let effective_dir = hooks::effective_hooks_dir(repo, config, home)?;
        let dispatcher_installed = hooks::is_dispatcher(&effective_dir.join(hooks::HOOK_NAME));

        Ok(Self {
            general: GeneralSettings {
                default_base: non_empty(config.get_effective(DEFAULT_BASE_KEY)?),
                picker: picker(config)?,
            },
            hooks: HookSettings {
                effective_dir: Some(effective_dir.display().to_string()),
                dispatcher_installed,
                post_create_global: non_empty(config.get(Scope::Global, hooks::POST_CREATE_KEY)?),
                post_create_local: non_empty(config.get(Scope::Local, hooks::POST_CREATE_KEY)?),
            },
            state: StateSettings {
                previous_branch: non_empty(PreviousBranch::new(config).get()?),
            },
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

/// Picker command line, `fzf` unless configured.
pub fn picker(config: &dyn ConfigStore) -> git::Result<String> {
    Ok(non_empty(config.get_effective(PICKER_KEY)?).unwrap_or_else(default_picker))
}

/// Picker program followed by its arguments.
pub fn picker_command(config: &dyn ConfigStore) -> Result<Vec<String>> {
    let line = picker(config)?;
    let words = shlex::split(&line).ok_or_else(|| Error::Picker(line.clone()))?;
    if words.is_empty() {
        return Ok(vec![default_picker()]);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::memory::MemoryRepo;
    use std::path::PathBuf;

    fn repo() -> MemoryRepo {
        MemoryRepo::new(&PathBuf::from("/src/myproject"), "main")
    }

    #[test]
    fn test_defaults() {
        let repo = repo();
        let settings = Settings::resolve(&repo, &repo, None).unwrap();
        assert_eq!(settings.general.picker, "fzf");
        assert_eq!(settings.general.default_base, None);
        assert!(!settings.hooks.dispatcher_installed);
        assert_eq!(
            settings.hooks.effective_dir.as_deref(),
            Some("/src/myproject/.git/hooks")
        );
        assert_eq!(settings.state.previous_branch, None);
    }

    #[test]
    fn test_local_overrides_global() {
        let repo = repo();
        repo.set(Scope::Global, PICKER_KEY, "sk").unwrap();
        repo.set(Scope::Global, DEFAULT_BASE_KEY, "develop").unwrap();
        repo.set(Scope::Local, DEFAULT_BASE_KEY, "trunk").unwrap();

        let settings = Settings::resolve(&repo, &repo, None).unwrap();
        assert_eq!(settings.general.picker, "sk");
        assert_eq!(settings.general.default_base.as_deref(), Some("trunk"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let repo = repo();
        repo.set(Scope::Local, PICKER_KEY, "").unwrap();
        repo.set(Scope::Local, DEFAULT_BASE_KEY, "").unwrap();

        let settings = Settings::resolve(&repo, &repo, None).unwrap();
        assert_eq!(settings.general.picker, "fzf");
        assert_eq!(settings.general.default_base, None);
    }

    #[test]
    fn test_to_toml() {
        let repo = repo();
        repo.set(Scope::Global, hooks::POST_CREATE_KEY, "/home/me/setup.sh").unwrap();
        repo.set(Scope::Local, crate::state::PREVIOUS_BRANCH_KEY, "feature-x").unwrap();

        let toml = Settings::resolve(&repo, &repo, None).unwrap().to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("picker = \"fzf\""));
        assert!(toml.contains("post_create_global = \"/home/me/setup.sh\""));
        assert!(!toml.contains("post_create_local"));
        assert!(toml.contains("previous_branch = \"feature-x\""));
    }

    #[test]
    fn test_picker_command_keeps_quoted_args() {
        let repo = repo();
        assert_eq!(picker_command(&repo).unwrap(), vec!["fzf"]);

        repo.set(Scope::Local, PICKER_KEY, "fzf --prompt 'pick > ' --height=40%").unwrap();
        assert_eq!(
            picker_command(&repo).unwrap(),
            vec!["fzf", "--prompt", "pick > ", "--height=40%"]
        );

        repo.set(Scope::Local, PICKER_KEY, "   ").unwrap();
        assert_eq!(picker_command(&repo).unwrap(), vec!["fzf"]);
    }

    #[test]
    fn test_picker_command_unbalanced_quote() {
        let repo = repo();
        repo.set(Scope::Local, PICKER_KEY, "fzf --prompt 'pick").unwrap();
        let err = picker_command(&repo).unwrap_err();
        assert!(matches!(err, Error::Picker(_)));
        assert!(err.to_string().contains("gwt.picker"));
    }
}
