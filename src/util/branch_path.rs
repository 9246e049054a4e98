// ===========================================================================
// Branch Path Sanitizer
// ===========================================================================
//
// Maps a branch name to the sibling directory that holds its worktree:
//
//   /src/myproject  +  feature/login  ->  /src/myproject.feature--login

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Replacement for each path separator in a branch name
pub const SEPARATOR_MARKER: &str = "--";

/// Replace every `/` and `\` with `--`. Nothing else is touched.
pub fn sanitize(branch: &str) -> String {
    let mut out = String::with_capacity(branch.len());
    for c in branch.chars() {
        match c {
            '/' | '\\' => out.push_str(SEPARATOR_MARKER),
            _ => out.push(c),
        }
    }
    out
}

/// Target directory for `branch`: `<parent of main>/<main name>.<sanitized>`
pub fn worktree_path(main: &Path, branch: &str) -> PathBuf {
    let mut name = main
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(sanitize(branch));

    match main.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_name_unchanged() {
        assert_eq!(sanitize("feature-x"), "feature-x");
    }

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize("feature/login"), "feature--login");
        assert_eq!(sanitize("user\\fix"), "user--fix");
        assert_eq!(sanitize("a/b\\c/d"), "a--b--c--d");
    }

    #[test]
    fn test_sanitize_passes_through_case_and_unicode() {
        assert_eq!(sanitize("Fix/Ünïcode Name"), "Fix--Ünïcode Name");
    }

    #[test]
    fn test_sanitize_marker_count_matches_separator_count() {
        for name in ["", "a", "a/b", "//", "a\\b/c", "x/y/z/w", "--/--"] {
            let separators = name.chars().filter(|c| *c == '/' || *c == '\\').count();
            let existing = name.matches(SEPARATOR_MARKER).count();
            let out = sanitize(name);
            assert!(!out.contains('/') && !out.contains('\\'), "{name}");
            assert_eq!(out.matches(SEPARATOR_MARKER).count(), separators + existing, "{name}");
        }
    }

    #[test]
    fn test_sanitize_known_collision() {
        assert_eq!(sanitize("a/b"), sanitize("a--b"));
    }

    #[test]
    fn test_worktree_path_is_sibling() {
        let main = Path::new("/src/myproject");
        assert_eq!(
            worktree_path(main, "feature-x"),
            PathBuf::from("/src/myproject.feature-x")
        );
        assert_eq!(
            worktree_path(main, "feature/login"),
            PathBuf::from("/src/myproject.feature--login")
        );
    }
}
