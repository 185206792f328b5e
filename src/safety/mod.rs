use std::path::{Component, Path, PathBuf};

use crate::errors::PromptGenError;

/// Join `relative` onto `out_root`, refusing anything that could land
/// outside it: absolute paths, drive prefixes, and `..` segments.
pub fn resolve_within(out_root: &Path, relative: &str) -> Result<PathBuf, PromptGenError> {
    if relative.trim().is_empty() {
        return Err(PromptGenError::UnsafePath("empty path".into()));
    }
    for c in Path::new(relative).components() {
        match c {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(PromptGenError::UnsafePath(relative.to_string()));
            }
        }
    }
    Ok(out_root.join(relative))
}

/// Existing targets are also canonicalized so a symlinked directory cannot
/// redirect a write outside the root.
pub fn stays_within(out_root: &Path, target: &Path) -> bool {
    let Ok(root) = std::fs::canonicalize(out_root) else {
        return false;
    };
    let mut probe = target;
    loop {
        if probe.exists() {
            return match std::fs::canonicalize(probe) {
                Ok(abs) => abs.starts_with(&root),
                Err(_) => false,
            };
        }
        match probe.parent() {
            Some(p) => probe = p,
            None => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_relative_paths() {
        let p = resolve_within(Path::new("/proj"), ".github/copilot-instructions.md").unwrap();
        assert_eq!(p, PathBuf::from("/proj/.github/copilot-instructions.md"));
        assert!(resolve_within(Path::new("/proj"), "./CLAUDE.md").is_ok());
    }

    #[test]
    fn rejects_escapes() {
        for bad in ["../x.md", "/etc/passwd", "a/../../b", "", "  "] {
            assert!(resolve_within(Path::new("/proj"), bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn stays_within_checks_nearest_existing_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(".cursor").join("rules").join("project.mdc");
        assert!(stays_within(dir.path(), &target));

        let other = tempfile::tempdir().unwrap();
        assert!(!stays_within(dir.path(), &other.path().join("x.md")));
    }
}
