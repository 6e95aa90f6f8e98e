use crate::version::SCHEMA_VERSION;
use std::path::{Path, PathBuf};

/// Find the project root by walking up from `cwd` looking for `package.json` or `.git`.
///
/// Returns the first directory containing either marker, or `None` if neither is found.
#[must_use]
pub fn project_root(cwd: &Path) -> Option<PathBuf> {
    let mut current = cwd.to_path_buf();

    loop {
        if current.join("package.json").exists() || current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Get the cache directory used to store previously fetched remote-dependency artifacts.
///
/// Uses platform-appropriate locations with versioning:
/// - Linux: `$XDG_CACHE_HOME/wsnap/v{N}` or `~/.cache/wsnap/v{N}`
/// - macOS: `~/Library/Caches/wsnap/v{N}`
/// - Windows: `%LOCALAPPDATA%\wsnap\cache\v{N}`
#[must_use]
pub fn cache_dir() -> PathBuf {
    let base = dirs_next::cache_dir().map_or_else(
        || {
            dirs_next::home_dir().map_or_else(
                || PathBuf::from(".wsnap-cache"),
                |p| p.join(".cache").join("wsnap"),
            )
        },
        |p| p.join("wsnap"),
    );

    base.join(format!("v{SCHEMA_VERSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_project_root_with_package_json() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();

        let root = project_root(&nested);
        assert_eq!(root, Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_project_root_with_git() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("src");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let root = project_root(&nested);
        assert_eq!(root, Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_project_root_not_found() {
        let dir = tempdir().unwrap();
        let root = project_root(dir.path());
        let _ = root;
    }

    #[test]
    fn test_cache_dir_contains_version() {
        let dir = cache_dir();
        let dir_str = dir.to_string_lossy();
        assert!(dir_str.contains(&format!("v{SCHEMA_VERSION}")));
    }
}
