//! File enumerator: walks mount roots, applies exclusion globs, yields a
//! deduplicated, first-seen-ordered sequence of candidate source files.

use glob::Pattern;
use rustc_hash::FxHashSet as HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Enumerate candidate files across all mount roots.
///
/// `mounts` lists disk directories to walk, in declaration order.
/// `exclude` is a list of glob patterns matched against paths relative to
/// each mount root. The `web_modules/` output namespace is always excluded,
/// and dot-prefixed path segments are always skipped.
#[must_use]
pub fn enumerate_files(mounts: &[PathBuf], exclude: &[String]) -> Vec<PathBuf> {
    let patterns: Vec<Pattern> = exclude
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();

    let mut seen = HashSet::default();
    let mut out = Vec::new();

    for root in mounts {
        for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();

            if is_hidden(path, root) {
                continue;
            }
            if is_web_modules(path, root) {
                continue;
            }

            let rel = path.strip_prefix(root).unwrap_or(path);
            if patterns.iter().any(|p| p.matches_path(rel)) {
                continue;
            }

            let canonical = path.to_path_buf();
            if seen.insert(canonical.clone()) {
                out.push(canonical);
            }
        }
    }

    out
}

fn is_hidden(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}

fn is_web_modules(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .any(|c| c.as_os_str() == "web_modules")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn dedupes_and_skips_hidden_and_web_modules() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::create_dir_all(dir.path().join("web_modules")).unwrap();

        fs::write(dir.path().join("src/index.js"), "").unwrap();
        fs::write(dir.path().join(".git/config"), "").unwrap();
        fs::write(dir.path().join("web_modules/react.js"), "").unwrap();

        let files = enumerate_files(&[dir.path().to_path_buf()], &[]);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/index.js"));
    }

    #[test]
    fn exclusion_globs_are_applied_relative_to_mount() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tests")).unwrap();
        fs::write(dir.path().join("tests/skip.js"), "").unwrap();
        fs::write(dir.path().join("keep.js"), "").unwrap();

        let files = enumerate_files(
            &[dir.path().to_path_buf()],
            &["tests/**".to_string()],
        );
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.js"));
    }
}
