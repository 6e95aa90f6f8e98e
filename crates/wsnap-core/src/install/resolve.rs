//! Specifier resolver: the node-style manifest protocol cascade described
//! in the install core's component design. Turns a bare specifier into a
//! concrete on-disk `DependencyLocation`.

use super::classify::{is_top_level_package_name, split_package_specifier};
use super::manifest::{is_reserved_package, PackageManifest, RESERVED_PACKAGE_PREFIXES};
use crate::resolver::{resolve_v0, ResolveContext, ResolverConfig, ResolveStatus};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Js,
    Asset,
    Ignore,
}

#[derive(Debug, Clone)]
pub struct DependencyLocation {
    pub kind: DependencyKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub enum ResolveError {
    /// Cascade exhausted all four strategies.
    ResolutionFailure { specifier: String, hint: Option<String> },
    /// Export map subpath present but its resolved value is not a string.
    ExportMapMismatch { package: String, subpath: String },
    /// Reserved package name (obsolete workaround).
    ObsoletePackage { package: String },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResolutionFailure { specifier, hint } => {
                write!(f, "cannot resolve '{specifier}'")?;
                if let Some(hint) = hint {
                    write!(f, " (tried: {hint})")?;
                }
                Ok(())
            }
            Self::ExportMapMismatch { package, subpath } => {
                write!(f, "export map entry for '{package}' subpath '{subpath}' is not a string")
            }
            Self::ObsoletePackage { package } => {
                write!(
                    f,
                    "'{package}' is an obsolete workaround package; install the official package instead"
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {}

const JS_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

/// Resolve a bare specifier to a concrete dependency location, rooted at
/// `project_root` (where `node_modules` is expected to live).
///
/// # Errors
/// See [`ResolveError`].
pub fn resolve_specifier(
    specifier: &str,
    project_root: &Path,
) -> Result<DependencyLocation, ResolveError> {
    // Step 1: direct file reference.
    if has_file_extension(specifier) && !is_top_level_package_name(specifier) {
        if let Some(path) = node_resolve(specifier, project_root) {
            let kind = classify_by_extension(&path);
            return Ok(DependencyLocation { kind, path });
        }
    }

    let (pkg_name, subpath) = split_package_specifier(specifier);

    if is_reserved_package(pkg_name) {
        return Err(ResolveError::ObsoletePackage {
            package: pkg_name.to_string(),
        });
    }

    let pkg_dir = node_modules_dir(pkg_name, project_root);

    // Step 2: export map.
    if let Some(pkg_dir) = &pkg_dir {
        if let Some(manifest) = PackageManifest::load(pkg_dir) {
            if manifest.has_exports() {
                match manifest.resolve_export_entry(subpath) {
                    Ok(Some(target)) => {
                        let path = manifest.dir.join(target.trim_start_matches("./"));
                        return Ok(DependencyLocation {
                            kind: DependencyKind::Js,
                            path,
                        });
                    }
                    Ok(None) => {
                        // No matching export key: fall through to step 3/4.
                    }
                    Err(()) => {
                        return Err(ResolveError::ExportMapMismatch {
                            package: pkg_name.to_string(),
                            subpath: subpath.unwrap_or("").to_string(),
                        });
                    }
                }
            }
        }
    }

    // Step 3: package manifest main-field cascade (whole-package specifiers only).
    if subpath.is_none() {
        if let Some(pkg_dir) = &pkg_dir {
            if let Some(manifest) = PackageManifest::load(pkg_dir) {
                let (entry, implicit_index) = manifest
                    .browser_override(specifier)
                    .map(|e| (e, false))
                    .unwrap_or_else(|| manifest.main_entry());

                let entry_path = manifest.dir.join(entry.trim_start_matches("./"));
                match resolve_node_file(&entry_path) {
                    Some(path) => {
                        return Ok(DependencyLocation {
                            kind: DependencyKind::Js,
                            path,
                        });
                    }
                    None if implicit_index && manifest.has_types_field() => {
                        return Ok(DependencyLocation {
                            kind: DependencyKind::Ignore,
                            path: entry_path,
                        });
                    }
                    None => {
                        return Err(ResolveError::ResolutionFailure {
                            specifier: specifier.to_string(),
                            hint: Some(entry_path.display().to_string()),
                        });
                    }
                }
            }
        }
    }

    // Step 4: raw fallback.
    if let Some(path) = node_resolve(specifier, project_root) {
        let kind = classify_by_extension(&path);
        return Ok(DependencyLocation { kind, path });
    }

    Err(ResolveError::ResolutionFailure {
        specifier: specifier.to_string(),
        hint: pkg_dir.map(|p| p.display().to_string()),
    })
}

fn has_file_extension(specifier: &str) -> bool {
    Path::new(specifier)
        .extension()
        .is_some_and(|e| !e.is_empty())
}

fn classify_by_extension(path: &Path) -> DependencyKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if JS_EXTENSIONS.contains(&ext) => DependencyKind::Js,
        _ => DependencyKind::Asset,
    }
}

fn node_modules_dir(pkg_name: &str, project_root: &Path) -> Option<PathBuf> {
    let dir = project_root.join("node_modules").join(pkg_name);
    dir.is_dir().then_some(dir)
}

/// Node-style module lookup: extension probing + directory index, rooted
/// at `project_root`. Reimplemented as a pure filesystem function rather
/// than delegated to a host runtime resolver.
fn node_resolve(specifier: &str, project_root: &Path) -> Option<PathBuf> {
    let config = ResolverConfig::default();
    let ctx = ResolveContext {
        cwd: project_root.to_path_buf(),
        parent: project_root.to_path_buf(),
        channel: "stable".to_string(),
        config: &config,
        pkg_json_cache: None,
    };
    let result = resolve_v0(&ctx, specifier);
    if result.status == ResolveStatus::Resolved {
        result.resolved
    } else {
        None
    }
}

fn resolve_node_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    for ext in ["js", "mjs", "cjs", "json"] {
        let candidate = path.with_extension(ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    if path.is_dir() {
        let index = path.join("index.js");
        if index.is_file() {
            return Some(index);
        }
    }
    None
}

#[must_use]
pub fn reserved_package_prefixes() -> &'static [&'static str] {
    RESERVED_PACKAGE_PREFIXES
}
