//! Front-end dependency installer: discover every bare module specifier an
//! app imports, resolve each to a concrete on-disk entry point, and emit a
//! flat directory of ES modules plus an import map.
//!
//! Pipeline: enumerate -> scan -> aggregate -> resolve -> bundle -> emit.

pub mod aggregate;
pub mod alias;
pub mod bundle;
pub mod classify;
pub mod config;
pub mod enumerate;
pub mod load;
pub mod lockfile;
pub mod manifest;
pub mod resolve;
pub mod scan;
pub mod target;

pub use config::{InstallConfig, InstallOptions, RollupOptions};
pub use lockfile::{ImportMap, IMPORT_MAP_FILENAME};
pub use target::InstallTarget;

use self::alias::build_aliases;
use self::resolve::DependencyLocation;
use crate::Error;
use tracing::{debug, info, warn};

/// Install pipeline state, advanced strictly forward until it reaches a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Idle,
    Enumerating,
    Scanning,
    Aggregating,
    Resolving,
    Bundling,
    Emitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct InstallStats {
    pub files_scanned: usize,
    pub targets_found: usize,
    pub targets_bundled: usize,
    pub targets_skipped: usize,
}

/// The outcome of one install run.
pub struct InstallResult {
    pub success: bool,
    pub has_error: bool,
    pub state: InstallState,
    pub import_map: ImportMap,
    pub new_lockfile: ImportMap,
    pub stats: InstallStats,
    pub errors: Vec<Error>,
}

impl InstallResult {
    fn failed(state: InstallState, error: Error) -> Self {
        Self {
            success: false,
            has_error: true,
            state,
            import_map: ImportMap::new(),
            new_lockfile: ImportMap::new(),
            stats: InstallStats::default(),
            errors: vec![error],
        }
    }
}

/// Run the full install pipeline for `config`.
///
/// Never panics on a bad project; per-target failures (unresolved
/// specifiers, bundler errors) are collected into `errors` and skip only
/// that target. Configuration failures are fatal and short-circuit before
/// anything is written to disk.
#[must_use]
pub fn install(config: &InstallConfig) -> InstallResult {
    if let Err(e) = config.validate() {
        warn!(error = %e, "install configuration invalid");
        return InstallResult::failed(InstallState::Failed, e);
    }

    let mut errors = Vec::new();

    info!(mounts = config.mount.len(), "enumerating project files");
    let files = enumerate::enumerate_files(&config.mount, &config.exclude);
    debug!(files = files.len(), "enumeration complete");

    info!("scanning files for import specifiers");
    let mut scanned = Vec::new();
    for file in &files {
        match load::load_source(file) {
            Ok(load::LoadOutcome::Loaded(src)) => {
                scanned.extend(scan::scan_file(&src.base_ext, &src.contents));
            }
            Ok(load::LoadOutcome::Skipped) => {}
            Ok(load::LoadOutcome::IgnoreWarning { path }) => {
                warn!(path = %path.display(), "ignored file with unrecognized extension");
                errors.push(Error::other(format!(
                    "ignored unrecognized file: {}",
                    path.display()
                )));
            }
            Err(e) => {
                warn!(file = %file.display(), error = %e, "failed to read file");
                errors.push(Error::from(e));
            }
        }
    }
    let files_scanned = files.len();
    debug!(specifiers = scanned.len(), "scan complete");

    info!("aggregating install targets");
    let aliases = build_aliases(&config.alias);
    let targets = aggregate::aggregate(
        scanned,
        &config.known_entrypoints,
        &config.web_dependencies,
        &aliases,
        &config.install_options.external_package,
    );
    let targets_found = targets.len();
    debug!(targets = targets_found, "aggregation complete");

    // A specifier already keyed in the lockfile bypasses resolution and
    // bundling entirely; its lockfile URL is carried over unchanged.
    let dest = config.project_root.join(&config.install_options.dest);
    let lockfile = ImportMap::read(&dest.join(IMPORT_MAP_FILENAME)).unwrap_or_default();

    let mut import_map = ImportMap::new();
    let mut targets_bundled = 0;
    let mut targets_skipped = 0;
    let mut seen_circular = false;

    info!("resolving install targets");
    let mut resolved: Vec<(InstallTarget, DependencyLocation)> = Vec::new();
    for target in targets {
        if let Some(url) = lockfile.imports.get(&target.specifier) {
            debug!(specifier = %target.specifier, "bypassed by lockfile");
            import_map.imports.insert(target.specifier.clone(), url.clone());
            continue;
        }
        match resolve::resolve_specifier(&target.specifier, &config.project_root) {
            Ok(location) => resolved.push((target, location)),
            Err(e) => {
                warn!(specifier = %target.specifier, error = %e, "failed to resolve specifier");
                errors.push(Error::from(e));
            }
        }
    }

    info!(dest = %dest.display(), "emitting output directory");
    if dest.is_dir() {
        if let Err(e) = std::fs::remove_dir_all(&dest) {
            return InstallResult::failed(
                InstallState::Emitting,
                Error::other(format!("failed to clear destination {}: {e}", dest.display())),
            );
        }
    }

    info!(count = resolved.len(), "bundling resolved targets");
    for (target, location) in &resolved {
        match bundle::bundle_one(&target.specifier, location, config) {
            Ok(Some(output)) => match bundle::write_output(&dest, &output) {
                Ok(_path) => {
                    let rel = dest_relative_specifier(&output.filename);
                    import_map.imports.insert(target.specifier.clone(), rel);
                    classify_warnings(&target.specifier, &output.warnings, &mut errors, &mut seen_circular);
                    targets_bundled += 1;
                }
                Err(e) => {
                    warn!(specifier = %target.specifier, error = %e, "failed to write output");
                    errors.push(Error::other(format!(
                        "failed to write output for '{}': {e}",
                        target.specifier
                    )));
                    targets_skipped += 1;
                }
            },
            Ok(None) => {
                targets_skipped += 1;
            }
            Err(e) => {
                warn!(specifier = %target.specifier, error = %e, "bundler failed on target");
                errors.push(e);
                targets_skipped += 1;
            }
        }
    }

    let lockfile_path = dest.join(IMPORT_MAP_FILENAME);
    if let Err(e) = import_map.write_atomic(&lockfile_path) {
        return InstallResult::failed(
            InstallState::Emitting,
            Error::other(format!("failed to write lockfile: {e}")),
        );
    }

    info!(
        bundled = targets_bundled,
        skipped = targets_skipped,
        "install succeeded"
    );

    InstallResult {
        success: true,
        has_error: !errors.is_empty(),
        state: InstallState::Succeeded,
        import_map: import_map.clone(),
        new_lockfile: import_map,
        stats: InstallStats {
            files_scanned,
            targets_found,
            targets_bundled,
            targets_skipped,
        },
        errors,
    }
}

/// Apply the bundler's warning policy: circular-dependency warnings report
/// only once per install run, unresolved-module warnings are upgraded to
/// fatal errors with the path normalized to forward slashes, everything
/// else passes through unchanged.
fn classify_warnings(specifier: &str, warnings: &[String], errors: &mut Vec<Error>, seen_circular: &mut bool) {
    for warning in warnings {
        let lower = warning.to_lowercase();
        if lower.contains("circular") {
            if !*seen_circular {
                errors.push(Error::CircularDependency(warning.clone()));
                *seen_circular = true;
            }
        } else if lower.contains("unresolved") {
            errors.push(Error::UnresolvedModule {
                specifier: specifier.to_string(),
            });
        } else {
            errors.push(Error::other(warning.clone()));
        }
    }
}

fn dest_relative_specifier(filename: &str) -> String {
    format!("./{filename}")
}
