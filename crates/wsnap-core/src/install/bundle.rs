//! Bundling stage: runs each resolved dependency location through the
//! bundler's fixed plugin chain and emits one flat ES module per specifier.

use super::config::InstallConfig;
use super::resolve::{DependencyKind, DependencyLocation};
use crate::bundler::{AliasPlugin, BundleFormat, BundleOptions, Bundler, JsonPlugin, ReplacePlugin, Target};
use std::path::{Path, PathBuf};

/// What the bundler produced for one install target.
pub struct BundledOutput {
    /// Final output filename (extension included), relative to the install
    /// destination.
    pub filename: String,
    pub bytes: Vec<u8>,
    pub warnings: Vec<String>,
}

/// Bundle one resolved dependency into its final output form.
///
/// Asset and ignored locations bypass the bundler entirely: assets are
/// copied verbatim, ignored locations (types-only packages) produce nothing.
///
/// # Errors
/// Returns an error if the bundler fails on the resolved entry point, or if
/// an asset cannot be read.
pub fn bundle_one(
    specifier: &str,
    location: &DependencyLocation,
    config: &InstallConfig,
) -> Result<Option<BundledOutput>, crate::Error> {
    match location.kind {
        DependencyKind::Ignore => Ok(None),
        DependencyKind::Asset => {
            let filename = asset_filename(specifier, &location.path);
            let bytes = std::fs::read(&location.path)?;
            Ok(Some(BundledOutput {
                filename,
                bytes,
                warnings: Vec::new(),
            }))
        }
        DependencyKind::Js => bundle_js(specifier, &location.path, config),
    }
}

/// An asset keeps its real extension (read from the resolved on-disk path,
/// not from the specifier text) so the copied file is still recognizable by
/// extension — `sanitize_name` strips the specifier's own extension.
fn asset_filename(specifier: &str, resolved_path: &Path) -> String {
    let base = super::classify::sanitize_name(specifier);
    match resolved_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}

/// Build the environment-replacement plugin: `process.env.*`,
/// `process.versions.node`, `process.platform`, and the `typeof` guards
/// callers commonly use to branch on them. `NODE_ENV` defaults to
/// `"production"` when the project hasn't declared it.
fn environment_plugin(config: &InstallConfig) -> ReplacePlugin {
    let mut replace = ReplacePlugin::new()
        .replace("process.versions.node", "\"22.0.0\"")
        .replace("process.platform", "\"browser\"")
        .replace("typeof process", "\"object\"")
        .replace("typeof window", "\"object\"")
        .env("NODE_ENV", "production");

    for (key, value) in &config.install_options.env {
        let literal = match value {
            None => std::env::var(key).unwrap_or_default(),
            Some(v) => v.clone(),
        };
        replace = replace.env(key, literal);
    }
    replace
}

fn bundle_js(
    specifier: &str,
    entry: &Path,
    config: &InstallConfig,
) -> Result<Option<BundledOutput>, crate::Error> {
    let mut bundler = Bundler::with_cwd(&config.project_root);
    bundler = bundler.plugin(Box::new(environment_plugin(config)));

    let mut alias = AliasPlugin::new();
    for (from, to) in &config.alias {
        alias = alias.alias(from.clone(), to.clone());
    }
    bundler = bundler.plugin(Box::new(alias));
    bundler = bundler.plugin(Box::new(JsonPlugin));

    let options = BundleOptions {
        format: BundleFormat::Esm,
        minify: false,
        sourcemap: config.install_options.source_map,
        external: config.install_options.external_package.clone(),
        target: Target::ESNext,
        treeshake: config.install_options.treeshake,
        splitting: false,
    };

    let result = bundler
        .bundle(entry, &config.project_root, &options)
        .map_err(|e| crate::Error::BundlerError(e.to_string()))?;

    let filename = format!("{}.js", super::classify::sanitize_name(specifier));
    Ok(Some(BundledOutput {
        filename,
        bytes: result.code.into_bytes(),
        warnings: result.warnings,
    }))
}

/// Write a bundled output under the install destination, creating parent
/// directories as needed. `output.filename` already carries its final
/// extension; this never rewrites it.
///
/// # Errors
/// Returns an error on any filesystem failure.
pub fn write_output(dest: &Path, output: &BundledOutput) -> std::io::Result<PathBuf> {
    let path = dest.join(&output.filename);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &output.bytes)?;
    Ok(path)
}
