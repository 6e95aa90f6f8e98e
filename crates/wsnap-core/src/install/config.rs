//! The installer's own configuration surface, distinct from the ambient
//! runtime [`crate::Config`]. Mirrors the mount/exclude/alias/entrypoint
//! shape a project declares for its install step.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Rollup-specific passthrough knobs, kept as a nested struct since they
/// apply only to the bundling stage.
#[derive(Debug, Clone, Default)]
pub struct RollupOptions {
    pub dedupe: Vec<String>,
    /// Opaque plugin names; actual plugin wiring happens in the bundler.
    pub plugins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub dest: PathBuf,
    pub env: BTreeMap<String, Option<String>>,
    pub external_package: Vec<String>,
    pub source_map: bool,
    pub treeshake: bool,
    pub install_types: bool,
    pub named_exports: BTreeMap<String, Vec<String>>,
    pub rollup: RollupOptions,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            dest: PathBuf::from("web_modules"),
            env: BTreeMap::new(),
            external_package: Vec::new(),
            source_map: false,
            treeshake: false,
            install_types: false,
            named_exports: BTreeMap::new(),
            rollup: RollupOptions::default(),
        }
    }
}

/// Top-level install configuration: where to look, what to skip, how to
/// rewrite specifiers, and what to force-include beyond what scanning finds.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub project_root: PathBuf,
    pub mount: Vec<PathBuf>,
    pub exclude: Vec<String>,
    pub alias: BTreeMap<String, String>,
    pub known_entrypoints: Vec<String>,
    pub web_dependencies: Vec<String>,
    pub install_options: InstallOptions,
}

impl InstallConfig {
    #[must_use]
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            mount: vec![project_root.clone()],
            project_root,
            exclude: vec!["**/node_modules/**".to_string()],
            alias: BTreeMap::new(),
            known_entrypoints: Vec::new(),
            web_dependencies: Vec::new(),
            install_options: InstallOptions::default(),
        }
    }

    /// Validate the configuration, matching the `ConfigInvalid` error kind.
    ///
    /// # Errors
    /// Returns an error describing the first invalid field found.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.mount.is_empty() {
            return Err(crate::Error::ConfigInvalid(
                "at least one mount directory is required".to_string(),
            ));
        }
        for dir in &self.mount {
            if !dir.is_dir() {
                return Err(crate::Error::ConfigInvalid(format!(
                    "mount directory does not exist: {}",
                    dir.display()
                )));
            }
        }
        if self.install_options.dest.as_os_str().is_empty() {
            return Err(crate::Error::ConfigInvalid(
                "installOptions.dest must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
