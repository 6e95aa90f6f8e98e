use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::{info, warn};
use wsnap_core::install::InstallConfig;
use wsnap_core::Config;

/// Flags that shape the install configuration, gathered from CLI args.
pub struct InstallArgs {
    pub dest: Option<PathBuf>,
    pub exclude: Vec<String>,
    pub external_package: Vec<String>,
    pub source_map: bool,
    pub treeshake: bool,
}

pub fn run(config: &Config, args: &InstallArgs, json: bool) -> Result<()> {
    let mut install_config = InstallConfig::new(config.cwd.clone());
    if !args.exclude.is_empty() {
        install_config.exclude.extend(args.exclude.iter().cloned());
    }
    if let Some(dest) = &args.dest {
        install_config.install_options.dest = dest.clone();
    }
    install_config
        .install_options
        .external_package
        .extend(args.external_package.iter().cloned());
    install_config.install_options.source_map = args.source_map;
    install_config.install_options.treeshake = args.treeshake;

    info!(cwd = %config.cwd.display(), "running install");
    let result = wsnap_core::install::install(&install_config);

    for err in &result.errors {
        warn!("{err}");
    }

    if json {
        let payload = serde_json::json!({
            "success": result.success,
            "hasError": result.has_error,
            "importMap": result.import_map.imports,
            "stats": {
                "filesScanned": result.stats.files_scanned,
                "targetsFound": result.stats.targets_found,
                "targetsBundled": result.stats.targets_bundled,
                "targetsSkipped": result.stats.targets_skipped,
            },
            "errors": result.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload).into_diagnostic()?);
    } else {
        println!(
            "installed {} of {} discovered specifiers into {}",
            result.import_map.imports.len(),
            result.stats.targets_found,
            install_config.install_options.dest.display()
        );
        if result.has_error {
            println!("{} warning(s) (see above)", result.errors.len());
        }
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
