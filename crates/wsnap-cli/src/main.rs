#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use commands::install::InstallArgs;
use miette::Result;
use std::path::PathBuf;
use wsnap_core::Config;

#[derive(Parser, Debug)]
#[command(name = "wsnap")]
#[command(author, version, about = "Installs third-party imports into a flat directory of ES modules", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Scan imports, resolve dependencies, and emit web_modules/
    Install {
        /// Output directory, relative to the project root
        #[arg(long)]
        dest: Option<PathBuf>,

        /// Additional exclusion globs, applied during enumeration
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Package prefixes to leave unbundled
        #[arg(long = "external", value_delimiter = ',')]
        external_package: Vec<String>,

        /// Emit source maps alongside bundled output
        #[arg(long)]
        source_map: bool,

        /// Enable tree-shaking in the bundler
        #[arg(long)]
        treeshake: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    if matches!(cli.command, Some(Commands::Version)) {
        return commands::version::run();
    }

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Install {
            dest,
            exclude,
            external_package,
            source_map,
            treeshake,
        }) => {
            let args = InstallArgs {
                dest,
                exclude,
                external_package,
                source_map,
                treeshake,
            };
            commands::install::run(&config, &args, cli.json)
        }
        Some(Commands::Version) => unreachable!("handled above"),
        None => {
            let args = InstallArgs {
                dest: None,
                exclude: Vec::new(),
                external_package: Vec::new(),
                source_map: false,
                treeshake: false,
            };
            commands::install::run(&config, &args, cli.json)
        }
    }
}
