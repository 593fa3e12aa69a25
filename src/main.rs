//! geomatrix CLI entry point

use clap::Parser;
use console::style;
use geomatrix::cli::{commands, Cli, Commands};
use geomatrix::config::ConfigManager;
use geomatrix::error::GeoMatrixResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> GeoMatrixResult<()> {
    let cli = Cli::parse();

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = manager.load()?;

    init_logging(cli.verbose, &config.general.log_format);

    match cli.command {
        Commands::Resolve(args) => commands::resolve(args, &config),
        Commands::Matrix(args) => commands::matrix(args, &config),
        Commands::Token(args) => commands::token(args, &config),
        Commands::Cache(args) => commands::cache(args, &config),
        Commands::Config(args) => commands::config(args, &config, &manager),
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `RUST_LOG` overrides
fn init_logging(verbose: u8, format: &str) {
    let level = match verbose {
        0 => "geomatrix=warn",
        1 => "geomatrix=info",
        _ => "geomatrix=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
