//! CLI argument definitions using clap derive

use crate::matrix::MatrixKind;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// geomatrix - cached travel matrices over a rate-limited routing service
///
/// Resolves location identifiers to coordinates and builds duration and
/// distance matrices, routing only pairs it has never seen before.
#[derive(Parser, Debug)]
#[command(name = "geomatrix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "GEOMATRIX_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve identifiers (e.g. postal codes) to coordinates
    Resolve(ResolveArgs),

    /// Build and print the travel matrix for a set of identifiers
    Matrix(MatrixArgs),

    /// Show or refresh the service access token
    Token(TokenArgs),

    /// Inspect or clear the on-disk caches
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Identifiers to resolve
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct MatrixArgs {
    /// Identifiers, in the row/column order to print
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Which matrix to print
    #[arg(short, long, default_value = "duration")]
    pub kind: MatrixKind,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Re-issue calls for pairs left pending by earlier failures
    #[arg(long)]
    pub retry_pending: bool,
}

#[derive(Parser, Debug)]
pub struct TokenArgs {
    /// Request a new token even if the stored one is fresh
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show snapshot size, geocode entries and token state
    Info,

    /// Delete cached matrices and geocode results
    Clear {
        /// Also delete the stored token
        #[arg(long)]
        token: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_resolve() {
        let cli = Cli::parse_from(["geomatrix", "resolve", "338729", "018956"]);
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.ids, vec!["338729", "018956"]);
                assert_eq!(args.format, OutputFormat::Table);
            }
            _ => panic!("expected Resolve command"),
        }
    }

    #[test]
    fn resolve_requires_ids() {
        assert!(Cli::try_parse_from(["geomatrix", "resolve"]).is_err());
    }

    #[test]
    fn cli_parses_matrix() {
        let cli = Cli::parse_from([
            "geomatrix", "matrix", "--kind", "distance", "--format", "json", "1", "2",
        ]);
        match cli.command {
            Commands::Matrix(args) => {
                assert_eq!(args.kind, MatrixKind::Distance);
                assert_eq!(args.format, OutputFormat::Json);
                assert!(!args.retry_pending);
                assert_eq!(args.ids.len(), 2);
            }
            _ => panic!("expected Matrix command"),
        }
    }

    #[test]
    fn matrix_defaults_to_duration() {
        let cli = Cli::parse_from(["geomatrix", "matrix", "1"]);
        match cli.command {
            Commands::Matrix(args) => assert_eq!(args.kind, MatrixKind::Duration),
            _ => panic!("expected Matrix command"),
        }
    }

    #[test]
    fn cli_parses_token_refresh() {
        let cli = Cli::parse_from(["geomatrix", "token", "--refresh"]);
        assert!(matches!(cli.command, Commands::Token(TokenArgs { refresh: true })));
    }

    #[test]
    fn cli_parses_cache_clear() {
        let cli = Cli::parse_from(["geomatrix", "cache", "clear", "--yes"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Clear { token, yes },
            }) => {
                assert!(yes);
                assert!(!token);
            }
            _ => panic!("expected Cache clear"),
        }
    }

    #[test]
    fn cli_parses_config_init() {
        let cli = Cli::parse_from(["geomatrix", "config", "init", "--force"]);
        match cli.command {
            Commands::Config(ConfigArgs {
                action: Some(ConfigAction::Init { force }),
            }) => assert!(force),
            _ => panic!("expected Config init"),
        }
    }

    #[test]
    fn verbose_counts() {
        let cli = Cli::parse_from(["geomatrix", "-vv", "config", "path"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["geomatrix", "cache", "info", "--config", "/tmp/g.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/g.toml")));
    }
}
