//! CLI definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Confsnap - application configuration discovery and backup
#[derive(Parser, Debug)]
#[command(
    name = "confsnap",
    author,
    version,
    about = "Discover, filter and back up application configuration",
    long_about = "Confsnap resolves where each installed application keeps its configuration \
                  (curated hints, then standard OS locations, then optional research), copies \
                  what it finds into a permission-hardened backup tree with caches, logs and \
                  credentials filtered out, and writes a consolidated snapshot of the system.",
    after_help = "Examples:\n    \
                  confsnap run --inventory inventory.toml\n    \
                  confsnap run --inventory inventory.json --redact-secrets --output ./backup\n    \
                  confsnap resolve --inventory inventory.toml\n    \
                  confsnap validate-hints data/app-hints.toml"
)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, short = 'c', global = true, env = "CONFSNAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve, back up and snapshot every application in an inventory
    Run(RunArgs),

    /// Resolve configuration locations without copying anything
    Resolve(ResolveArgs),

    /// Load a hints database and report rejected entries
    ValidateHints(ValidateHintsArgs),
}

/// Options shared by commands that resolve applications
#[derive(Args, Debug, Clone)]
pub struct DiscoveryArgs {
    /// Inventory document (TOML, or JSON with a .json extension)
    #[arg(long, short = 'i', value_name = "FILE")]
    pub inventory: PathBuf,

    /// Hints database file or directory (defaults to <data dir>/app-hints.toml)
    #[arg(long, value_name = "PATH")]
    pub hints: Option<PathBuf>,

    /// Disable tier-2 convention scanning
    #[arg(long)]
    pub no_conventions: bool,

    /// External research program and arguments (enables tier 3)
    #[arg(long, value_name = "CMD", num_args = 1.., allow_hyphen_values = true)]
    pub research_command: Vec<String>,

    /// TOML file of canned research answers (enables tier 3 offline)
    #[arg(long, value_name = "FILE", conflicts_with = "research_command")]
    pub research_fixture: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Backup output directory (defaults to ~/confsnap-backups/<timestamp>)
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Directory holding config-patterns.toml and security-patterns.toml
    #[arg(long, value_name = "DIR")]
    pub rules: Option<PathBuf>,

    /// Copy files containing credentials unmodified
    #[arg(long, conflicts_with = "redact_secrets")]
    pub include_secrets: bool,

    /// Copy files containing credentials with every match replaced
    #[arg(long)]
    pub redact_secrets: bool,
}

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,
}

/// Arguments for the validate-hints command
#[derive(Args, Debug)]
pub struct ValidateHintsArgs {
    /// Hints database file or directory (defaults to <data dir>/app-hints.toml)
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "confsnap",
            "--verbose",
            "run",
            "--inventory",
            "inventory.toml",
            "--redact-secrets",
            "--research-command",
            "agent",
            "--json",
        ])
        .expect("valid arguments");

        assert!(cli.verbose);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.discovery.inventory, PathBuf::from("inventory.toml"));
        assert!(args.redact_secrets);
        assert_eq!(args.discovery.research_command, vec!["agent", "--json"]);
    }

    #[test]
    fn test_secret_flags_conflict() {
        let result = Cli::try_parse_from([
            "confsnap",
            "run",
            "--inventory",
            "inventory.toml",
            "--include-secrets",
            "--redact-secrets",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_validate_hints_without_path() {
        let cli = Cli::try_parse_from(["confsnap", "validate-hints"]).expect("valid arguments");
        let Commands::ValidateHints(args) = cli.command else {
            panic!("expected validate-hints command");
        };
        assert!(args.path.is_none());
    }
}
