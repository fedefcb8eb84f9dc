//! Run command implementation
//!
//! Resolves every application in the inventory, backs up what was found,
//! and writes `state.json`, `undiscovered.json` and the restoration bundles
//! into the output directory.

use crate::cli::RunArgs;
use crate::context::{build_resolver, data_dir, output_dir};
use anyhow::{bail, Context, Result};
use confsnap_backup::BackupExecutor;
use confsnap_core::{AppConfig, Roots, SecretPolicy};
use confsnap_filter::{PatternFilter, PatternRules, SecretScanner, SecurityRules};
use confsnap_snapshot::{BundleWriter, Inventory, Snapshot, SnapshotBuilder};
use std::path::{Path, PathBuf};
use tracing::info;

/// Snapshot file name in the output directory.
pub const STATE_FILE: &str = "state.json";

/// Undiscovered report file name in the output directory.
pub const UNDISCOVERED_FILE: &str = "undiscovered.json";

/// Run the full pipeline. Returns the output directory.
pub async fn run(config: &AppConfig, args: RunArgs) -> Result<PathBuf> {
    let roots = Roots::from_config(&config.paths).context("failed to resolve filesystem roots")?;
    let inventory = Inventory::load(&args.discovery.inventory).context("failed to load inventory")?;
    let resolver = build_resolver(config, &roots, &args.discovery)?;

    let rules_dir = rules_dir(config, args.rules.as_deref())?;
    let filter = PatternFilter::new(&PatternRules::load_or_default(&rules_dir))
        .with_max_file_size(config.filter.max_file_size_bytes);
    let policy = secret_policy(config, &args);
    let scanner = SecretScanner::new(&SecurityRules::load_or_default(&rules_dir), policy);

    let output = output_dir(config, &roots, args.output.as_deref());
    info!(output = %output.display(), policy = ?policy, "starting run");

    let outcome = resolver.resolve_all(&inventory.identities()).await;

    let executor = BackupExecutor::new(&output, roots, filter, scanner);
    let summary = executor
        .backup_all(&outcome.resolved)
        .context("failed to create backup tree")?;

    outcome
        .undiscovered
        .write_report(&output.join(UNDISCOVERED_FILE))
        .context("failed to write undiscovered report")?;

    BundleWriter::new(&output)
        .write_all(&inventory)
        .context("failed to write restoration bundles")?;

    let snapshot = SnapshotBuilder::new(inventory)
        .with_discovery(&outcome)
        .with_backup(summary)
        .with_output_directory(&output)
        .build();
    snapshot
        .write_json(&output.join(STATE_FILE))
        .context("failed to write snapshot")?;

    println!("{}", summary_line(&snapshot));
    println!("Output: {}", output.display());
    Ok(output)
}

/// Rules directory: explicit (must exist) or the data directory.
fn rules_dir(config: &AppConfig, explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(dir) if dir.is_dir() => Ok(dir.to_path_buf()),
        Some(dir) => bail!("rules directory not found at {}", dir.display()),
        None => Ok(data_dir(config)),
    }
}

fn secret_policy(config: &AppConfig, args: &RunArgs) -> SecretPolicy {
    if args.include_secrets {
        SecretPolicy::Include
    } else if args.redact_secrets {
        SecretPolicy::Redact
    } else {
        config.security.secret_policy
    }
}

fn summary_line(snapshot: &Snapshot) -> String {
    let summary = &snapshot.summary;
    let stats = &snapshot.discovery.stats;
    format!(
        "{} apps: {} hints, {} conventions, {} research, {} undiscovered | \
         {} files copied, {} skipped, {} errors, {} secret-filtered",
        stats.total,
        stats.tier1,
        stats.tier2,
        stats.tier3,
        stats.undiscovered,
        summary.config_files_copied,
        summary.config_files_skipped,
        summary.config_errors,
        summary.secrets_filtered,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DiscoveryArgs;
    use tempfile::TempDir;

    fn args(include: bool, redact: bool) -> RunArgs {
        RunArgs {
            discovery: DiscoveryArgs {
                inventory: PathBuf::from("inventory.toml"),
                hints: None,
                no_conventions: false,
                research_command: Vec::new(),
                research_fixture: None,
            },
            output: None,
            rules: None,
            include_secrets: include,
            redact_secrets: redact,
        }
    }

    #[test]
    fn test_secret_policy_flags_override_config() {
        let mut config = AppConfig::default();
        config.security.secret_policy = SecretPolicy::Redact;

        assert_eq!(secret_policy(&config, &args(false, false)), SecretPolicy::Redact);
        assert_eq!(secret_policy(&config, &args(true, false)), SecretPolicy::Include);

        config.security.secret_policy = SecretPolicy::Exclude;
        assert_eq!(secret_policy(&config, &args(false, true)), SecretPolicy::Redact);
    }

    #[test]
    fn test_missing_rules_dir_is_fatal() {
        let tmp = TempDir::new().expect("create temp dir");
        let config = AppConfig::default();

        assert!(rules_dir(&config, Some(&tmp.path().join("missing"))).is_err());
        assert_eq!(
            rules_dir(&config, Some(tmp.path())).expect("existing dir"),
            tmp.path()
        );
    }

    #[tokio::test]
    async fn test_run_writes_artifacts() {
        let home = TempDir::new().expect("create temp dir");
        let work = TempDir::new().expect("create temp dir");

        std::fs::create_dir_all(home.path().join(".toolbox")).expect("create app dir");
        std::fs::write(home.path().join(".toolbox/config.toml"), "theme = \"dark\"\n")
            .expect("write config");

        let hints = work.path().join("hints.toml");
        std::fs::write(&hints, "[broken-entry]\nconfiguration_files = [\"/abs\"]\n")
            .expect("write hints");
        let inventory = work.path().join("inventory.toml");
        std::fs::write(
            &inventory,
            "[[applications]]\nname = \"Toolbox\"\n\n[[applications]]\nname = \"Ghost\"\n\n\
             [homebrew]\nformulae = [\"git\"]\n",
        )
        .expect("write inventory");

        let mut config = AppConfig::default();
        config.paths.home_dir = Some(home.path().to_path_buf());
        config.paths.xdg_config_home = Some(home.path().join(".config"));

        let mut run_args = args(false, false);
        run_args.discovery.inventory = inventory;
        run_args.discovery.hints = Some(hints);
        run_args.rules = Some(work.path().to_path_buf());
        run_args.output = Some(work.path().join("out"));

        let output = run(&config, run_args).await.expect("run completes");

        assert!(output.join(STATE_FILE).is_file());
        assert!(output.join(UNDISCOVERED_FILE).is_file());
        assert!(output.join("bundles/Brewfile").is_file());
        assert!(output
            .join("configs/apps/toolbox/conventions/.toolbox/config.toml")
            .is_file());

        let snapshot = Snapshot::read_json(&output.join(STATE_FILE)).expect("read snapshot");
        assert_eq!(snapshot.discovery.stats.tier2, 1);
        assert_eq!(snapshot.discovery.stats.undiscovered, 1);
        assert_eq!(snapshot.summary.config_files_copied, 1);
    }
}
