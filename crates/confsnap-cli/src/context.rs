//! Run context: configuration, filesystem roots and the resolver stack.

use crate::cli::DiscoveryArgs;
use anyhow::{bail, Context, Result};
use confsnap_core::{AppConfig, Roots, Timestamp};
use confsnap_hints::{HintsLoader, HintsStore};
use confsnap_resolver::{CommandResearcher, StaticResearcher, TieredResolver};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hints database file name inside the data directory.
pub const HINTS_FILE: &str = "app-hints.toml";

/// Load configuration from `--config` or the default location, apply
/// environment overrides and validate.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    config.apply_env();
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Directory holding the bundled hints and rule files.
///
/// Uses `paths.data_dir` when configured, otherwise the first `data/`
/// directory containing a hints database found walking up from the current
/// directory or the executable, otherwise `data`.
pub fn data_dir(config: &AppConfig) -> PathBuf {
    if let Some(dir) = &config.paths.data_dir {
        return dir.clone();
    }

    let starts = [
        std::env::current_dir().ok(),
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf)),
    ];

    for start in starts.into_iter().flatten() {
        if let Some(found) = find_data_dir(&start) {
            debug!(path = %found.display(), "found data directory");
            return found;
        }
    }

    PathBuf::from("data")
}

fn find_data_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("data"))
        .find(|candidate| candidate.join(HINTS_FILE).is_file())
}

/// Default hints database location.
pub fn hints_path(config: &AppConfig, explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| data_dir(config).join(HINTS_FILE), Path::to_path_buf)
}

/// Backup output directory: explicit, configured, or a fresh timestamped
/// directory under the home directory.
pub fn output_dir(config: &AppConfig, roots: &Roots, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| config.paths.output_dir.clone())
        .unwrap_or_else(|| {
            roots
                .home()
                .join("confsnap-backups")
                .join(Timestamp::now().to_compact())
        })
}

/// Load the hints database. A missing or unparsable database is fatal;
/// rejected entries are only logged.
pub fn load_hints(path: &Path) -> Result<HintsStore> {
    let loader = HintsLoader::new(path)
        .with_context(|| format!("hints database not found at {}", path.display()))?;
    let store = HintsStore::new();
    let report = store
        .reload(&loader)
        .with_context(|| format!("failed to load hints from {}", path.display()))?;

    if !report.rejected.is_empty() {
        warn!(
            rejected = report.rejected.len(),
            "some hint entries were rejected; run `confsnap validate-hints` for details"
        );
    }
    Ok(store)
}

/// Build the tiered resolver from configuration and command-line options.
pub fn build_resolver(
    config: &AppConfig,
    roots: &Roots,
    args: &DiscoveryArgs,
) -> Result<TieredResolver> {
    let hints = load_hints(&hints_path(config, args.hints.as_deref()))?;

    let mut resolver = TieredResolver::new(hints, roots.clone()).with_config(&config.discovery);
    if args.no_conventions {
        resolver = resolver.with_conventions(false);
    }

    if let Some(fixture) = &args.research_fixture {
        let researcher = StaticResearcher::from_fixture(fixture)
            .with_context(|| format!("failed to load research fixture {}", fixture.display()))?;
        info!(path = %fixture.display(), "tier-3 research from fixture");
        return Ok(resolver.with_researcher(Arc::new(researcher)));
    }

    let command = if args.research_command.is_empty() {
        if !config.discovery.research_enabled {
            return Ok(resolver);
        }
        &config.discovery.research_command
    } else {
        &args.research_command
    };

    if command.is_empty() {
        bail!("research is enabled but discovery.research_command is empty");
    }

    let researcher = CommandResearcher::new(command).context("invalid research command")?;
    info!(program = %command[0], "tier-3 research via external command");
    Ok(resolver.with_researcher(Arc::new(researcher)))
}
