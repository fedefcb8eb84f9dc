//! Resolve command implementation
//!
//! Runs the tier cascade for every application in the inventory and prints
//! where each one's configuration was found, without copying anything.

use crate::cli::ResolveArgs;
use crate::context::build_resolver;
use anyhow::{Context, Result};
use confsnap_core::{AppConfig, Roots};
use confsnap_resolver::DiscoveryOutcome;
use confsnap_snapshot::Inventory;

/// Run resolve command
pub async fn run(config: &AppConfig, args: ResolveArgs) -> Result<()> {
    let roots = Roots::from_config(&config.paths).context("failed to resolve filesystem roots")?;
    let inventory =
        Inventory::load(&args.discovery.inventory).context("failed to load inventory")?;
    let resolver = build_resolver(config, &roots, &args.discovery)?;

    let outcome = resolver.resolve_all(&inventory.identities()).await;
    for line in render(&outcome) {
        println!("{line}");
    }
    Ok(())
}

/// One line per application, then a totals line.
fn render(outcome: &DiscoveryOutcome) -> Vec<String> {
    let width = outcome
        .resolved
        .iter()
        .map(|c| c.identity.key.as_str().len())
        .chain(
            outcome
                .undiscovered
                .entries()
                .iter()
                .map(|e| e.identity.key.as_str().len()),
        )
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for config in &outcome.resolved {
        lines.push(format!(
            "{:<width$}  tier {} ({}), {} path(s)",
            config.identity.key.as_str(),
            config.tier.number(),
            config.tier.label(),
            config.source_paths.len(),
        ));
        for path in &config.source_paths {
            lines.push(format!("{:<width$}    {}", "", path.display()));
        }
    }
    for entry in outcome.undiscovered.entries() {
        lines.push(format!(
            "{:<width$}  undiscovered ({})",
            entry.identity.key.as_str(),
            entry.reason,
        ));
    }

    let stats = &outcome.stats;
    lines.push(format!(
        "{} applications: {} tier 1, {} tier 2, {} tier 3, {} undiscovered",
        stats.total, stats.tier1, stats.tier2, stats.tier3, stats.undiscovered
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsnap_core::{ApplicationIdentity, InstallMethod, Tier};
    use confsnap_resolver::{
        DiscoveryStats, ResolvedConfig, UndiscoveredEntry, UndiscoveredReason,
    };
    use std::path::PathBuf;

    fn identity(name: &str) -> ApplicationIdentity {
        ApplicationIdentity::new(name, None, InstallMethod::Unknown).expect("valid identity")
    }

    #[test]
    fn test_render_lists_every_application() {
        let mut outcome = DiscoveryOutcome {
            resolved: vec![ResolvedConfig::new(
                identity("git"),
                Tier::Tier1,
                vec![PathBuf::from("/home/u/.gitconfig")],
            )],
            stats: DiscoveryStats {
                total: 2,
                tier1: 1,
                undiscovered: 1,
                ..DiscoveryStats::default()
            },
            ..DiscoveryOutcome::default()
        };
        outcome.undiscovered.record(UndiscoveredEntry::new(
            identity("Ghost"),
            UndiscoveredReason::NoConventionMatch,
        ));

        let lines = render(&outcome);
        assert_eq!(lines[0], "git    tier 1 (hints), 1 path(s)");
        assert_eq!(lines[1], "         /home/u/.gitconfig");
        assert_eq!(lines[2], "ghost  undiscovered (no_convention_match)");
        assert_eq!(
            lines[3],
            "2 applications: 1 tier 1, 0 tier 2, 0 tier 3, 1 undiscovered"
        );
    }
}
