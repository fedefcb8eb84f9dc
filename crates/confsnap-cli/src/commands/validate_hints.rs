//! Validate-hints command implementation
//!
//! Loads a hints database the same way a run does and reports every entry
//! the loader rejected.

use crate::cli::ValidateHintsArgs;
use crate::context::hints_path;
use anyhow::{Context, Result};
use confsnap_core::AppConfig;
use confsnap_hints::{HintsLoader, LoadReport};

/// Run validate-hints command. Returns whether every entry was accepted.
pub fn run(config: &AppConfig, args: &ValidateHintsArgs) -> Result<bool> {
    let path = hints_path(config, args.path.as_deref());
    let loader = HintsLoader::new(&path)
        .with_context(|| format!("hints database not found at {}", path.display()))?;
    let report = loader
        .load_all()
        .with_context(|| format!("failed to load hints from {}", path.display()))?;

    for line in render(&report) {
        println!("{line}");
    }
    Ok(report.rejected.is_empty())
}

fn render(report: &LoadReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} entries loaded, {} rejected",
        report.entries.len(),
        report.rejected.len()
    )];
    for rejected in &report.rejected {
        lines.push(format!(
            "  {} ({}): {}",
            rejected.key,
            rejected.source.display(),
            rejected.reason
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reports_rejected_entries() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("hints.toml");
        std::fs::write(
            &path,
            "[git]\nconfiguration_files = [\".gitconfig\"]\n\n\
             [broken]\nconfiguration_files = [\"~/.brokenrc\"]\n",
        )
        .expect("write hints");

        let args = ValidateHintsArgs { path: Some(path) };
        let valid = run(&AppConfig::default(), &args).expect("load hints");
        assert!(!valid);

        let report = HintsLoader::new(tmp.path().join("hints.toml"))
            .expect("loader")
            .load_all()
            .expect("load hints");
        let lines = render(&report);
        assert_eq!(lines[0], "1 entries loaded, 1 rejected");
        assert!(lines[1].starts_with("  broken ("));
    }

    #[test]
    fn test_clean_database_is_valid() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("hints.toml");
        std::fs::write(&path, "[git]\nconfiguration_files = [\".gitconfig\"]\n")
            .expect("write hints");

        let args = ValidateHintsArgs { path: Some(path) };
        assert!(run(&AppConfig::default(), &args).expect("load hints"));
    }
}
