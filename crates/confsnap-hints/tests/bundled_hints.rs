use confsnap_core::{AppKey, InstallMethod, Roots};
use confsnap_hints::{HintsLoader, HintsStore};
use std::path::PathBuf;
use tempfile::TempDir;

fn bundled_hints_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("data")
        .join("app-hints.toml")
}

#[test]
fn test_bundled_database_loads_without_rejections() {
    let loader = HintsLoader::new(bundled_hints_path()).expect("bundled hints exist");
    let report = loader.load_all().expect("load bundled hints");

    assert!(
        report.rejected.is_empty(),
        "bundled hints rejected: {:?}",
        report.rejected
    );
    assert!(report.entries.len() >= 20);
}

#[test]
fn test_bundled_database_iterm2_entry() {
    let loader = HintsLoader::new(bundled_hints_path()).expect("bundled hints exist");
    let store = HintsStore::load_from(&loader).expect("load store");

    let key = AppKey::from_name("iTerm2").expect("derive key");
    let hint = store.get(&key).expect("iterm2 hint");
    assert_eq!(hint.install_method, InstallMethod::Cask);
    assert_eq!(hint.bundle_id.as_deref(), Some("com.googlecode.iterm2"));
    assert_eq!(hint.home_relative_paths.len(), 2);
}

#[test]
fn test_resolved_paths_stay_under_roots() {
    let home = TempDir::new().expect("create temp dir");
    let roots = Roots::new(home.path(), None).expect("create roots");

    let loader = HintsLoader::new(bundled_hints_path()).expect("bundled hints exist");
    let store = HintsStore::load_from(&loader).expect("load store");

    for hint in store.get_all() {
        for path in hint.resolve_paths(&roots) {
            assert!(
                path.starts_with(home.path()),
                "{} escapes home: {}",
                hint.key,
                path.display()
            );
        }
    }
}
