//! Restoration bundles: one install manifest per package manager.
//!
//! Each bundle is a plain list transformation of inventory data. Bundles
//! with no entries are not written, so the bundle directory only lists
//! managers that actually have something to restore.

use crate::error::{Result, SnapshotError};
use crate::inventory::{Inventory, Package};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Subdirectory of the output root holding the bundles.
pub const BUNDLES_DIR: &str = "bundles";

/// One restoration manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// File name under the bundles directory
    pub file_name: &'static str,
    /// How to replay the file
    pub restore_hint: &'static str,
    /// Manifest lines
    pub lines: Vec<String>,
}

impl Bundle {
    fn new(file_name: &'static str, restore_hint: &'static str, lines: Vec<String>) -> Self {
        Self {
            file_name,
            restore_hint,
            lines,
        }
    }

    /// Whether the bundle has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// File contents: a comment header followed by one entry per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("# {}\n", self.restore_hint);
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Build every bundle for an inventory, empty ones included.
#[must_use]
pub fn bundles(inventory: &Inventory) -> Vec<Bundle> {
    let packages = &inventory.global_packages;
    let extensions = &inventory.editor_extensions;
    let runtimes = &inventory.runtime_versions;

    vec![
        Bundle::new(
            "Brewfile",
            "Restore with: brew bundle install --file=Brewfile",
            brewfile(inventory),
        ),
        Bundle::new(
            "MASApps.txt",
            "Restore each line with: mas install <id>",
            inventory
                .mas
                .iter()
                .map(|app| format!("{} # {}", app.id, app.name))
                .collect(),
        ),
        Bundle::new(
            "NPMGlobalPackages.txt",
            "Restore each line with: npm install -g <package>",
            pinned(&packages.npm, "@"),
        ),
        Bundle::new(
            "PipPackages.txt",
            "Restore with: pip install -r PipPackages.txt",
            pinned(&packages.pip, "=="),
        ),
        Bundle::new(
            "PipxPackages.txt",
            "Restore each line with: pipx install <package>",
            names(&packages.pipx),
        ),
        Bundle::new(
            "CargoPackages.txt",
            "Restore each line with: cargo install <crate>",
            pinned(&packages.cargo, "@"),
        ),
        Bundle::new(
            "GemPackages.txt",
            "Restore each line with: gem install <gem>",
            pinned(&packages.gem, ":"),
        ),
        Bundle::new(
            "GoPackages.txt",
            "Restore each line with: go install <module>",
            go_modules(&packages.go),
        ),
        Bundle::new(
            "VSCodeExtensions.txt",
            "Restore each line with: code --install-extension <id>",
            extensions.vscode.clone(),
        ),
        Bundle::new(
            "CursorExtensions.txt",
            "Restore each line with: cursor --install-extension <id>",
            extensions.cursor.clone(),
        ),
        Bundle::new(
            "ZedExtensions.txt",
            "Install each extension from the Zed extensions panel",
            extensions.zed.clone(),
        ),
        Bundle::new(
            "PythonVersions.txt",
            "Restore each line with: pyenv install <version>",
            runtimes.python.clone(),
        ),
        Bundle::new(
            "NodeVersions.txt",
            "Restore each line with: nvm install <version>",
            runtimes.node.clone(),
        ),
        Bundle::new(
            "RubyVersions.txt",
            "Restore each line with: rbenv install <version>",
            runtimes.ruby.clone(),
        ),
    ]
}

fn brewfile(inventory: &Inventory) -> Vec<String> {
    let brew = &inventory.homebrew;
    let taps = brew.taps.iter().map(|tap| format!("tap \"{tap}\""));
    let formulae = brew.formulae.iter().map(|f| format!("brew \"{}\"", f.name));
    let casks = brew.casks.iter().map(|c| format!("cask \"{}\"", c.name));
    let mas = inventory
        .mas
        .iter()
        .map(|app| format!("mas \"{}\", id: {}", app.name.replace('"', "'"), app.id));

    taps.chain(formulae).chain(casks).chain(mas).collect()
}

fn names(packages: &[Package]) -> Vec<String> {
    packages.iter().map(|p| p.name.clone()).collect()
}

fn pinned(packages: &[Package], separator: &str) -> Vec<String> {
    packages
        .iter()
        .map(|p| match &p.version {
            Some(version) => format!("{}{separator}{version}", p.name),
            None => p.name.clone(),
        })
        .collect()
}

fn go_modules(packages: &[Package]) -> Vec<String> {
    packages
        .iter()
        .map(|p| format!("{}@{}", p.name, p.version.as_deref().unwrap_or("latest")))
        .collect()
}

/// Writes restoration bundles under `<output>/bundles/`.
#[derive(Debug, Clone)]
pub struct BundleWriter {
    dir: PathBuf,
}

impl BundleWriter {
    /// Create a writer for an output root.
    #[must_use]
    pub fn new(output_root: impl AsRef<Path>) -> Self {
        Self {
            dir: output_root.as_ref().join(BUNDLES_DIR),
        }
    }

    /// Directory the bundles are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every non-empty bundle and return the written paths.
    ///
    /// # Errors
    /// Returns error if the directory or a file can't be written.
    pub fn write_all(&self, inventory: &Inventory) -> Result<Vec<PathBuf>> {
        let pending: Vec<Bundle> = bundles(inventory)
            .into_iter()
            .filter(|bundle| !bundle.is_empty())
            .collect();

        if pending.is_empty() {
            debug!("inventory has nothing to bundle");
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(&self.dir).map_err(|e| SnapshotError::write(&self.dir, e))?;

        let mut written = Vec::with_capacity(pending.len());
        for bundle in &pending {
            let path = self.dir.join(bundle.file_name);
            std::fs::write(&path, bundle.render()).map_err(|e| SnapshotError::write(&path, e))?;
            debug!(path = %path.display(), entries = bundle.lines.len(), "wrote bundle");
            written.push(path);
        }

        info!(dir = %self.dir.display(), bundles = written.len(), "wrote restoration bundles");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::MasApp;
    use tempfile::TempDir;

    fn find<'a>(bundles: &'a [Bundle], name: &str) -> &'a Bundle {
        bundles
            .iter()
            .find(|b| b.file_name == name)
            .expect("bundle exists")
    }

    #[test]
    fn test_brewfile_lines() {
        let mut inventory = Inventory::default();
        inventory.homebrew.taps.push("homebrew/cask-fonts".to_string());
        inventory.homebrew.formulae.push(Package::new("git").with_version("2.44.0"));
        inventory.homebrew.casks.push(Package::new("docker"));
        inventory.mas.push(MasApp {
            id: 409_183_694,
            name: "Keynote".to_string(),
        });

        let all = bundles(&inventory);
        assert_eq!(
            find(&all, "Brewfile").lines,
            vec![
                "tap \"homebrew/cask-fonts\"",
                "brew \"git\"",
                "cask \"docker\"",
                "mas \"Keynote\", id: 409183694",
            ]
        );
        assert_eq!(find(&all, "MASApps.txt").lines, vec!["409183694 # Keynote"]);
    }

    #[test]
    fn test_version_pinning() {
        let mut inventory = Inventory::default();
        inventory.global_packages.npm.push(Package::new("typescript").with_version("5.4.2"));
        inventory.global_packages.pip.push(Package::new("httpie").with_version("3.2.2"));
        inventory.global_packages.pipx.push(Package::new("black").with_version("24.2.0"));
        inventory.global_packages.go.push(Package::new("golang.org/x/tools/gopls"));

        let all = bundles(&inventory);
        assert_eq!(find(&all, "NPMGlobalPackages.txt").lines, vec!["typescript@5.4.2"]);
        assert_eq!(find(&all, "PipPackages.txt").lines, vec!["httpie==3.2.2"]);
        assert_eq!(find(&all, "PipxPackages.txt").lines, vec!["black"]);
        assert_eq!(find(&all, "GoPackages.txt").lines, vec!["golang.org/x/tools/gopls@latest"]);
    }

    #[test]
    fn test_render_has_header() {
        let bundle = Bundle::new("X.txt", "hint", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(bundle.render(), "# hint\na\nb\n");
    }

    #[test]
    fn test_write_skips_empty_bundles() {
        let tmp = TempDir::new().expect("create temp dir");
        let mut inventory = Inventory::default();
        inventory.editor_extensions.vscode.push("rust-lang.rust-analyzer".to_string());
        inventory.runtime_versions.python.push("3.12.2".to_string());

        let writer = BundleWriter::new(tmp.path());
        let written = writer.write_all(&inventory).expect("write bundles");

        let names: Vec<String> = written
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(names, vec!["VSCodeExtensions.txt", "PythonVersions.txt"]);
        assert!(!tmp.path().join("bundles").join("Brewfile").exists());

        let contents =
            std::fs::read_to_string(tmp.path().join("bundles").join("VSCodeExtensions.txt"))
                .expect("read bundle");
        assert!(contents.ends_with("rust-lang.rust-analyzer\n"));
    }

    #[test]
    fn test_empty_inventory_writes_nothing() {
        let tmp = TempDir::new().expect("create temp dir");
        let written = BundleWriter::new(tmp.path())
            .write_all(&Inventory::default())
            .expect("write bundles");
        assert!(written.is_empty());
        assert!(!tmp.path().join("bundles").exists());
    }
}
