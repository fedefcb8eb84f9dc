//! Resolved filesystem roots for a run.

use crate::config::PathsConfig;
use crate::error::{ConfsnapError, Result};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

/// Home and XDG configuration roots that relative paths are resolved against.
///
/// The home directory is the boundary of a run: symlinks leaving it are not
/// followed and backup destinations are laid out relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    home: PathBuf,
    canonical_home: PathBuf,
    xdg_config_home: PathBuf,
}

impl Roots {
    /// Create roots from an explicit home directory.
    ///
    /// `xdg_config_home` defaults to `<home>/.config`.
    ///
    /// # Errors
    /// Returns `NotFound` if `home` is not an existing directory.
    pub fn new(home: impl Into<PathBuf>, xdg_config_home: Option<PathBuf>) -> Result<Self> {
        let home = home.into();

        if !home.is_dir() {
            return Err(ConfsnapError::NotFound {
                what: "home directory".to_string(),
                path: home.display().to_string(),
            });
        }

        let canonical_home = home.canonicalize()?;
        let xdg_config_home = xdg_config_home.unwrap_or_else(|| home.join(".config"));

        Ok(Self {
            home,
            canonical_home,
            xdg_config_home,
        })
    }

    /// Resolve roots from configuration, the environment, and the current user.
    ///
    /// # Errors
    /// Returns `NotFound` if no home directory is configured and none can be
    /// determined for the current user, or if the home directory is missing.
    pub fn from_config(paths: &PathsConfig) -> Result<Self> {
        let home = match &paths.home_dir {
            Some(home) => home.clone(),
            None => BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .ok_or_else(|| ConfsnapError::NotFound {
                    what: "home directory".to_string(),
                    path: "$HOME".to_string(),
                })?,
        };

        let xdg = paths.xdg_config_home.clone().or_else(|| {
            std::env::var_os("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .filter(|p| p.is_absolute())
        });

        Self::new(home, xdg)
    }

    /// The home directory as configured.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The XDG configuration root.
    #[must_use]
    pub fn xdg_config_home(&self) -> &Path {
        &self.xdg_config_home
    }

    /// Whether `path` lies inside the home boundary once symlinks are resolved.
    ///
    /// Paths that cannot be canonicalized (dangling links) are outside.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        path.canonicalize()
            .map(|resolved| resolved.starts_with(&self.canonical_home))
            .unwrap_or(false)
    }

    /// Path relative to home, if `path` is lexically under it.
    #[must_use]
    pub fn relative_to_home<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.home)
            .or_else(|_| path.strip_prefix(&self.canonical_home))
            .ok()
    }

    /// Path relative to the XDG configuration root, if lexically under it.
    #[must_use]
    pub fn relative_to_xdg<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.xdg_config_home).ok()
    }

    /// Path relative to whichever root contains it, home first.
    #[must_use]
    pub fn relative_to_root<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        self.relative_to_home(path).or_else(|| self.relative_to_xdg(path))
    }
}
