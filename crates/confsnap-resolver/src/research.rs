//! Research collaborator interface for tier-3 discovery.
//!
//! Research is best-effort and may be slow or networked, so it sits behind a
//! trait. The resolver never trusts an answer: every returned path is
//! validated and checked for existence before it is used.

use crate::error::{ResearchError, ResearchResult};
use async_trait::async_trait;
use confsnap_core::{AppKey, ApplicationIdentity};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Maximum number of stderr bytes kept in a `CommandFailed` error.
const MAX_STDERR_BYTES: usize = 512;

/// One answer from a research collaborator, shaped like a hint entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchCandidate {
    /// Paths relative to the home directory
    pub configuration_files: Vec<String>,
    /// Paths relative to the XDG configuration root
    pub xdg_configuration_files: Vec<String>,
    /// Globs of files that must not be backed up
    pub exclude_files: Vec<String>,
    /// Free-form notes from the researcher
    pub notes: Option<String>,
}

impl ResearchCandidate {
    /// Whether the candidate names no paths at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configuration_files.is_empty() && self.xdg_configuration_files.is_empty()
    }
}

/// External discovery capability used only for otherwise-unresolved applications.
///
/// Implementations must be thread-safe: the resolver runs several research
/// tasks concurrently.
#[async_trait]
pub trait ResearchCollaborator: Send + Sync {
    /// Research configuration locations for one application.
    ///
    /// # Errors
    /// Returns error if the collaborator fails or its answer can't be decoded.
    async fn research(
        &self,
        identity: &ApplicationIdentity,
    ) -> ResearchResult<Vec<ResearchCandidate>>;

    /// Get the unique identifier for this researcher.
    fn researcher_id(&self) -> &str;
}

/// Researcher backed by an external program.
///
/// The identity is written to the program's stdin as JSON; the program
/// answers with a JSON array of [`ResearchCandidate`] on stdout.
#[derive(Debug, Clone)]
pub struct CommandResearcher {
    program: String,
    args: Vec<String>,
}

impl CommandResearcher {
    /// Create a researcher from an argv list.
    ///
    /// # Errors
    /// Returns `InvalidResponse` if `argv` is empty.
    pub fn new(argv: &[String]) -> ResearchResult<Self> {
        let (program, args) = argv.split_first().ok_or_else(|| ResearchError::InvalidResponse {
            reason: "research command is empty".to_string(),
        })?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait]
impl ResearchCollaborator for CommandResearcher {
    async fn research(
        &self,
        identity: &ApplicationIdentity,
    ) -> ResearchResult<Vec<ResearchCandidate>> {
        let request =
            serde_json::to_vec(identity).map_err(|e| ResearchError::InvalidResponse {
                reason: e.to_string(),
            })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ResearchError::Spawn {
                command: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&request).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let end = stderr
                .char_indices()
                .map(|(i, c)| i + c.len_utf8())
                .take_while(|end| *end <= MAX_STDERR_BYTES)
                .last()
                .unwrap_or(0);
            return Err(ResearchError::CommandFailed {
                command: self.program.clone(),
                status: output.status.to_string(),
                stderr: stderr[..end].to_string(),
            });
        }

        let candidates: Vec<ResearchCandidate> = serde_json::from_slice(&output.stdout)
            .map_err(|e| ResearchError::InvalidResponse {
                reason: e.to_string(),
            })?;

        debug!(
            key = %identity.key,
            candidates = candidates.len(),
            "research command answered"
        );
        Ok(candidates)
    }

    fn researcher_id(&self) -> &str {
        &self.program
    }
}

/// One key in a research fixture file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FixtureEntry {
    configuration_files: Vec<String>,
    xdg_configuration_files: Vec<String>,
    exclude_files: Vec<String>,
    notes: Option<String>,
    fail: bool,
}

/// Researcher with fixed answers per application key.
///
/// Keys without an answer get an empty response. Used for offline runs from
/// a fixture file and as the stand-in collaborator in tests.
#[derive(Debug, Default)]
pub struct StaticResearcher {
    answers: HashMap<AppKey, Vec<ResearchCandidate>>,
    failures: HashSet<AppKey>,
    delays: HashMap<AppKey, Duration>,
    calls: AtomicUsize,
}

impl StaticResearcher {
    /// Create a researcher that knows nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `key` with a candidate.
    #[must_use]
    pub fn with_answer(mut self, key: AppKey, candidate: ResearchCandidate) -> Self {
        self.answers.entry(key).or_default().push(candidate);
        self
    }

    /// Fail every request for `key`.
    #[must_use]
    pub fn with_failure(mut self, key: AppKey) -> Self {
        self.failures.insert(key);
        self
    }

    /// Delay the answer for `key`.
    #[must_use]
    pub fn with_delay(mut self, key: AppKey, delay: Duration) -> Self {
        self.delays.insert(key, delay);
        self
    }

    /// Load answers from a TOML fixture.
    ///
    /// Each table is keyed by application name or key and has the hint entry
    /// fields, plus an optional `fail = true`.
    ///
    /// # Errors
    /// Returns `Fixture` if the file can't be read or parsed.
    pub fn from_fixture(path: &Path) -> ResearchResult<Self> {
        let fixture_error = |reason: String| ResearchError::Fixture {
            path: path.display().to_string(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| fixture_error(e.to_string()))?;
        let entries: HashMap<String, FixtureEntry> =
            toml::from_str(&contents).map_err(|e| fixture_error(e.to_string()))?;

        let mut researcher = Self::new();
        for (raw_key, entry) in entries {
            let key = AppKey::from_name(&raw_key).map_err(|e| fixture_error(e.to_string()))?;
            if entry.fail {
                researcher = researcher.with_failure(key);
                continue;
            }
            researcher = researcher.with_answer(
                key,
                ResearchCandidate {
                    configuration_files: entry.configuration_files,
                    xdg_configuration_files: entry.xdg_configuration_files,
                    exclude_files: entry.exclude_files,
                    notes: entry.notes,
                },
            );
        }

        Ok(researcher)
    }

    /// Number of research requests served so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResearchCollaborator for StaticResearcher {
    async fn research(
        &self,
        identity: &ApplicationIdentity,
    ) -> ResearchResult<Vec<ResearchCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&identity.key) {
            tokio::time::sleep(*delay).await;
        }

        if self.failures.contains(&identity.key) {
            return Err(ResearchError::Failed {
                researcher: self.researcher_id().to_string(),
                reason: format!("no answer for {}", identity.key),
            });
        }

        Ok(self.answers.get(&identity.key).cloned().unwrap_or_default())
    }

    fn researcher_id(&self) -> &str {
        "static"
    }
}
