//! Tiered resolver: curated hints, then conventions, then research.
//!
//! Each application moves through `unresolved → tier1 | tier2 | tier3 |
//! undiscovered` exactly once per run. The first tier that yields a result
//! wins and tiers are never combined. Tiers 1 and 2 are synchronous
//! filesystem checks; tier 3 runs in fixed-size concurrent batches with a
//! timeout per task, and a failed task only affects its own application.

use crate::conventions::ConventionScanner;
use crate::research::{ResearchCandidate, ResearchCollaborator};
use crate::undiscovered::{UndiscoveredEntry, UndiscoveredReason, UndiscoveredTracker};
use confsnap_core::{AppKey, ApplicationIdentity, DiscoveryConfig, Roots, Tier};
use confsnap_hints::{check_relative_path, HintsStore};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default number of research tasks in flight at once.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default timeout for one research task.
pub const DEFAULT_RESEARCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration paths resolved for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// The application
    pub identity: ApplicationIdentity,
    /// Tier that produced the paths
    pub tier: Tier,
    /// Absolute paths verified to exist, in resolution order
    pub source_paths: Vec<PathBuf>,
    /// Whether the pattern filter applies (false only for tier 1)
    pub filtered: bool,
    /// Exclusion globs from the hint or research answer
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl ResolvedConfig {
    /// Create a resolved config; `filtered` follows from the tier.
    #[must_use]
    pub fn new(identity: ApplicationIdentity, tier: Tier, source_paths: Vec<PathBuf>) -> Self {
        Self {
            identity,
            tier,
            source_paths,
            filtered: tier.is_filtered(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Attach exclusion globs.
    #[must_use]
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }
}

/// Terminal state of one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    /// Curated hint
    Tier1,
    /// Convention scan
    Tier2,
    /// Research
    Tier3,
    /// No tier matched
    Undiscovered,
}

impl From<Tier> for ResolutionState {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Tier1 => Self::Tier1,
            Tier::Tier2 => Self::Tier2,
            Tier::Tier3 => Self::Tier3,
        }
    }
}

/// Result of resolving one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A tier produced configuration paths
    Resolved(ResolvedConfig),
    /// No tier matched
    Undiscovered(UndiscoveredEntry),
}

impl Resolution {
    /// The terminal state.
    #[must_use]
    pub fn state(&self) -> ResolutionState {
        match self {
            Self::Resolved(config) => config.tier.into(),
            Self::Undiscovered(_) => ResolutionState::Undiscovered,
        }
    }

    /// The application this resolution is for.
    #[must_use]
    pub fn identity(&self) -> &ApplicationIdentity {
        match self {
            Self::Resolved(config) => &config.identity,
            Self::Undiscovered(entry) => &entry.identity,
        }
    }
}

/// Result of running the synchronous tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalResolution {
    /// Tier 1 or 2 decided the outcome
    Done(Resolution),
    /// Only research can still resolve the application
    NeedsResearch {
        /// The application
        identity: ApplicationIdentity,
        /// Convention candidates already checked
        checked: Vec<PathBuf>,
    },
}

/// Per-tier counts for one discovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryStats {
    /// Distinct applications resolved
    pub total: usize,
    /// Applications resolved from hints
    pub tier1: usize,
    /// Applications resolved from conventions
    pub tier2: usize,
    /// Applications resolved from research
    pub tier3: usize,
    /// Applications no tier matched
    pub undiscovered: usize,
    /// Research tasks that errored or timed out
    pub research_failures: usize,
}

impl DiscoveryStats {
    fn record(&mut self, state: ResolutionState) {
        self.total += 1;
        match state {
            ResolutionState::Tier1 => self.tier1 += 1,
            ResolutionState::Tier2 => self.tier2 += 1,
            ResolutionState::Tier3 => self.tier3 += 1,
            ResolutionState::Undiscovered => self.undiscovered += 1,
        }
    }
}

/// Everything one discovery pass produced.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    /// Resolved applications, in input order
    pub resolved: Vec<ResolvedConfig>,
    /// Applications no tier matched, in input order
    pub undiscovered: UndiscoveredTracker,
    /// Per-tier counts
    pub stats: DiscoveryStats,
}

impl DiscoveryOutcome {
    /// Map of application key to terminal state.
    #[must_use]
    pub fn states(&self) -> BTreeMap<AppKey, ResolutionState> {
        let resolved = self
            .resolved
            .iter()
            .map(|config| (config.identity.key.clone(), config.tier.into()));
        let undiscovered = self
            .undiscovered
            .entries()
            .iter()
            .map(|entry| (entry.identity.key.clone(), ResolutionState::Undiscovered));
        resolved.chain(undiscovered).collect()
    }
}

/// Result slot for one research task.
struct ResearchSlot {
    index: usize,
    resolution: Resolution,
    failed: bool,
}

/// Orchestrates the discovery tiers for a set of applications.
pub struct TieredResolver {
    hints: HintsStore,
    conventions: ConventionScanner,
    researcher: Option<Arc<dyn ResearchCollaborator>>,
    conventions_enabled: bool,
    batch_size: usize,
    research_timeout: Duration,
}

impl TieredResolver {
    /// Create a resolver over a hints store and filesystem roots.
    #[must_use]
    pub fn new(hints: HintsStore, roots: Roots) -> Self {
        Self {
            hints,
            conventions: ConventionScanner::new(roots),
            researcher: None,
            conventions_enabled: true,
            batch_size: DEFAULT_BATCH_SIZE,
            research_timeout: DEFAULT_RESEARCH_TIMEOUT,
        }
    }

    /// Apply the discovery section of the application config.
    ///
    /// The research collaborator itself is injected with [`Self::with_researcher`].
    #[must_use]
    pub fn with_config(self, config: &DiscoveryConfig) -> Self {
        self.with_conventions(config.conventions_enabled)
            .with_batch_size(config.research_batch_size)
            .with_research_timeout(Duration::from_secs(config.research_timeout_secs))
    }

    /// Set the tier-3 research collaborator.
    #[must_use]
    pub fn with_researcher(mut self, researcher: Arc<dyn ResearchCollaborator>) -> Self {
        self.researcher = Some(researcher);
        self
    }

    /// Enable or disable convention scanning.
    #[must_use]
    pub fn with_conventions(mut self, enabled: bool) -> Self {
        self.conventions_enabled = enabled;
        self
    }

    /// Set the number of research tasks in flight at once.
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the timeout for one research task.
    #[must_use]
    pub fn with_research_timeout(mut self, timeout: Duration) -> Self {
        self.research_timeout = timeout;
        self
    }

    /// The filesystem roots candidates are resolved against.
    #[must_use]
    pub fn roots(&self) -> &Roots {
        self.conventions.roots()
    }

    /// Run tiers 1 and 2 for one application.
    #[must_use]
    pub fn resolve_local(&self, identity: &ApplicationIdentity) -> LocalResolution {
        if let Some(hint) = self.hints.lookup(&identity.key) {
            let mut source_paths = Vec::new();
            for path in hint.resolve_paths(self.roots()) {
                if path.exists() {
                    source_paths.push(path);
                } else {
                    debug!(key = %identity.key, path = %path.display(), "curated path not on disk");
                }
            }

            if source_paths.is_empty() {
                warn!(
                    key = %identity.key,
                    configured = hint.path_count(),
                    "no curated path exists on disk"
                );
            }

            let config = ResolvedConfig::new(identity.clone(), Tier::Tier1, source_paths)
                .with_exclude_patterns(hint.exclude_patterns);
            return LocalResolution::Done(Resolution::Resolved(config));
        }

        let mut checked = Vec::new();
        if self.conventions_enabled {
            let scan = self.conventions.scan(identity);
            if !scan.found.is_empty() {
                debug!(key = %identity.key, paths = scan.found.len(), "resolved by conventions");
                let config = ResolvedConfig::new(identity.clone(), Tier::Tier2, scan.found);
                return LocalResolution::Done(Resolution::Resolved(config));
            }
            checked = scan.checked;
        }

        if self.researcher.is_some() {
            return LocalResolution::NeedsResearch {
                identity: identity.clone(),
                checked,
            };
        }

        let reason = if self.conventions_enabled {
            UndiscoveredReason::NoConventionMatch
        } else {
            UndiscoveredReason::NoHint
        };
        LocalResolution::Done(Resolution::Undiscovered(
            UndiscoveredEntry::new(identity.clone(), reason).with_checked_paths(checked),
        ))
    }

    /// Resolve one application through every tier.
    pub async fn resolve(&self, identity: &ApplicationIdentity) -> Resolution {
        match self.resolve_local(identity) {
            LocalResolution::Done(resolution) => resolution,
            LocalResolution::NeedsResearch { identity, checked } => {
                self.research_one(0, identity, checked).await.resolution
            }
        }
    }

    /// Resolve a set of applications.
    ///
    /// Duplicate keys are resolved once. Research runs in batches of
    /// `batch_size`; results of a batch are merged only after every task in
    /// it has finished. Output keeps input order.
    pub async fn resolve_all(&self, identities: &[ApplicationIdentity]) -> DiscoveryOutcome {
        let mut seen = HashSet::new();
        let mut slots: Vec<Option<Resolution>> = Vec::new();
        let mut pending = Vec::new();

        for identity in identities {
            if !seen.insert(identity.key.clone()) {
                debug!(key = %identity.key, "skipping duplicate application");
                continue;
            }

            match self.resolve_local(identity) {
                LocalResolution::Done(resolution) => slots.push(Some(resolution)),
                LocalResolution::NeedsResearch { identity, checked } => {
                    pending.push((slots.len(), identity, checked));
                    slots.push(None);
                }
            }
        }

        info!(
            applications = slots.len(),
            needs_research = pending.len(),
            "local discovery complete"
        );

        let mut research_failures = 0;
        let mut batch_number = 0;
        let mut pending = pending.into_iter().peekable();

        while pending.peek().is_some() {
            batch_number += 1;
            let mut futures = FuturesUnordered::new();
            for (index, identity, checked) in pending.by_ref().take(self.batch_size) {
                futures.push(self.research_one(index, identity, checked));
            }

            let mut batch = Vec::with_capacity(futures.len());
            while let Some(slot) = futures.next().await {
                batch.push(slot);
            }

            debug!(batch = batch_number, tasks = batch.len(), "research batch complete");
            for slot in batch {
                if slot.failed {
                    research_failures += 1;
                }
                slots[slot.index] = Some(slot.resolution);
            }
        }

        let mut outcome = DiscoveryOutcome::default();
        for resolution in slots.into_iter().flatten() {
            outcome.stats.record(resolution.state());
            match resolution {
                Resolution::Resolved(config) => outcome.resolved.push(config),
                Resolution::Undiscovered(entry) => outcome.undiscovered.record(entry),
            }
        }
        outcome.stats.research_failures = research_failures;

        info!(
            total = outcome.stats.total,
            tier1 = outcome.stats.tier1,
            tier2 = outcome.stats.tier2,
            tier3 = outcome.stats.tier3,
            undiscovered = outcome.stats.undiscovered,
            "discovery complete"
        );
        outcome
    }

    /// Run one research task and verify its answer.
    async fn research_one(
        &self,
        index: usize,
        identity: ApplicationIdentity,
        mut checked: Vec<PathBuf>,
    ) -> ResearchSlot {
        let Some(researcher) = &self.researcher else {
            return ResearchSlot {
                index,
                resolution: Resolution::Undiscovered(
                    UndiscoveredEntry::new(identity, UndiscoveredReason::NoConventionMatch)
                        .with_checked_paths(checked),
                ),
                failed: false,
            };
        };

        let inconclusive = |identity: ApplicationIdentity, checked: Vec<PathBuf>, detail: String| {
            Resolution::Undiscovered(
                UndiscoveredEntry::new(identity, UndiscoveredReason::Tier3Inconclusive)
                    .with_checked_paths(checked)
                    .with_detail(detail),
            )
        };

        let answer =
            tokio::time::timeout(self.research_timeout, researcher.research(&identity)).await;

        let candidates = match answer {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(e)) => {
                warn!(
                    key = %identity.key,
                    researcher = researcher.researcher_id(),
                    error = %e,
                    "research failed"
                );
                return ResearchSlot {
                    index,
                    resolution: inconclusive(identity, checked, e.to_string()),
                    failed: true,
                };
            }
            Err(_) => {
                warn!(
                    key = %identity.key,
                    timeout_secs = self.research_timeout.as_secs_f64(),
                    "research timed out"
                );
                let detail = format!("timed out after {:?}", self.research_timeout);
                return ResearchSlot {
                    index,
                    resolution: inconclusive(identity, checked, detail),
                    failed: true,
                };
            }
        };

        if candidates.iter().all(ResearchCandidate::is_empty) {
            return ResearchSlot {
                index,
                resolution: inconclusive(
                    identity,
                    checked,
                    "researcher returned no paths".to_string(),
                ),
                failed: false,
            };
        }

        let (source_paths, exclude_patterns) =
            self.verify_candidates(&identity, &candidates, &mut checked);
        if source_paths.is_empty() {
            debug!(key = %identity.key, "no researched path exists on disk");
            return ResearchSlot {
                index,
                resolution: inconclusive(
                    identity,
                    checked,
                    "no returned path exists on disk".to_string(),
                ),
                failed: false,
            };
        }

        debug!(key = %identity.key, paths = source_paths.len(), "resolved by research");
        let config = ResolvedConfig::new(identity, Tier::Tier3, source_paths)
            .with_exclude_patterns(exclude_patterns);
        ResearchSlot {
            index,
            resolution: Resolution::Resolved(config),
            failed: false,
        }
    }

    /// Validate researched paths and keep the ones that exist.
    ///
    /// Rejected and missing paths are appended to `checked`.
    fn verify_candidates(
        &self,
        identity: &ApplicationIdentity,
        candidates: &[ResearchCandidate],
        checked: &mut Vec<PathBuf>,
    ) -> (Vec<PathBuf>, Vec<String>) {
        let roots = self.roots();
        let mut source_paths: Vec<PathBuf> = Vec::new();
        let mut exclude_patterns: Vec<String> = Vec::new();

        for candidate in candidates {
            let home = candidate
                .configuration_files
                .iter()
                .map(|p| (roots.home(), p));
            let xdg = candidate
                .xdg_configuration_files
                .iter()
                .map(|p| (roots.xdg_config_home(), p));

            for (base, raw) in home.chain(xdg) {
                if let Err(reason) = check_relative_path(raw) {
                    warn!(
                        key = %identity.key,
                        path = %raw,
                        reason = %reason,
                        "discarding researched path"
                    );
                    continue;
                }

                let path = base.join(raw.trim().trim_end_matches('/'));
                if source_paths.contains(&path) {
                    continue;
                }
                if path.exists() {
                    source_paths.push(path);
                } else {
                    checked.push(path);
                }
            }

            for pattern in &candidate.exclude_files {
                if pattern.starts_with('/') || exclude_patterns.contains(pattern) {
                    continue;
                }
                exclude_patterns.push(pattern.clone());
            }
        }

        (source_paths, exclude_patterns)
    }
}
