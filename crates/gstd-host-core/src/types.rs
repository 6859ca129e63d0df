//! Core types for library bootstrap and daemon lifecycle.
//!
//! The daemon state machine is explicit; no transition happens implicitly.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Identifier of a single bootstrap attempt, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BootId(uuid::Uuid);

impl BootId {
    /// Creates a new random boot ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for BootId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Daemon lifecycle state.
///
/// ```text
/// Unloaded → LibrariesLoaded → Initialized → Running ⇄ Stopped
///                   ↑                           │
///                   └──── (re-init) ── Failed ←─┘   (any state on bridge error)
/// ```
///
/// `Running` is entered only from `Initialized` or `Stopped`. `Failed` is not
/// terminal: initialization may be retried from it. Initialization is
/// refused while `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DaemonState {
    /// No libraries loaded yet.
    #[default]
    Unloaded,
    /// All required libraries are loaded.
    LibrariesLoaded,
    /// The bridge accepted the storage paths.
    Initialized,
    /// The daemon was started successfully.
    Running,
    /// The daemon was stopped (or a stop was attempted).
    Stopped,
    /// An unrecoverable bridge error occurred.
    Failed,
}

impl DaemonState {
    /// Returns true if `start` may be attempted from this state.
    #[must_use]
    pub const fn can_start(&self) -> bool {
        matches!(self, Self::Initialized | Self::Stopped)
    }

    /// Returns true if environment initialization may be attempted from this state.
    ///
    /// Never while `Running`: the daemon thread reads the environment.
    #[must_use]
    pub const fn can_initialize(&self) -> bool {
        !matches!(self, Self::Unloaded | Self::Running)
    }

    /// Returns true if the libraries have been loaded at some point.
    #[must_use]
    pub const fn libraries_loaded(&self) -> bool {
        !matches!(self, Self::Unloaded)
    }
}

impl fmt::Display for DaemonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unloaded => "unloaded",
            Self::LibrariesLoaded => "libraries-loaded",
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A native library to load, with its failure policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Library identifier without platform prefix/suffix (e.g. `glib-2.0`).
    pub identifier: String,
    /// Whether a load failure aborts the bootstrap sequence.
    pub required: bool,
}

impl LibraryEntry {
    /// Creates a required entry.
    #[must_use]
    pub fn required(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            required: true,
        }
    }

    /// Creates an optional entry.
    #[must_use]
    pub fn optional(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            required: false,
        }
    }
}

/// An ordered group of libraries loaded before the next group is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryTier {
    /// Label used in log lines.
    #[serde(default)]
    pub label: String,
    /// Entries, loaded sequentially.
    pub entries: Vec<LibraryEntry>,
}

impl LibraryTier {
    /// Creates a tier from its entries.
    #[must_use]
    pub fn new(label: impl Into<String>, entries: Vec<LibraryEntry>) -> Self {
        Self {
            label: label.into(),
            entries,
        }
    }

    /// Returns the identifiers in load order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.identifier.as_str())
    }
}

/// Result of a single load attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOutcome {
    /// Library identifier.
    pub identifier: String,
    /// Whether the library was required.
    pub required: bool,
    /// Whether the load succeeded.
    pub succeeded: bool,
    /// Loader error text on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated result of one bootstrap attempt. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Outcomes in attempt order.
    pub outcomes: Vec<LoadOutcome>,
    /// Set when a required library failed and loading stopped.
    pub aborted: bool,
    /// False iff a required library failed.
    pub overall_success: bool,
}

impl LoadReport {
    /// Creates an empty, successful report.
    #[must_use]
    pub fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            aborted: false,
            overall_success: true,
        }
    }

    /// Records a successful load.
    pub fn record_success(&mut self, entry: &LibraryEntry) {
        self.outcomes.push(LoadOutcome {
            identifier: entry.identifier.clone(),
            required: entry.required,
            succeeded: true,
            error: None,
        });
    }

    /// Records a failed load. A required failure aborts the report.
    pub fn record_failure(&mut self, entry: &LibraryEntry, error: impl Into<String>) {
        self.outcomes.push(LoadOutcome {
            identifier: entry.identifier.clone(),
            required: entry.required,
            succeeded: false,
            error: Some(error.into()),
        });
        if entry.required {
            self.aborted = true;
            self.overall_success = false;
        }
    }

    /// Returns the outcome for `identifier`, if it was attempted.
    #[must_use]
    pub fn outcome(&self, identifier: &str) -> Option<&LoadOutcome> {
        self.outcomes.iter().find(|o| o.identifier == identifier)
    }

    /// Returns true if `identifier` was attempted.
    #[must_use]
    pub fn attempted(&self, identifier: &str) -> bool {
        self.outcome(identifier).is_some()
    }

    /// Returns the failed outcomes in attempt order.
    pub fn failures(&self) -> impl Iterator<Item = &LoadOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }

    /// Returns the required failure that aborted loading, if any.
    #[must_use]
    pub fn required_failure(&self) -> Option<&LoadOutcome> {
        self.failures().find(|o| o.required)
    }

    /// Number of libraries loaded successfully.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }
}

impl Default for LoadReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Host-provided storage directories handed to the bridge at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonPaths {
    cache_dir: PathBuf,
    storage_dir: PathBuf,
}

impl DaemonPaths {
    /// Captures the two directories.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            storage_dir: storage_dir.into(),
        }
    }

    /// Cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Persistent storage (files) directory.
    #[must_use]
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Returns true if both directories are absolute.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.cache_dir.is_absolute() && self.storage_dir.is_absolute()
    }
}

/// Ordered argument tokens passed to the daemon at start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaemonArguments(Vec<String>);

impl DaemonArguments {
    /// Creates an argument list from tokens.
    #[must_use]
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    /// Returns the tokens.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for DaemonArguments {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl fmt::Display for DaemonArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}
