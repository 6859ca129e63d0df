//! Tiered native library loading.
//!
//! Tiers are attempted in order and entries inside a tier sequentially. A
//! required failure stops loading immediately; an optional failure is logged
//! and skipped. Whether an entry is optional comes from the caller (see
//! [`crate::config::OPTIONAL_LIBRARIES`]); the loader never guesses from names.

use std::panic::{self, AssertUnwindSafe};

use crate::bridge::panic_message;
use crate::error::SupervisorError;
use crate::types::{LibraryTier, LoadReport};

/// Error type for a single library load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// No shared object could be located for the identifier.
    #[error("library not found: {0}")]
    NotFound(String),

    /// The dynamic linker rejected the library (missing symbol, bad ELF, ...).
    #[error("link error: {0}")]
    Link(String),

    /// The opener unwound.
    #[error("opener panicked: {0}")]
    Panicked(String),
}

impl LoadError {
    /// Creates a link error.
    #[must_use]
    pub fn link(msg: impl Into<String>) -> Self {
        Self::Link(msg.into())
    }
}

/// Something that can make a native library available to the process.
pub trait LibraryOpener {
    /// Loads the library named `identifier` (no `lib` prefix or suffix).
    fn open(&mut self, identifier: &str) -> Result<(), LoadError>;
}

impl<O: LibraryOpener + ?Sized> LibraryOpener for Box<O> {
    fn open(&mut self, identifier: &str) -> Result<(), LoadError> {
        (**self).open(identifier)
    }
}

/// Loads library tiers through a [`LibraryOpener`].
#[derive(Debug)]
pub struct LibraryLoader<O> {
    opener: O,
}

impl<O: LibraryOpener> LibraryLoader<O> {
    /// Creates a loader over `opener`.
    #[must_use]
    pub const fn new(opener: O) -> Self {
        Self { opener }
    }

    /// Returns the opener.
    #[must_use]
    pub const fn opener(&self) -> &O {
        &self.opener
    }

    /// Consumes the loader, returning the opener (and any handles it holds).
    #[must_use]
    pub fn into_opener(self) -> O {
        self.opener
    }

    /// Loads every tier in order, stopping at the first required failure.
    pub fn load(&mut self, tiers: &[LibraryTier]) -> LoadReport {
        let mut report = LoadReport::new();

        'tiers: for tier in tiers {
            tracing::debug!(tier = %tier.label, entries = tier.entries.len(), "loading tier");

            for entry in &tier.entries {
                match self.open_guarded(&entry.identifier) {
                    Ok(()) => {
                        tracing::info!(library = %entry.identifier, "loaded library");
                        report.record_success(entry);
                    }
                    Err(e) if entry.required => {
                        let err = SupervisorError::required_library(&entry.identifier, e.to_string());
                        tracing::error!(library = %entry.identifier, error = %err, "failed to load required library");
                        report.record_failure(entry, e.to_string());
                        break 'tiers;
                    }
                    Err(e) => {
                        let err = SupervisorError::optional_library(&entry.identifier, e.to_string());
                        tracing::warn!(library = %entry.identifier, error = %err, "continuing without optional library");
                        report.record_failure(entry, e.to_string());
                    }
                }
            }
        }

        report
    }

    fn open_guarded(&mut self, identifier: &str) -> Result<(), LoadError> {
        let opener = &mut self.opener;
        match panic::catch_unwind(AssertUnwindSafe(|| opener.open(identifier))) {
            Ok(result) => result,
            Err(payload) => Err(LoadError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}
