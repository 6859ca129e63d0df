//! Shared library opener backed by the platform dynamic linker.

use std::path::{Path, PathBuf};

use gstd_host_core::{LibraryOpener, LoadError};
use libloading::Library;

use crate::error::{NativeError, Result};

/// Resolves the file name or path for `identifier`.
///
/// `gstd` becomes `libgstd.so` on Linux and Android, `libgstd.dylib` on
/// macOS. With a directory, the name is joined onto it; without one, the
/// bare name is handed to the linker's search path.
#[must_use]
pub fn resolve(library_dir: Option<&Path>, identifier: &str) -> PathBuf {
    let file_name = libloading::library_filename(identifier);
    match library_dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Opens one library and returns its handle.
pub(crate) fn open_library(library_dir: Option<&Path>, identifier: &str) -> Result<Library> {
    let path = resolve(library_dir, identifier);
    if library_dir.is_some() && !path.exists() {
        return Err(NativeError::NotFound(path.display().to_string()));
    }
    // SAFETY: loading runs the library's initializers. The tiers name
    // GLib/GStreamer libraries whose constructors only register types.
    let library = unsafe { Library::new(&path) };
    library.map_err(|source| NativeError::Open {
        library: path.display().to_string(),
        source,
    })
}

/// Opens libraries with `dlopen` and keeps every handle until dropped.
///
/// Handles are held for the lifetime of the opener so symbols stay
/// resolvable; the owning supervisor keeps the opener alive for the
/// lifetime of the process.
#[derive(Debug, Default)]
pub struct DylibOpener {
    library_dir: Option<PathBuf>,
    handles: Vec<(String, Library)>,
}

impl DylibOpener {
    /// Creates an opener using the platform search path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an opener that loads from `dir`.
    #[must_use]
    pub fn with_library_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: Some(dir.into()),
            handles: Vec::new(),
        }
    }

    /// Creates an opener from an optional directory.
    #[must_use]
    pub fn from_library_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::with_library_dir(dir),
            None => Self::new(),
        }
    }

    /// Directory searched, if any.
    #[must_use]
    pub fn library_dir(&self) -> Option<&Path> {
        self.library_dir.as_deref()
    }

    /// Identifiers opened so far, in order.
    pub fn loaded(&self) -> impl Iterator<Item = &str> {
        self.handles.iter().map(|(id, _)| id.as_str())
    }

    /// Whether `identifier` has been opened.
    #[must_use]
    pub fn is_loaded(&self, identifier: &str) -> bool {
        self.loaded().any(|id| id == identifier)
    }
}

impl LibraryOpener for DylibOpener {
    fn open(&mut self, identifier: &str) -> std::result::Result<(), LoadError> {
        if self.is_loaded(identifier) {
            return Ok(());
        }
        let library = open_library(self.library_dir.as_deref(), identifier)?;
        tracing::debug!(library = identifier, "dlopen succeeded");
        self.handles.push((identifier.to_string(), library));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_platform_file_name() {
        let name = resolve(None, "gstd");
        let name = name.to_string_lossy();
        assert!(name.contains("gstd"));
        if cfg!(any(target_os = "linux", target_os = "android")) {
            assert_eq!(name, "libgstd.so");
        }
    }

    #[test]
    fn test_resolve_joins_library_dir() {
        let path = resolve(Some(Path::new("/opt/gst/lib")), "gstreamer-1.0");
        assert!(path.starts_with("/opt/gst/lib"));
        assert!(path.to_string_lossy().contains("gstreamer-1.0"));
    }

    #[test]
    fn test_missing_library_in_dir_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut opener = DylibOpener::with_library_dir(dir.path());

        let err = opener.open("gstd").unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
        assert_eq!(opener.loaded().count(), 0);
    }

    #[test]
    fn test_garbage_library_is_link_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve(Some(dir.path()), "broken");
        std::fs::write(&path, b"not an object file").unwrap();
        let mut opener = DylibOpener::with_library_dir(dir.path());

        let err = opener.open("broken").unwrap_err();
        assert!(matches!(err, LoadError::Link(_)));
        assert!(!opener.is_loaded("broken"));
    }

    #[test]
    fn test_unknown_library_on_search_path_fails() {
        let mut opener = DylibOpener::new();
        assert!(opener.open("gstd-host-does-not-exist").is_err());
    }

    #[test]
    fn test_from_library_dir() {
        assert!(DylibOpener::from_library_dir(None).library_dir().is_none());
        let opener = DylibOpener::from_library_dir(Some(Path::new("/opt/lib")));
        assert_eq!(opener.library_dir(), Some(Path::new("/opt/lib")));
    }
}
