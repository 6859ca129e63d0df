//! Entry points exported by `libgstd`.

use std::ffi::{CStr, c_char, c_int};

use libloading::Library;

use crate::error::{NativeError, Result};

/// `int gstd_start(int argc, char **argv)`: runs the daemon until stopped.
pub type GstdStart = unsafe extern "C" fn(c_int, *mut *mut c_char) -> c_int;
/// `void gstd_stop(void)`: asks a running daemon to return from `gstd_start`.
pub type GstdStop = unsafe extern "C" fn();
/// `const char *gstd_version(void)`: static version string.
pub type GstdVersion = unsafe extern "C" fn() -> *const c_char;

const START: &str = "gstd_start";
const STOP: &str = "gstd_stop";
const VERSION: &str = "gstd_version";

/// Version reported when the library does not export `gstd_version`.
pub const BUNDLED_VERSION: &str = "0.15.2";

/// Resolved entry points. Valid while the owning [`Library`] is loaded.
#[derive(Debug, Clone, Copy)]
pub struct GstdSymbols {
    /// `gstd_start`.
    pub start: GstdStart,
    /// `gstd_stop`.
    pub stop: GstdStop,
    /// `gstd_version`, when exported.
    pub version: Option<GstdVersion>,
}

impl GstdSymbols {
    /// Resolves the entry points from `library`.
    pub fn resolve(library: &Library) -> Result<Self> {
        Ok(Self {
            start: required(library, START)?,
            stop: required(library, STOP)?,
            // SAFETY: the declared type matches the C prototype above.
            version: unsafe { library.get::<GstdVersion>(VERSION.as_bytes()) }
                .ok()
                .map(|symbol| *symbol),
        })
    }

    /// Reads the version string, falling back to [`BUNDLED_VERSION`].
    #[must_use]
    pub fn version_string(&self) -> String {
        let Some(version) = self.version else {
            return BUNDLED_VERSION.to_string();
        };
        // SAFETY: gstd_version returns a pointer to a static NUL-terminated
        // string, or null.
        let ptr = unsafe { version() };
        if ptr.is_null() {
            return BUNDLED_VERSION.to_string();
        }
        // SAFETY: non-null and NUL-terminated per the contract above.
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

fn required<T: Copy>(library: &Library, symbol: &'static str) -> Result<T> {
    // SAFETY: callers instantiate `T` with the fn pointer type matching the
    // exported C prototype.
    unsafe { library.get::<T>(symbol.as_bytes()) }
        .map(|s| *s)
        .map_err(|source| NativeError::Symbol { symbol, source })
}
