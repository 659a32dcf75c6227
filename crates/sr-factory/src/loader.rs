//! Library loading abstraction.
//!
//! A loader opens a library, reads its [`PluginDeclaration`], and lets it
//! populate a registry. Loads are idempotent per loader instance, and a
//! loader drops all its references at once in [`LibraryLoader::unload_all`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sr_solver::{
    ABI_VERSION, CORE_VERSION, PluginDeclaration, PluginRegistrar, SettingsFactoryConstructor,
    SolverConstructor,
};
use thiserror::Error;
use tracing::debug;

use crate::registry::RegistrySink;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Library not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Cannot resolve library path {}: {source}", path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open library {}: {message}", path.display())]
    Open { path: PathBuf, message: String },

    #[error("Library {} has no `{symbol}` entry point", path.display())]
    MissingEntryPoint { path: PathBuf, symbol: &'static str },

    #[error(
        "Library {} is incompatible: abi {found_abi} (expected {expected_abi}), core {found_core} (expected {expected_core})",
        path.display()
    )]
    AbiMismatch {
        path: PathBuf,
        expected_abi: u32,
        found_abi: u32,
        expected_core: &'static str,
        found_core: String,
    },
}

pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Library was opened and registered this many constructors.
    Loaded { registered: usize },
    /// Path was already loaded by this loader; nothing happened.
    AlreadyLoaded,
}

/// A loaded library.
///
/// Shared (`Arc`) by the loader and by every registry entry and value built
/// from it, so each of them can report where its code came from.
///
/// Dynamic libraries stay mapped until the process exits. Backend code
/// escapes through values no handle tracks (settings objects, vtables,
/// `&'static str` in errors), so unmapping is never safe; dropping the last
/// handle only ends the bookkeeping.
pub struct LibraryHandle {
    path: PathBuf,
    dynamic: bool,
}

impl LibraryHandle {
    /// A library opened from disk and left resident.
    pub(crate) fn resident(path: PathBuf) -> Self {
        Self {
            path,
            dynamic: true,
        }
    }

    /// A "library" whose code is linked into the host binary.
    pub fn in_process(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dynamic: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }
}

impl fmt::Debug for LibraryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryHandle")
            .field("path", &self.path)
            .field("dynamic", &self.dynamic)
            .finish()
    }
}

impl Drop for LibraryHandle {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), dynamic = self.dynamic, "library handle released");
    }
}

/// Opens libraries and lets them populate registries.
///
/// Not safe for concurrent use; every method that mutates takes `&mut self`.
pub trait LibraryLoader {
    /// Load `path` into `target`. A path this loader already loaded is a
    /// no-op success.
    fn load_library(
        &mut self,
        path: &Path,
        target: &mut dyn RegistrySink,
    ) -> LoadResult<LoadOutcome>;

    fn is_loaded(&self, path: &Path) -> bool;

    fn loaded_count(&self) -> usize;

    /// Drop every library reference this loader holds. Safe to call with
    /// nothing loaded and safe to call repeatedly. Dynamic libraries stay
    /// mapped (see [`LibraryHandle`]).
    fn unload_all(&mut self);
}

/// Check a declaration against this host and run its registration function
/// into `target`. Returns the number of constructors `target` accepted.
///
/// Shared by every loader so the ABI check and tagging are identical
/// whether the declaration came from `dlopen` or from the host binary.
pub fn register_declaration(
    library: &Arc<LibraryHandle>,
    declaration: &PluginDeclaration,
    target: &mut dyn RegistrySink,
) -> LoadResult<usize> {
    if !declaration.is_compatible() {
        return Err(LoadError::AbiMismatch {
            path: library.path().to_path_buf(),
            expected_abi: ABI_VERSION,
            found_abi: declaration.abi_version,
            expected_core: CORE_VERSION,
            found_core: declaration.core_version.to_string(),
        });
    }

    let mut registrar = LibraryRegistrar {
        target,
        library,
        accepted: 0,
    };
    (declaration.register)(&mut registrar);
    Ok(registrar.accepted)
}

/// Forwards a library's registrations to a registry, tagged with the library.
struct LibraryRegistrar<'a> {
    target: &'a mut dyn RegistrySink,
    library: &'a Arc<LibraryHandle>,
    accepted: usize,
}

impl PluginRegistrar for LibraryRegistrar<'_> {
    fn register_solver(&mut self, name: &str, constructor: SolverConstructor) {
        if self.target.offer_solver(name, constructor, self.library) {
            self.accepted += 1;
        }
    }

    fn register_settings_factory(&mut self, name: &str, constructor: SettingsFactoryConstructor) {
        if self
            .target
            .offer_settings_factory(name, constructor, self.library)
        {
            self.accepted += 1;
        }
    }
}
