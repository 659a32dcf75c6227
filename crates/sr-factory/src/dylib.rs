//! `libloading`-backed loader for backend shared libraries.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use sr_solver::{PLUGIN_DECLARATION_NAME, PLUGIN_DECLARATION_SYMBOL, PluginDeclaration};
use tracing::{debug, info};

use crate::loader::{
    LibraryHandle, LibraryLoader, LoadError, LoadOutcome, LoadResult, register_declaration,
};
use crate::registry::RegistrySink;

/// Loads backend libraries from disk with `dlopen`/`LoadLibrary`.
///
/// Paths are canonicalized before comparison, so two spellings of the same
/// file load once. A library that registered successfully is never closed:
/// it stays mapped until the process exits, and `unload_all` only forgets
/// it. A library rejected before registration is closed again.
#[derive(Debug, Default)]
pub struct DylibLoader {
    loaded: Vec<Arc<LibraryHandle>>,
}

impl DylibLoader {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, resolved: &Path) -> Option<&Arc<LibraryHandle>> {
        self.loaded.iter().find(|lib| lib.path() == resolved)
    }

    fn resolve(path: &Path) -> LoadResult<PathBuf> {
        let resolved = fs::canonicalize(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::Missing {
                path: path.to_path_buf(),
            },
            _ => LoadError::Inaccessible {
                path: path.to_path_buf(),
                source,
            },
        })?;
        if !resolved.is_file() {
            return Err(LoadError::Missing {
                path: path.to_path_buf(),
            });
        }
        Ok(resolved)
    }

    /// Open `path` and copy out its declaration.
    ///
    /// The returned declaration borrows from the library (its version string
    /// and function pointer), so it must not outlive the returned `Library`.
    fn open(path: &Path) -> LoadResult<(Library, PluginDeclaration)> {
        // SAFETY: opening runs the library's initializers. Backend libraries
        // are trusted code shipped with the runtime.
        let library = unsafe { Library::new(path) }.map_err(|e| LoadError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        // SAFETY: the symbol is a `static PluginDeclaration` exported by
        // `export_plugin!`. `PluginDeclaration` is `repr(C)` with
        // `abi_version` first, so that field is read before anything else;
        // the full struct is copied only once the ABI version matches.
        let declaration = unsafe {
            let symbol = library
                .get::<*const PluginDeclaration>(PLUGIN_DECLARATION_SYMBOL)
                .map_err(|_| LoadError::MissingEntryPoint {
                    path: path.to_path_buf(),
                    symbol: PLUGIN_DECLARATION_NAME,
                })?;
            let raw: *const PluginDeclaration = *symbol;
            let abi_version = std::ptr::addr_of!((*raw).abi_version).read();
            if abi_version != sr_solver::ABI_VERSION {
                return Err(LoadError::AbiMismatch {
                    path: path.to_path_buf(),
                    expected_abi: sr_solver::ABI_VERSION,
                    found_abi: abi_version,
                    expected_core: sr_solver::CORE_VERSION,
                    found_core: String::from("<unknown>"),
                });
            }
            raw.read()
        };

        Ok((library, declaration))
    }
}

impl LibraryLoader for DylibLoader {
    fn load_library(
        &mut self,
        path: &Path,
        target: &mut dyn RegistrySink,
    ) -> LoadResult<LoadOutcome> {
        let resolved = Self::resolve(path)?;
        if self.find(&resolved).is_some() {
            debug!(path = %resolved.display(), "library already loaded");
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let (library, declaration) = Self::open(&resolved)?;
        let handle = Arc::new(LibraryHandle::resident(resolved));
        // On error nothing was registered, so `library` may close here.
        let registered = register_declaration(&handle, &declaration, target)?;
        // Constructors now point into the library; keep it mapped for good.
        std::mem::forget(library);

        info!(
            path = %handle.path().display(),
            registry = %target.kind(),
            registered,
            "library loaded"
        );
        self.loaded.push(handle);
        Ok(LoadOutcome::Loaded { registered })
    }

    fn is_loaded(&self, path: &Path) -> bool {
        match fs::canonicalize(path) {
            Ok(resolved) => self.find(&resolved).is_some(),
            Err(_) => false,
        }
    }

    fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    fn unload_all(&mut self) {
        if self.loaded.is_empty() {
            return;
        }
        let count = self.loaded.len();
        while let Some(handle) = self.loaded.pop() {
            debug!(
                path = %handle.path().display(),
                outstanding = Arc::strong_count(&handle) - 1,
                "dropping loader reference"
            );
        }
        info!(count, "loader references dropped; libraries stay resident");
    }
}
