//! Loader for backends linked into the host binary.
//!
//! Maps library file names to in-process declarations, so a host can ship
//! some backends statically and still select them through the same
//! name -> file -> registry path as dynamically loaded ones.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sr_solver::PluginDeclaration;
use tracing::{debug, info};

use crate::loader::{
    LibraryHandle, LibraryLoader, LoadError, LoadOutcome, LoadResult, register_declaration,
};
use crate::registry::RegistrySink;

#[derive(Debug, Default)]
pub struct StaticLoader {
    available: HashMap<OsString, PluginDeclaration>,
    loaded: Vec<Arc<LibraryHandle>>,
    opens: HashMap<PathBuf, usize>,
    requests: usize,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `declaration` answer for any path whose file name is `file_name`.
    pub fn with_library(
        mut self,
        file_name: impl Into<OsString>,
        declaration: PluginDeclaration,
    ) -> Self {
        self.insert(file_name, declaration);
        self
    }

    pub fn insert(&mut self, file_name: impl Into<OsString>, declaration: PluginDeclaration) {
        self.available.insert(file_name.into(), declaration);
    }

    /// Times `path` was actually opened (already-loaded requests excluded).
    pub fn open_count(&self, path: &Path) -> usize {
        self.opens.get(path).copied().unwrap_or(0)
    }

    /// Every `load_library` call, including no-ops and failures.
    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl LibraryLoader for StaticLoader {
    fn load_library(
        &mut self,
        path: &Path,
        target: &mut dyn RegistrySink,
    ) -> LoadResult<LoadOutcome> {
        self.requests += 1;
        if self.is_loaded(path) {
            debug!(path = %path.display(), "library already loaded");
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let declaration = path
            .file_name()
            .and_then(|name| self.available.get(name))
            .copied()
            .ok_or_else(|| LoadError::Missing {
                path: path.to_path_buf(),
            })?;

        *self.opens.entry(path.to_path_buf()).or_default() += 1;
        let handle = Arc::new(LibraryHandle::in_process(path));
        let registered = register_declaration(&handle, &declaration, target)?;

        info!(
            path = %path.display(),
            registry = %target.kind(),
            registered,
            "static library loaded"
        );
        self.loaded.push(handle);
        Ok(LoadOutcome::Loaded { registered })
    }

    fn is_loaded(&self, path: &Path) -> bool {
        self.loaded.iter().any(|lib| lib.path() == path)
    }

    fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    fn unload_all(&mut self) {
        if self.loaded.is_empty() {
            return;
        }
        let count = self.loaded.len();
        self.loaded.clear();
        info!(count, "all static libraries unloaded");
    }
}
