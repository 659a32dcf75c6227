//! The solver factory: name resolution, lazy loading, and construction.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::Arc;

use sr_core::RuntimePaths;
use sr_solver::{SETTINGS_FACTORY_KEY, SettingsFactory, Solver, SolverSettings, SystemRef};
use tracing::{debug, info, warn};

use crate::config::FactoryConfig;
use crate::dylib::DylibLoader;
use crate::error::{FactoryError, FactoryResult};
use crate::loader::{LibraryHandle, LibraryLoader, LoadOutcome};
use crate::registry::{RegistryKind, SettingsRegistry, SolverRegistry};
use crate::selector::{
    Backend, DEFAULT_SOLVER_BACKEND, Resolution, SETTINGS_LIBRARY_STEM, classify,
    library_file_name,
};

/// Lifecycle of a `SolverFactory`.
///
/// `Uninitialized -> Initializing -> Ready -> Destroyed`. A failed
/// construction passes through `Failed` and is unwound before the
/// constructor returns, so callers only ever observe `Ready` or `Destroyed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FactoryState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
    Destroyed,
}

/// A constructed solver, owned by the caller.
///
/// Remembers which library the solver's code came from.
pub struct SolverHandle {
    solver: Box<dyn Solver>,
    library: Option<Arc<LibraryHandle>>,
}

impl SolverHandle {
    /// Path of the library this solver's code came from.
    pub fn library_path(&self) -> Option<&Path> {
        self.library.as_deref().map(LibraryHandle::path)
    }
}

impl Deref for SolverHandle {
    type Target = dyn Solver;

    fn deref(&self) -> &Self::Target {
        self.solver.as_ref()
    }
}

impl DerefMut for SolverHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.solver.as_mut()
    }
}

impl fmt::Debug for SolverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverHandle")
            .field("solver", &self.solver.name())
            .field("library", &self.library_path())
            .finish()
    }
}

/// A constructed settings backend, shared between factory user and run.
pub struct SettingsFactoryHandle {
    factory: Box<dyn SettingsFactory>,
    library: Option<Arc<LibraryHandle>>,
}

impl SettingsFactoryHandle {
    pub fn library_path(&self) -> Option<&Path> {
        self.library.as_deref().map(LibraryHandle::path)
    }
}

impl Deref for SettingsFactoryHandle {
    type Target = dyn SettingsFactory;

    fn deref(&self) -> &Self::Target {
        self.factory.as_ref()
    }
}

impl fmt::Debug for SettingsFactoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsFactoryHandle")
            .field("library", &self.library_path())
            .finish()
    }
}

/// Selects, loads, and constructs solver backends.
///
/// Registries belong to this instance alone. Methods that may load take
/// `&mut self`; share a factory across threads only behind a `Mutex`.
pub struct SolverFactory<L: LibraryLoader = DylibLoader> {
    config: FactoryConfig,
    loader: L,
    solvers: SolverRegistry,
    settings: SettingsRegistry,
    state: FactoryState,
}

impl SolverFactory<DylibLoader> {
    /// Construct with the dynamic library loader.
    pub fn new(config: FactoryConfig) -> FactoryResult<Self> {
        Self::with_loader(config, DylibLoader::new())
    }

    /// Read a YAML [`FactoryConfig`] from `path` and construct from it.
    pub fn from_config_file(path: &Path) -> FactoryResult<Self> {
        let config = FactoryConfig::load_yaml(path)?;
        Self::new(config)
    }
}

impl<L: LibraryLoader> SolverFactory<L> {
    /// Construct with any loader.
    ///
    /// Unless dry-run is on, the settings library and the default solver
    /// library are loaded now. If either load fails, whatever was loaded is
    /// released and the error is returned.
    pub fn with_loader(config: FactoryConfig, loader: L) -> FactoryResult<Self> {
        let mut factory = Self {
            config,
            loader,
            solvers: SolverRegistry::new(RegistryKind::Solver),
            settings: SettingsRegistry::new(RegistryKind::Settings),
            state: FactoryState::Uninitialized,
        };

        if factory.config.is_dry_run() {
            info!(
                library_dir = %factory.config.paths.library_dir.display(),
                "dry run: skipping eager library loads"
            );
            factory.state = FactoryState::Ready;
            return Ok(factory);
        }

        factory.state = FactoryState::Initializing;
        if let Err(err) = factory.initialize_libraries() {
            warn!(error = %err, "factory construction failed, unloading");
            factory.state = FactoryState::Failed;
            factory.shutdown();
            return Err(err);
        }

        factory.state = FactoryState::Ready;
        info!(
            library_dir = %factory.config.paths.library_dir.display(),
            solvers = factory.solvers.len(),
            "solver factory ready"
        );
        Ok(factory)
    }

    fn initialize_libraries(&mut self) -> FactoryResult<()> {
        let settings_path = self
            .config
            .paths
            .library(library_file_name(SETTINGS_LIBRARY_STEM));
        self.loader
            .load_library(&settings_path, &mut self.settings)
            .map_err(|source| FactoryError::Load {
                backend: "settings factory".to_string(),
                source,
            })?;

        self.load_backend(DEFAULT_SOLVER_BACKEND)?;
        Ok(())
    }

    fn load_backend(&mut self, backend: Backend) -> FactoryResult<LoadOutcome> {
        let path = self.config.paths.library(backend.library_file_name());
        let outcome = self
            .loader
            .load_library(&path, &mut self.solvers)
            .map_err(|source| FactoryError::Load {
                backend: backend.name().to_string(),
                source,
            })?;
        debug!(%backend, ?outcome, "backend library requested");
        Ok(outcome)
    }

    fn ensure_live(&self) -> FactoryResult<()> {
        match self.state {
            FactoryState::Ready => Ok(()),
            _ => Err(FactoryError::Destroyed),
        }
    }

    /// Resolve `solver_name`, load its backend on first use, and construct it.
    ///
    /// - unknown name: `InvalidArgument`, nothing is loaded
    /// - `idas` / `ida`: no load; `NotFound` unless something registered the key
    /// - `dassl`: served by the `cvode` backend
    /// - backend library cannot be loaded: `Load`
    pub fn create_solver(
        &mut self,
        system: SystemRef,
        solver_name: &str,
        settings: &dyn SolverSettings,
    ) -> FactoryResult<SolverHandle> {
        self.ensure_live()?;
        let resolution = classify(solver_name)?;

        match resolution {
            Resolution::Load(backend) => {
                self.load_backend(backend)?;
            }
            Resolution::Placeholder(name) => {
                debug!(name, "selector has no backend library");
            }
        }

        let key = resolution.registry_key();
        let registration = self.solvers.lookup(&key)?;
        let solver = (registration.constructor)(system, settings);
        debug!(requested = solver_name, key = %key, "solver constructed");

        Ok(SolverHandle {
            solver,
            library: registration.library().cloned(),
        })
    }

    /// Construct the settings backend registered under `"SettingsFactory"`.
    pub fn create_settings_factory(&self) -> FactoryResult<Arc<SettingsFactoryHandle>> {
        self.ensure_live()?;
        let registration = self
            .settings
            .get(SETTINGS_FACTORY_KEY)
            .ok_or_else(|| FactoryError::invalid("No such settings library"))?;
        let factory = (registration.constructor)(&self.config.paths);

        Ok(Arc::new(SettingsFactoryHandle {
            factory,
            library: registration.library().cloned(),
        }))
    }

    /// Unload every library and release both registries. Idempotent.
    pub fn shutdown(&mut self) {
        if self.state == FactoryState::Destroyed {
            return;
        }
        self.loader.unload_all();
        self.solvers.clear();
        self.settings.clear();
        self.state = FactoryState::Destroyed;
        debug!("solver factory destroyed");
    }

    pub fn state(&self) -> FactoryState {
        self.state
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn paths(&self) -> &RuntimePaths {
        &self.config.paths
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn solver_registry(&self) -> &SolverRegistry {
        &self.solvers
    }

    pub fn settings_registry(&self) -> &SettingsRegistry {
        &self.settings
    }

    pub fn is_backend_loaded(&self, backend: Backend) -> bool {
        self.loader
            .is_loaded(&self.config.paths.library(backend.library_file_name()))
    }
}

impl<L: LibraryLoader> Drop for SolverFactory<L> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<L: LibraryLoader> fmt::Debug for SolverFactory<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverFactory")
            .field("state", &self.state)
            .field("library_dir", &self.config.paths.library_dir)
            .field("solvers", &self.solvers.names())
            .field("settings", &self.settings.names())
            .finish()
    }
}
