//! Solver backend selection, loading, and construction.
//!
//! The factory turns a selector string (`"cvode"`, `"dassl"`, ...) into a
//! constructed solver:
//! 1. classify the name (unknown names fail before any filesystem access)
//! 2. apply the `dassl` -> `cvode` alias
//! 3. load the backend library on first use
//! 4. look up `<backend>Solver` in the factory's own registry
//! 5. construct the solver with the caller's system and settings
//!
//! Libraries are opened through a [`LibraryLoader`]; [`DylibLoader`] is the
//! only place that touches `libloading`.

pub mod config;
pub mod dylib;
pub mod error;
pub mod factory;
pub mod loader;
pub mod registry;
pub mod selector;
pub mod static_loader;

pub use config::{ConfigError, ConfigResult, FactoryConfig};
pub use dylib::DylibLoader;
pub use error::{FactoryError, FactoryResult};
pub use factory::{FactoryState, SettingsFactoryHandle, SolverFactory, SolverHandle};
pub use loader::{
    LibraryHandle, LibraryLoader, LoadError, LoadOutcome, LoadResult, register_declaration,
};
pub use registry::{
    Registration, Registry, RegistryKind, RegistrySink, SettingsRegistry, SolverRegistry,
};
pub use selector::{
    Backend, DEFAULT_SOLVER_BACKEND, Resolution, SETTINGS_LIBRARY_STEM, SolverSelector, classify,
    library_file_name,
};
pub use static_loader::StaticLoader;
