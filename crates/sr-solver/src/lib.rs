//! Interfaces between the simulation runtime and its pluggable backends.
//!
//! Provides:
//! - `MixedSystem`: the model handle a solver integrates
//! - `Solver`: the step/integrate surface a backend implements
//! - `SolverSettings` / `SettingsFactory`: backend configuration
//! - the plugin ABI a backend library exports (`PluginDeclaration`, `export_plugin!`)

pub mod error;
pub mod plugin;
pub mod settings;
pub mod solver;
pub mod system;

// Re-exports for public API
pub use error::{
    SettingsError, SettingsResult, SolverError, SolverResult, SystemError, SystemResult,
};
pub use plugin::{
    ABI_VERSION, CORE_VERSION, PLUGIN_DECLARATION_NAME, PLUGIN_DECLARATION_SYMBOL,
    PluginDeclaration, PluginRegistrar, RegisterFn, SETTINGS_FACTORY_KEY, SOLVER_KEY_SUFFIX,
    SettingsFactoryConstructor, SolverConstructor, solver_key,
};
pub use settings::{BasicSolverSettings, GlobalSettings, SettingsFactory, SolverSettings};
pub use solver::{Solver, SolverStatus};
pub use system::{MixedSystem, SystemRef, shared_system};
