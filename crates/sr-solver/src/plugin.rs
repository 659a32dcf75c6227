//! Plugin ABI shared by the host runtime and backend libraries.
//!
//! A backend library exports one [`PluginDeclaration`] under
//! [`PLUGIN_DECLARATION_SYMBOL`] (use [`export_plugin!`]). When the host loads
//! the library it checks `abi_version` and `core_version`, then calls
//! `register` with a registrar that records the library's constructors.
//!
//! ```rust,ignore
//! use sr_solver::{PluginRegistrar, export_plugin, solver_key};
//!
//! fn register(registrar: &mut dyn PluginRegistrar) {
//!     registrar.register_solver(&solver_key("cvode"), create_cvode);
//! }
//!
//! export_plugin!(register);
//! ```
//!
//! Both sides must be built by the same compiler against the same
//! `sr-solver`; the declaration carries Rust-ABI function pointers and trait
//! objects, not a C interface.

use sr_core::RuntimePaths;

use crate::settings::{SettingsFactory, SolverSettings};
use crate::solver::Solver;
use crate::system::SystemRef;

/// Builds a solver for a system with the given settings.
pub type SolverConstructor = fn(SystemRef, &dyn SolverSettings) -> Box<dyn Solver>;

/// Builds a settings backend for the runtime's directories.
pub type SettingsFactoryConstructor = fn(&RuntimePaths) -> Box<dyn SettingsFactory>;

/// Suffix appended to a backend name to form its solver registry key.
pub const SOLVER_KEY_SUFFIX: &str = "Solver";

/// Registry key the settings backend registers under.
pub const SETTINGS_FACTORY_KEY: &str = "SettingsFactory";

/// Registry key for a solver backend: `"cvode"` -> `"cvodeSolver"`.
pub fn solver_key(backend: &str) -> String {
    let mut key = String::with_capacity(backend.len() + SOLVER_KEY_SUFFIX.len());
    key.push_str(backend);
    key.push_str(SOLVER_KEY_SUFFIX);
    key
}

/// Receives constructors from a library's registration function.
pub trait PluginRegistrar {
    fn register_solver(&mut self, name: &str, constructor: SolverConstructor);

    fn register_settings_factory(&mut self, name: &str, constructor: SettingsFactoryConstructor);
}

/// Signature of a library's registration function.
pub type RegisterFn = fn(&mut dyn PluginRegistrar);

/// Bumped whenever `PluginDeclaration` or the constructor signatures change.
pub const ABI_VERSION: u32 = 1;

/// Version of this crate, compared against the library's copy at load time.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exported symbol name (NUL-terminated for the dynamic loader).
///
/// Must match the static `export_plugin!` defines.
pub const PLUGIN_DECLARATION_SYMBOL: &[u8] = b"sr_plugin_declaration\0";

/// [`PLUGIN_DECLARATION_SYMBOL`] without its terminator, for diagnostics.
pub const PLUGIN_DECLARATION_NAME: &str = match PLUGIN_DECLARATION_SYMBOL.split_last() {
    Some((&0, name)) => match std::str::from_utf8(name) {
        Ok(name) => name,
        Err(_) => panic!("plugin declaration symbol is not UTF-8"),
    },
    _ => panic!("plugin declaration symbol is not NUL-terminated"),
};

/// The single static a backend library exports.
///
/// `abi_version` stays the first field so a host can read it from any
/// library before trusting the rest of the layout.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct PluginDeclaration {
    pub abi_version: u32,
    pub core_version: &'static str,
    pub register: RegisterFn,
}

impl PluginDeclaration {
    /// Declaration stamped with this build's ABI and core versions.
    pub const fn new(register: RegisterFn) -> Self {
        Self {
            abi_version: ABI_VERSION,
            core_version: CORE_VERSION,
            register,
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.abi_version == ABI_VERSION && self.core_version == CORE_VERSION
    }
}

/// Export a registration function as this library's plugin declaration.
#[macro_export]
macro_rules! export_plugin {
    ($register:expr) => {
        #[doc(hidden)]
        #[allow(non_upper_case_globals)]
        #[unsafe(no_mangle)]
        pub static sr_plugin_declaration: $crate::PluginDeclaration =
            $crate::PluginDeclaration::new($register);
    };
}
