//! Name -> constructor registries.
//!
//! A factory owns one registry per kind. Registries are never shared
//! between factory instances and are append-only until teardown.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sr_solver::{SettingsFactoryConstructor, SolverConstructor};
use tracing::{debug, warn};

use crate::error::{FactoryError, FactoryResult};
use crate::loader::LibraryHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    Solver,
    Settings,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKind::Solver => write!(f, "solver"),
            RegistryKind::Settings => write!(f, "settings"),
        }
    }
}

/// One registered constructor and the library that provided it.
#[derive(Clone, Debug)]
pub struct Registration<C> {
    pub constructor: C,
    library: Option<Arc<LibraryHandle>>,
}

impl<C> Registration<C> {
    /// The library this constructor lives in; `None` for in-process registrations.
    pub fn library(&self) -> Option<&Arc<LibraryHandle>> {
        self.library.as_ref()
    }
}

#[derive(Debug)]
pub struct Registry<C> {
    kind: RegistryKind,
    entries: HashMap<String, Registration<C>>,
}

pub type SolverRegistry = Registry<SolverConstructor>;
pub type SettingsRegistry = Registry<SettingsFactoryConstructor>;

impl<C> Registry<C> {
    pub fn new(kind: RegistryKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    /// Register an in-process constructor. Last registration for a name wins.
    pub fn register(&mut self, name: impl Into<String>, constructor: C) {
        self.insert(name.into(), constructor, None);
    }

    fn insert(&mut self, name: String, constructor: C, library: Option<Arc<LibraryHandle>>) {
        let previous = self.entries.insert(
            name.clone(),
            Registration {
                constructor,
                library,
            },
        );
        if let Some(previous) = previous {
            warn!(
                registry = %self.kind,
                name = %name,
                replaced_from = ?previous.library.as_ref().map(|l| l.path().to_path_buf()),
                "registry entry overwritten"
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<&Registration<C>> {
        self.entries.get(name)
    }

    pub fn lookup(&self, name: &str) -> FactoryResult<&Registration<C>> {
        self.get(name).ok_or_else(|| FactoryError::NotFound {
            registry: self.kind,
            key: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry (and with it, the registry's hold on its libraries).
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The registry side of a library load.
///
/// A registration function may offer constructors of either kind; each
/// registry keeps only its own kind.
pub trait RegistrySink {
    fn kind(&self) -> RegistryKind;

    fn offer_solver(
        &mut self,
        name: &str,
        constructor: SolverConstructor,
        library: &Arc<LibraryHandle>,
    ) -> bool;

    fn offer_settings_factory(
        &mut self,
        name: &str,
        constructor: SettingsFactoryConstructor,
        library: &Arc<LibraryHandle>,
    ) -> bool;
}

impl RegistrySink for SolverRegistry {
    fn kind(&self) -> RegistryKind {
        self.kind
    }

    fn offer_solver(
        &mut self,
        name: &str,
        constructor: SolverConstructor,
        library: &Arc<LibraryHandle>,
    ) -> bool {
        self.insert(name.to_string(), constructor, Some(Arc::clone(library)));
        true
    }

    fn offer_settings_factory(
        &mut self,
        name: &str,
        _constructor: SettingsFactoryConstructor,
        library: &Arc<LibraryHandle>,
    ) -> bool {
        debug!(name, library = %library.path().display(), "skipping settings entry in solver registry");
        false
    }
}

impl RegistrySink for SettingsRegistry {
    fn kind(&self) -> RegistryKind {
        self.kind
    }

    fn offer_solver(
        &mut self,
        name: &str,
        _constructor: SolverConstructor,
        library: &Arc<LibraryHandle>,
    ) -> bool {
        debug!(name, library = %library.path().display(), "skipping solver entry in settings registry");
        false
    }

    fn offer_settings_factory(
        &mut self,
        name: &str,
        constructor: SettingsFactoryConstructor,
        library: &Arc<LibraryHandle>,
    ) -> bool {
        self.insert(name.to_string(), constructor, Some(Arc::clone(library)));
        true
    }
}
