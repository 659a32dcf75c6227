//! Solver selector vocabulary and backend library names.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fmt;
use std::str::FromStr;

use sr_solver::solver_key;

use crate::error::FactoryError;

/// File stem of the settings backend library.
pub const SETTINGS_LIBRARY_STEM: &str = "sr_settings";

/// Backend whose library is loaded eagerly at factory construction.
pub const DEFAULT_SOLVER_BACKEND: Backend = Backend::Cvode;

/// Platform file name for a library stem: `sr_cvode` -> `libsr_cvode.so`.
pub fn library_file_name(stem: &str) -> String {
    format!("{DLL_PREFIX}{stem}{DLL_SUFFIX}")
}

/// Classify a selector name without touching the filesystem.
///
/// Unknown names fail with `InvalidArgument`; callers can use this to
/// validate a name before a factory exists.
pub fn classify(solver_name: &str) -> Result<Resolution, FactoryError> {
    Ok(solver_name.parse::<SolverSelector>()?.resolve())
}

/// Every name `create_solver` accepts. Matching is case-sensitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SolverSelector {
    Euler,
    Idas,
    Ida,
    Cvode,
    /// Served by the CVode backend.
    Dassl,
}

impl SolverSelector {
    pub const ALL: [SolverSelector; 5] = [
        SolverSelector::Euler,
        SolverSelector::Idas,
        SolverSelector::Ida,
        SolverSelector::Cvode,
        SolverSelector::Dassl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SolverSelector::Euler => "euler",
            SolverSelector::Idas => "idas",
            SolverSelector::Ida => "ida",
            SolverSelector::Cvode => "cvode",
            SolverSelector::Dassl => "dassl",
        }
    }

    /// Apply aliasing and placeholder rules.
    pub fn resolve(self) -> Resolution {
        match self {
            SolverSelector::Euler => Resolution::Load(Backend::Euler),
            SolverSelector::Cvode | SolverSelector::Dassl => Resolution::Load(Backend::Cvode),
            SolverSelector::Idas => Resolution::Placeholder("idas"),
            SolverSelector::Ida => Resolution::Placeholder("ida"),
        }
    }
}

impl FromStr for SolverSelector {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SolverSelector::ALL
            .into_iter()
            .find(|sel| sel.as_str() == s)
            .ok_or_else(|| FactoryError::invalid(format!("Selected solver is not available: {s}")))
    }
}

impl fmt::Display for SolverSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend that ships as its own library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    Euler,
    Cvode,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Backend::Euler => "euler",
            Backend::Cvode => "cvode",
        }
    }

    pub fn library_stem(self) -> &'static str {
        match self {
            Backend::Euler => "sr_euler",
            Backend::Cvode => "sr_cvode",
        }
    }

    pub fn library_file_name(self) -> String {
        library_file_name(self.library_stem())
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a recognized selector turns into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Load this backend's library, then look it up.
    Load(Backend),
    /// Recognized name without an implementation: no load, lookup only.
    Placeholder(&'static str),
}

impl Resolution {
    pub fn backend_name(self) -> &'static str {
        match self {
            Resolution::Load(backend) => backend.name(),
            Resolution::Placeholder(name) => name,
        }
    }

    pub fn registry_key(self) -> String {
        solver_key(self.backend_name())
    }
}
