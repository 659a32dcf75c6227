//! Settings handed to solver backends.

use sr_core::{Real, RuntimePaths, Tolerances};

use crate::error::{SettingsError, SettingsResult};

/// Per-solver numeric settings.
pub trait SolverSettings {
    fn initial_step_size(&self) -> Real;

    fn lower_step_limit(&self) -> Real;

    fn upper_step_limit(&self) -> Real;

    fn tolerances(&self) -> Tolerances;
}

/// Run-wide settings shared by every backend.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalSettings {
    pub start_time: Real,
    pub end_time: Real,
    /// Output sampling interval.
    pub output_interval: Real,
    /// Selector name passed to the solver factory.
    pub solver_name: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            end_time: 1.0,
            output_interval: 1e-2,
            solver_name: "cvode".to_string(),
        }
    }
}

/// A settings backend, produced from a loaded library via the
/// `SettingsFactory` registry key. Shared between factory and orchestration.
pub trait SettingsFactory: Send + Sync {
    /// Paths this factory was constructed with.
    fn paths(&self) -> &RuntimePaths;

    fn global_settings(&self) -> SettingsResult<GlobalSettings>;

    /// Settings for the named solver backend.
    fn create_solver_settings(&self, solver: &str) -> SettingsResult<Box<dyn SolverSettings>>;
}

/// Plain-value `SolverSettings`, for backends and hosts that do not need
/// anything richer.
#[derive(Clone, Debug, PartialEq)]
pub struct BasicSolverSettings {
    pub initial_step_size: Real,
    pub lower_step_limit: Real,
    pub upper_step_limit: Real,
    pub tolerances: Tolerances,
}

impl BasicSolverSettings {
    pub fn new(initial_step_size: Real, tolerances: Tolerances) -> SettingsResult<Self> {
        let tolerances = tolerances.validate()?;
        if !(initial_step_size.is_finite() && initial_step_size > 0.0) {
            return Err(SettingsError::Invalid(sr_core::CoreError::InvalidArg {
                what: "initial step size must be positive",
            }));
        }
        Ok(Self {
            initial_step_size,
            lower_step_limit: initial_step_size * 1e-6,
            upper_step_limit: initial_step_size * 1e3,
            tolerances,
        })
    }
}

impl Default for BasicSolverSettings {
    fn default() -> Self {
        Self {
            initial_step_size: 1e-3,
            lower_step_limit: 1e-9,
            upper_step_limit: 1.0,
            tolerances: Tolerances::default(),
        }
    }
}

impl SolverSettings for BasicSolverSettings {
    fn initial_step_size(&self) -> Real {
        self.initial_step_size
    }

    fn lower_step_limit(&self) -> Real {
        self.lower_step_limit
    }

    fn upper_step_limit(&self) -> Real {
        self.upper_step_limit
    }

    fn tolerances(&self) -> Tolerances {
        self.tolerances
    }
}
