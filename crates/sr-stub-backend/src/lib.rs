//! A settings backend and a `cvode` solver in one shared library.
//!
//! The loader tests copy the built library under each backend file name and
//! open it through `DylibLoader`. The solver is fixed-step explicit Euler;
//! only the plumbing matters here.

use sr_core::{Real, RuntimePaths, Tolerances};
use sr_solver::{
    BasicSolverSettings, GlobalSettings, PluginRegistrar, SETTINGS_FACTORY_KEY, SettingsError,
    SettingsFactory, SettingsResult, Solver, SolverError, SolverResult, SolverSettings,
    SolverStatus, SystemRef, solver_key,
};

/// Initial step handed out for every known solver.
const STEP: Real = 0.125;

struct StubSettingsFactory {
    paths: RuntimePaths,
}

impl SettingsFactory for StubSettingsFactory {
    fn paths(&self) -> &RuntimePaths {
        &self.paths
    }

    fn global_settings(&self) -> SettingsResult<GlobalSettings> {
        Ok(GlobalSettings {
            end_time: 0.5,
            ..GlobalSettings::default()
        })
    }

    fn create_solver_settings(&self, solver: &str) -> SettingsResult<Box<dyn SolverSettings>> {
        match solver {
            "cvode" | "euler" => Ok(Box::new(BasicSolverSettings::new(
                STEP,
                Tolerances::default(),
            )?)),
            other => Err(SettingsError::UnknownSolver {
                name: other.to_string(),
            }),
        }
    }
}

struct ExplicitSolver {
    system: SystemRef,
    h: Real,
    t_start: Real,
    t_end: Real,
    t: Real,
    x: Vec<Real>,
    status: SolverStatus,
}

impl ExplicitSolver {
    fn lock_failed(t: Real) -> SolverError {
        SolverError::StepFailed {
            t,
            message: "system lock poisoned".to_string(),
        }
    }
}

impl Solver for ExplicitSolver {
    fn name(&self) -> &str {
        "cvode"
    }

    fn set_start_time(&mut self, t: Real) {
        self.t_start = t;
    }

    fn set_end_time(&mut self, t: Real) {
        self.t_end = t;
    }

    fn set_initial_step_size(&mut self, h: Real) {
        self.h = h;
    }

    fn initialize(&mut self) -> SolverResult<()> {
        if self.t_end < self.t_start {
            self.status = SolverStatus::Error;
            return Err(SolverError::InvalidArg {
                what: "end time precedes start time",
            });
        }
        let system = self
            .system
            .lock()
            .map_err(|_| Self::lock_failed(self.t_start))?;
        self.x = vec![0.0; system.dimension()];
        system.initial_state(&mut self.x);
        self.t = self.t_start;
        self.status = SolverStatus::Continue;
        Ok(())
    }

    fn solve(&mut self) -> SolverResult<()> {
        if self.status != SolverStatus::Continue {
            return Err(SolverError::NotInitialized);
        }
        let mut system = self.system.lock().map_err(|_| Self::lock_failed(self.t))?;
        let mut dxdt = vec![0.0; self.x.len()];
        while self.t < self.t_end {
            let h = self.h.min(self.t_end - self.t);
            system.rhs(self.t, &self.x, &mut dxdt)?;
            for (x, d) in self.x.iter_mut().zip(&dxdt) {
                *x += h * d;
            }
            self.t += h;
        }
        self.status = SolverStatus::Done;
        Ok(())
    }

    fn status(&self) -> SolverStatus {
        self.status
    }
}

fn create_settings(paths: &RuntimePaths) -> Box<dyn SettingsFactory> {
    Box::new(StubSettingsFactory {
        paths: paths.clone(),
    })
}

fn create_cvode(system: SystemRef, settings: &dyn SolverSettings) -> Box<dyn Solver> {
    Box::new(ExplicitSolver {
        system,
        h: settings.initial_step_size(),
        t_start: 0.0,
        t_end: 0.0,
        t: 0.0,
        x: Vec::new(),
        status: SolverStatus::Uninitialized,
    })
}

fn register(registrar: &mut dyn PluginRegistrar) {
    registrar.register_settings_factory(SETTINGS_FACTORY_KEY, create_settings);
    registrar.register_solver(&solver_key("cvode"), create_cvode);
}

#[cfg(not(feature = "stale-abi"))]
sr_solver::export_plugin!(register);

#[cfg(feature = "stale-abi")]
#[allow(non_upper_case_globals)]
#[unsafe(no_mangle)]
pub static sr_plugin_declaration: sr_solver::PluginDeclaration = sr_solver::PluginDeclaration {
    abi_version: sr_solver::ABI_VERSION + 1,
    ..sr_solver::PluginDeclaration::new(register)
};
