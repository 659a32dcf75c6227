//! Shared fixtures: stub backends, a recording loader, configs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sr_core::{Real, RuntimePaths};
use sr_factory::{
    Backend, FactoryConfig, LibraryLoader, LoadOutcome, LoadResult, RegistrySink,
    SETTINGS_LIBRARY_STEM, StaticLoader, library_file_name,
};
use sr_solver::{
    BasicSolverSettings, GlobalSettings, MixedSystem, PluginDeclaration, PluginRegistrar,
    SETTINGS_FACTORY_KEY, SettingsError, SettingsFactory, SettingsResult, Solver, SolverError,
    SolverResult, SolverSettings, SolverStatus, SystemRef, SystemResult, shared_system,
    solver_key,
};

/// Two-state model with constant derivatives.
pub struct RampSystem;

impl MixedSystem for RampSystem {
    fn name(&self) -> &str {
        "ramp"
    }

    fn dimension(&self) -> usize {
        2
    }

    fn initial_state(&self, x: &mut [Real]) {
        x.fill(0.0);
    }

    fn rhs(&mut self, _t: Real, _x: &[Real], dxdt: &mut [Real]) -> SystemResult<()> {
        dxdt[0] = 1.0;
        dxdt[1] = -1.0;
        Ok(())
    }
}

pub fn system() -> SystemRef {
    shared_system(RampSystem)
}

/// Backend stand-in: remembers which backend built it and what step it got.
pub struct StubSolver {
    pub backend: &'static str,
    pub system: SystemRef,
    pub h: Real,
    pub t: Real,
    pub t_end: Real,
    pub status: SolverStatus,
}

impl StubSolver {
    fn boxed(backend: &'static str, system: SystemRef, settings: &dyn SolverSettings) -> Box<dyn Solver> {
        Box::new(StubSolver {
            backend,
            system,
            h: settings.initial_step_size(),
            t: 0.0,
            t_end: 0.0,
            status: SolverStatus::Uninitialized,
        })
    }
}

impl Solver for StubSolver {
    fn name(&self) -> &str {
        self.backend
    }

    fn set_start_time(&mut self, t: Real) {
        self.t = t;
    }

    fn set_end_time(&mut self, t: Real) {
        self.t_end = t;
    }

    fn set_initial_step_size(&mut self, h: Real) {
        self.h = h;
    }

    fn initialize(&mut self) -> SolverResult<()> {
        self.status = SolverStatus::Continue;
        Ok(())
    }

    fn solve(&mut self) -> SolverResult<()> {
        if self.status == SolverStatus::Uninitialized {
            return Err(SolverError::NotInitialized);
        }
        let mut system = self.system.lock().map_err(|_| SolverError::StepFailed {
            t: self.t,
            message: "system lock poisoned".to_string(),
        })?;
        let mut x = vec![0.0; system.dimension()];
        let mut dxdt = vec![0.0; x.len()];
        system.initial_state(&mut x);
        while self.t < self.t_end {
            system.rhs(self.t, &x, &mut dxdt)?;
            self.t += self.h;
        }
        self.status = SolverStatus::Done;
        Ok(())
    }

    fn status(&self) -> SolverStatus {
        self.status
    }
}

fn create_euler(system: SystemRef, settings: &dyn SolverSettings) -> Box<dyn Solver> {
    StubSolver::boxed("euler", system, settings)
}

fn create_cvode(system: SystemRef, settings: &dyn SolverSettings) -> Box<dyn Solver> {
    StubSolver::boxed("cvode", system, settings)
}

pub struct StubSettingsFactory {
    paths: RuntimePaths,
}

impl SettingsFactory for StubSettingsFactory {
    fn paths(&self) -> &RuntimePaths {
        &self.paths
    }

    fn global_settings(&self) -> SettingsResult<GlobalSettings> {
        Ok(GlobalSettings::default())
    }

    fn create_solver_settings(&self, solver: &str) -> SettingsResult<Box<dyn SolverSettings>> {
        match solver {
            "euler" | "cvode" => Ok(Box::new(BasicSolverSettings::default())),
            other => Err(SettingsError::UnknownSolver {
                name: other.to_string(),
            }),
        }
    }
}

fn create_settings(paths: &RuntimePaths) -> Box<dyn SettingsFactory> {
    Box::new(StubSettingsFactory {
        paths: paths.clone(),
    })
}

pub fn register_settings(registrar: &mut dyn PluginRegistrar) {
    registrar.register_settings_factory(SETTINGS_FACTORY_KEY, create_settings);
}

fn register_cvode(registrar: &mut dyn PluginRegistrar) {
    registrar.register_solver(&solver_key("cvode"), create_cvode);
}

fn register_euler(registrar: &mut dyn PluginRegistrar) {
    registrar.register_solver(&solver_key("euler"), create_euler);
}

pub fn settings_file() -> String {
    library_file_name(SETTINGS_LIBRARY_STEM)
}

/// Loader offering the settings and cvode libraries, optionally euler.
pub fn static_loader(with_euler: bool) -> StaticLoader {
    let loader = StaticLoader::new()
        .with_library(settings_file(), PluginDeclaration::new(register_settings))
        .with_library(
            Backend::Cvode.library_file_name(),
            PluginDeclaration::new(register_cvode),
        );
    if with_euler {
        loader.with_library(
            Backend::Euler.library_file_name(),
            PluginDeclaration::new(register_euler),
        )
    } else {
        loader
    }
}

pub fn config(library_dir: impl Into<PathBuf>) -> FactoryConfig {
    FactoryConfig::new(RuntimePaths::new(library_dir, "/opt/sim/model", "/opt/sim/config"))
}

pub fn backend_path(config: &FactoryConfig, backend: Backend) -> PathBuf {
    config.paths.library(backend.library_file_name())
}

/// What a `RecordingLoader` saw. Shared so tests can inspect it after the
/// loader has moved into (or been dropped with) a factory.
#[derive(Debug, Default)]
pub struct LoaderLog {
    pub requests: Vec<PathBuf>,
    pub unload_calls: usize,
    pub released: usize,
}

pub struct RecordingLoader {
    inner: StaticLoader,
    log: Arc<Mutex<LoaderLog>>,
}

impl RecordingLoader {
    pub fn new(inner: StaticLoader) -> (Self, Arc<Mutex<LoaderLog>>) {
        let log = Arc::new(Mutex::new(LoaderLog::default()));
        (
            Self {
                inner,
                log: Arc::clone(&log),
            },
            log,
        )
    }

    pub fn open_count(&self, path: &Path) -> usize {
        self.inner.open_count(path)
    }
}

impl LibraryLoader for RecordingLoader {
    fn load_library(
        &mut self,
        path: &Path,
        target: &mut dyn RegistrySink,
    ) -> LoadResult<LoadOutcome> {
        self.log.lock().unwrap().requests.push(path.to_path_buf());
        self.inner.load_library(path, target)
    }

    fn is_loaded(&self, path: &Path) -> bool {
        self.inner.is_loaded(path)
    }

    fn loaded_count(&self) -> usize {
        self.inner.loaded_count()
    }

    fn unload_all(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.unload_calls += 1;
        log.released += self.inner.loaded_count();
        self.inner.unload_all();
    }
}
