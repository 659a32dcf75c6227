//! The default factory against a real backend library built from
//! `crates/sr-stub-backend`.
//!
//! The library is built once per test run into its own target directory and
//! copied under the backend file names a test needs.

mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use sr_core::RuntimePaths;
use sr_factory::{
    Backend, DylibLoader, FactoryConfig, FactoryError, FactoryState, LibraryLoader, LoadError,
    LoadOutcome, RegistryKind, SETTINGS_LIBRARY_STEM, SolverFactory, SolverRegistry,
    library_file_name,
};
use sr_solver::{ABI_VERSION, SolverError, SolverStatus};
use tempfile::TempDir;

struct BuiltBackends {
    current: PathBuf,
    stale_abi: PathBuf,
}

fn backends() -> &'static BuiltBackends {
    static BUILT: OnceLock<BuiltBackends> = OnceLock::new();
    BUILT.get_or_init(|| {
        let root = Path::new(env!("CARGO_TARGET_TMPDIR")).join("sr-stub-backend");
        BuiltBackends {
            current: build_backend(&root.join("current"), &[]),
            stale_abi: build_backend(&root.join("stale-abi"), &["--features", "stale-abi"]),
        }
    })
}

fn build_backend(target_dir: &Path, extra_args: &[&str]) -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("../sr-stub-backend/Cargo.toml");
    let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
    let status = Command::new(cargo)
        .args(["build", "--quiet", "--offline", "--manifest-path"])
        .arg(&manifest)
        .arg("--target-dir")
        .arg(target_dir)
        .args(extra_args)
        .env_remove("CARGO_TARGET_DIR")
        .status()
        .expect("failed to spawn cargo");
    assert!(status.success(), "building sr-stub-backend failed: {status}");

    let artifact = target_dir
        .join("debug")
        .join(library_file_name("sr_stub_backend"));
    assert!(artifact.is_file(), "missing {}", artifact.display());
    artifact
}

/// Library directory holding the settings library and the cvode library;
/// no euler library.
fn library_dir(cvode: &Path) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(
        &backends().current,
        dir.path().join(library_file_name(SETTINGS_LIBRARY_STEM)),
    )
    .unwrap();
    fs::copy(cvode, dir.path().join(Backend::Cvode.library_file_name())).unwrap();
    dir
}

fn config_for(dir: &Path) -> FactoryConfig {
    FactoryConfig::new(RuntimePaths::new(dir, dir, dir))
}

#[test]
fn construction_and_cvode_from_real_libraries() {
    let dir = library_dir(&backends().current);

    let mut factory = SolverFactory::new(config_for(dir.path())).unwrap();

    assert_eq!(factory.state(), FactoryState::Ready);
    assert_eq!(factory.loader().loaded_count(), 2);
    assert!(factory.is_backend_loaded(Backend::Cvode));
    assert_eq!(factory.solver_registry().names(), vec!["cvodeSolver"]);

    let settings_factory = factory.create_settings_factory().unwrap();
    let global = settings_factory.global_settings().unwrap();
    let settings = settings_factory
        .create_solver_settings(&global.solver_name)
        .unwrap();

    let mut solver = factory
        .create_solver(common::system(), &global.solver_name, settings.as_ref())
        .unwrap();
    let cvode_path = fs::canonicalize(dir.path().join(Backend::Cvode.library_file_name())).unwrap();
    assert_eq!(solver.name(), "cvode");
    assert_eq!(solver.library_path(), Some(cvode_path.as_path()));

    solver.set_end_time(global.end_time);
    solver.initialize().unwrap();
    solver.solve().unwrap();
    assert_eq!(solver.status(), SolverStatus::Done);

    factory
        .create_solver(common::system(), "dassl", settings.as_ref())
        .unwrap();
    let err = factory
        .create_solver(common::system(), "euler", settings.as_ref())
        .unwrap_err();
    assert!(
        matches!(
            err,
            FactoryError::Load {
                source: LoadError::Missing { .. },
                ..
            }
        ),
        "got {err:?}"
    );
}

#[test]
fn backend_values_stay_usable_after_teardown() {
    let dir = library_dir(&backends().current);
    let mut factory = SolverFactory::new(config_for(dir.path())).unwrap();
    let settings_factory = factory.create_settings_factory().unwrap();
    let settings = settings_factory.create_solver_settings("cvode").unwrap();
    let unknown = settings_factory.create_solver_settings("rk4").err().unwrap();
    let mut solver = factory
        .create_solver(common::system(), "cvode", settings.as_ref())
        .unwrap();
    solver.set_start_time(1.0);
    solver.set_end_time(0.0);
    let rejected = solver.initialize().unwrap_err();
    let step = settings.initial_step_size();

    drop(solver);
    drop(settings_factory);
    drop(factory);

    // Vtables and static strings all live in the backend library.
    assert_eq!(settings.initial_step_size(), step);
    assert_eq!(settings.upper_step_limit(), step * 1e3);
    assert!(matches!(rejected, SolverError::InvalidArg { .. }));
    assert_eq!(rejected.to_string(), "Invalid argument: end time precedes start time");
    assert!(unknown.to_string().contains("rk4"));
}

#[test]
fn two_spellings_of_one_library_load_once() {
    let dir = library_dir(&backends().current);
    let direct = dir.path().join(Backend::Cvode.library_file_name());
    let dotted = dir.path().join(".").join(Backend::Cvode.library_file_name());
    let mut loader = DylibLoader::new();
    let mut registry = SolverRegistry::new(RegistryKind::Solver);

    let first = loader.load_library(&direct, &mut registry).unwrap();
    let second = loader.load_library(&dotted, &mut registry).unwrap();

    assert_eq!(first, LoadOutcome::Loaded { registered: 1 });
    assert_eq!(second, LoadOutcome::AlreadyLoaded);
    assert_eq!(loader.loaded_count(), 1);
    assert!(loader.is_loaded(&dotted));
}

#[cfg(unix)]
#[test]
fn symlinked_library_loads_once() {
    let dir = library_dir(&backends().current);
    let direct = dir.path().join(Backend::Cvode.library_file_name());
    let link = dir.path().join("libcvode-link.so");
    std::os::unix::fs::symlink(&direct, &link).unwrap();
    let mut loader = DylibLoader::new();
    let mut registry = SolverRegistry::new(RegistryKind::Solver);

    loader.load_library(&direct, &mut registry).unwrap();
    let again = loader.load_library(&link, &mut registry).unwrap();

    assert_eq!(again, LoadOutcome::AlreadyLoaded);
    assert_eq!(loader.loaded_count(), 1);
}

#[test]
fn stale_abi_library_fails_construction() {
    let dir = library_dir(&backends().stale_abi);

    let err = SolverFactory::new(config_for(dir.path())).unwrap_err();

    match err {
        FactoryError::Load { backend, source } => {
            assert_eq!(backend, Backend::Cvode.name());
            match source {
                LoadError::AbiMismatch {
                    expected_abi,
                    found_abi,
                    ..
                } => {
                    assert_eq!(expected_abi, ABI_VERSION);
                    assert_eq!(found_abi, ABI_VERSION + 1);
                }
                other => panic!("expected AbiMismatch, got {other:?}"),
            }
        }
        other => panic!("expected Load, got {other:?}"),
    }
}

#[test]
fn stale_abi_library_registers_nothing() {
    let mut loader = DylibLoader::new();
    let mut registry = SolverRegistry::new(RegistryKind::Solver);

    let err = loader
        .load_library(&backends().stale_abi, &mut registry)
        .unwrap_err();

    assert!(matches!(err, LoadError::AbiMismatch { .. }), "got {err:?}");
    assert!(registry.is_empty());
    assert_eq!(loader.loaded_count(), 0);
}
