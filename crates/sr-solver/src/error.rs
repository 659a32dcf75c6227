//! Error types for backend-facing operations.

use sr_core::{CoreError, Real};
use thiserror::Error;

/// Errors raised by a model while being evaluated.
#[derive(Error, Debug)]
pub enum SystemError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Evaluation failed at t={t}: {message}")]
    Evaluation { t: Real, message: String },
}

pub type SystemResult<T> = Result<T, SystemError>;

/// Errors raised by a solver backend while integrating.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Solver not initialized")]
    NotInitialized,

    #[error("Step failed at t={t}: {message}")]
    StepFailed { t: Real, message: String },

    #[error("System error: {0}")]
    System(#[from] SystemError),
}

pub type SolverResult<T> = Result<T, SolverError>;

/// Errors raised by a settings backend.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("No settings available for solver: {name}")]
    UnknownSolver { name: String },

    #[error("Invalid settings value: {0}")]
    Invalid(#[from] CoreError),
}

pub type SettingsResult<T> = Result<T, SettingsError>;
