//! The surface every integrator backend exposes to the engine.

use sr_core::Real;

use crate::error::SolverResult;

/// Coarse progress state reported by a backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolverStatus {
    #[default]
    Uninitialized,
    /// Initialized, end time not yet reached.
    Continue,
    /// End time reached.
    Done,
    /// Last call failed; the backend must be re-initialized.
    Error,
}

/// Trait for integrator backends (Euler, CVode, ...).
///
/// The stepping algorithm is owned entirely by the backend; the runtime
/// only drives it through this interface.
pub trait Solver: Send {
    /// Backend name, e.g. `"cvode"`.
    fn name(&self) -> &str;

    fn set_start_time(&mut self, t: Real);

    fn set_end_time(&mut self, t: Real);

    fn set_initial_step_size(&mut self, h: Real);

    /// Prepare internal state from the system's initial conditions.
    fn initialize(&mut self) -> SolverResult<()>;

    /// Integrate from the current time to the configured end time.
    fn solve(&mut self) -> SolverResult<()>;

    fn status(&self) -> SolverStatus;
}
