//! MixedSystem trait for the model a solver integrates.

use std::sync::{Arc, Mutex};

use sr_core::Real;

use crate::error::SystemResult;

/// A compiled model exposed to integrator backends.
///
/// The runtime does not evaluate equations itself; it only hands this
/// handle to whichever backend was selected. A MixedSystem must provide:
/// - its continuous state dimension
/// - the initial state
/// - the right-hand side dx/dt = f(t, x)
pub trait MixedSystem: Send {
    /// Model name, used in diagnostics.
    fn name(&self) -> &str;

    /// Number of continuous states.
    fn dimension(&self) -> usize;

    /// Write the initial state into `x` (length == `dimension()`).
    fn initial_state(&self, x: &mut [Real]);

    /// Compute state derivatives into `dxdt`.
    ///
    /// Takes &mut self so models can cache intermediate results between calls.
    fn rhs(&mut self, t: Real, x: &[Real], dxdt: &mut [Real]) -> SystemResult<()>;
}

/// Shared handle to a model. The solver and the engine both hold one.
pub type SystemRef = Arc<Mutex<dyn MixedSystem>>;

/// Wrap a concrete model into a `SystemRef`.
pub fn shared_system<S: MixedSystem + 'static>(system: S) -> SystemRef {
    Arc::new(Mutex::new(system))
}
