//! sr-simdata: the data exchange store shared by the simulation engine and
//! reporting.

pub mod snapshot;
pub mod store;
pub mod var;

pub use snapshot::SimDataSnapshot;
pub use store::SimData;
pub use var::{SimVar, VarValue};

use sr_core::CoreError;

pub type SimDataResult<T> = Result<T, SimDataError>;

#[derive(thiserror::Error, Debug)]
pub enum SimDataError {
    #[error("Variable not found: {name}")]
    VarNotFound { name: String },

    #[error("Result not found: {name}")]
    ResultNotFound { name: String },

    #[error("Result {name} has {len} samples, expected {expected}")]
    LengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}
