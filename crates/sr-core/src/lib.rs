//! sr-core: stable foundation for simruntime.
//!
//! Contains:
//! - numeric (Real + tolerances + sequence checks)
//! - paths (the library/system/config directory triple)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod paths;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use paths::RuntimePaths;
