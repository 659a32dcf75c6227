//! Error types for factory operations.

use thiserror::Error;

use crate::config::ConfigError;
use crate::loader::LoadError;
use crate::registry::RegistryKind;

/// Errors surfaced by `SolverFactory`.
#[derive(Error, Debug)]
pub enum FactoryError {
    /// Unknown selector name, or a fixed registry key nothing registered.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Failed loading {backend} library: {source}")]
    Load {
        backend: String,
        #[source]
        source: LoadError,
    },

    #[error("No such {registry} entry: {key}")]
    NotFound { registry: RegistryKind, key: String },

    #[error("Factory has been shut down")]
    Destroyed,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type FactoryResult<T> = Result<T, FactoryError>;

impl FactoryError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        FactoryError::InvalidArgument {
            message: message.into(),
        }
    }
}
