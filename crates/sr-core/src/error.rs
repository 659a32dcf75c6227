use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what} at index {index}: {value}")]
    NonFinite {
        what: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Sequence {what} decreases at index {index} ({prev} > {next})")]
    NotMonotonic {
        what: &'static str,
        index: usize,
        prev: f64,
        next: f64,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
