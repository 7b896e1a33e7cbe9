//! Error types for the experiment design engine

use thiserror::Error;

/// Result type for designer operations
pub type DesignerResult<T> = Result<T, DesignerError>;

/// Error types for the experiment design engine
#[derive(Error, Debug)]
pub enum DesignerError {
    /// Unknown capital accounting mode in the options
    #[error("unknown capital type: {0}")]
    UnknownCapitalType(String),

    /// A completed query came back with inconsistent timing
    #[error(
        "something wrong with the timing. send: {send:.4}, receive: {receive:.4}, eval: {eval:.4}"
    )]
    InvalidTiming {
        send: f64,
        receive: f64,
        eval: f64,
    },

    /// A completed query's step index was not in the in-progress set
    #[error("step {0} is not in progress")]
    StepNotInProgress(u64),

    /// The in-progress set holds the same step index more than once
    #[error("step {0} is in progress more than once")]
    DuplicateStepInProgress(u64),

    /// Invalid domain construction
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// Invalid options
    #[error("invalid options: {0}")]
    Validation(String),

    /// The policy could not produce a query
    #[error("query selection failed: {0}")]
    QuerySelection(String),

    /// The worker manager rejected a dispatch
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for DesignerError {
    fn from(err: std::io::Error) -> Self {
        DesignerError::Internal(err.to_string())
    }
}
