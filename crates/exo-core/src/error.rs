#![forbid(unsafe_code)]

//! Error types for the exoplanet data pipeline.
//!
//! Nothing in here is fatal to a session. Unparseable numeric cells are not
//! errors at all: they degrade to `None` and are reported as
//! [`ParseDegradation`](crate::normalize::ParseDegradation) values.

use thiserror::Error;

use crate::record::NumericField;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the pipeline and the scene controller contract.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An operation was invoked with a missing or out-of-contract argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No record carries a value for the field, so it has no extent.
    #[error("no values present for {0}")]
    EmptyExtent(NumericField),

    /// A filter parameter or axis name that is not part of the schema.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The source table could not be split into rows.
    #[error("malformed table at line {line}: {message}")]
    Table { line: usize, message: String },

    /// Reading the source table failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns `true` for contract violations by the caller.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
