//! error types for quorumkey

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// every failure is terminal for the call that produced it.
/// messages never carry secret material.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("math invariant violated: {0}")]
    MathInvariantViolation(String),

    #[error("secret too large: {len} bytes, at most {max} allowed")]
    EncodingTooLarge { len: usize, max: usize },

    #[error("recovered value is not hex text (digit {digit:?})")]
    DecodeAlphabetViolation { digit: char },

    #[error("malformed input: {0}")]
    Format(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    pub(crate) fn math(msg: impl Into<String>) -> Self {
        Self::MathInvariantViolation(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}
