use core::{error, fmt};

/// Errors raised whilst running biosig.
///
/// Only argument misuse is reported through this type. Data-quality problems
/// (too short, fully missing) are surfaced as diagnostics next to a NaN result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Argument passed into a function was invalid.
    InvalidArg {
        /// The invalid arg
        arg: String,
        /// Explaining why arg is invalid.
        reason: String,
    },
    /// Two or more arguments passed into a function conflict.
    ConflictArg {
        /// Explaining what arg is invalid.
        reason: String,
    },
    /// Execution was attempted with a violated kernel invariant.
    ExecInvariantViolation {
        /// Why execution could not proceed.
        reason: String,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidArg`].
    pub fn invalid_arg(arg: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArg {
            arg: arg.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArg { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            Error::ConflictArg { reason } => write!(f, "Conflicting arguments: {reason}"),
            Error::ExecInvariantViolation { reason } => {
                write!(f, "Execution invariant violation: {reason}")
            }
        }
    }
}

impl error::Error for Error {}
