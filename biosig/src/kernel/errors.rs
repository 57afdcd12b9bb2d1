use biosig_core::Error;
use core::fmt;

/// Validation errors raised at kernel construction or adapter binding time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input or configuration field is empty.
    EmptyInput {
        /// Name of the argument that is empty.
        arg: &'static str,
    },
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyInput { arg } => write!(f, "Input `{arg}` was empty."),
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::EmptyInput { arg } => Error::invalid_arg(arg, "must not be empty."),
            ConfigError::InvalidArgument { arg, reason } => Error::invalid_arg(arg, reason),
            ConfigError::NonContiguous { arg } => {
                Error::invalid_arg(arg, "must be contiguous in memory.")
            }
        }
    }
}

/// Runtime execution invariant violations for checked kernel entrypoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// An execution precondition was violated.
    InvalidState {
        /// Human readable reason.
        reason: &'static str,
    },
    /// Output length mismatched the expected runtime shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// Adapter binding/configuration failure.
    Config(ConfigError),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::InvalidState { reason } => {
                write!(f, "Execution invariant violation: {reason}")
            }
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Execution length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExecInvariantViolation {}

impl From<ExecInvariantViolation> for Error {
    fn from(value: ExecInvariantViolation) -> Self {
        match value {
            ExecInvariantViolation::Config(err) => err.into(),
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => Error::invalid_arg(
                arg,
                format!("expected length {expected}, got {got}."),
            ),
            ExecInvariantViolation::InvalidState { reason } => Error::ExecInvariantViolation {
                reason: reason.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_become_invalid_args() {
        let err: Error = ConfigError::InvalidArgument {
            arg: "noverlap",
            reason: "noverlap must be smaller than the window length",
        }
        .into();
        assert_eq!(
            err,
            Error::InvalidArg {
                arg: "noverlap".into(),
                reason: "noverlap must be smaller than the window length".into(),
            }
        );
    }

    #[test]
    fn length_mismatch_keeps_both_lengths() {
        let err: Error = ExecInvariantViolation::LengthMismatch {
            arg: "out",
            expected: 10,
            got: 9,
        }
        .into();
        assert_eq!(err.to_string(), "Invalid argument `out`: expected length 10, got 9.");
    }
}
