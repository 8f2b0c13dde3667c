//! Error taxonomy for the simulator, surfaced at the CLI boundary.
use std::fmt;

/// Errors that can be reported to a user. Internal invariant violations
/// (out-of-range register/memory indices) are not represented here: per
/// design they are programming errors and the implementation asserts and
/// aborts rather than returning a recoverable `SimError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The program file could not be read or parsed.
    ProgramLoad { path: String, reason: String },
    /// A CLI argument was missing or malformed.
    BadArgs(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::ProgramLoad { path, reason } => {
                write!(f, "could not load program `{path}`: {reason}")
            }
            SimError::BadArgs(msg) => write!(f, "bad arguments: {msg}"),
        }
    }
}

impl std::error::Error for SimError {}
