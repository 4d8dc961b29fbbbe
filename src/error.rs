//! Error types for terminfo sessions

use std::fmt;
use std::io;
use thiserror::Error;

/// The three typed capability tables of a terminfo entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Boolean,
    Numeric,
    String,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Boolean => f.write_str("boolean"),
            CapabilityKind::Numeric => f.write_str("numeric"),
            CapabilityKind::String => f.write_str("string"),
        }
    }
}

/// Terminfo session error type
#[derive(Error, Debug)]
pub enum Error {
    /// `init` was called on a session that already holds a context
    #[error("session is already initialized")]
    AlreadyInitialized,

    /// A capability operation was attempted before `init`
    #[error("session is not initialized")]
    NotInitialized,

    /// The terminal cannot do cursor addressing
    #[error("'{0}': hardcopy terminals are not supported")]
    Hardcopy(String),

    /// No entry for the requested terminal type
    #[error("terminal type '{0}' could not be found")]
    TypeNotFound(String),

    /// The terminfo database itself is missing
    #[error("terminfo database could not be found")]
    DatabaseUnavailable,

    /// setupterm failed with a code it does not document
    #[error("unexpected setupterm error (code {0})")]
    Setup(i32),

    /// The capability exists under a different type
    #[error("'{name}' is not a {expected} capability")]
    WrongType {
        name: String,
        expected: CapabilityKind,
    },

    /// The capability is absent from the entry or explicitly canceled
    #[error("'{0}' is a canceled or absent capability")]
    AbsentOrCanceled(String),

    /// tparm rejected the template
    #[error("parameter expansion failed")]
    ExpansionFailed,

    /// tputs rejected the template
    #[error("padding expansion failed")]
    PaddingFailed,

    /// The window size ioctl failed on the descriptor
    #[error("Failed to access window size: {0}")]
    WindowSize(#[source] io::Error),

    /// The platform has no window size ioctl
    #[error("window size requests are not supported on this platform")]
    WindowSizeUnsupported,

    /// A required argument was empty
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// An argument the database cannot accept
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be loaded or is inconsistent
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

/// Result type for terminfo session operations
pub type Result<T> = std::result::Result<T, Error>;
