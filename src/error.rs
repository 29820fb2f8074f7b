//! Error type shared by the whole engine.

use std::fmt;
use std::io;

use crate::poly::Poly;

/// Errors raised while reducing a system of binary equations.
#[derive(Debug)]
pub enum Error {
    /// No {0,1} assignment satisfies the system. Carries the offending pair.
    Contradiction {
        lhs: Poly,
        rhs: Poly,
        reason: String,
    },
    /// A bounded safety valve tripped; indicates a logic error, not bad data.
    InternalFault(String),
    /// An expression that is not binary-shaped reached a strict store.
    Malformed(String),
    /// Textual input could not be parsed.
    Parse(String),
    /// File I/O error.
    Io(io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn contradiction(lhs: &Poly, rhs: &Poly, reason: impl Into<String>) -> Self {
        Error::Contradiction {
            lhs: lhs.clone(),
            rhs: rhs.clone(),
            reason: reason.into(),
        }
    }

    pub fn is_contradiction(&self) -> bool {
        matches!(self, Error::Contradiction { .. })
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Contradiction { lhs, rhs, reason } => {
                write!(f, "{}: {} == {}", reason, lhs, rhs)
            }
            Error::InternalFault(msg) => write!(f, "Internal fault: {}", msg),
            Error::Malformed(msg) => write!(f, "Malformed input: {}", msg),
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}
