//! Error types for the VM translator

use std::fmt;
use std::io;

/// Errors produced while translating VM code to Hack assembly
#[derive(Debug)]
pub enum TranslateError {
    /// Input could not be read or output could not be written
    Io(io::Error),
    /// Wrong file extension, or a directory with no `.vm` files
    Format(String),
    /// Malformed VM command
    Syntax(String),
}

impl std::error::Error for TranslateError {}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Syntax(msg) => write!(f, "syntax error: {msg}"),
        }
    }
}

impl From<io::Error> for TranslateError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}
