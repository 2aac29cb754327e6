//! Error types for the Jack compiler
//!
//! The compiler aborts on the first malformed construct; there is no error
//! recovery and no attempt to resynchronize.

use std::fmt;
use std::io;

/// Errors produced while compiling Jack source to VM code
#[derive(Debug)]
pub enum CompileError {
    /// Input could not be read or output could not be written
    Io(io::Error),
    /// Wrong file extension, or a directory with no `.jack` files
    Format(String),
    /// Grammar violation, with expected-vs-actual where meaningful
    Syntax(String),
    /// Undefined identifier where a variable is required, or a duplicate
    /// definition in the same scope
    Symbol(String),
    /// Integer constant above the Hack 15-bit range
    IntOutOfRange(u32),
}

impl std::error::Error for CompileError {}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Syntax(msg) => write!(f, "syntax error: {msg}"),
            Self::Symbol(msg) => write!(f, "symbol error: {msg}"),
            Self::IntOutOfRange(value) => {
                write!(f, "integer constant {value} exceeds 32767")
            }
        }
    }
}

impl From<io::Error> for CompileError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}
