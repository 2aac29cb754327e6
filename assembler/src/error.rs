//! Error types for the Hack assembler
//!
//! Every error is fatal: the assembler aborts on the first malformed
//! construct and reports a single diagnostic.

use std::fmt;
use std::io;

/// Errors produced while assembling a Hack program
#[derive(Debug)]
pub enum AssembleError {
    /// Input could not be read or output could not be written
    Io(io::Error),
    /// Wrong file extension or otherwise unusable input
    Format(String),
    /// Malformed instruction text
    Syntax(String),
    /// A `(LABEL)` was declared twice
    DuplicateLabel(String),
    /// Dest mnemonic not in the encoding table
    UnknownDest(String),
    /// Comp mnemonic not in the encoding table
    UnknownComp(String),
    /// Jump mnemonic not in the encoding table
    UnknownJump(String),
    /// Numeric A-instruction address above the 15-bit range
    AddressOverflow(u32),
}

impl std::error::Error for AssembleError {}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Syntax(msg) => write!(f, "syntax error: {msg}"),
            Self::DuplicateLabel(name) => write!(f, "duplicate label: ({name})"),
            Self::UnknownDest(m) => write!(f, "unknown dest mnemonic: {m}"),
            Self::UnknownComp(m) => write!(f, "unknown comp mnemonic: {m}"),
            Self::UnknownJump(m) => write!(f, "unknown jump mnemonic: {m}"),
            Self::AddressOverflow(addr) => {
                write!(f, "address {addr} exceeds the 15-bit range (max 32767)")
            }
        }
    }
}

impl From<io::Error> for AssembleError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AssembleError::DuplicateLabel("LOOP".to_string());
        assert_eq!(err.to_string(), "duplicate label: (LOOP)");

        let err = AssembleError::UnknownComp("D+2".to_string());
        assert_eq!(err.to_string(), "unknown comp mnemonic: D+2");

        let err = AssembleError::AddressOverflow(40000);
        assert!(err.to_string().contains("40000"));
    }
}
