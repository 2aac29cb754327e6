//! VM Translator
//!
//! Translates programs in the stack-based VM intermediate language into Hack
//! assembly, including the full function calling convention.
//!
//! # Architecture
//!
//! - [`parser`]: Parses `.vm` text into tagged [`parser::Command`] values
//! - [`code_writer`]: Lowers commands to assembly, tracking the per-file
//!   static namespace, the enclosing function for label scoping, and the
//!   unique-label counters
//! - [`error`]: The fatal error taxonomy
//!
//! A translation of several files shares one [`code_writer::CodeWriter`] so
//! return-address and comparison labels stay unique across the whole program.
//!
//! # Example
//!
//! ```rust
//! use vm_translator::translate_source;
//!
//! let asm = translate_source("Add", "push constant 7\npush constant 8\nadd\n").unwrap();
//! assert!(asm.contains("@7"));
//! assert!(asm.contains("@8"));
//! assert!(asm.contains("M=M+D"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod code_writer;
pub mod error;
pub mod parser;

pub use code_writer::CodeWriter;
pub use error::TranslateError;
pub use parser::{ArithmeticOp, Command, Parser, Segment};

/// Translates one `.vm` source, without bootstrap code
///
/// `file_stem` names the static segment (`<stem>.<i>`) and scopes labels
/// that appear outside any function.
pub fn translate_source(file_stem: &str, source: &str) -> Result<String, TranslateError> {
    translate_program(&[(file_stem.to_string(), source.to_string())], false)
}

/// Translates a whole program, one or more `.vm` files, into one assembly
/// listing
///
/// With `bootstrap` set (directory mode), the output starts by setting SP to
/// 256 and calling `Sys.init`.
pub fn translate_program(
    files: &[(String, String)],
    bootstrap: bool,
) -> Result<String, TranslateError> {
    if files.is_empty() {
        return Err(TranslateError::Format(
            "no .vm files to translate".to_string(),
        ));
    }

    let mut writer = CodeWriter::new();
    if bootstrap {
        writer.write_bootstrap();
    }

    for (stem, source) in files {
        writer.set_file_name(stem);
        let mut parser = Parser::new(source);
        while parser.has_more_commands() {
            let command = parser.advance()?;
            writer.write_command(&command)?;
        }
    }

    Ok(writer.finish())
}
