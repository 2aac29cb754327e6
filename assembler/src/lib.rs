//! Hack Assembler
//!
//! Two-pass assembler translating Hack assembly language into Hack machine
//! code (16-bit ASCII binary, one instruction per line).
//!
//! # Architecture
//!
//! The assembler consists of four modules:
//! - [`parser`]: Zero-copy parsing of assembly instructions
//! - [`code`]: Binary encoding using perfect hash functions (PHF)
//! - [`symbol_table`]: Symbol management with predefined symbols
//! - [`error`]: The fatal error taxonomy
//!
//! # Translation
//!
//! - **Pass 1**: Builds the symbol table by recording label positions
//! - **Pass 2**: Generates machine code, resolving all symbols; undeclared
//!   symbolic references are allocated RAM addresses starting at 16
//!
//! # Example
//!
//! ```rust
//! use assembler::assemble;
//!
//! let binary = assemble("@2\nD=A\n@3\nD=D+A\n@0\nM=D\n").unwrap();
//! let lines: Vec<&str> = binary.lines().collect();
//! assert_eq!(lines[0], "0000000000000010"); // @2
//! assert_eq!(lines[1], "1110110000010000"); // D=A
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::inline_always,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod code;
pub mod error;
pub mod parser;
pub mod symbol_table;

// Re-export commonly used types for convenience
pub use error::AssembleError;
pub use parser::{CommandType, ParserLines};
pub use symbol_table::SymbolTable;

/// First pass: Build symbol table with label addresses
///
/// Scans through all lines and records the ROM address of each label.
/// Label declarations (L-commands) don't generate code, so they don't
/// increment the ROM address counter.
pub fn first_pass(lines: &[String], symbol_table: &mut SymbolTable) -> Result<(), AssembleError> {
    let mut rom_address = 0u16;
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance() {
        match parser.command_type()? {
            CommandType::LCommand => {
                // Labels mark the next instruction's address
                let symbol = parser.symbol()?;
                symbol_table.add_label(symbol, rom_address)?;
            }
            CommandType::ACommand | CommandType::CCommand => {
                // Actual instructions increment the address
                rom_address += 1;
            }
        }
    }

    Ok(())
}

/// Second pass: Generate machine code
///
/// Translates each instruction to binary:
/// - A-commands: Resolve symbols to addresses, allocating variables from 16
/// - C-commands: Encode dest, comp, and jump fields
/// - L-commands: Skip (already processed in pass 1)
pub fn second_pass(
    lines: &[String],
    symbol_table: &mut SymbolTable,
    output: &mut String,
) -> Result<(), AssembleError> {
    let mut ram_address = 16u16; // Variables start at RAM[16]
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance() {
        match parser.command_type()? {
            CommandType::ACommand => {
                let symbol = parser.symbol()?;
                let address = resolve_address(symbol, symbol_table, &mut ram_address)?;

                output.push_str(&code::encode_a_instruction(address));
                output.push('\n');
            }
            CommandType::CCommand => {
                let instruction =
                    code::encode_c_instruction(parser.dest()?, parser.comp()?, parser.jump()?)?;
                output.push_str(&instruction);
                output.push('\n');
            }
            CommandType::LCommand => {
                // Validated and recorded in pass 1
                parser.symbol()?;
            }
        }
    }

    Ok(())
}

/// Resolves an A-instruction operand to a 15-bit address
///
/// A symbol starting with a digit must be a decimal constant; anything else
/// is looked up in the table or allocated as a new variable.
fn resolve_address(
    symbol: &str,
    symbol_table: &mut SymbolTable,
    ram_address: &mut u16,
) -> Result<u16, AssembleError> {
    if symbol.as_bytes()[0].is_ascii_digit() {
        let value: u32 = symbol
            .parse()
            .map_err(|_| AssembleError::Syntax(format!("invalid address literal: @{symbol}")))?;
        if value > 0x7FFF {
            return Err(AssembleError::AddressOverflow(value));
        }
        u16::try_from(value).map_err(|_| AssembleError::AddressOverflow(value))
    } else {
        Ok(symbol_table.get_or_insert(symbol, ram_address))
    }
}

/// Assembles a complete Hack assembly program into machine code
///
/// Returns one 16-character binary line per instruction, each terminated by
/// a newline. The first error encountered aborts the translation.
pub fn assemble(source: &str) -> Result<String, AssembleError> {
    let lines: Vec<String> = source.lines().map(str::to_string).collect();

    let mut symbol_table = SymbolTable::new();
    first_pass(&lines, &mut symbol_table)?;

    // Each emitted line is 17 bytes including the newline
    let mut output = String::with_capacity(lines.len() * 17);
    second_pass(&lines, &mut symbol_table, &mut output)?;
    Ok(output)
}
