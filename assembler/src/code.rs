//! Code generation module for Hack assembly language
//!
//! Translates assembly mnemonics to binary machine code using perfect hash functions (PHF).
//! PHF provides O(1) lookup with zero runtime overhead - the hash table is computed at compile time.
//!
//! Unknown mnemonics are rejected with an [`AssembleError`]; there are no
//! silent fallback encodings.

use crate::error::AssembleError;
use phf::phf_map;

/// Destination mnemonic to binary code mapping (3 bits)
///
/// Maps destination mnemonics to their 3-bit binary representation.
/// Empty string represents null destination.
static DEST_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "" => "000",
    "M" => "001",
    "D" => "010",
    "MD" => "011",
    "A" => "100",
    "AM" => "101",
    "AD" => "110",
    "AMD" => "111",
};

/// Computation mnemonic to binary code mapping (7 bits: 1 bit 'a' + 6 bits 'cccccc')
///
/// Includes both a=0 (A register) and a=1 (M register) variants.
/// The first bit indicates which register to use: 0 for A, 1 for M.
static COMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    // a=0 (A register operations)
    "0" => "0101010",
    "1" => "0111111",
    "-1" => "0111010",
    "D" => "0001100",
    "A" => "0110000",
    "!D" => "0001101",
    "!A" => "0110001",
    "-D" => "0001111",
    "-A" => "0110011",
    "D+1" => "0011111",
    "A+1" => "0110111",
    "D-1" => "0001110",
    "A-1" => "0110010",
    "D+A" => "0000010",
    "D-A" => "0010011",
    "A-D" => "0000111",
    "D&A" => "0000000",
    "D|A" => "0010101",

    // a=1 (M register operations)
    "M" => "1110000",
    "!M" => "1110001",
    "-M" => "1110011",
    "M+1" => "1110111",
    "M-1" => "1110010",
    "D+M" => "1000010",
    "D-M" => "1010011",
    "M-D" => "1000111",
    "D&M" => "1000000",
    "D|M" => "1010101",
};

/// Jump mnemonic to binary code mapping (3 bits)
///
/// Maps jump mnemonics to their 3-bit binary representation.
/// Empty string represents no jump.
static JUMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "" => "000",
    "JGT" => "001",
    "JEQ" => "010",
    "JGE" => "011",
    "JLT" => "100",
    "JNE" => "101",
    "JLE" => "110",
    "JMP" => "111",
};

/// Translates a destination mnemonic to its binary code
///
/// # Errors
/// `UnknownDest` if the mnemonic is not one of the 8 valid destinations.
#[inline]
pub fn dest(mnemonic: &str) -> Result<&'static str, AssembleError> {
    DEST_MAP
        .get(mnemonic)
        .copied()
        .ok_or_else(|| AssembleError::UnknownDest(mnemonic.to_string()))
}

/// Translates a computation mnemonic to its binary code
///
/// # Errors
/// `UnknownComp` if the mnemonic is not in the Hack comp table.
#[inline]
pub fn comp(mnemonic: &str) -> Result<&'static str, AssembleError> {
    COMP_MAP
        .get(mnemonic)
        .copied()
        .ok_or_else(|| AssembleError::UnknownComp(mnemonic.to_string()))
}

/// Translates a jump mnemonic to its binary code
///
/// # Errors
/// `UnknownJump` if the mnemonic is not one of the 8 valid jumps.
#[inline]
pub fn jump(mnemonic: &str) -> Result<&'static str, AssembleError> {
    JUMP_MAP
        .get(mnemonic)
        .copied()
        .ok_or_else(|| AssembleError::UnknownJump(mnemonic.to_string()))
}

/// Encodes a complete C-instruction
///
/// C-instruction format: 111accccccdddjjj (16 bits)
/// - 111: C-instruction prefix (3 bits)
/// - acccccc: computation (7 bits)
/// - ddd: destination (3 bits)
/// - jjj: jump (3 bits)
///
/// # Errors
/// Rejects unknown mnemonics in any of the three fields.
///
/// # Example
/// ```
/// use assembler::code::encode_c_instruction;
/// let instruction = encode_c_instruction("D", "D+1", "").unwrap();
/// assert_eq!(instruction, "1110011111010000");
/// ```
#[inline]
pub fn encode_c_instruction(
    dest_mnemonic: &str,
    comp_mnemonic: &str,
    jump_mnemonic: &str,
) -> Result<String, AssembleError> {
    Ok(format!(
        "111{}{}{}",
        comp(comp_mnemonic)?,
        dest(dest_mnemonic)?,
        jump(jump_mnemonic)?
    ))
}

/// Encodes an A-instruction
///
/// A-instruction format: 0vvvvvvvvvvvvvvv (16 bits)
/// - 0: A-instruction prefix (1 bit)
/// - vvvvvvvvvvvvvvv: 15-bit address/value
///
/// The caller guarantees `address <= 0x7FFF`; the leading bit of a `u16` in
/// that range is always 0.
///
/// # Example
/// ```
/// use assembler::code::encode_a_instruction;
/// let instruction = encode_a_instruction(100);
/// assert_eq!(instruction, "0000000001100100");
/// ```
#[inline]
#[must_use]
pub fn encode_a_instruction(address: u16) -> String {
    format!("{address:016b}")
}
