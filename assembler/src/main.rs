//! Hack Assembler - Main Entry Point
//!
//! Translates a `.asm` file into a sibling `.hack` file.
//!
//! # Usage
//! ```bash
//! cargo run <input.asm>
//! ```

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use assembler::{AssembleError, assemble};
use colored::Colorize;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.asm>", args[0]);
        process::exit(1);
    }

    if let Err(e) = run(Path::new(&args[1])) {
        eprintln!("{} {e}", "error:".red().bold());
        process::exit(1);
    }
}

fn run(input: &Path) -> Result<(), AssembleError> {
    if input.extension().is_none_or(|ext| ext != "asm") {
        return Err(AssembleError::Format(format!(
            "expected a .asm file, got {}",
            input.display()
        )));
    }

    let source = fs::read_to_string(input)?;
    let binary = assemble(&source)?;

    let output = output_path(input);
    fs::write(&output, binary)?;

    println!("Assembly completed. Output written to {}", output.display());
    Ok(())
}

/// Determines the output file path: the input with `.hack` in place of `.asm`
fn output_path(input: &Path) -> PathBuf {
    input.with_extension("hack")
}
