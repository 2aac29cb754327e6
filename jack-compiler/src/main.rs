//! Jack Compiler - Main Entry Point
//!
//! Compiles a `.jack` file, or every `.jack` file in a directory, to `.vm`
//! files placed next to their inputs.
//!
//! # Usage
//! ```bash
//! cargo run <input.jack | directory>
//! ```

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use colored::Colorize;
use jack_compiler::{CompileError, compile_source};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.jack | directory>", args[0]);
        process::exit(1);
    }

    if let Err(e) = run(Path::new(&args[1])) {
        eprintln!("{} {e}", "error:".red().bold());
        process::exit(1);
    }
}

fn run(input: &Path) -> Result<(), CompileError> {
    let files = if input.is_dir() {
        collect_jack_files(input)?
    } else {
        if input.extension().is_none_or(|ext| ext != "jack") {
            return Err(CompileError::Format(format!(
                "expected a .jack file or a directory, got {}",
                input.display()
            )));
        }
        vec![input.to_path_buf()]
    };

    for path in &files {
        let source = fs::read_to_string(path)?;
        let vm_code = compile_source(&source)?;

        let output = path.with_extension("vm");
        fs::write(&output, vm_code)?;
        println!("Compiled {} -> {}", path.display(), output.display());
    }

    Ok(())
}

/// All `.jack` files in the directory, sorted by name
fn collect_jack_files(dir: &Path) -> Result<Vec<PathBuf>, CompileError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "jack"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(CompileError::Format(format!(
            "no .jack files in {}",
            dir.display()
        )));
    }
    Ok(files)
}
