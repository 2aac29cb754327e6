//! VM Translator - Main Entry Point
//!
//! Translates a single `.vm` file or a directory of them into one `.asm`
//! file. Directory mode prepends the bootstrap (SP = 256, `call Sys.init 0`).
//!
//! # Usage
//! ```bash
//! cargo run <input.vm | directory>
//! ```

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use colored::Colorize;
use vm_translator::{TranslateError, translate_program};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm | directory>", args[0]);
        process::exit(1);
    }

    match run(Path::new(&args[1])) {
        Ok(output) => {
            println!("Translation complete: {} -> {}", args[1], output.display());
        }
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            process::exit(1);
        }
    }
}

fn run(input: &Path) -> Result<PathBuf, TranslateError> {
    let (files, output, bootstrap) = if input.is_dir() {
        (collect_vm_files(input)?, directory_output(input)?, true)
    } else {
        if input.extension().is_none_or(|ext| ext != "vm") {
            return Err(TranslateError::Format(format!(
                "expected a .vm file or a directory, got {}",
                input.display()
            )));
        }
        (vec![input.to_path_buf()], input.with_extension("asm"), false)
    };

    let mut sources = Vec::with_capacity(files.len());
    for path in &files {
        let stem = file_stem(path)?;
        let text = fs::read_to_string(path)?;
        sources.push((stem, text));
    }

    let assembly = translate_program(&sources, bootstrap)?;
    fs::write(&output, assembly)?;
    Ok(output)
}

/// All `.vm` files in the directory, sorted by name for stable output
fn collect_vm_files(dir: &Path) -> Result<Vec<PathBuf>, TranslateError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "vm"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(TranslateError::Format(format!(
            "no .vm files in {}",
            dir.display()
        )));
    }
    Ok(files)
}

/// Directory mode writes `<dir>/<dirname>.asm`
fn directory_output(dir: &Path) -> Result<PathBuf, TranslateError> {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            TranslateError::Format(format!("cannot name output for {}", dir.display()))
        })?;
    Ok(dir.join(format!("{name}.asm")))
}

fn file_stem(path: &Path) -> Result<String, TranslateError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| TranslateError::Format(format!("bad file name: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_output_naming() {
        assert_eq!(
            directory_output(Path::new("projects/Pong")).unwrap(),
            Path::new("projects/Pong/Pong.asm")
        );
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("dir/Main.vm")).unwrap(), "Main");
    }
}
