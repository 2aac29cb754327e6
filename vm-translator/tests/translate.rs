//! End-to-end translation tests, including assembling the emitted code with
//! the workspace assembler to prove it is well-formed Hack assembly.

use vm_translator::{translate_program, translate_source};

fn strip_comments(asm: &str) -> String {
    asm.lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn simple_add_assembles_to_16_bit_words() {
    let asm = translate_source("SimpleAdd", "push constant 7\npush constant 8\nadd\n").unwrap();
    let binary = assembler::assemble(&asm).unwrap();

    for line in binary.lines() {
        assert_eq!(line.len(), 16);
        assert!(line.chars().all(|c| c == '0' || c == '1'));
    }
}

#[test]
fn arithmetic_comparisons_emit_unique_labels() {
    let source = "push constant 1\npush constant 2\nlt\npush constant 3\npush constant 4\nlt\n";
    let asm = translate_source("Compare", source).unwrap();

    assert!(asm.contains("(LT_0)"));
    assert!(asm.contains("(LT_1)"));
    // Labels are plain identifiers, never '@' inside parentheses
    assert!(!asm.contains("(@"));
}

#[test]
fn call_return_roundtrip_program_assembles() {
    let sys = "\
function Sys.init 0
call Main.main 0
label HALT
goto HALT
";
    let main = "\
function Main.main 0
push constant 42
return
";
    let files = [
        ("Main".to_string(), main.to_string()),
        ("Sys".to_string(), sys.to_string()),
    ];
    let asm = translate_program(&files, true).unwrap();

    // Bootstrap first, then per-file translations
    assert!(asm.starts_with("// bootstrap"));
    assert!(asm.contains("(Sys.init)"));
    assert!(asm.contains("(Main.main)"));

    // Two call sites: bootstrap's Sys.init call and Sys.init's Main.main call
    assert!(asm.contains("(Sys.init$ret.0)"));
    assert!(asm.contains("(Main.main$ret.1)"));

    // The whole program is valid assembly
    let binary = assembler::assemble(&asm).unwrap();
    assert!(binary.lines().all(|l| l.len() == 16));
}

#[test]
fn return_restores_frame_pointers_in_order() {
    let asm = translate_source("Ret", "function F.g 0\nreturn\n").unwrap();
    let code = strip_comments(&asm);

    // THAT, THIS, ARG, LCL restored from endFrame-1..endFrame-4
    let that = code.find("@THAT\nM=D").unwrap();
    let this = code.find("@THIS\nM=D").unwrap();
    let arg = code.rfind("@ARG\nM=D").unwrap();
    let lcl = code.rfind("@LCL\nM=D").unwrap();
    assert!(that < this && this < arg && arg < lcl);

    // Return address is read before the return value overwrites ARG[0]
    let save_ret = code.find("@R14\nM=D").unwrap();
    let move_value = code.find("@ARG\nA=M\nM=D").unwrap();
    assert!(save_ret < move_value);
}

#[test]
fn branching_program_assembles() {
    let source = "\
function Main.loop 1
push constant 10
pop local 0
label AGAIN
push local 0
push constant 1
sub
pop local 0
push local 0
if-goto AGAIN
push constant 0
return
";
    let asm = translate_source("Main", source).unwrap();

    assert!(asm.contains("(Main.loop$AGAIN)"));
    assert!(asm.contains("@Main.loop$AGAIN\nD;JNE"));

    let binary = assembler::assemble(&asm).unwrap();
    assert!(binary.lines().all(|l| l.len() == 16));
}

#[test]
fn all_segments_assemble() {
    let source = "\
push constant 10
pop local 0
push constant 11
pop argument 0
push constant 12
pop this 0
push constant 13
pop that 0
push constant 14
pop temp 3
push constant 15
pop static 1
push constant 16
pop pointer 0
push local 0
push argument 0
push this 0
push that 0
push temp 3
push static 1
push pointer 0
";
    let asm = translate_source("Memory", source).unwrap();
    assert!(asm.contains("@Memory.1"));

    let binary = assembler::assemble(&asm).unwrap();
    assert!(binary.lines().all(|l| l.len() == 16));
}
