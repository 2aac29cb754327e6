//! Lowers parsed VM commands to Hack assembly
//!
//! The writer accumulates assembly text in memory; the caller decides where
//! it goes. Each VM command is echoed as a comment before its translation so
//! the emitted assembly stays navigable.

use crate::error::TranslateError;
use crate::parser::{ArithmeticOp, Command, Segment};
use std::fmt::Write;

// Emits a fixed block of assembly lines
macro_rules! write_asm {
    ($out:expr, $($line:literal)*) => {
        $out.push_str(concat!($($line, "\n"),*))
    };
}

pub struct CodeWriter {
    out: String,
    /// Comparison labels (EQ_n / GT_n / LT_n), unique per writer
    label_counter: usize,
    /// Return-address labels (F$ret.n), unique per writer
    call_counter: usize,
    /// Stem of the file being translated, names the static segment
    file_name: String,
    /// Innermost `function` declaration, scopes VM labels
    function_name: Option<String>,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    #[must_use]
    pub fn new() -> Self {
        CodeWriter {
            out: String::with_capacity(8192),
            label_counter: 0,
            call_counter: 0,
            file_name: String::new(),
            function_name: None,
        }
    }

    /// Call when the translation of a new VM file starts
    ///
    /// The stem names static-segment variables (`<stem>.<i>`); the label
    /// scope resets until the file's first `function` declaration.
    pub fn set_file_name(&mut self, stem: &str) {
        self.file_name.clear();
        self.file_name.push_str(stem);
        self.function_name = None;
        let _ = writeln!(self.out, "// file: {stem}.vm");
    }

    /// Emits the VM bootstrap: SP = 256, then `call Sys.init 0`
    pub fn write_bootstrap(&mut self) {
        write_asm!(self.out,
            "// bootstrap"
            "@256"
            "D=A"
            "@SP"
            "M=D"
        );
        self.write_call("Sys.init", 0);
    }

    /// Translates one command, echoing it as a comment first
    pub fn write_command(&mut self, command: &Command) -> Result<(), TranslateError> {
        let _ = writeln!(self.out, "// {command}");

        match command {
            Command::Arithmetic(op) => self.write_arithmetic(*op),
            Command::Push { segment, index } => self.write_push(*segment, *index)?,
            Command::Pop { segment, index } => self.write_pop(*segment, *index)?,
            Command::Label(label) => self.write_label(label),
            Command::Goto(label) => self.write_goto(label),
            Command::IfGoto(label) => self.write_if_goto(label),
            Command::Function { name, n_locals } => self.write_function(name, *n_locals),
            Command::Call { name, n_args } => self.write_call(name, *n_args),
            Command::Return => self.write_return(),
        }

        Ok(())
    }

    /// Consumes the writer, returning the accumulated assembly
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    fn write_arithmetic(&mut self, op: ArithmeticOp) {
        match op {
            ArithmeticOp::Add => self.write_binary_op("M=M+D"),
            ArithmeticOp::Sub => self.write_binary_op("M=M-D"),
            ArithmeticOp::And => self.write_binary_op("M=M&D"),
            ArithmeticOp::Or => self.write_binary_op("M=M|D"),
            ArithmeticOp::Neg => self.write_unary_op("M=-M"),
            ArithmeticOp::Not => self.write_unary_op("M=!M"),
            ArithmeticOp::Eq => self.write_comparison("EQ", "JEQ"),
            ArithmeticOp::Gt => self.write_comparison("GT", "JGT"),
            ArithmeticOp::Lt => self.write_comparison("LT", "JLT"),
        }
    }

    /// Pops the right operand into D, then applies `operation` to the new top
    fn write_binary_op(&mut self, operation: &str) {
        self.write_pop_to_d();
        write_asm!(self.out,
            "@SP"
            "A=M-1"
        );
        self.out.push_str(operation);
        self.out.push('\n');
    }

    /// Rewrites the top of the stack in place
    fn write_unary_op(&mut self, operation: &str) {
        write_asm!(self.out,
            "@SP"
            "A=M-1"
        );
        self.out.push_str(operation);
        self.out.push('\n');
    }

    /// Compares the two top values, leaving -1 (true) or 0 (false)
    ///
    /// Writes the true result first and jumps over the overwrite when the
    /// comparison holds, so a single label per emission suffices. The label
    /// counter keeps every emission globally unique within this translation.
    fn write_comparison(&mut self, prefix: &str, jump: &str) {
        let n = self.label_counter;
        self.label_counter += 1;

        self.write_pop_to_d();
        let _ = write!(
            self.out,
            "@SP\n\
             A=M-1\n\
             D=M-D\n\
             M=-1\n\
             @{prefix}_{n}\n\
             D;{jump}\n\
             @SP\n\
             A=M-1\n\
             M=0\n\
             ({prefix}_{n})\n"
        );
    }

    fn write_push(&mut self, segment: Segment, index: u16) -> Result<(), TranslateError> {
        match segment {
            Segment::Constant => {
                let _ = write!(self.out, "@{index}\nD=A\n");
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = segment.base_symbol().unwrap_or("LCL");
                let _ = write!(self.out, "@{base}\nD=M\n@{index}\nA=D+A\nD=M\n");
            }
            Segment::Temp => {
                self.check_index(segment, index, 7)?;
                let _ = write!(self.out, "@5\nD=A\n@{index}\nA=D+A\nD=M\n");
            }
            Segment::Pointer => {
                self.check_index(segment, index, 1)?;
                let target = if index == 0 { "THIS" } else { "THAT" };
                let _ = write!(self.out, "@{target}\nD=M\n");
            }
            Segment::Static => {
                let _ = write!(self.out, "@{}.{index}\nD=M\n", self.file_name);
            }
        }
        self.write_push_d();
        Ok(())
    }

    fn write_pop(&mut self, segment: Segment, index: u16) -> Result<(), TranslateError> {
        match segment {
            Segment::Constant => {
                return Err(TranslateError::Syntax(
                    "cannot pop to the constant segment".to_string(),
                ));
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = segment.base_symbol().unwrap_or("LCL");
                // Stage the destination address in R13
                let _ = write!(self.out, "@{base}\nD=M\n@{index}\nD=D+A\n@R13\nM=D\n");
                self.write_pop_to_d();
                write_asm!(self.out,
                    "@R13"
                    "A=M"
                    "M=D"
                );
            }
            Segment::Temp => {
                self.check_index(segment, index, 7)?;
                let _ = write!(self.out, "@5\nD=A\n@{index}\nD=D+A\n@R13\nM=D\n");
                self.write_pop_to_d();
                write_asm!(self.out,
                    "@R13"
                    "A=M"
                    "M=D"
                );
            }
            Segment::Pointer => {
                self.check_index(segment, index, 1)?;
                let target = if index == 0 { "THIS" } else { "THAT" };
                self.write_pop_to_d();
                let _ = write!(self.out, "@{target}\nM=D\n");
            }
            Segment::Static => {
                self.write_pop_to_d();
                let _ = write!(self.out, "@{}.{index}\nM=D\n", self.file_name);
            }
        }
        Ok(())
    }

    fn write_label(&mut self, label: &str) {
        let scoped = self.scoped_label(label);
        let _ = writeln!(self.out, "({scoped})");
    }

    fn write_goto(&mut self, label: &str) {
        let scoped = self.scoped_label(label);
        let _ = write!(self.out, "@{scoped}\n0;JMP\n");
    }

    fn write_if_goto(&mut self, label: &str) {
        let scoped = self.scoped_label(label);
        self.write_pop_to_d();
        let _ = write!(self.out, "@{scoped}\nD;JNE\n");
    }

    fn write_function(&mut self, name: &str, n_locals: u16) {
        self.function_name = Some(name.to_string());
        let _ = writeln!(self.out, "({name})");

        for _ in 0..n_locals {
            write_asm!(self.out, "D=0");
            self.write_push_d();
        }
    }

    fn write_call(&mut self, name: &str, n_args: u16) {
        let ret = format!("{name}$ret.{}", self.call_counter);
        self.call_counter += 1;

        // Push the return address, then the caller's frame pointers
        let _ = write!(self.out, "@{ret}\nD=A\n");
        self.write_push_d();
        for base in ["LCL", "ARG", "THIS", "THAT"] {
            let _ = write!(self.out, "@{base}\nD=M\n");
            self.write_push_d();
        }

        // ARG = SP - nArgs - 5
        let _ = write!(
            self.out,
            "@SP\nD=M\n@{}\nD=D-A\n@ARG\nM=D\n",
            u32::from(n_args) + 5
        );

        // LCL = SP
        write_asm!(self.out,
            "@SP"
            "D=M"
            "@LCL"
            "M=D"
        );

        // Transfer control; the callee's label is global, not scoped
        let _ = write!(self.out, "@{name}\n0;JMP\n({ret})\n");
    }

    fn write_return(&mut self) {
        // endFrame = LCL (R13); retAddr = *(endFrame - 5) (R14).
        // The return address must be saved before the return value lands in
        // ARG[0]: with zero arguments they are the same cell.
        write_asm!(self.out,
            "@LCL"
            "D=M"
            "@R13"
            "M=D"
            "@5"
            "A=D-A"
            "D=M"
            "@R14"
            "M=D"
        );

        // *ARG = pop(); SP = ARG + 1
        self.write_pop_to_d();
        write_asm!(self.out,
            "@ARG"
            "A=M"
            "M=D"
            "@ARG"
            "D=M+1"
            "@SP"
            "M=D"
        );

        // Restore THAT, THIS, ARG, LCL by walking endFrame down
        write_asm!(self.out,
            "@R13"
            "AM=M-1"
            "D=M"
            "@THAT"
            "M=D"
            "@R13"
            "AM=M-1"
            "D=M"
            "@THIS"
            "M=D"
            "@R13"
            "AM=M-1"
            "D=M"
            "@ARG"
            "M=D"
            "@R13"
            "AM=M-1"
            "D=M"
            "@LCL"
            "M=D"
            "@R14"
            "A=M"
            "0;JMP"
        );
    }

    /// Push from D onto top of stack, increment SP
    fn write_push_d(&mut self) {
        write_asm!(self.out,
            "@SP"
            "A=M"
            "M=D"
            "@SP"
            "M=M+1"
        );
    }

    /// Decrement SP, pop from top of stack into D
    fn write_pop_to_d(&mut self) {
        write_asm!(self.out,
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        );
    }

    /// VM labels are scoped to the enclosing function; before any `function`
    /// declaration the file stem serves as the scope.
    fn scoped_label(&self, label: &str) -> String {
        let scope = self.function_name.as_deref().unwrap_or(&self.file_name);
        format!("{scope}${label}")
    }

    fn check_index(
        &self,
        segment: Segment,
        index: u16,
        max: u16,
    ) -> Result<(), TranslateError> {
        if index > max {
            return Err(TranslateError::Syntax(format!(
                "{} index {index} out of range (max {max})",
                segment.as_str()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> CodeWriter {
        let mut w = CodeWriter::new();
        w.set_file_name("Test");
        w
    }

    #[test]
    fn test_push_constant() {
        let mut w = writer();
        w.write_push(Segment::Constant, 7).unwrap();
        let asm = w.finish();
        assert!(asm.contains("@7\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n"));
    }

    #[test]
    fn test_static_uses_file_stem() {
        let mut w = writer();
        w.write_push(Segment::Static, 3).unwrap();
        w.write_pop(Segment::Static, 4).unwrap();
        let asm = w.finish();
        assert!(asm.contains("@Test.3\nD=M\n"));
        assert!(asm.contains("@Test.4\nM=D\n"));
    }

    #[test]
    fn test_comparison_labels_are_unique() {
        let mut w = writer();
        w.write_arithmetic(ArithmeticOp::Eq);
        w.write_arithmetic(ArithmeticOp::Eq);
        let asm = w.finish();
        assert!(asm.contains("(EQ_0)"));
        assert!(asm.contains("(EQ_1)"));
    }

    #[test]
    fn test_labels_scope_to_function() {
        let mut w = writer();
        w.write_label("top");
        w.write_function("Main.main", 0);
        w.write_label("top");
        w.write_goto("top");
        let asm = w.finish();
        assert!(asm.contains("(Test$top)"));
        assert!(asm.contains("(Main.main$top)"));
        assert!(asm.contains("@Main.main$top\n0;JMP\n"));
    }

    #[test]
    fn test_if_goto_pops_and_jumps_on_nonzero() {
        let mut w = writer();
        w.write_function("Main.main", 0);
        w.write_if_goto("END");
        let asm = w.finish();
        assert!(asm.contains("@SP\nM=M-1\nA=M\nD=M\n@Main.main$END\nD;JNE\n"));
    }

    #[test]
    fn test_function_allocates_locals() {
        let mut w = writer();
        w.write_function("Main.main", 2);
        let asm = w.finish();
        assert!(asm.contains("(Main.main)"));
        assert_eq!(asm.matches("D=0\n@SP\nA=M\nM=D\n@SP\nM=M+1\n").count(), 2);
    }

    #[test]
    fn test_call_frame_layout() {
        let mut w = writer();
        w.write_call("Main.main", 2);
        let asm = w.finish();

        // Return address pushed first, then the four frame pointers
        assert!(asm.starts_with("// file: Test.vm\n@Main.main$ret.0\nD=A\n"));
        for base in ["@LCL\nD=M\n", "@ARG\nD=M\n", "@THIS\nD=M\n", "@THAT\nD=M\n"] {
            assert!(asm.contains(base));
        }
        // ARG = SP - 2 - 5
        assert!(asm.contains("@SP\nD=M\n@7\nD=D-A\n@ARG\nM=D\n"));
        assert!(asm.contains("@Main.main\n0;JMP\n(Main.main$ret.0)\n"));
    }

    #[test]
    fn test_return_saves_ret_addr_before_overwriting_arg0() {
        let mut w = writer();
        w.write_return();
        let asm = w.finish();

        let save_ret = asm.find("@R14\nM=D").unwrap();
        let move_result = asm.find("@ARG\nA=M\nM=D").unwrap();
        assert!(save_ret < move_result);
    }

    #[test]
    fn test_pop_to_constant_is_rejected() {
        let mut w = writer();
        assert!(w.write_pop(Segment::Constant, 0).is_err());
    }

    #[test]
    fn test_temp_and_pointer_bounds() {
        let mut w = writer();
        assert!(w.write_push(Segment::Temp, 8).is_err());
        assert!(w.write_push(Segment::Pointer, 2).is_err());
        assert!(w.write_push(Segment::Temp, 7).is_ok());
        assert!(w.write_push(Segment::Pointer, 1).is_ok());
    }
}
