//! Recursive-descent compilation engine
//!
//! Parses one Jack class with single-token lookahead and emits VM code in the
//! same traversal. Parsing validates by consumption: every grammar rule
//! consumes the tokens it expects or fails with expected-vs-actual.

use crate::error::CompileError;
use crate::symbol_table::{Kind, Symbol, SymbolTable};
use crate::tokenizer::{Keyword, Token};
use crate::vm_writer::{ArithmeticCommand, Segment, VmWriter};

/// A kind's VM segment: static -> static, field -> this, argument ->
/// argument, local -> local.
fn segment_for(kind: Kind) -> Segment {
    match kind {
        Kind::Static => Segment::Static,
        Kind::Field => Segment::This,
        Kind::Arg => Segment::Argument,
        Kind::Var => Segment::Local,
    }
}

pub struct CompilationEngine {
    tokens: Vec<Token>,
    pos: usize,
    class_name: String,
    symbols: SymbolTable,
    writer: VmWriter,
    /// Numbers if/while labels; reset for every subroutine
    label_counter: u16,
}

impl CompilationEngine {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        CompilationEngine {
            tokens,
            pos: 0,
            class_name: String::new(),
            symbols: SymbolTable::new(),
            writer: VmWriter::new(),
            label_counter: 0,
        }
    }

    /// Compiles the class and returns the generated VM code
    pub fn compile(mut self) -> Result<String, CompileError> {
        self.compile_class()?;
        if let Some(extra) = self.peek() {
            return Err(CompileError::Syntax(format!(
                "expected end of input after class, found {extra}"
            )));
        }
        Ok(self.writer.finish())
    }

    // ---- program structure ----

    fn compile_class(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Class)?;
        self.class_name = self.expect_identifier()?;
        self.expect_symbol('{')?;

        while self.peek_any_keyword(&[Keyword::Static, Keyword::Field]) {
            self.compile_class_var_dec()?;
        }
        while self.peek_any_keyword(&[Keyword::Constructor, Keyword::Function, Keyword::Method]) {
            self.compile_subroutine()?;
        }

        self.expect_symbol('}')
    }

    fn compile_class_var_dec(&mut self) -> Result<(), CompileError> {
        let kind = if self.peek_keyword(Keyword::Static) {
            self.expect_keyword(Keyword::Static)?;
            Kind::Static
        } else {
            self.expect_keyword(Keyword::Field)?;
            Kind::Field
        };

        let var_type = self.consume_type()?;
        loop {
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &var_type, kind)?;
            if !self.peek_symbol(',') {
                break;
            }
            self.expect_symbol(',')?;
        }
        self.expect_symbol(';')
    }

    fn compile_subroutine(&mut self) -> Result<(), CompileError> {
        let kind = match self.advance()? {
            Token::Keyword(kw @ (Keyword::Constructor | Keyword::Function | Keyword::Method)) => kw,
            other => {
                return Err(CompileError::Syntax(format!(
                    "expected subroutine declaration, found {other}"
                )));
            }
        };

        // Return type: `void` or a type; unused beyond consumption, the
        // grammar is all the checking we do
        if self.peek_keyword(Keyword::Void) {
            self.expect_keyword(Keyword::Void)?;
        } else {
            self.consume_type()?;
        }

        let name = self.expect_identifier()?;

        self.symbols.reset();
        self.label_counter = 0;
        if kind == Keyword::Method {
            // `this` is argument 0 of every method
            let class_name = self.class_name.clone();
            self.symbols.define("this", &class_name, Kind::Arg)?;
        }

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        self.compile_subroutine_body(kind, &name)
    }

    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        if self.peek_symbol(')') {
            return Ok(());
        }
        loop {
            let var_type = self.consume_type()?;
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &var_type, Kind::Arg)?;
            if !self.peek_symbol(',') {
                return Ok(());
            }
            self.expect_symbol(',')?;
        }
    }

    fn compile_subroutine_body(
        &mut self,
        kind: Keyword,
        name: &str,
    ) -> Result<(), CompileError> {
        self.expect_symbol('{')?;

        // All locals are declared up front; their count sizes the frame
        while self.peek_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }
        let n_locals = self.symbols.var_count(Kind::Var);

        let full_name = format!("{}.{name}", self.class_name);
        self.writer.write_function(&full_name, n_locals);

        match kind {
            Keyword::Constructor => {
                // Allocate the object and aim THIS at it
                let n_fields = self.symbols.var_count(Kind::Field);
                self.writer.write_push(Segment::Constant, n_fields);
                self.writer.write_call("Memory.alloc", 1);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            Keyword::Method => {
                // Aim THIS at the receiver
                self.writer.write_push(Segment::Argument, 0);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            _ => {}
        }

        self.compile_statements()?;
        self.expect_symbol('}')
    }

    fn compile_var_dec(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Var)?;
        let var_type = self.consume_type()?;
        loop {
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &var_type, Kind::Var)?;
            if !self.peek_symbol(',') {
                break;
            }
            self.expect_symbol(',')?;
        }
        self.expect_symbol(';')
    }

    // ---- statements ----

    fn compile_statements(&mut self) -> Result<(), CompileError> {
        loop {
            match self.peek() {
                Some(Token::Keyword(Keyword::Let)) => self.compile_let()?,
                Some(Token::Keyword(Keyword::If)) => self.compile_if()?,
                Some(Token::Keyword(Keyword::While)) => self.compile_while()?,
                Some(Token::Keyword(Keyword::Do)) => self.compile_do()?,
                Some(Token::Keyword(Keyword::Return)) => self.compile_return()?,
                _ => return Ok(()),
            }
        }
    }

    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Let)?;
        let name = self.expect_identifier()?;
        let Symbol { kind, index, .. } = *self.lookup_variable(&name)?;
        let (segment, index) = (segment_for(kind), index);

        if self.peek_symbol('[') {
            // Address = base + index expression
            self.expect_symbol('[')?;
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.write_push(segment, index);
            self.writer.write_arithmetic(ArithmeticCommand::Add);

            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;

            // Park the RHS in temp 0 before re-establishing THAT, so array
            // references inside the RHS cannot clobber the target address
            self.writer.write_pop(Segment::Temp, 0);
            self.writer.write_pop(Segment::Pointer, 1);
            self.writer.write_push(Segment::Temp, 0);
            self.writer.write_pop(Segment::That, 0);
        } else {
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;
            self.writer.write_pop(segment, index);
        }
        Ok(())
    }

    fn compile_if(&mut self) -> Result<(), CompileError> {
        let n = self.label_counter;
        self.label_counter += 1;
        let else_label = format!("IF_FALSE{n}");
        let end_label = format!("IF_END{n}");

        self.expect_keyword(Keyword::If)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        // Branch out when the condition is false
        self.writer.write_arithmetic(ArithmeticCommand::Not);
        self.writer.write_if(&else_label);

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;

        self.writer.write_goto(&end_label);
        self.writer.write_label(&else_label);

        if self.peek_keyword(Keyword::Else) {
            self.expect_keyword(Keyword::Else)?;
            self.expect_symbol('{')?;
            self.compile_statements()?;
            self.expect_symbol('}')?;
        }

        self.writer.write_label(&end_label);
        Ok(())
    }

    fn compile_while(&mut self) -> Result<(), CompileError> {
        let n = self.label_counter;
        self.label_counter += 1;
        let loop_label = format!("WHILE{n}");
        let end_label = format!("WHILE_END{n}");

        self.writer.write_label(&loop_label);

        self.expect_keyword(Keyword::While)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.writer.write_arithmetic(ArithmeticCommand::Not);
        self.writer.write_if(&end_label);

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;

        self.writer.write_goto(&loop_label);
        self.writer.write_label(&end_label);
        Ok(())
    }

    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Do)?;
        let first = self.expect_identifier()?;
        self.compile_subroutine_call(first)?;
        self.expect_symbol(';')?;

        // Discard the (possibly void) return value
        self.writer.write_pop(Segment::Temp, 0);
        Ok(())
    }

    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Return)?;
        if self.peek_symbol(';') {
            // Void subroutines still return a value by convention
            self.writer.write_push(Segment::Constant, 0);
        } else {
            self.compile_expression()?;
        }
        self.expect_symbol(';')?;
        self.writer.write_return();
        Ok(())
    }

    // ---- expressions ----

    fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.compile_term()?;

        // Left to right, no precedence: ((t op t) op t) ...
        while let Some(&Token::Symbol(
            op @ ('+' | '-' | '*' | '/' | '&' | '|' | '<' | '>' | '='),
        )) = self.peek()
        {
            self.advance()?;
            self.compile_term()?;
            match op {
                '+' => self.writer.write_arithmetic(ArithmeticCommand::Add),
                '-' => self.writer.write_arithmetic(ArithmeticCommand::Sub),
                '&' => self.writer.write_arithmetic(ArithmeticCommand::And),
                '|' => self.writer.write_arithmetic(ArithmeticCommand::Or),
                '<' => self.writer.write_arithmetic(ArithmeticCommand::Lt),
                '>' => self.writer.write_arithmetic(ArithmeticCommand::Gt),
                '=' => self.writer.write_arithmetic(ArithmeticCommand::Eq),
                '*' => self.writer.write_call("Math.multiply", 2),
                _ => self.writer.write_call("Math.divide", 2),
            }
        }
        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), CompileError> {
        match self.advance()? {
            Token::IntConst(value) => {
                self.writer.write_push(Segment::Constant, value);
            }
            Token::StringConst(value) => {
                self.compile_string_constant(&value);
            }
            Token::Keyword(Keyword::True) => {
                self.writer.write_push(Segment::Constant, 0);
                self.writer.write_arithmetic(ArithmeticCommand::Not);
            }
            Token::Keyword(Keyword::False | Keyword::Null) => {
                self.writer.write_push(Segment::Constant, 0);
            }
            Token::Keyword(Keyword::This) => {
                self.writer.write_push(Segment::Pointer, 0);
            }
            Token::Symbol('(') => {
                self.compile_expression()?;
                self.expect_symbol(')')?;
            }
            Token::Symbol('-') => {
                self.compile_term()?;
                self.writer.write_arithmetic(ArithmeticCommand::Neg);
            }
            Token::Symbol('~') => {
                self.compile_term()?;
                self.writer.write_arithmetic(ArithmeticCommand::Not);
            }
            Token::Identifier(name) => {
                if self.peek_symbol('[') {
                    // Array element: *(base + e) through THAT
                    self.expect_symbol('[')?;
                    self.compile_expression()?;
                    self.expect_symbol(']')?;

                    let Symbol { kind, index, .. } = *self.lookup_variable(&name)?;
                    self.writer.write_push(segment_for(kind), index);
                    self.writer.write_arithmetic(ArithmeticCommand::Add);
                    self.writer.write_pop(Segment::Pointer, 1);
                    self.writer.write_push(Segment::That, 0);
                } else if self.peek_symbol('(') || self.peek_symbol('.') {
                    self.compile_subroutine_call(name)?;
                } else {
                    let Symbol { kind, index, .. } = *self.lookup_variable(&name)?;
                    self.writer.write_push(segment_for(kind), index);
                }
            }
            other => {
                return Err(CompileError::Syntax(format!(
                    "expected a term, found {other}"
                )));
            }
        }
        Ok(())
    }

    fn compile_string_constant(&mut self, value: &str) {
        let length = u16::try_from(value.chars().count()).unwrap_or(u16::MAX);
        self.writer.write_push(Segment::Constant, length);
        self.writer.write_call("String.new", 1);
        for c in value.chars() {
            let code = u16::try_from(u32::from(c)).unwrap_or(0);
            self.writer.write_push(Segment::Constant, code);
            self.writer.write_call("String.appendChar", 2);
        }
    }

    /// Compiles a subroutine call whose leading identifier is already
    /// consumed
    ///
    /// Three forms: `name(...)` is a method call on `this`; `var.name(...)`
    /// is a method call on the instance (the identifier is in the symbol
    /// table); `Class.name(...)` is a function or constructor call.
    fn compile_subroutine_call(&mut self, first: String) -> Result<(), CompileError> {
        let (full_name, mut n_args) = if self.peek_symbol('.') {
            self.expect_symbol('.')?;
            let second = self.expect_identifier()?;

            if let Some(symbol) = self.symbols.lookup(&first) {
                // Instance method: the receiver is the hidden first argument
                let full_name = format!("{}.{second}", symbol.var_type);
                let (segment, index) = (segment_for(symbol.kind), symbol.index);
                self.writer.write_push(segment, index);
                (full_name, 1)
            } else {
                (format!("{first}.{second}"), 0)
            }
        } else {
            // Bare call: a method on the current object
            self.writer.write_push(Segment::Pointer, 0);
            (format!("{}.{first}", self.class_name), 1)
        };

        self.expect_symbol('(')?;
        n_args += self.compile_expression_list()?;
        self.expect_symbol(')')?;

        self.writer.write_call(&full_name, n_args);
        Ok(())
    }

    fn compile_expression_list(&mut self) -> Result<u16, CompileError> {
        let mut count = 0;
        if self.peek_symbol(')') {
            return Ok(count);
        }
        loop {
            self.compile_expression()?;
            count += 1;
            if !self.peek_symbol(',') {
                return Ok(count);
            }
            self.expect_symbol(',')?;
        }
    }

    // ---- token consumption ----

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Result<Token, CompileError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| CompileError::Syntax("unexpected end of input".to_string()))?;
        self.pos += 1;
        Ok(token)
    }

    fn peek_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek(), Some(Token::Keyword(kw)) if *kw == keyword)
    }

    fn peek_any_keyword(&self, keywords: &[Keyword]) -> bool {
        matches!(self.peek(), Some(Token::Keyword(kw)) if keywords.contains(kw))
    }

    fn peek_symbol(&self, symbol: char) -> bool {
        matches!(self.peek(), Some(Token::Symbol(c)) if *c == symbol)
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), CompileError> {
        match self.advance()? {
            Token::Keyword(kw) if kw == keyword => Ok(()),
            other => Err(CompileError::Syntax(format!(
                "expected keyword `{}`, found {other}",
                keyword.as_str()
            ))),
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), CompileError> {
        match self.advance()? {
            Token::Symbol(c) if c == symbol => Ok(()),
            other => Err(CompileError::Syntax(format!(
                "expected symbol `{symbol}`, found {other}"
            ))),
        }
    }

    fn expect_identifier(&mut self) -> Result<String, CompileError> {
        match self.advance()? {
            Token::Identifier(name) => Ok(name),
            other => Err(CompileError::Syntax(format!(
                "expected an identifier, found {other}"
            ))),
        }
    }

    /// A type is `int`, `char`, `boolean`, or a class name
    fn consume_type(&mut self) -> Result<String, CompileError> {
        match self.advance()? {
            Token::Keyword(kw @ (Keyword::Int | Keyword::Char | Keyword::Boolean)) => {
                Ok(kw.as_str().to_string())
            }
            Token::Identifier(name) => Ok(name),
            other => Err(CompileError::Syntax(format!(
                "expected a type, found {other}"
            ))),
        }
    }

    fn lookup_variable(&self, name: &str) -> Result<&Symbol, CompileError> {
        self.symbols
            .lookup(name)
            .ok_or_else(|| CompileError::Symbol(format!("undefined variable `{name}`")))
    }
}
