//! Scoped symbol table for Jack identifiers
//!
//! Two flat scopes: class scope (static/field, persists for a whole class)
//! and subroutine scope (argument/local, reset at every subroutine). Lookup
//! consults the subroutine scope first. Each kind keeps its own running
//! index, starting at 0.

use crate::error::CompileError;
use std::collections::HashMap;

/// What sort of variable an identifier names, which fixes its VM segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Var,
}

impl Kind {
    const fn counter_slot(self) -> usize {
        match self {
            Self::Static => 0,
            Self::Field => 1,
            Self::Arg => 2,
            Self::Var => 3,
        }
    }

    const fn is_class_scope(self) -> bool {
        matches!(self, Self::Static | Self::Field)
    }
}

/// One resolved identifier: its declared type, kind, and running index
#[derive(Debug, Clone)]
pub struct Symbol {
    pub var_type: String,
    pub kind: Kind,
    pub index: u16,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Symbol>,
    subroutine_scope: HashMap<String, Symbol>,
    counters: [u16; 4],
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a new identifier, assigning it the next index of its kind
    ///
    /// # Errors
    /// `Symbol` if the name is already defined in the kind's scope.
    pub fn define(&mut self, name: &str, var_type: &str, kind: Kind) -> Result<(), CompileError> {
        let scope = if kind.is_class_scope() {
            &mut self.class_scope
        } else {
            &mut self.subroutine_scope
        };

        if scope.contains_key(name) {
            return Err(CompileError::Symbol(format!(
                "duplicate definition of `{name}`"
            )));
        }

        let slot = kind.counter_slot();
        let index = self.counters[slot];
        self.counters[slot] += 1;

        scope.insert(
            name.to_string(),
            Symbol {
                var_type: var_type.to_string(),
                kind,
                index,
            },
        );
        Ok(())
    }

    /// Number of variables of the given kind defined so far
    #[must_use]
    pub fn var_count(&self, kind: Kind) -> u16 {
        self.counters[kind.counter_slot()]
    }

    /// Resolves a name, subroutine scope first, then class scope
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.lookup(name).map(|s| s.kind)
    }

    #[must_use]
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|s| s.var_type.as_str())
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|s| s.index)
    }

    /// Clears the subroutine scope and its argument/local counters
    ///
    /// The class scope and its static/field counters persist.
    pub fn reset(&mut self) {
        self.subroutine_scope.clear();
        self.counters[Kind::Arg.counter_slot()] = 0;
        self.counters[Kind::Var.counter_slot()] = 0;
    }
}
