//! Symbol table and scope management
//!
//! C-minus has exactly two scope levels: the global scope and one private
//! scope per function. A symbol is identified by its name together with the
//! scope it was declared in.

use crate::frontend::ast::{IdentKind, TypeName};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Names that exist before any source is analyzed
const BUILTINS: [(&str, TypeName); 2] = [("input", TypeName::Int), ("output", TypeName::Void)];

/// Scope a symbol lives in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Function(String),
}

impl Scope {
    pub fn function(name: impl Into<String>) -> Self {
        Scope::Function(name.into())
    }

    /// The global scope is named by the empty string
    pub fn name(&self) -> &str {
        match self {
            Scope::Global => "",
            Scope::Function(name) => name,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Variable,
    Array,
}

impl SymbolKind {
    /// Phrase used in diagnostics
    pub fn with_article(self) -> &'static str {
        match self {
            SymbolKind::Function => "a function",
            SymbolKind::Variable => "a variable",
            SymbolKind::Array => "an array",
        }
    }
}

impl From<IdentKind> for SymbolKind {
    fn from(kind: IdentKind) -> Self {
        match kind {
            IdentKind::Function => SymbolKind::Function,
            IdentKind::Variable => SymbolKind::Variable,
            IdentKind::Array => SymbolKind::Array,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            SymbolKind::Function => "fun",
            SymbolKind::Variable => "var",
            SymbolKind::Array => "array",
        })
    }
}

/// A symbol in the symbol table
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub scope: Scope,
    pub kind: SymbolKind,
    pub ty: TypeName,
    /// Declaration line followed by every line the symbol is referenced on
    pub lines: BTreeSet<u32>,
    pub builtin: bool,
}

/// Outcome of [`SymbolTable::declare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    Inserted,
    AlreadyDeclared,
}

/// All declarations of one program, in first-declaration order
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    /// scope -> name -> position in `symbols`
    index: HashMap<Scope, HashMap<String, usize>>,
}

impl SymbolTable {
    /// Create a table holding only the built-in functions
    pub fn new() -> Self {
        let mut table = Self {
            symbols: Vec::new(),
            index: HashMap::new(),
        };
        table.seed_builtins();
        table
    }

    /// Drop every declaration and re-seed the built-ins
    pub fn reset(&mut self) {
        self.symbols.clear();
        self.index.clear();
        self.seed_builtins();
    }

    fn seed_builtins(&mut self) {
        for (name, ty) in BUILTINS {
            self.insert(name, None, &Scope::Global, SymbolKind::Function, ty, true);
        }
    }

    /// Declare `name` in `scope`. An existing entry is left untouched.
    pub fn declare(
        &mut self,
        name: &str,
        line: Option<u32>,
        scope: &Scope,
        kind: SymbolKind,
        ty: TypeName,
    ) -> Declared {
        if self.lookup_exact(name, scope) {
            return Declared::AlreadyDeclared;
        }
        self.insert(name, line, scope, kind, ty, false);
        Declared::Inserted
    }

    fn insert(
        &mut self,
        name: &str,
        line: Option<u32>,
        scope: &Scope,
        kind: SymbolKind,
        ty: TypeName,
        builtin: bool,
    ) {
        let position = self.symbols.len();
        self.symbols.push(Symbol {
            name: name.to_string(),
            scope: scope.clone(),
            kind,
            ty,
            lines: line.into_iter().collect(),
            builtin,
        });
        self.index
            .entry(scope.clone())
            .or_default()
            .insert(name.to_string(), position);
    }

    /// Add `line` to the entry `name` resolves to from `scope`.
    /// Does nothing when the name is not declared at all.
    pub fn record_use(&mut self, name: &str, scope: &Scope, line: u32) {
        if let Some(position) = self.position(name, scope).or_else(|| self.position(name, &Scope::Global)) {
            self.symbols[position].lines.insert(line);
        }
    }

    fn position(&self, name: &str, scope: &Scope) -> Option<usize> {
        self.index.get(scope)?.get(name).copied()
    }

    /// Entry declared in exactly `scope`
    pub fn get(&self, name: &str, scope: &Scope) -> Option<&Symbol> {
        self.position(name, scope).map(|p| &self.symbols[p])
    }

    /// Entry visible from `scope`: the local one if present, else the global one
    pub fn resolve(&self, name: &str, scope: &Scope) -> Option<&Symbol> {
        self.get(name, scope).or_else(|| self.get(name, &Scope::Global))
    }

    pub fn lookup_exact(&self, name: &str, scope: &Scope) -> bool {
        self.get(name, scope).is_some()
    }

    pub fn lookup(&self, name: &str, scope: &Scope) -> bool {
        self.resolve(name, scope).is_some()
    }

    pub fn kind_of(&self, name: &str, scope: &Scope) -> Option<SymbolKind> {
        self.resolve(name, scope).map(|s| s.kind)
    }

    pub fn type_of(&self, name: &str, scope: &Scope) -> Option<TypeName> {
        self.resolve(name, scope).map(|s| s.ty)
    }

    /// Symbols in first-declaration order
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Fixed-width listing of every symbol in first-declaration order.
    /// Usage lines of built-ins are not listed.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("Variable Name  Scope     ID Type  Data Type  Line Numbers\n");
        out.push_str("-------------  --------  -------  ---------  -------------------------\n");

        for symbol in &self.symbols {
            let mut row = format!(
                "{:<14} {:<9} {:<8} {:<10} ",
                symbol.name, symbol.scope, symbol.kind, symbol.ty
            );
            if !symbol.builtin {
                for line in &symbol.lines {
                    row.push_str(&format!("{:>2} ", line));
                }
            }
            out.push_str(row.trim_end());
            out.push('\n');
        }

        out
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
