//! Semantic analysis module
//!
//! This module builds the symbol table, resolves names and performs the
//! type checks layered on top of it.

mod scope;
mod analyzer;
mod diagnostics;
mod typeck;

pub use scope::{Declared, Scope, Symbol, SymbolKind, SymbolTable};
pub use analyzer::{SemanticAnalyzer, ENTRY_POINT};
pub use diagnostics::{Diagnostics, SemanticError};
pub use typeck::TypeChecker;
