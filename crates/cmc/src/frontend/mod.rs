//! C-minus front end
//!
//! The front end is responsible for:
//! 1. Lexing source code into tokens
//! 2. Parsing tokens into the arena AST
//! 3. Building the symbol table and resolving names
//! 4. Type checking

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;

pub use ast::Ast;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use sema::SemanticAnalyzer;

/// Configuration options for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Run the type-check extension after name resolution
    pub type_check: bool,
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub verbose: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            type_check: true,
            dump_tokens: false,
            dump_ast: false,
            verbose: false,
        }
    }
}
