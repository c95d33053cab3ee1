//! CMC - semantic analysis for the C-minus language
//!
//! This library parses C-minus programs and runs the semantic core on them:
//! symbol-table construction, name resolution and a small type check.
//!
//! ## Architecture
//!
//! The compiler is organized into:
//! - **Frontend** (`frontend/`): lexer, parser, arena AST and semantic passes
//! - **Driver** (`driver/`): pipeline orchestration for one source file
//! - **Common** (`common/`): shared infrastructure (errors, spans, lines)

pub mod common;
pub mod frontend;
pub mod driver;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use driver::{AnalysisOutput, Session};
pub use frontend::AnalysisConfig;
pub use frontend::sema::{Diagnostics, SemanticAnalyzer, SemanticError, SymbolTable};
