//! Analysis driver and pipeline orchestration

use crate::common::CompileResult;
use crate::frontend::sema::{Diagnostics, SemanticAnalyzer, SymbolTable};
use crate::frontend::{AnalysisConfig, Ast, Lexer, Parser};

/// Everything one run produces
#[derive(Debug)]
pub struct AnalysisOutput {
    pub ast: Ast,
    pub table: SymbolTable,
    pub diagnostics: Diagnostics,
}

impl AnalysisOutput {
    /// Later phases may only run on an error-free program
    pub fn can_proceed(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// The symbol-table report as printed after analysis
    pub fn report(&self) -> String {
        format!("\nSymbol table:\n\n{}", self.table)
    }
}

/// Runs the front end over one source file
pub struct Session {
    config: AnalysisConfig,
}

impl Session {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Parse and analyze `source`
    ///
    /// Lexer and parser errors are fatal and returned. Semantic errors are
    /// collected in the output; analysis always runs to completion.
    pub fn run(&self, source: &str) -> CompileResult<AnalysisOutput> {
        if self.config.dump_tokens {
            let tokens = Lexer::new(source).tokenize_all()?;
            eprintln!("=== Tokens ===");
            for token in &tokens {
                eprintln!("{:?}", token);
            }
            eprintln!("=== End Tokens ===\n");
        }

        if self.config.verbose {
            eprintln!("Parsing...");
        }
        let mut ast = Parser::new(source)?.parse()?;

        if self.config.dump_ast {
            eprintln!("=== AST ===");
            eprintln!("{:#?}", ast);
            eprintln!("=== End AST ===\n");
        }

        if self.config.verbose {
            eprintln!("Building symbol table...");
        }
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.build_symtab(&ast);

        if self.config.type_check {
            if self.config.verbose {
                eprintln!("Type checking...");
            }
            analyzer.type_check(&mut ast);
        }

        let (table, diagnostics) = analyzer.into_parts();
        if self.config.verbose {
            eprintln!("{} semantic error(s)", diagnostics.error_count());
        }

        Ok(AnalysisOutput {
            ast,
            table,
            diagnostics,
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CompileError;

    #[test]
    fn test_clean_program_can_proceed() {
        let output = Session::default().run("int main(void) { return 0; }").unwrap();
        assert!(output.can_proceed());
        assert!(output.report().starts_with("\nSymbol table:\n\nVariable Name"));
    }

    #[test]
    fn test_type_check_can_be_disabled() {
        let source = "void g(void) { return output(1); }\nint main(void) {}";

        let checked = Session::default().run(source).unwrap();
        assert_eq!(checked.diagnostics.error_count(), 1);

        let config = AnalysisConfig { type_check: false, ..AnalysisConfig::default() };
        let unchecked = Session::new(config).run(source).unwrap();
        assert!(unchecked.can_proceed());
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let err = Session::default().run("int main(void) { x = ; }").unwrap_err();
        assert!(matches!(err, CompileError::Parser { .. }));
        assert!(err.span().is_some());
    }

    #[test]
    fn test_lexer_error_is_fatal() {
        let err = Session::default().run("int main(void) { x = 1 % 2; }").unwrap_err();
        assert!(matches!(err, CompileError::Lexer { .. }));
    }
}
