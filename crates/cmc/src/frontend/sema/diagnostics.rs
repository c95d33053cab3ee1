//! Semantic diagnostics
//!
//! Semantic errors never stop analysis. Each one is recorded where it is
//! detected and the collected list doubles as the error counter the driver
//! consults before moving on to later phases.

use super::scope::SymbolKind;
use std::io;
use thiserror::Error;

/// A semantic error. `Display` renders the diagnostic line exactly as emitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Semantic error at line {line}: variable '{name}' declared void")]
    VoidVariableDeclared { name: String, line: u32 },

    #[error("Semantic error at line {line}: '{name}' was already declared as {}", .previous.with_article())]
    DuplicateDeclaration {
        name: String,
        line: u32,
        previous: SymbolKind,
    },

    #[error("Semantic error at line {line}: '{name}' was already declared as a function")]
    NameKindConflict { name: String, line: u32 },

    #[error("Semantic error at line {line}: '{name}' was not declared in this scope")]
    UndeclaredIdentifier { name: String, line: u32 },

    #[error("Semantic error: undefined reference to 'main'")]
    MissingEntryPoint,

    #[error("Semantic error at line {line}: invalid use of void expression")]
    InvalidVoidUsage { name: String, line: u32 },
}

impl SemanticError {
    pub fn line(&self) -> Option<u32> {
        match self {
            SemanticError::VoidVariableDeclared { line, .. }
            | SemanticError::DuplicateDeclaration { line, .. }
            | SemanticError::NameKindConflict { line, .. }
            | SemanticError::UndeclaredIdentifier { line, .. }
            | SemanticError::InvalidVoidUsage { line, .. } => Some(*line),
            SemanticError::MissingEntryPoint => None,
        }
    }

    /// Offending identifier
    pub fn name(&self) -> Option<&str> {
        match self {
            SemanticError::VoidVariableDeclared { name, .. }
            | SemanticError::DuplicateDeclaration { name, .. }
            | SemanticError::NameKindConflict { name, .. }
            | SemanticError::UndeclaredIdentifier { name, .. }
            | SemanticError::InvalidVoidUsage { name, .. } => Some(name.as_str()),
            SemanticError::MissingEntryPoint => None,
        }
    }
}

/// Semantic errors of one analysis run, in report order
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<SemanticError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: SemanticError) {
        self.errors.push(error);
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &SemanticError> {
        self.errors.iter()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Write one line per error
    pub fn emit(&self, out: &mut impl io::Write) -> io::Result<()> {
        for error in &self.errors {
            writeln!(out, "{}", error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let undeclared = SemanticError::UndeclaredIdentifier { name: "y".into(), line: 4 };
        assert_eq!(
            undeclared.to_string(),
            "Semantic error at line 4: 'y' was not declared in this scope"
        );

        let duplicate = SemanticError::DuplicateDeclaration {
            name: "f".into(),
            line: 2,
            previous: SymbolKind::Function,
        };
        assert_eq!(
            duplicate.to_string(),
            "Semantic error at line 2: 'f' was already declared as a function"
        );

        assert_eq!(
            SemanticError::MissingEntryPoint.to_string(),
            "Semantic error: undefined reference to 'main'"
        );
        assert_eq!(SemanticError::MissingEntryPoint.line(), None);
        assert_eq!(undeclared.name(), Some("y"));
    }

    #[test]
    fn test_emit_in_report_order() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_errors());

        diagnostics.report(SemanticError::VoidVariableDeclared { name: "v".into(), line: 1 });
        diagnostics.report(SemanticError::MissingEntryPoint);
        assert_eq!(diagnostics.error_count(), 2);

        let mut out = Vec::new();
        diagnostics.emit(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Semantic error at line 1: variable 'v' declared void\n\
             Semantic error: undefined reference to 'main'\n"
        );
    }
}
