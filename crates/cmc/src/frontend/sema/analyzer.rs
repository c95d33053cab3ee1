//! Semantic analyzer - symbol table construction and name resolution
//!
//! Analysis walks the tree twice. The declaration pass enters every function,
//! variable and array into the symbol table; the use pass then resolves every
//! other identifier against it. Each pass tracks its own current scope, so
//! forward references to functions declared later in the file still resolve.

use super::diagnostics::{Diagnostics, SemanticError};
use super::scope::{Declared, Scope, SymbolKind, SymbolTable};
use super::typeck::TypeChecker;
use crate::frontend::ast::*;

/// Name of the function every program must define
pub const ENTRY_POINT: &str = "main";

/// Semantic analyzer holding the symbol table and diagnostics of the last run
pub struct SemanticAnalyzer {
    table: SymbolTable,
    diagnostics: Diagnostics,
    found_entry_point: bool,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            diagnostics: Diagnostics::new(),
            found_entry_point: false,
        }
    }

    /// Run both passes over `ast` and check for the entry point.
    ///
    /// Starts from a fresh table each time; errors are recorded, never returned.
    pub fn build_symtab(&mut self, ast: &Ast) {
        self.table.reset();
        self.diagnostics.clear();
        self.found_entry_point = false;

        let mut declarations = DeclarationPass::new(&mut self.table, &mut self.diagnostics);
        traverse(ast, ast.root(), &mut declarations);
        self.found_entry_point = declarations.found_entry_point;

        let mut uses = UsePass::new(&mut self.table, &mut self.diagnostics);
        traverse(ast, ast.root(), &mut uses);

        if !self.found_entry_point {
            self.diagnostics.report(SemanticError::MissingEntryPoint);
        }
    }

    /// Flag void calls used as values and annotate expression types
    pub fn type_check(&mut self, ast: &mut Ast) {
        let mut checker = TypeChecker::new(&self.table, &mut self.diagnostics);
        traverse(ast, ast.root(), &mut checker);
        for (id, ty) in checker.into_annotations() {
            ast.set_type(id, ty);
        }
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn found_entry_point(&self) -> bool {
        self.found_entry_point
    }

    pub fn into_parts(self) -> (SymbolTable, Diagnostics) {
        (self.table, self.diagnostics)
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Function name of a declaration-site function identifier
fn function_declaration(ast: &Ast, id: NodeId) -> Option<&str> {
    match &ast.node(id).kind {
        NodeKind::Ident { kind: IdentKind::Function, name } if ast.is_declaration_site(id) => {
            Some(name.as_str())
        }
        _ => None,
    }
}

/// First pass: enter declarations
struct DeclarationPass<'a> {
    table: &'a mut SymbolTable,
    diagnostics: &'a mut Diagnostics,
    scope: Scope,
    found_entry_point: bool,
}

impl<'a> DeclarationPass<'a> {
    fn new(table: &'a mut SymbolTable, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            table,
            diagnostics,
            scope: Scope::Global,
            found_entry_point: false,
        }
    }

    fn declare_function(&mut self, name: &str, line: u32, ty: TypeName) {
        let declared = self
            .table
            .declare(name, Some(line), &Scope::Global, SymbolKind::Function, ty);
        if declared == Declared::AlreadyDeclared {
            self.report_duplicate(name, line, &Scope::Global);
        }

        if name == ENTRY_POINT {
            self.found_entry_point = true;
        }
        self.scope = Scope::function(name);
    }

    fn declare_data(&mut self, name: &str, line: u32, kind: SymbolKind, ty: TypeName) {
        if ty == TypeName::Void {
            self.diagnostics.report(SemanticError::VoidVariableDeclared {
                name: name.to_string(),
                line,
            });
            return;
        }

        // Only checked in this direction: a function declared after a
        // same-named local is accepted.
        let shadows_function = self
            .table
            .get(name, &Scope::Global)
            .is_some_and(|symbol| symbol.kind == SymbolKind::Function);
        if shadows_function {
            self.diagnostics.report(SemanticError::NameKindConflict {
                name: name.to_string(),
                line,
            });
            return;
        }

        let scope = self.scope.clone();
        if self.table.declare(name, Some(line), &scope, kind, ty) == Declared::AlreadyDeclared {
            self.report_duplicate(name, line, &scope);
        }
    }

    fn report_duplicate(&mut self, name: &str, line: u32, scope: &Scope) {
        let previous = self
            .table
            .get(name, scope)
            .map_or(SymbolKind::Variable, |symbol| symbol.kind);
        self.diagnostics.report(SemanticError::DuplicateDeclaration {
            name: name.to_string(),
            line,
            previous,
        });
    }
}

impl Visitor for DeclarationPass<'_> {
    fn enter(&mut self, ast: &Ast, id: NodeId) {
        let node = ast.node(id);
        let NodeKind::Ident { kind, name } = &node.kind else {
            return;
        };
        let Some(ty) = ast.declared_type(id) else {
            return;
        };

        match kind {
            IdentKind::Function => self.declare_function(name, node.line, ty),
            IdentKind::Variable | IdentKind::Array => {
                self.declare_data(name, node.line, SymbolKind::from(*kind), ty);
            }
        }
    }

    fn leave(&mut self, ast: &Ast, id: NodeId) {
        if function_declaration(ast, id).is_some() {
            self.scope = Scope::Global;
        }
    }
}

/// Second pass: resolve references
struct UsePass<'a> {
    table: &'a mut SymbolTable,
    diagnostics: &'a mut Diagnostics,
    scope: Scope,
}

impl<'a> UsePass<'a> {
    fn new(table: &'a mut SymbolTable, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            table,
            diagnostics,
            scope: Scope::Global,
        }
    }

    /// Functions only ever live in the global scope
    fn resolve_function(&mut self, name: &str, line: u32) {
        if self.table.lookup_exact(name, &Scope::Global) {
            self.table.record_use(name, &Scope::Global, line);
        } else {
            self.report_undeclared(name, line);
        }
    }

    fn resolve_data(&mut self, name: &str, line: u32) {
        let found = self.table.resolve(name, &self.scope).map(|symbol| symbol.scope.clone());
        match found {
            Some(scope) => self.table.record_use(name, &scope, line),
            None => self.report_undeclared(name, line),
        }
    }

    fn report_undeclared(&mut self, name: &str, line: u32) {
        self.diagnostics.report(SemanticError::UndeclaredIdentifier {
            name: name.to_string(),
            line,
        });
    }
}

impl Visitor for UsePass<'_> {
    fn enter(&mut self, ast: &Ast, id: NodeId) {
        if let Some(name) = function_declaration(ast, id) {
            self.scope = Scope::function(name);
            return;
        }

        let node = ast.node(id);
        match &node.kind {
            NodeKind::Expr(ExprKind::Call(name)) => self.resolve_function(name, node.line),
            // A bare function identifier outside a declaration is treated as a call
            NodeKind::Ident { kind: IdentKind::Function, name } => {
                self.resolve_function(name, node.line);
            }
            NodeKind::Ident { kind: IdentKind::Variable | IdentKind::Array, name }
                if !ast.is_declaration_site(id) =>
            {
                self.resolve_data(name, node.line);
            }
            _ => {}
        }
    }

    fn leave(&mut self, ast: &Ast, id: NodeId) {
        if function_declaration(ast, id).is_some() {
            self.scope = Scope::Global;
        }
    }
}
