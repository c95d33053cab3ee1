//! Type checking on top of a built symbol table
//!
//! The only rule enforced so far is that a call to a `void` function cannot
//! appear where a value is consumed. Along the way every expression node gets
//! an [`ExprType`] annotation, which later checks can build on.

use super::diagnostics::{Diagnostics, SemanticError};
use super::scope::{Scope, SymbolTable};
use crate::frontend::ast::*;

/// Post-order checker; annotations are collected and applied after the walk
pub struct TypeChecker<'a> {
    table: &'a SymbolTable,
    diagnostics: &'a mut Diagnostics,
    annotations: Vec<(NodeId, ExprType)>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(table: &'a SymbolTable, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            table,
            diagnostics,
            annotations: Vec::new(),
        }
    }

    pub fn into_annotations(self) -> Vec<(NodeId, ExprType)> {
        self.annotations
    }

    /// Name of the called function if `id` is a call site
    fn callee<'n>(ast: &'n Ast, id: NodeId) -> Option<&'n str> {
        match &ast.node(id).kind {
            NodeKind::Expr(ExprKind::Call(name)) => Some(name.as_str()),
            NodeKind::Ident { kind: IdentKind::Function, name } if !ast.is_declaration_site(id) => {
                Some(name.as_str())
            }
            _ => None,
        }
    }

    fn return_type(&self, name: &str) -> Option<ExprType> {
        self.table.type_of(name, &Scope::Global).map(|ty| match ty {
            TypeName::Void => ExprType::Void,
            TypeName::Int => ExprType::Integer,
        })
    }

    fn expression_type(&self, ast: &Ast, id: NodeId) -> Option<ExprType> {
        if let Some(name) = Self::callee(ast, id) {
            return self.return_type(name);
        }

        match &ast.node(id).kind {
            NodeKind::Expr(ExprKind::Constant(_)) => Some(ExprType::Integer),
            NodeKind::Expr(ExprKind::Operator(op)) if op.is_relational() => Some(ExprType::Boolean),
            NodeKind::Expr(ExprKind::Operator(_)) => Some(ExprType::Integer),
            NodeKind::Stmt(StmtKind::Assign) => Some(ExprType::Integer),
            NodeKind::Ident { .. } if !ast.is_declaration_site(id) => Some(ExprType::Integer),
            _ => None,
        }
    }
}

/// Whether the parent of `id` consumes its value
fn in_value_context(ast: &Ast, id: NodeId) -> bool {
    let Some(parent_id) = ast.node(id).parent else {
        return false;
    };
    let parent = ast.node(parent_id);

    match &parent.kind {
        // Index or argument of a referenced identifier; a declared function's
        // body statements also hang off an identifier and are not values
        NodeKind::Ident { .. } => !ast.is_declaration_site(parent_id),
        NodeKind::Expr(ExprKind::Operator(_) | ExprKind::Return | ExprKind::Call(_))
        | NodeKind::Stmt(StmtKind::Assign) => true,
        // Only the condition; branches and loop bodies are statements
        NodeKind::Stmt(StmtKind::If | StmtKind::While) => parent.child(0) == Some(id),
        NodeKind::Expr(ExprKind::Constant(_)) | NodeKind::Type(_) => false,
    }
}

impl Visitor for TypeChecker<'_> {
    fn leave(&mut self, ast: &Ast, id: NodeId) {
        let Some(ty) = self.expression_type(ast, id) else {
            return;
        };
        self.annotations.push((id, ty));

        if ty != ExprType::Void || !in_value_context(ast, id) {
            return;
        }
        if let Some(name) = Self::callee(ast, id) {
            self.diagnostics.report(SemanticError::InvalidVoidUsage {
                name: name.to_string(),
                line: ast.node(id).line,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::Parser;
    use crate::frontend::sema::SemanticAnalyzer;

    fn check(source: &str) -> (Ast, Vec<String>) {
        let mut ast = Parser::new(source).unwrap().parse().unwrap();
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.build_symtab(&ast);
        analyzer.type_check(&mut ast);
        let messages = analyzer.diagnostics().iter().map(ToString::to_string).collect();
        (ast, messages)
    }

    #[test]
    fn test_void_call_as_return_value() {
        let (_, messages) = check("void g(void) {\n return output(1);\n}\nint main(void) {}");
        assert_eq!(messages, vec!["Semantic error at line 2: invalid use of void expression"]);
    }

    #[test]
    fn test_void_call_in_value_positions() {
        let source = "void f(void) {}\n\
                      int main(void) {\n\
                      int x; int a[2];\n\
                      x = f();\n\
                      x = 1 + f();\n\
                      x = a[f()];\n\
                      output(f());\n\
                      while (f()) x = 1;\n\
                      }";
        let (_, messages) = check(source);
        assert_eq!(
            messages,
            vec![
                "Semantic error at line 4: invalid use of void expression",
                "Semantic error at line 5: invalid use of void expression",
                "Semantic error at line 6: invalid use of void expression",
                "Semantic error at line 7: invalid use of void expression",
                "Semantic error at line 8: invalid use of void expression",
            ]
        );
    }

    #[test]
    fn test_void_call_as_statement_is_fine() {
        let source = "void f(void) {}\nint main(void) {\n f();\n if (1) f(); else output(2);\n while (0) f();\n}";
        let (_, messages) = check(source);
        assert!(messages.is_empty(), "unexpected: {:?}", messages);
    }

    #[test]
    fn test_int_call_in_value_position_is_fine() {
        let (_, messages) = check("int main(void) {\n int x;\n x = input() + 1;\n return input();\n}");
        assert!(messages.is_empty(), "unexpected: {:?}", messages);
    }

    #[test]
    fn test_annotations() {
        let (ast, _) = check("int main(void) {\n int x;\n if (x < input()) x = -3;\n output(x);\n}");
        let main = ast.node(ast.root().unwrap()).child(0).unwrap();
        let body: Vec<NodeId> = ast.siblings(ast.node(main).child(1)).collect();

        let if_node = ast.node(body[1]);
        let condition = ast.node(if_node.child(0).unwrap());
        assert_eq!(condition.ty, Some(ExprType::Boolean));
        assert_eq!(ast.node(condition.child(1).unwrap()).ty, Some(ExprType::Integer));

        let assign = ast.node(if_node.child(1).unwrap());
        assert_eq!(ast.node(assign.child(1).unwrap()).ty, Some(ExprType::Integer));

        assert_eq!(ast.node(body[2]).ty, Some(ExprType::Void));
        // declarations are not expressions
        assert_eq!(ast.node(body[0]).ty, None);
    }
}
