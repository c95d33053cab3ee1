//! Depth-first traversal with pre- and post-order hooks

use super::{Ast, NodeId};

/// Hooks invoked by [`traverse`]. Both default to doing nothing.
pub trait Visitor {
    fn enter(&mut self, ast: &Ast, id: NodeId) {
        let _ = (ast, id);
    }

    fn leave(&mut self, ast: &Ast, id: NodeId) {
        let _ = (ast, id);
    }
}

/// Walk the tree rooted at `start`
///
/// For each node: `enter`, then every child slot in order, then `leave`,
/// then the next sibling. `leave` therefore fires only after a node's whole
/// subtree is done, which is what lets a pass bracket a function body.
pub fn traverse<V: Visitor + ?Sized>(ast: &Ast, start: Option<NodeId>, visitor: &mut V) {
    // Siblings are walked iteratively; long statement lists would otherwise
    // recurse once per statement.
    let mut cursor = start;
    while let Some(id) = cursor {
        visitor.enter(ast, id);
        for child in ast.node(id).children {
            traverse(ast, child, visitor);
        }
        visitor.leave(ast, id);
        cursor = ast.node(id).sibling;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::{IdentKind, NodeKind, TypeName};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Visitor for Recorder {
        fn enter(&mut self, ast: &Ast, id: NodeId) {
            self.events.push(format!("+{}", label(ast, id)));
        }

        fn leave(&mut self, ast: &Ast, id: NodeId) {
            self.events.push(format!("-{}", label(ast, id)));
        }
    }

    fn label(ast: &Ast, id: NodeId) -> String {
        match &ast.node(id).kind {
            NodeKind::Type(ty) => ty.to_string(),
            other => ast.node(id).name().map_or_else(|| format!("{:?}", other), str::to_string),
        }
    }

    fn ident(ast: &mut Ast, name: &str) -> NodeId {
        ast.alloc(
            NodeKind::Ident { kind: IdentKind::Variable, name: name.to_string() },
            1,
        )
    }

    #[test]
    fn test_order_children_before_leave_before_sibling() {
        // int -> f(a, b) ; void -> g
        let mut ast = Ast::new();
        let int = ast.alloc(NodeKind::Type(TypeName::Int), 1);
        let f = ident(&mut ast, "f");
        let a = ident(&mut ast, "a");
        let b = ident(&mut ast, "b");
        let void = ast.alloc(NodeKind::Type(TypeName::Void), 2);
        let g = ident(&mut ast, "g");

        let args = ast.link_siblings(&[a, b]);
        ast.set_child(f, 0, args);
        ast.set_child(int, 0, Some(f));
        ast.set_child(void, 0, Some(g));
        let root = ast.link_siblings(&[int, void]);

        let mut recorder = Recorder::default();
        traverse(&ast, root, &mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "+int", "+f", "+a", "-a", "+b", "-b", "-f", "-int",
                "+void", "+g", "-g", "-void",
            ]
        );
    }

    #[test]
    fn test_absent_start_visits_nothing() {
        let ast = Ast::new();
        let mut recorder = Recorder::default();
        traverse(&ast, None, &mut recorder);
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn test_default_hooks() {
        struct Nothing;
        impl Visitor for Nothing {}

        let mut ast = Ast::new();
        let x = ident(&mut ast, "x");
        traverse(&ast, Some(x), &mut Nothing);
    }
}
