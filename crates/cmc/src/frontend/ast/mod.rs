//! Abstract Syntax Tree definitions
//!
//! The tree is an arena of [`Node`]s addressed by [`NodeId`]. Every node has
//! up to three ordered children, an optional next sibling (statement lists,
//! parameter lists, argument lists) and a parent index. The parent is only
//! used for structural questions such as "is this identifier a declaration".

mod kinds;
mod traverse;

pub use kinds::*;
pub use traverse::{traverse, Visitor};

use std::fmt;

pub const MAX_CHILDREN: usize = 3;

/// Index of a node in its [`Ast`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn to_raw(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub children: [Option<NodeId>; MAX_CHILDREN],
    pub sibling: Option<NodeId>,
    pub parent: Option<NodeId>,
    /// 1-based source line
    pub line: u32,
    /// Filled in by the type checker
    pub ty: Option<ExprType>,
}

impl Node {
    /// Name carried by identifiers and call sites
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Ident { name, .. } | NodeKind::Expr(ExprKind::Call(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn child(&self, slot: usize) -> Option<NodeId> {
        self.children.get(slot).copied().flatten()
    }
}

/// A parsed program
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a detached node
    pub fn alloc(&mut self, kind: NodeKind, line: u32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            children: [None; MAX_CHILDREN],
            sibling: None,
            parent: None,
            line,
            ty: None,
        });
        id
    }

    /// First node of the top-level declaration list
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.to_raw()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.to_raw())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach `child` (and every sibling chained after it) under `parent`
    pub fn set_child(&mut self, parent: NodeId, slot: usize, child: Option<NodeId>) {
        self.nodes[parent.to_raw()].children[slot] = child;
        let mut cursor = child;
        while let Some(id) = cursor {
            let node = &mut self.nodes[id.to_raw()];
            node.parent = Some(parent);
            cursor = node.sibling;
        }
    }

    /// Chain `ids` as siblings in order and return the head of the chain
    pub fn link_siblings(&mut self, ids: &[NodeId]) -> Option<NodeId> {
        for pair in ids.windows(2) {
            self.nodes[pair[0].to_raw()].sibling = Some(pair[1]);
        }
        ids.first().copied()
    }

    /// Iterate over a sibling chain starting at `first`
    pub fn siblings(&self, first: Option<NodeId>) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(first, move |&id| self.node(id).sibling)
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.node(id).parent.map(|p| self.node(p))
    }

    /// An identifier occurrence is a declaration iff its parent is a type node
    pub fn is_declaration_site(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Ident { .. })
            && matches!(self.parent(id).map(|p| &p.kind), Some(NodeKind::Type(_)))
    }

    /// Declared type of a declaration-site identifier, taken from its parent
    pub fn declared_type(&self, id: NodeId) -> Option<TypeName> {
        match self.parent(id).map(|p| &p.kind) {
            Some(NodeKind::Type(ty)) => Some(*ty),
            _ => None,
        }
    }

    pub fn set_type(&mut self, id: NodeId, ty: ExprType) {
        self.nodes[id.to_raw()].ty = Some(ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(ast: &mut Ast, kind: IdentKind, name: &str, line: u32) -> NodeId {
        ast.alloc(NodeKind::Ident { kind, name: name.to_string() }, line)
    }

    #[test]
    fn test_set_child_assigns_parent_to_whole_chain() {
        let mut ast = Ast::new();
        let func = ident(&mut ast, IdentKind::Function, "main", 1);
        let a = ident(&mut ast, IdentKind::Variable, "a", 2);
        let b = ident(&mut ast, IdentKind::Variable, "b", 3);
        let head = ast.link_siblings(&[a, b]);
        ast.set_child(func, 1, head);

        assert_eq!(ast.node(func).child(1), Some(a));
        assert_eq!(ast.node(a).parent, Some(func));
        assert_eq!(ast.node(b).parent, Some(func));
        assert_eq!(ast.siblings(head).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_declaration_site() {
        let mut ast = Ast::new();
        let ty = ast.alloc(NodeKind::Type(TypeName::Int), 1);
        let decl = ident(&mut ast, IdentKind::Variable, "x", 1);
        ast.set_child(ty, 0, Some(decl));
        let assign = ast.alloc(NodeKind::Stmt(StmtKind::Assign), 2);
        let usage = ident(&mut ast, IdentKind::Variable, "x", 2);
        ast.set_child(assign, 0, Some(usage));

        assert!(ast.is_declaration_site(decl));
        assert_eq!(ast.declared_type(decl), Some(TypeName::Int));
        assert!(!ast.is_declaration_site(usage));
        assert!(!ast.is_declaration_site(ty));
        assert_eq!(ast.node(usage).name(), Some("x"));
    }

    #[test]
    fn test_empty_chain() {
        let mut ast = Ast::new();
        assert_eq!(ast.link_siblings(&[]), None);
        assert_eq!(ast.siblings(None).count(), 0);
        assert!(ast.is_empty());
    }
}
