//! Node kinds

use std::fmt;

/// What a node is, with its kind-specific payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Stmt(StmtKind),
    Expr(ExprKind),
    /// Identifier occurrence: a declaration when the parent is a `Type` node, a use otherwise
    Ident { kind: IdentKind, name: String },
    Type(TypeName),
}

/// Statement kinds
///
/// Children: `If` = condition/then/else, `Assign` = target/value,
/// `While` = condition/body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtKind {
    If,
    Assign,
    While,
}

/// Expression kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// One operand for unary minus, two otherwise
    Operator(Operator),
    Constant(i64),
    /// Optional returned value in `child[0]`
    Return,
    /// Call site; arguments are the sibling chain in `child[0]`
    Call(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentKind {
    Variable,
    Array,
    Function,
}

/// Type specifier named by a `Type` node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    Void,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    Neg,
}

impl Operator {
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Operator::Lt
                | Operator::LtEq
                | Operator::Gt
                | Operator::GtEq
                | Operator::Eq
                | Operator::NotEq
        )
    }
}

/// Type annotation written by the type checker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprType {
    Void,
    Integer,
    Boolean,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            TypeName::Void => "void",
            TypeName::Int => "int",
        })
    }
}
