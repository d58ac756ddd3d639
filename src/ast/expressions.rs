use super::{
    ast::NodeId,
    types::{BinaryOperator, LiteralKind, UnaryOperator},
};

// LITERALS

/// Literal Expression
/// The value is kept as written in the source.
#[derive(Debug, Clone)]
pub struct LiteralExpr {
    pub kind: LiteralKind,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct IdentifierExpr {
    pub name: String,
}

// ACCESS

/// Member Access Expression
/// `target.member` before the resolver knows what `member` is.
#[derive(Debug, Clone)]
pub struct MemberAccessExpr {
    pub target: NodeId,
    pub member: String,
}

/// Property Access Expression
/// A member access whose member was resolved to a property.
#[derive(Debug, Clone)]
pub struct PropertyAccessExpr {
    pub target: NodeId,
    pub property: String,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: NodeId,
    pub arguments: Vec<NodeId>,
}

/// One call argument, `label: value` or just `value`.
#[derive(Debug, Clone)]
pub struct ArgumentExpr {
    pub label: Option<String>,
    pub value: NodeId,
}

// OPERATORS

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub operator: BinaryOperator,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub operator: UnaryOperator,
    pub operand: NodeId,
}

#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub target: NodeId,
    pub value: NodeId,
}

/// Error Node
/// Stands in for input that failed to parse or to type check.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub message: String,
}
