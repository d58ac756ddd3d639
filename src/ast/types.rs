//! Small enums shared by AST nodes and symbols.
//!
//! - Type kinds and declaration visibility
//! - Binary and unary operators
//! - Literal kinds
//! - Per-node resolution status

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Contract,
    Enum,
    Generic,
    Primitive,
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Contract => "contract",
            TypeKind::Enum => "enum",
            TypeKind::Generic => "generic type",
            TypeKind::Primitive => "primitive",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    Public,
    #[default]
    Internal,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }

    /// Operator named by a host library's operator method, e.g. `op_Addition`.
    pub fn from_host_method(name: &str) -> Option<BinaryOperator> {
        let operator = match name {
            "op_Addition" => BinaryOperator::Add,
            "op_Subtraction" => BinaryOperator::Subtract,
            "op_Multiply" => BinaryOperator::Multiply,
            "op_Division" => BinaryOperator::Divide,
            "op_Modulus" => BinaryOperator::Modulo,
            "op_Equality" => BinaryOperator::Equal,
            "op_Inequality" => BinaryOperator::NotEqual,
            "op_LessThan" => BinaryOperator::Less,
            "op_GreaterThan" => BinaryOperator::Greater,
            "op_LessThanOrEqual" => BinaryOperator::LessEqual,
            "op_GreaterThanOrEqual" => BinaryOperator::GreaterEqual,
            "op_LogicalAnd" => BinaryOperator::And,
            "op_LogicalOr" => BinaryOperator::Or,
            _ => return None,
        };
        Some(operator)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Boolean,
}

/// Progress of a node through the semantic passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionStatus {
    #[default]
    Unresolved,
    Resolving,
    Resolved,
    Failed,
}
