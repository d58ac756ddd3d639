//! Declaration nodes.
//!
//! Files own one module; modules own type and function declarations; type
//! declarations own their members. Every child is a `NodeId` slot.

use super::{
    ast::NodeId,
    types::{BinaryOperator, TypeKind, Visibility},
};

/// Root of one source file.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub path: String,
    pub imports: Vec<NodeId>,
    pub module: NodeId,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    /// Dotted module path as written.
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct ModuleDecl {
    /// Dotted module path, `Main` when the file declares none.
    pub name: String,
    pub members: Vec<NodeId>,
}

impl ModuleDecl {
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split('.')
    }
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    pub visibility: Visibility,
    /// `TypeRef` nodes written after the colon.
    pub conformances: Vec<NodeId>,
    pub members: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub visibility: Visibility,
    pub parameters: Vec<NodeId>,
    pub return_type: Option<NodeId>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct InitDecl {
    pub visibility: Visibility,
    pub parameters: Vec<NodeId>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct OperatorDecl {
    pub operator: BinaryOperator,
    pub parameters: Vec<NodeId>,
    pub return_type: NodeId,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ParameterDecl {
    pub name: String,
    pub ty: NodeId,
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub name: String,
    pub visibility: Visibility,
    pub mutable: bool,
    pub ty: Option<NodeId>,
    pub initializer: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct EnumCaseDecl {
    pub name: String,
}

/// A written type name. Starts bare and is rewritten to the resolved FQN.
#[derive(Debug, Clone)]
pub struct TypeRef {
    pub name: String,
    pub kind: Option<TypeKind>,
}
