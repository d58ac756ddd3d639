use super::ast::NodeId;

/// Block Statement
/// A braced list of statements; also the unit of local scope.
#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub statements: Vec<NodeId>,
}

/// Variable Declaration Statement
#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    pub name: String,
    pub mutable: bool,
    pub ty: Option<NodeId>,
    pub initializer: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<NodeId>,
}

/// If Statement
/// `else_branch` is either a block or another if statement.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: NodeId,
    pub then_block: NodeId,
    pub else_branch: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: NodeId,
    pub body: NodeId,
}
