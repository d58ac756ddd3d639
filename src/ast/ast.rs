use crate::{
    errors::errors::{Error, ErrorImpl},
    symbols::symbols::SymbolId,
    Span, MK_ID,
};

use super::{
    declarations::{
        EnumCaseDecl, FileNode, FunctionDecl, ImportDecl, InitDecl, ModuleDecl, OperatorDecl,
        ParameterDecl, PropertyDecl, TypeDecl, TypeRef,
    },
    expressions::{
        ArgumentExpr, AssignmentExpr, BinaryExpr, CallExpr, ErrorNode, IdentifierExpr,
        LiteralExpr, MemberAccessExpr, PropertyAccessExpr, UnaryExpr,
    },
    statements::{BlockStmt, IfStmt, ReturnStmt, VarDeclStmt, WhileStmt},
    types::ResolutionStatus,
};

MK_ID!(NodeId);

/// Every node shape. Each child slot holds a `NodeId` so any slot can be
/// swapped for another node in place.
#[derive(Debug, Clone)]
pub enum NodeKind {
    // Declarations
    File(FileNode),
    Import(ImportDecl),
    Module(ModuleDecl),
    TypeDecl(TypeDecl),
    Function(FunctionDecl),
    Init(InitDecl),
    Operator(OperatorDecl),
    Parameter(ParameterDecl),
    Property(PropertyDecl),
    EnumCase(EnumCaseDecl),
    TypeRef(TypeRef),

    // Statements
    Block(BlockStmt),
    VarDecl(VarDeclStmt),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),

    // Expressions
    Literal(LiteralExpr),
    Identifier(IdentifierExpr),
    SelfRef,
    MemberAccess(MemberAccessExpr),
    PropertyAccess(PropertyAccessExpr),
    Call(CallExpr),
    Argument(ArgumentExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Assignment(AssignmentExpr),
    Error(ErrorNode),
}

impl NodeKind {
    /// Child slots in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::File(file) => {
                let mut children = file.imports.clone();
                children.push(file.module);
                children
            }
            NodeKind::Module(module) => module.members.clone(),
            NodeKind::TypeDecl(decl) => {
                let mut children = decl.conformances.clone();
                children.extend(decl.members.iter().copied());
                children
            }
            NodeKind::Function(function) => {
                let mut children = function.parameters.clone();
                children.extend(function.return_type);
                children.extend(function.body);
                children
            }
            NodeKind::Init(init) => {
                let mut children = init.parameters.clone();
                children.extend(init.body);
                children
            }
            NodeKind::Operator(operator) => {
                let mut children = operator.parameters.clone();
                children.push(operator.return_type);
                children.extend(operator.body);
                children
            }
            NodeKind::Parameter(parameter) => vec![parameter.ty],
            NodeKind::Property(property) => property
                .ty
                .into_iter()
                .chain(property.initializer)
                .collect(),
            NodeKind::Block(block) => block.statements.clone(),
            NodeKind::VarDecl(decl) => decl.ty.into_iter().chain(decl.initializer).collect(),
            NodeKind::Return(ret) => ret.value.into_iter().collect(),
            NodeKind::If(stmt) => {
                let mut children = vec![stmt.condition, stmt.then_block];
                children.extend(stmt.else_branch);
                children
            }
            NodeKind::While(stmt) => vec![stmt.condition, stmt.body],
            NodeKind::MemberAccess(access) => vec![access.target],
            NodeKind::PropertyAccess(access) => vec![access.target],
            NodeKind::Call(call) => {
                let mut children = vec![call.callee];
                children.extend(call.arguments.iter().copied());
                children
            }
            NodeKind::Argument(argument) => vec![argument.value],
            NodeKind::Binary(binary) => vec![binary.left, binary.right],
            NodeKind::Unary(unary) => vec![unary.operand],
            NodeKind::Assignment(assignment) => vec![assignment.target, assignment.value],
            NodeKind::Import(_)
            | NodeKind::EnumCase(_)
            | NodeKind::TypeRef(_)
            | NodeKind::Literal(_)
            | NodeKind::Identifier(_)
            | NodeKind::SelfRef
            | NodeKind::Error(_) => vec![],
        }
    }

    fn slots_mut(&mut self) -> Vec<&mut NodeId> {
        match self {
            NodeKind::File(file) => {
                let mut slots: Vec<&mut NodeId> = file.imports.iter_mut().collect();
                slots.push(&mut file.module);
                slots
            }
            NodeKind::Module(module) => module.members.iter_mut().collect(),
            NodeKind::TypeDecl(decl) => decl
                .conformances
                .iter_mut()
                .chain(decl.members.iter_mut())
                .collect(),
            NodeKind::Function(function) => function
                .parameters
                .iter_mut()
                .chain(function.return_type.iter_mut())
                .chain(function.body.iter_mut())
                .collect(),
            NodeKind::Init(init) => init
                .parameters
                .iter_mut()
                .chain(init.body.iter_mut())
                .collect(),
            NodeKind::Operator(operator) => {
                let mut slots: Vec<&mut NodeId> = operator.parameters.iter_mut().collect();
                slots.push(&mut operator.return_type);
                slots.extend(operator.body.iter_mut());
                slots
            }
            NodeKind::Parameter(parameter) => vec![&mut parameter.ty],
            NodeKind::Property(property) => property
                .ty
                .iter_mut()
                .chain(property.initializer.iter_mut())
                .collect(),
            NodeKind::Block(block) => block.statements.iter_mut().collect(),
            NodeKind::VarDecl(decl) => decl
                .ty
                .iter_mut()
                .chain(decl.initializer.iter_mut())
                .collect(),
            NodeKind::Return(ret) => ret.value.iter_mut().collect(),
            NodeKind::If(stmt) => {
                let mut slots = vec![&mut stmt.condition, &mut stmt.then_block];
                slots.extend(stmt.else_branch.iter_mut());
                slots
            }
            NodeKind::While(stmt) => vec![&mut stmt.condition, &mut stmt.body],
            NodeKind::MemberAccess(access) => vec![&mut access.target],
            NodeKind::PropertyAccess(access) => vec![&mut access.target],
            NodeKind::Call(call) => {
                let mut slots = vec![&mut call.callee];
                slots.extend(call.arguments.iter_mut());
                slots
            }
            NodeKind::Argument(argument) => vec![&mut argument.value],
            NodeKind::Binary(binary) => vec![&mut binary.left, &mut binary.right],
            NodeKind::Unary(unary) => vec![&mut unary.operand],
            NodeKind::Assignment(assignment) => {
                vec![&mut assignment.target, &mut assignment.value]
            }
            NodeKind::Import(_)
            | NodeKind::EnumCase(_)
            | NodeKind::TypeRef(_)
            | NodeKind::Literal(_)
            | NodeKind::Identifier(_)
            | NodeKind::SelfRef
            | NodeKind::Error(_) => vec![],
        }
    }

    /// Declared name, for nodes that declare one.
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeKind::Module(module) => Some(&module.name),
            NodeKind::TypeDecl(decl) => Some(&decl.name),
            NodeKind::Function(function) => Some(&function.name),
            NodeKind::Init(_) => Some("init"),
            NodeKind::Parameter(parameter) => Some(&parameter.name),
            NodeKind::Property(property) => Some(&property.name),
            NodeKind::EnumCase(case) => Some(&case.name),
            NodeKind::VarDecl(decl) => Some(&decl.name),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            NodeKind::Function(_) | NodeKind::Init(_) | NodeKind::Operator(_)
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, NodeKind::Error(_))
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub status: ResolutionStatus,
    /// Type the node evaluates to, once resolved.
    pub result_type: Option<SymbolId>,
    /// Symbol the node declares or refers to, once resolved.
    pub symbol: Option<SymbolId>,
}

/// Arena holding the nodes of every file in one compilation.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `kind` and adopts its child slots.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        for child in kind.children() {
            self.nodes[child.index()].parent = Some(id);
        }

        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            status: ResolutionStatus::Unresolved,
            result_type: None,
            symbol: None,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.get(id).kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.get_mut(id).kind
    }

    pub fn span(&self, id: NodeId) -> &Span {
        &self.get(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    pub fn status(&self, id: NodeId) -> ResolutionStatus {
        self.get(id).status
    }

    pub fn set_status(&mut self, id: NodeId, status: ResolutionStatus) {
        self.get_mut(id).status = status;
    }

    pub fn result_type(&self, id: NodeId) -> Option<SymbolId> {
        self.get(id).result_type
    }

    pub fn set_result_type(&mut self, id: NodeId, ty: Option<SymbolId>) {
        self.get_mut(id).result_type = ty;
    }

    pub fn symbol(&self, id: NodeId) -> Option<SymbolId> {
        self.get(id).symbol
    }

    pub fn set_symbol(&mut self, id: NodeId, symbol: Option<SymbolId>) {
        self.get_mut(id).symbol = symbol;
    }

    /// Puts `new` in whichever slot of `old`'s parent holds `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<(), Error> {
        let Some(parent) = self.parent(old) else {
            return Err(Error::new(
                ErrorImpl::InternalInvariant {
                    message: format!("cannot replace root or detached node {:?}", old),
                },
                self.span(old).clone(),
            ));
        };

        let replaced = match self
            .kind_mut(parent)
            .slots_mut()
            .into_iter()
            .find(|slot| **slot == old)
        {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        };

        if !replaced {
            return Err(Error::new(
                ErrorImpl::InternalInvariant {
                    message: format!("{:?} is not a child of its parent {:?}", old, parent),
                },
                self.span(old).clone(),
            ));
        }

        self.get_mut(new).parent = Some(parent);
        self.get_mut(old).parent = None;
        Ok(())
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = vec![];
        let mut current = self.parent(id);
        while let Some(node) = current {
            ancestors.push(node);
            current = self.parent(node);
        }
        ancestors
    }

    fn nearest(&self, id: NodeId, predicate: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|node| predicate(self.kind(*node)))
    }

    pub fn file_of(&self, id: NodeId) -> Option<NodeId> {
        self.nearest(id, |kind| matches!(kind, NodeKind::File(_)))
    }

    pub fn module_of(&self, id: NodeId) -> Option<NodeId> {
        if let Some(NodeKind::File(file)) = self.file_of(id).map(|file| self.kind(file)) {
            return Some(file.module);
        }
        self.nearest(id, |kind| matches!(kind, NodeKind::Module(_)))
    }

    /// Nearest enclosing type declaration, including `id` itself.
    pub fn enclosing_type(&self, id: NodeId) -> Option<NodeId> {
        self.nearest(id, |kind| matches!(kind, NodeKind::TypeDecl(_)))
    }

    /// Nearest enclosing function, init or operator, including `id` itself.
    pub fn enclosing_callable(&self, id: NodeId) -> Option<NodeId> {
        self.nearest(id, NodeKind::is_callable)
    }

    /// Blocks owned directly by `scope`, in source order, without descending
    /// into those blocks.
    pub fn scope_blocks(&self, scope: NodeId) -> Vec<NodeId> {
        let mut blocks = vec![];
        let mut pending: Vec<NodeId> = self.children(scope).into_iter().rev().collect();

        while let Some(node) = pending.pop() {
            match self.kind(node) {
                NodeKind::Block(_) => blocks.push(node),
                kind => pending.extend(kind.children().into_iter().rev()),
            }
        }
        blocks
    }

    /// Pre-order walk of `root` and everything under it.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut nodes = vec![];
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            nodes.push(node);
            pending.extend(self.children(node).into_iter().rev());
        }
        nodes
    }
}
