use crate::{
    ast::{
        ast::NodeId,
        types::{BinaryOperator, TypeKind, Visibility},
    },
    MK_ID,
};

MK_ID!(SymbolId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Module,
    Type,
    Function,
    Init,
    Operator,
    Parameter,
    Property,
    Variable,
    Block,
    EnumCase,
    GenericParameter,
}

/// A type slot that may still be waiting for the reference pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclaredType {
    #[default]
    Unknown,
    Known(SymbolId),
}

impl DeclaredType {
    pub fn known(&self) -> Option<SymbolId> {
        match self {
            DeclaredType::Unknown => None,
            DeclaredType::Known(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModuleSymbol {
    pub is_external: bool,
}

#[derive(Debug, Clone)]
pub struct TypeSymbol {
    pub kind: TypeKind,
    pub visibility: Visibility,
    /// Single inherited class. Never also listed in `contracts`.
    pub base_type: Option<SymbolId>,
    pub contracts: Vec<SymbolId>,
    pub is_external: bool,
}

impl TypeSymbol {
    pub fn new(kind: TypeKind, visibility: Visibility) -> Self {
        TypeSymbol {
            kind,
            visibility,
            base_type: None,
            contracts: vec![],
            is_external: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionSymbol {
    pub visibility: Visibility,
    pub return_type: DeclaredType,
    pub is_static: bool,
    pub is_external: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InitSymbol {
    pub visibility: Visibility,
    /// Memberwise initializer created for a struct without one.
    pub synthesized: bool,
}

#[derive(Debug, Clone)]
pub struct OperatorSymbol {
    pub operator: BinaryOperator,
    pub return_type: DeclaredType,
}

/// Parameters and local variables.
#[derive(Debug, Clone, Default)]
pub struct ValueSymbol {
    pub ty: DeclaredType,
    /// Written type, rewritten to the FQN once resolved. Drives signature
    /// matching before types are known.
    pub type_name: String,
    pub mutable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PropertySymbol {
    pub ty: DeclaredType,
    pub type_name: String,
    pub mutable: bool,
    pub visibility: Visibility,
    pub has_initializer: bool,
}

#[derive(Debug, Clone)]
pub enum SymbolData {
    Module(ModuleSymbol),
    Type(TypeSymbol),
    Function(FunctionSymbol),
    Init(InitSymbol),
    Operator(OperatorSymbol),
    Parameter(ValueSymbol),
    Property(PropertySymbol),
    Variable(ValueSymbol),
    Block,
    EnumCase,
    GenericParameter,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub parent: Option<SymbolId>,
    pub children: Vec<SymbolId>,
    /// Declaring node, absent for builtin and imported symbols.
    pub declaration: Option<NodeId>,
    pub data: SymbolData,
}

impl Symbol {
    pub fn kind(&self) -> SymbolKind {
        match &self.data {
            SymbolData::Module(_) => SymbolKind::Module,
            SymbolData::Type(_) => SymbolKind::Type,
            SymbolData::Function(_) => SymbolKind::Function,
            SymbolData::Init(_) => SymbolKind::Init,
            SymbolData::Operator(_) => SymbolKind::Operator,
            SymbolData::Parameter(_) => SymbolKind::Parameter,
            SymbolData::Property(_) => SymbolKind::Property,
            SymbolData::Variable(_) => SymbolKind::Variable,
            SymbolData::Block => SymbolKind::Block,
            SymbolData::EnumCase => SymbolKind::EnumCase,
            SymbolData::GenericParameter => SymbolKind::GenericParameter,
        }
    }

    pub fn as_type(&self) -> Option<&TypeSymbol> {
        match &self.data {
            SymbolData::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_type_mut(&mut self) -> Option<&mut TypeSymbol> {
        match &mut self.data {
            SymbolData::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// Type of a value symbol, or the return type of a callable.
    pub fn declared_type(&self) -> DeclaredType {
        match &self.data {
            SymbolData::Function(function) => function.return_type,
            SymbolData::Operator(operator) => operator.return_type,
            SymbolData::Parameter(value) | SymbolData::Variable(value) => value.ty,
            SymbolData::Property(property) => property.ty,
            _ => DeclaredType::Unknown,
        }
    }

    pub fn set_declared_type(&mut self, ty: DeclaredType) {
        match &mut self.data {
            SymbolData::Function(function) => function.return_type = ty,
            SymbolData::Operator(operator) => operator.return_type = ty,
            SymbolData::Parameter(value) | SymbolData::Variable(value) => value.ty = ty,
            SymbolData::Property(property) => property.ty = ty,
            _ => {}
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        match &self.data {
            SymbolData::Parameter(value) | SymbolData::Variable(value) => Some(&value.type_name),
            SymbolData::Property(property) => Some(&property.type_name),
            _ => None,
        }
    }

    pub fn set_type_name(&mut self, name: &str) {
        match &mut self.data {
            SymbolData::Parameter(value) | SymbolData::Variable(value) => {
                value.type_name = name.to_string()
            }
            SymbolData::Property(property) => property.type_name = name.to_string(),
            _ => {}
        }
    }

    pub fn is_mutable(&self) -> bool {
        match &self.data {
            SymbolData::Parameter(value) | SymbolData::Variable(value) => value.mutable,
            SymbolData::Property(property) => property.mutable,
            _ => false,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match &self.data {
            SymbolData::Type(ty) => ty.visibility,
            SymbolData::Function(function) => function.visibility,
            SymbolData::Init(init) => init.visibility,
            SymbolData::Property(property) => property.visibility,
            _ => Visibility::Public,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self.kind(),
            SymbolKind::Function | SymbolKind::Init | SymbolKind::Operator
        )
    }
}
