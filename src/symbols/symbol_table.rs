use std::collections::HashMap;

use thiserror::Error;

use crate::ast::{
    ast::{Ast, NodeId, NodeKind},
    types::{BinaryOperator, LiteralKind, TypeKind, Visibility},
};

use super::{
    builtins::{literal_type_name, BUILTIN_TYPES, CORE_MODULE, VOID},
    symbols::{ModuleSymbol, Symbol, SymbolData, SymbolId, SymbolKind, TypeSymbol},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("type {name:?} not found")]
    NotFound { name: String },
    #[error("type {name:?} is ambiguous between {modules:?}")]
    Ambiguous { name: String, modules: Vec<String> },
}

/// One argument at a call site, as seen by overload matching.
#[derive(Debug, Clone)]
pub struct CallArgument {
    pub label: Option<String>,
    pub ty: Option<SymbolId>,
}

/// Owns every symbol of a compilation. Root entries are modules.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    modules: Vec<SymbolId>,
    core: SymbolId,
    builtins: HashMap<&'static str, SymbolId>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// An empty table holding only the `Core` module.
    pub fn new() -> Self {
        let mut table = SymbolTable {
            symbols: vec![],
            modules: vec![],
            core: SymbolId::from_raw(0),
            builtins: HashMap::new(),
        };

        let core = table.add_symbol(
            CORE_MODULE,
            None,
            None,
            SymbolData::Module(ModuleSymbol::default()),
        );
        table.core = core;

        for (name, kind) in BUILTIN_TYPES {
            let id = table.add_symbol(
                name,
                Some(core),
                None,
                SymbolData::Type(TypeSymbol::new(*kind, Visibility::Public)),
            );
            table.builtins.insert(name, id);
        }

        table
    }

    pub fn add_symbol(
        &mut self,
        name: &str,
        parent: Option<SymbolId>,
        declaration: Option<NodeId>,
        data: SymbolData,
    ) -> SymbolId {
        let id = SymbolId::from_raw(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.to_string(),
            parent,
            children: vec![],
            declaration,
            data,
        });

        match parent {
            Some(parent) => self.symbols[parent.index()].children.push(id),
            None => self.modules.push(id),
        }

        log::trace!("added symbol {} as {:?}", self.fqn(id), id);
        id
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.get(id).name
    }

    pub fn kind(&self, id: SymbolId) -> SymbolKind {
        self.get(id).kind()
    }

    pub fn parent(&self, id: SymbolId) -> Option<SymbolId> {
        self.get(id).parent
    }

    pub fn children(&self, id: SymbolId) -> &[SymbolId] {
        &self.get(id).children
    }

    pub fn modules(&self) -> &[SymbolId] {
        &self.modules
    }

    pub fn core(&self) -> SymbolId {
        self.core
    }

    pub fn children_named(&self, parent: SymbolId, name: &str) -> Vec<SymbolId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|child| self.name(*child) == name)
            .collect()
    }

    pub fn children_of_kind(&self, parent: SymbolId, kind: SymbolKind) -> Vec<SymbolId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|child| self.kind(*child) == kind)
            .collect()
    }

    pub fn child_of_kind(&self, parent: SymbolId, name: &str, kind: SymbolKind) -> Option<SymbolId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.kind(*child) == kind && self.name(*child) == name)
    }

    /// Dot-joined names from the outermost module down to `id`.
    pub fn fqn(&self, id: SymbolId) -> String {
        let mut names = vec![self.name(id)];
        let mut current = self.parent(id);
        while let Some(parent) = current {
            names.push(self.name(parent));
            current = self.parent(parent);
        }
        names.reverse();
        names.join(".")
    }

    pub fn type_data(&self, id: SymbolId) -> Option<&TypeSymbol> {
        self.get(id).as_type()
    }

    pub fn type_kind(&self, id: SymbolId) -> Option<TypeKind> {
        self.type_data(id).map(|ty| ty.kind)
    }

    /// Resolved value type of a value symbol, or return type of a callable.
    pub fn value_type(&self, id: SymbolId) -> Option<SymbolId> {
        self.get(id).declared_type().known()
    }

    pub fn builtin(&self, name: &str) -> Option<SymbolId> {
        self.builtins.get(name).copied()
    }

    pub fn literal_type(&self, kind: LiteralKind) -> Option<SymbolId> {
        self.builtin(literal_type_name(kind))
    }

    pub fn void_type(&self) -> Option<SymbolId> {
        self.builtin(VOID)
    }

    pub fn is_void(&self, id: SymbolId) -> bool {
        self.void_type() == Some(id)
    }

    pub fn module_by_path(&self, path: &str) -> Option<SymbolId> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self
            .modules
            .iter()
            .copied()
            .find(|module| self.name(*module) == first)?;

        for segment in segments {
            current = self.child_of_kind(current, segment, SymbolKind::Module)?;
        }
        Some(current)
    }

    pub fn find_or_create_module(&mut self, path: &str, is_external: bool) -> SymbolId {
        let mut current: Option<SymbolId> = None;

        for segment in path.split('.') {
            let existing = match current {
                Some(parent) => self.child_of_kind(parent, segment, SymbolKind::Module),
                None => self
                    .modules
                    .iter()
                    .copied()
                    .find(|module| self.name(*module) == segment),
            };

            current = Some(match existing {
                Some(module) => module,
                None => {
                    log::debug!("creating module {} under {:?}", segment, current);
                    self.add_symbol(
                        segment,
                        current,
                        None,
                        SymbolData::Module(ModuleSymbol { is_external }),
                    )
                }
            });
        }

        current.unwrap_or(self.core)
    }

    /// Walks dotted segments from the root modules. Fails on any missing segment.
    pub fn find_by_fqn(&self, fqn: &str) -> Option<SymbolId> {
        let segments: Vec<&str> = fqn.split('.').collect();
        let mut current = self
            .modules
            .iter()
            .copied()
            .find(|module| self.name(*module) == segments[0])?;

        for (index, segment) in segments.iter().enumerate().skip(1) {
            let candidates = self.children_named(current, segment);
            let preferred = if index == segments.len() - 1 {
                candidates.iter().copied().find(|candidate| {
                    matches!(
                        self.kind(*candidate),
                        SymbolKind::Type | SymbolKind::GenericParameter
                    )
                })
            } else {
                candidates
                    .iter()
                    .copied()
                    .find(|candidate| self.kind(*candidate) == SymbolKind::Module)
            };
            current = preferred.or_else(|| candidates.first().copied())?;
        }

        Some(current)
    }

    /// The module symbol of the file containing `node`.
    pub fn own_module(&self, ast: &Ast, node: NodeId) -> Option<SymbolId> {
        let module = ast.module_of(node)?;
        match ast.kind(module) {
            NodeKind::Module(decl) => self.module_by_path(&decl.name),
            _ => None,
        }
    }

    /// The file's own module, each import that names a module, then `Core`.
    pub fn imported_modules(&self, ast: &Ast, node: NodeId) -> Vec<SymbolId> {
        let mut modules = vec![];
        modules.extend(self.own_module(ast, node));

        if let Some(file) = ast.file_of(node) {
            if let NodeKind::File(file) = ast.kind(file) {
                for import in &file.imports {
                    if let NodeKind::Import(import) = ast.kind(*import) {
                        modules.extend(self.module_by_path(&import.path));
                    }
                }
            }
        }

        modules.push(self.core);

        let mut seen = vec![];
        modules.retain(|module| {
            if seen.contains(module) {
                false
            } else {
                seen.push(*module);
                true
            }
        });
        modules
    }

    /// Finds a type visible from `context`.
    ///
    /// Dotted names are treated as FQNs. Bare names first check generic
    /// parameters and nested types from `scope` outwards, then every module in
    /// the import set. Private types of other modules are invisible.
    pub fn find_type(
        &self,
        ast: &Ast,
        context: NodeId,
        name: &str,
        scope: Option<SymbolId>,
    ) -> Result<SymbolId, LookupError> {
        let not_found = || LookupError::NotFound {
            name: name.to_string(),
        };

        if name.contains('.') {
            return self
                .find_by_fqn(name)
                .filter(|id| {
                    matches!(
                        self.kind(*id),
                        SymbolKind::Type | SymbolKind::GenericParameter
                    )
                })
                .ok_or_else(not_found);
        }

        let mut current = scope;
        while let Some(symbol) = current {
            if self.kind(symbol) == SymbolKind::Module {
                break;
            }
            let found = self.children_named(symbol, name).into_iter().find(|child| {
                matches!(
                    self.kind(*child),
                    SymbolKind::Type | SymbolKind::GenericParameter
                )
            });
            if let Some(found) = found {
                return Ok(found);
            }
            current = self.parent(symbol);
        }

        let own = self.own_module(ast, context);
        let mut matches: Vec<SymbolId> = vec![];

        for module in self.imported_modules(ast, context) {
            for child in self.children_named(module, name) {
                if self.kind(child) != SymbolKind::Type {
                    continue;
                }
                if Some(module) != own && self.get(child).visibility() == Visibility::Private {
                    continue;
                }
                if !matches.contains(&child) {
                    matches.push(child);
                }
            }
        }

        match matches.as_slice() {
            [] => Err(not_found()),
            [single] => Ok(*single),
            many => Err(LookupError::Ambiguous {
                name: name.to_string(),
                modules: many
                    .iter()
                    .filter_map(|found| self.parent(*found))
                    .map(|module| self.fqn(module))
                    .collect(),
            }),
        }
    }

    /// Replays the scope-bearing ancestors of `node` against the symbol tree.
    ///
    /// Blocks match positionally, callables by parameter type signature.
    /// Returns `None` as soon as a step has no matching child.
    pub fn find_by_ast_node(&self, ast: &Ast, node: NodeId) -> Option<SymbolId> {
        let mut chain: Vec<NodeId> = std::iter::once(node)
            .chain(ast.ancestors(node))
            .filter(|id| is_symbol_bearing(ast.kind(*id)))
            .collect();
        chain.reverse();

        let (first, rest) = chain.split_first()?;
        let NodeKind::Module(module) = ast.kind(*first) else {
            return None;
        };

        let mut current = self.module_by_path(&module.name)?;
        let mut previous = *first;

        for step in rest {
            current = self.match_step(ast, current, previous, *step)?;
            previous = *step;
        }

        Some(current)
    }

    fn match_step(
        &self,
        ast: &Ast,
        parent: SymbolId,
        parent_node: NodeId,
        node: NodeId,
    ) -> Option<SymbolId> {
        match ast.kind(node) {
            NodeKind::TypeDecl(decl) => self.child_of_kind(parent, &decl.name, SymbolKind::Type),
            NodeKind::Function(function) => {
                let signature = node_signature(ast, &function.parameters);
                self.children_of_kind(parent, SymbolKind::Function)
                    .into_iter()
                    .find(|candidate| {
                        self.name(*candidate) == function.name
                            && self.signature(*candidate) == signature
                    })
            }
            NodeKind::Init(init) => {
                let signature = node_signature(ast, &init.parameters);
                self.children_of_kind(parent, SymbolKind::Init)
                    .into_iter()
                    .find(|candidate| self.signature(*candidate) == signature)
            }
            NodeKind::Operator(operator) => {
                let signature = node_signature(ast, &operator.parameters);
                self.children_of_kind(parent, SymbolKind::Operator)
                    .into_iter()
                    .find(|candidate| {
                        self.operator_of(*candidate) == Some(operator.operator)
                            && self.signature(*candidate) == signature
                    })
            }
            NodeKind::Parameter(parameter) => {
                self.child_of_kind(parent, &parameter.name, SymbolKind::Parameter)
            }
            NodeKind::Property(property) => {
                self.child_of_kind(parent, &property.name, SymbolKind::Property)
            }
            NodeKind::EnumCase(case) => self.child_of_kind(parent, &case.name, SymbolKind::EnumCase),
            NodeKind::VarDecl(decl) => self.child_of_kind(parent, &decl.name, SymbolKind::Variable),
            NodeKind::Block(_) => {
                let index = ast
                    .scope_blocks(parent_node)
                    .iter()
                    .position(|block| *block == node)?;
                self.children_of_kind(parent, SymbolKind::Block)
                    .get(index)
                    .copied()
            }
            _ => None,
        }
    }

    pub fn operator_of(&self, id: SymbolId) -> Option<BinaryOperator> {
        match &self.get(id).data {
            SymbolData::Operator(operator) => Some(operator.operator),
            _ => None,
        }
    }

    pub fn parameters(&self, callable: SymbolId) -> Vec<SymbolId> {
        self.children_of_kind(callable, SymbolKind::Parameter)
    }

    /// Written or resolved parameter type names, in order.
    pub fn signature(&self, callable: SymbolId) -> Vec<String> {
        self.parameters(callable)
            .into_iter()
            .map(|parameter| self.get(parameter).type_name().unwrap_or_default().to_string())
            .collect()
    }

    pub fn same_type(&self, a: SymbolId, b: SymbolId) -> bool {
        a == b || self.fqn(a) == self.fqn(b)
    }

    /// Strict arity, every argument labelled with its parameter's name, and
    /// identical resolved types. No coercion.
    pub fn args_match_parameters(&self, arguments: &[CallArgument], callable: SymbolId) -> bool {
        let parameters = self.parameters(callable);
        if parameters.len() != arguments.len() {
            return false;
        }

        parameters.iter().zip(arguments).all(|(parameter, argument)| {
            if argument.label.as_deref() != Some(self.name(*parameter)) {
                return false;
            }

            match (argument.ty, self.value_type(*parameter)) {
                (Some(argument), Some(parameter)) => self.same_type(argument, parameter),
                _ => false,
            }
        })
    }

    /// Operators declared on `owner` for `left op right`.
    pub fn find_operators(
        &self,
        owner: SymbolId,
        operator: BinaryOperator,
        left: SymbolId,
        right: SymbolId,
    ) -> Vec<SymbolId> {
        self.children_of_kind(owner, SymbolKind::Operator)
            .into_iter()
            .filter(|candidate| self.operator_of(*candidate) == Some(operator))
            .filter(|candidate| {
                let parameters = self.parameters(*candidate);
                parameters.len() == 2
                    && matches!(self.value_type(parameters[0]), Some(ty) if self.same_type(ty, left))
                    && matches!(self.value_type(parameters[1]), Some(ty) if self.same_type(ty, right))
            })
            .collect()
    }

    /// Promotes `base` to the base type, dropping it from the contracts.
    pub fn set_base_type(&mut self, ty: SymbolId, base: SymbolId) {
        if let Some(data) = self.get_mut(ty).as_type_mut() {
            data.contracts.retain(|contract| *contract != base);
            data.base_type = Some(base);
        }
    }

    pub fn add_contract(&mut self, ty: SymbolId, contract: SymbolId) {
        if let Some(data) = self.get_mut(ty).as_type_mut() {
            if data.base_type != Some(contract) && !data.contracts.contains(&contract) {
                data.contracts.push(contract);
            }
        }
    }

    /// Base classes of `ty`, nearest first. Stops at a repeat.
    pub fn base_chain(&self, ty: SymbolId) -> Vec<SymbolId> {
        let mut chain = vec![];
        let mut current = self.type_data(ty).and_then(|data| data.base_type);
        while let Some(base) = current {
            if base == ty || chain.contains(&base) {
                break;
            }
            chain.push(base);
            current = self.type_data(base).and_then(|data| data.base_type);
        }
        chain
    }

    /// Functions named `name` directly under any of `modules`.
    pub fn module_functions(&self, modules: &[SymbolId], name: &str) -> Vec<SymbolId> {
        modules
            .iter()
            .flat_map(|module| self.children_named(*module, name))
            .filter(|child| self.kind(*child) == SymbolKind::Function)
            .collect()
    }
}

fn is_symbol_bearing(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Module(_)
            | NodeKind::TypeDecl(_)
            | NodeKind::Function(_)
            | NodeKind::Init(_)
            | NodeKind::Operator(_)
            | NodeKind::Parameter(_)
            | NodeKind::Property(_)
            | NodeKind::EnumCase(_)
            | NodeKind::VarDecl(_)
            | NodeKind::Block(_)
    )
}

/// Type names written on parameter nodes.
pub fn node_signature(ast: &Ast, parameters: &[NodeId]) -> Vec<String> {
    parameters
        .iter()
        .map(|parameter| match ast.kind(*parameter) {
            NodeKind::Parameter(parameter) => match ast.kind(parameter.ty) {
                NodeKind::TypeRef(ty) => ty.name.clone(),
                _ => String::new(),
            },
            _ => String::new(),
        })
        .collect()
}
