//! Declaration pass.
//!
//! Stage A registers a symbol for every declaration without touching any
//! type reference. Stage B resolves the written types of parameters, return
//! types and properties once every file has finished Stage A. Both stages
//! are idempotent: a rerun finds the symbols it created last time.

use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        types::{ResolutionStatus, TypeKind},
    },
    errors::errors::ErrorImpl,
    symbols::symbols::{
        DeclaredType, FunctionSymbol, InitSymbol, OperatorSymbol, PropertySymbol, SymbolData,
        SymbolId, SymbolKind, TypeSymbol, ValueSymbol,
    },
};

use super::context::Context;

/// Module declaration node and member list of a file.
pub(crate) fn file_members(ctx: &Context, file: NodeId) -> Option<(NodeId, String, Vec<NodeId>)> {
    let NodeKind::File(file) = ctx.ast.kind(file) else {
        return None;
    };
    let module_node = file.module;
    match ctx.ast.kind(module_node) {
        NodeKind::Module(module) => Some((module_node, module.name.clone(), module.members.clone())),
        _ => None,
    }
}

fn type_ref_name(ctx: &Context, node: Option<NodeId>) -> String {
    match node.map(|node| ctx.ast.kind(node)) {
        Some(NodeKind::TypeRef(reference)) => reference.name.clone(),
        _ => String::new(),
    }
}

/// Existing symbol declared by `node`, `None` to create one, or `Err` when the
/// name is taken by another declaration.
fn existing_symbol(ctx: &mut Context, node: NodeId) -> Result<Option<SymbolId>, ()> {
    if let Some(symbol) = ctx.ast.symbol(node) {
        if ctx.table.get(symbol).declaration == Some(node) {
            return Ok(Some(symbol));
        }
    }
    // Rejected as a duplicate by an earlier run
    if is_rejected(ctx, node) {
        return Err(());
    }

    let Some(existing) = ctx.table.find_by_ast_node(ctx.ast, node) else {
        return Ok(None);
    };

    match ctx.table.get(existing).declaration {
        Some(declaration) if declaration == node => Ok(Some(existing)),
        _ => {
            let name = ctx.ast.kind(node).name().unwrap_or_default().to_string();
            ctx.fail(ErrorImpl::AlreadyDeclared { name }, node);
            Err(())
        }
    }
}

fn is_rejected(ctx: &Context, node: NodeId) -> bool {
    ctx.ast.symbol(node).is_none() && ctx.ast.status(node) == ResolutionStatus::Failed
}

// STAGE A

pub fn register_members(ctx: &mut Context, file: NodeId) {
    let Some((module_node, name, members)) = file_members(ctx, file) else {
        return;
    };

    let module = ctx.table.find_or_create_module(&name, false);
    ctx.ast.set_symbol(module_node, Some(module));
    log::debug!("registering members of module {}", name);

    for member in members {
        match ctx.ast.kind(member) {
            NodeKind::TypeDecl(_) => register_type(ctx, module, member),
            NodeKind::Function(_) => {
                register_callable(ctx, module, member);
            }
            _ => {}
        }
    }
}

fn register_type(ctx: &mut Context, module: SymbolId, node: NodeId) {
    let NodeKind::TypeDecl(decl) = ctx.ast.kind(node).clone() else {
        return;
    };

    let ty = match existing_symbol(ctx, node) {
        Ok(Some(ty)) => ty,
        Ok(None) => ctx.table.add_symbol(
            &decl.name,
            Some(module),
            Some(node),
            SymbolData::Type(TypeSymbol::new(decl.kind, decl.visibility)),
        ),
        Err(()) => return,
    };
    ctx.ast.set_symbol(node, Some(ty));

    for member in &decl.members {
        match ctx.ast.kind(*member) {
            NodeKind::Function(_) | NodeKind::Init(_) | NodeKind::Operator(_) => {
                register_callable(ctx, ty, *member);
            }
            NodeKind::Property(_) => register_property(ctx, ty, *member),
            NodeKind::EnumCase(_) => register_enum_case(ctx, ty, *member),
            _ => {}
        }
    }

    if decl.kind == TypeKind::Struct {
        ensure_memberwise_init(ctx, ty, &decl.members);
    }
}

fn register_callable(ctx: &mut Context, parent: SymbolId, node: NodeId) -> Option<SymbolId> {
    let (name, data, parameters) = match ctx.ast.kind(node) {
        NodeKind::Function(function) => (
            function.name.clone(),
            SymbolData::Function(FunctionSymbol {
                visibility: function.visibility,
                ..FunctionSymbol::default()
            }),
            function.parameters.clone(),
        ),
        NodeKind::Init(init) => (
            "init".to_string(),
            SymbolData::Init(InitSymbol {
                visibility: init.visibility,
                synthesized: false,
            }),
            init.parameters.clone(),
        ),
        NodeKind::Operator(operator) => (
            operator.operator.symbol().to_string(),
            SymbolData::Operator(OperatorSymbol {
                operator: operator.operator,
                return_type: DeclaredType::Unknown,
            }),
            operator.parameters.clone(),
        ),
        _ => return None,
    };

    let callable = match existing_symbol(ctx, node) {
        Ok(Some(callable)) => callable,
        Ok(None) => ctx.table.add_symbol(&name, Some(parent), Some(node), data),
        Err(()) => return None,
    };
    ctx.ast.set_symbol(node, Some(callable));

    for parameter in parameters {
        register_parameter(ctx, callable, parameter);
    }
    Some(callable)
}

fn register_parameter(ctx: &mut Context, callable: SymbolId, node: NodeId) {
    let NodeKind::Parameter(parameter) = ctx.ast.kind(node) else {
        return;
    };
    let name = parameter.name.clone();
    let type_name = type_ref_name(ctx, Some(parameter.ty));
    if is_rejected(ctx, node) {
        return;
    }

    let symbol = match ctx.table.child_of_kind(callable, &name, SymbolKind::Parameter) {
        Some(existing) if ctx.table.get(existing).declaration == Some(node) => existing,
        Some(_) => {
            ctx.fail(ErrorImpl::AlreadyDeclared { name }, node);
            return;
        }
        None => ctx.table.add_symbol(
            &name,
            Some(callable),
            Some(node),
            SymbolData::Parameter(ValueSymbol {
                ty: DeclaredType::Unknown,
                type_name,
                mutable: false,
            }),
        ),
    };
    ctx.ast.set_symbol(node, Some(symbol));
}

fn register_property(ctx: &mut Context, ty: SymbolId, node: NodeId) {
    let NodeKind::Property(property) = ctx.ast.kind(node).clone() else {
        return;
    };

    let symbol = match existing_symbol(ctx, node) {
        Ok(Some(symbol)) => symbol,
        Ok(None) => {
            let type_name = type_ref_name(ctx, property.ty);
            ctx.table.add_symbol(
                &property.name,
                Some(ty),
                Some(node),
                SymbolData::Property(PropertySymbol {
                    ty: DeclaredType::Unknown,
                    type_name,
                    mutable: property.mutable,
                    visibility: property.visibility,
                    has_initializer: property.initializer.is_some(),
                }),
            )
        }
        Err(()) => return,
    };
    ctx.ast.set_symbol(node, Some(symbol));
}

fn register_enum_case(ctx: &mut Context, ty: SymbolId, node: NodeId) {
    let NodeKind::EnumCase(case) = ctx.ast.kind(node) else {
        return;
    };
    let name = case.name.clone();

    let symbol = match existing_symbol(ctx, node) {
        Ok(Some(symbol)) => symbol,
        Ok(None) => ctx
            .table
            .add_symbol(&name, Some(ty), Some(node), SymbolData::EnumCase),
        Err(()) => return,
    };
    ctx.ast.set_symbol(node, Some(symbol));
}

/// A struct without an explicit `init` gets one taking every property that
/// has no initializer, in declaration order.
fn ensure_memberwise_init(ctx: &mut Context, ty: SymbolId, members: &[NodeId]) {
    if members
        .iter()
        .any(|member| matches!(ctx.ast.kind(*member), NodeKind::Init(_)))
    {
        return;
    }
    if memberwise_init(ctx, ty).is_some() {
        return;
    }

    let init = ctx.table.add_symbol(
        "init",
        Some(ty),
        None,
        SymbolData::Init(InitSymbol {
            visibility: ctx.table.get(ty).visibility(),
            synthesized: true,
        }),
    );

    for property in ctx.table.children_of_kind(ty, SymbolKind::Property) {
        let symbol = ctx.table.get(property);
        let SymbolData::Property(data) = &symbol.data else {
            continue;
        };
        if data.has_initializer {
            continue;
        }

        let name = symbol.name.clone();
        let value = ValueSymbol {
            ty: data.ty,
            type_name: data.type_name.clone(),
            mutable: false,
        };
        ctx.table
            .add_symbol(&name, Some(init), None, SymbolData::Parameter(value));
    }

    log::debug!("synthesized memberwise init for {}", ctx.table.fqn(ty));
}

fn memberwise_init(ctx: &Context, ty: SymbolId) -> Option<SymbolId> {
    ctx.table
        .children_of_kind(ty, SymbolKind::Init)
        .into_iter()
        .find(|init| matches!(&ctx.table.get(*init).data, SymbolData::Init(init) if init.synthesized))
}

/// Copies property types onto the memberwise init's parameters.
pub fn sync_memberwise_init(ctx: &mut Context, ty: SymbolId) {
    let Some(init) = memberwise_init(ctx, ty) else {
        return;
    };

    for parameter in ctx.table.parameters(init) {
        let name = ctx.table.name(parameter).to_string();
        let Some(property) = ctx.table.child_of_kind(ty, &name, SymbolKind::Property) else {
            continue;
        };
        let declared = ctx.table.get(property).declared_type();
        let type_name = ctx
            .table
            .get(property)
            .type_name()
            .unwrap_or_default()
            .to_string();

        let symbol = ctx.table.get_mut(parameter);
        symbol.set_declared_type(declared);
        symbol.set_type_name(&type_name);
    }
}

// STAGE B

pub fn resolve_member_references(ctx: &mut Context, file: NodeId) {
    check_imports(ctx, file);

    let Some((_, _, members)) = file_members(ctx, file) else {
        return;
    };

    for member in members {
        match ctx.ast.kind(member) {
            NodeKind::TypeDecl(_) => resolve_type_members(ctx, member),
            NodeKind::Function(_) => resolve_callable_references(ctx, member),
            _ => {}
        }
    }
}

fn check_imports(ctx: &mut Context, file: NodeId) {
    let NodeKind::File(file) = ctx.ast.kind(file) else {
        return;
    };

    for import in file.imports.clone() {
        let NodeKind::Import(decl) = ctx.ast.kind(import) else {
            continue;
        };
        match ctx.table.module_by_path(&decl.path) {
            Some(module) => ctx.resolved(import, Some(module), None),
            None => {
                let name = decl.path.clone();
                ctx.fail(ErrorImpl::UndefinedName { name }, import);
            }
        }
    }
}

fn resolve_type_members(ctx: &mut Context, node: NodeId) {
    let NodeKind::TypeDecl(decl) = ctx.ast.kind(node).clone() else {
        return;
    };
    let Some(ty) = ctx.ast.symbol(node) else {
        return;
    };

    for member in &decl.members {
        match ctx.ast.kind(*member) {
            NodeKind::Function(_) | NodeKind::Init(_) | NodeKind::Operator(_) => {
                resolve_callable_references(ctx, *member)
            }
            NodeKind::Property(_) => resolve_property_reference(ctx, ty, *member),
            NodeKind::EnumCase(_) => {
                let case = ctx.ast.symbol(*member);
                ctx.resolved(*member, case, Some(ty));
            }
            _ => {}
        }
    }

    sync_memberwise_init(ctx, ty);
}

/// Resolves parameter and return types of a function, init or operator.
pub fn resolve_callable_references(ctx: &mut Context, node: NodeId) {
    let Some(callable) = ctx.ast.symbol(node) else {
        return;
    };
    if ctx.ast.status(node) == ResolutionStatus::Failed {
        return;
    }
    ctx.ast.set_status(node, ResolutionStatus::Resolving);

    let (parameters, return_type) = match ctx.ast.kind(node) {
        NodeKind::Function(function) => (function.parameters.clone(), function.return_type),
        NodeKind::Init(init) => (init.parameters.clone(), None),
        NodeKind::Operator(operator) => (operator.parameters.clone(), Some(operator.return_type)),
        _ => return,
    };

    let mut failed = false;
    for parameter in parameters {
        let NodeKind::Parameter(decl) = ctx.ast.kind(parameter) else {
            continue;
        };
        let type_ref = decl.ty;
        let Some(symbol) = ctx.ast.symbol(parameter) else {
            failed = true;
            continue;
        };

        match ctx.resolve_type_ref(type_ref, Some(callable)) {
            Some(ty) => {
                let fqn = ctx.fqn(ty);
                let entry = ctx.table.get_mut(symbol);
                entry.set_declared_type(DeclaredType::Known(ty));
                entry.set_type_name(&fqn);
                ctx.resolved(parameter, Some(symbol), Some(ty));
            }
            None => {
                failed = true;
                ctx.ast.set_status(parameter, ResolutionStatus::Failed);
            }
        }
    }

    let is_init = matches!(ctx.ast.kind(node), NodeKind::Init(_));
    let resolved_return = match return_type {
        Some(type_ref) => ctx.resolve_type_ref(type_ref, Some(callable)),
        None if is_init => None,
        None => ctx.table.void_type(),
    };
    match resolved_return {
        Some(ty) => ctx
            .table
            .get_mut(callable)
            .set_declared_type(DeclaredType::Known(ty)),
        None if !is_init => failed = true,
        None => {}
    }

    let status = if failed {
        ResolutionStatus::Failed
    } else {
        ResolutionStatus::Resolved
    };
    ctx.ast.set_status(node, status);
}

fn resolve_property_reference(ctx: &mut Context, ty: SymbolId, node: NodeId) {
    let NodeKind::Property(property) = ctx.ast.kind(node).clone() else {
        return;
    };
    let Some(symbol) = ctx.ast.symbol(node) else {
        return;
    };

    match property.ty {
        Some(type_ref) => match ctx.resolve_type_ref(type_ref, Some(ty)) {
            Some(resolved) => {
                let fqn = ctx.fqn(resolved);
                let entry = ctx.table.get_mut(symbol);
                entry.set_declared_type(DeclaredType::Known(resolved));
                entry.set_type_name(&fqn);
                ctx.resolved(node, Some(symbol), Some(resolved));
            }
            None => ctx.ast.set_status(node, ResolutionStatus::Failed),
        },
        // Inferred from the initializer by the type checker
        None if property.initializer.is_some() => {}
        None => ctx.fail(ErrorImpl::MissingTypeAnnotation { name: property.name }, node),
    }
}
