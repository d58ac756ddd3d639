//! Implementation pass.
//!
//! Runs once every body is resolved and checks what only a complete picture
//! can tell: bodies exist, returns agree with the declared return type,
//! immutable values stay unassigned, stored properties get initialized and
//! contracts are fully implemented.

use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        declarations::TypeDecl,
        types::TypeKind,
    },
    errors::errors::ErrorImpl,
    symbols::symbols::{SymbolId, SymbolKind},
};

use super::{context::Context, declarations::file_members};

pub fn check_implementations(ctx: &mut Context, file: NodeId) {
    let Some((_, _, members)) = file_members(ctx, file) else {
        return;
    };

    for member in members {
        match ctx.ast.kind(member) {
            NodeKind::TypeDecl(_) => check_type(ctx, member),
            NodeKind::Function(_) => check_callable(ctx, member, None),
            _ => {}
        }
    }
}

fn check_type(ctx: &mut Context, node: NodeId) {
    let NodeKind::TypeDecl(decl) = ctx.ast.kind(node).clone() else {
        return;
    };
    let Some(ty) = ctx.ast.symbol(node) else {
        return;
    };

    for member in &decl.members {
        if ctx.ast.kind(*member).is_callable() {
            check_callable(ctx, *member, Some(decl.kind));
        }
    }

    check_initialization(ctx, ty, &decl);
    if decl.kind != TypeKind::Contract {
        check_contracts(ctx, node, ty, &decl.name);
    }
}

fn callable_name(ctx: &Context, node: NodeId) -> String {
    match ctx.ast.kind(node) {
        NodeKind::Function(function) => function.name.clone(),
        NodeKind::Init(_) => "init".to_string(),
        NodeKind::Operator(operator) => format!("operator {}", operator.operator),
        _ => String::new(),
    }
}

fn check_callable(ctx: &mut Context, node: NodeId, owner: Option<TypeKind>) {
    let body = match ctx.ast.kind(node) {
        NodeKind::Function(function) => function.body,
        NodeKind::Init(init) => init.body,
        NodeKind::Operator(operator) => operator.body,
        _ => return,
    };

    match body {
        None if owner != Some(TypeKind::Contract) => {
            let function = callable_name(ctx, node);
            ctx.fail(ErrorImpl::MissingBody { function }, node);
        }
        None => {}
        Some(body) => {
            check_returns(ctx, node, body);
            check_assignments(ctx, node, body);
        }
    }
}

fn check_returns(ctx: &mut Context, node: NodeId, body: NodeId) {
    let Some(callable) = ctx.ast.symbol(node) else {
        return;
    };
    let is_init = matches!(ctx.ast.kind(node), NodeKind::Init(_));
    let return_type = ctx.table.value_type(callable);
    if !is_init && return_type.is_none() {
        return;
    }

    let returns_value = !is_init && return_type.is_some_and(|ty| !ctx.table.is_void(ty));
    let function = callable_name(ctx, node);

    for statement in ctx.ast.descendants(body) {
        let NodeKind::Return(ret) = ctx.ast.kind(statement) else {
            continue;
        };

        match (ret.value, returns_value) {
            (Some(_), false) => ctx.error(
                ErrorImpl::UnexpectedReturnValue {
                    function: function.clone(),
                },
                statement,
            ),
            (None, true) => ctx.error(
                ErrorImpl::MissingReturnValue {
                    function: function.clone(),
                },
                statement,
            ),
            (Some(value), true) => {
                let (Some(expected), Some(received)) = (return_type, ctx.ast.result_type(value))
                else {
                    continue;
                };
                if !ctx.table.same_type(expected, received) {
                    let expected = ctx.fqn(expected);
                    let received = ctx.fqn(received);
                    ctx.error(ErrorImpl::TypeMismatch { expected, received }, value);
                }
            }
            (None, false) => {}
        }
    }

    if returns_value && !definitely_returns(ctx, body) {
        ctx.error(ErrorImpl::MissingReturn { function }, node);
    }
}

/// Whether every path through `node` ends in a `return`.
fn definitely_returns(ctx: &Context, node: NodeId) -> bool {
    match ctx.ast.kind(node) {
        NodeKind::Return(_) => true,
        NodeKind::Block(block) => block
            .statements
            .iter()
            .any(|statement| definitely_returns(ctx, *statement)),
        NodeKind::If(stmt) => stmt.else_branch.is_some_and(|else_branch| {
            definitely_returns(ctx, stmt.then_block) && definitely_returns(ctx, else_branch)
        }),
        _ => false,
    }
}

/// Symbol an assignment target writes to, when it names one.
fn assigned_symbol(ctx: &Context, target: NodeId) -> Option<SymbolId> {
    match ctx.ast.kind(target) {
        NodeKind::Identifier(_) | NodeKind::PropertyAccess(_) => ctx.ast.symbol(target),
        _ => None,
    }
}

/// Whether `target` writes a property of the instance under construction.
fn writes_own_property(ctx: &Context, target: NodeId, ty: Option<SymbolId>) -> bool {
    match ctx.ast.kind(target) {
        NodeKind::Identifier(_) => true,
        NodeKind::PropertyAccess(access) => {
            matches!(ctx.ast.kind(access.target), NodeKind::SelfRef)
                && ctx.ast.symbol(access.target) == ty
        }
        _ => false,
    }
}

fn check_assignments(ctx: &mut Context, node: NodeId, body: NodeId) {
    let in_init = matches!(ctx.ast.kind(node), NodeKind::Init(_));
    let owner = ctx
        .ast
        .enclosing_type(node)
        .and_then(|ty| ctx.ast.symbol(ty));

    for expression in ctx.ast.descendants(body) {
        let NodeKind::Assignment(assignment) = ctx.ast.kind(expression) else {
            continue;
        };
        let target = assignment.target;
        let Some(symbol) = assigned_symbol(ctx, target) else {
            continue;
        };

        let allowed = match ctx.table.kind(symbol) {
            SymbolKind::Variable => ctx.table.get(symbol).is_mutable(),
            SymbolKind::Property => {
                ctx.table.get(symbol).is_mutable()
                    || (in_init
                        && ctx.table.parent(symbol) == owner
                        && writes_own_property(ctx, target, owner))
            }
            SymbolKind::Parameter | SymbolKind::EnumCase => false,
            _ => true,
        };

        if !allowed {
            let name = ctx.table.name(symbol).to_string();
            ctx.error(ErrorImpl::ImmutableAssignment { name }, target);
        }
    }
}

/// Stored properties without an initializer must be assigned by every
/// explicit init. Classes without one leave them uninitialized; structs get
/// the memberwise init.
fn check_initialization(ctx: &mut Context, ty: SymbolId, decl: &TypeDecl) {
    if !matches!(decl.kind, TypeKind::Class | TypeKind::Struct) {
        return;
    }

    let uninitialized: Vec<(String, NodeId)> = decl
        .members
        .iter()
        .filter_map(|member| match ctx.ast.kind(*member) {
            NodeKind::Property(property) if property.initializer.is_none() => {
                Some((property.name.clone(), *member))
            }
            _ => None,
        })
        .collect();
    if uninitialized.is_empty() {
        return;
    }

    let inits: Vec<(NodeId, Option<NodeId>)> = decl
        .members
        .iter()
        .filter_map(|member| match ctx.ast.kind(*member) {
            NodeKind::Init(init) => Some((*member, init.body)),
            _ => None,
        })
        .collect();

    if inits.is_empty() {
        if decl.kind == TypeKind::Class {
            for (property, node) in uninitialized {
                ctx.error(
                    ErrorImpl::UninitializedProperty {
                        type_name: decl.name.clone(),
                        property,
                    },
                    node,
                );
            }
        }
        return;
    }

    for (init, body) in inits {
        let Some(body) = body else {
            continue;
        };

        let assigned: Vec<SymbolId> = ctx
            .ast
            .descendants(body)
            .into_iter()
            .filter_map(|node| match ctx.ast.kind(node) {
                NodeKind::Assignment(assignment) => Some(assignment.target),
                _ => None,
            })
            .filter(|target| writes_own_property(ctx, *target, Some(ty)))
            .filter_map(|target| assigned_symbol(ctx, target))
            .collect();

        for (property, _) in &uninitialized {
            let covered = assigned.iter().any(|symbol| {
                ctx.table.kind(*symbol) == SymbolKind::Property
                    && ctx.table.parent(*symbol) == Some(ty)
                    && ctx.table.name(*symbol) == property
            });
            if !covered {
                ctx.error(
                    ErrorImpl::UninitializedProperty {
                        type_name: decl.name.clone(),
                        property: property.clone(),
                    },
                    init,
                );
            }
        }
    }
}

/// Every contract `ty` must satisfy: its own, its base classes', and the
/// contracts those contracts conform to.
fn required_contracts(ctx: &Context, ty: SymbolId) -> Vec<SymbolId> {
    let mut pending: Vec<SymbolId> = std::iter::once(ty)
        .chain(ctx.table.base_chain(ty))
        .filter_map(|owner| ctx.table.type_data(owner))
        .flat_map(|data| data.contracts.iter().copied())
        .collect();

    let mut contracts = vec![];
    while let Some(contract) = pending.pop() {
        if contracts.contains(&contract) {
            continue;
        }
        contracts.push(contract);
        if let Some(data) = ctx.table.type_data(contract) {
            pending.extend(data.contracts.iter().copied());
        }
    }
    contracts
}

fn same_optional_type(ctx: &Context, a: Option<SymbolId>, b: Option<SymbolId>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => ctx.table.same_type(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn implements(ctx: &Context, ty: SymbolId, requirement: SymbolId) -> bool {
    let name = ctx.table.name(requirement);
    let owners: Vec<SymbolId> = std::iter::once(ty).chain(ctx.table.base_chain(ty)).collect();

    match ctx.table.kind(requirement) {
        SymbolKind::Function => {
            let signature = ctx.table.signature(requirement);
            let return_type = ctx.table.value_type(requirement);
            owners.iter().any(|owner| {
                ctx.table
                    .children_named(*owner, name)
                    .into_iter()
                    .filter(|member| ctx.table.kind(*member) == SymbolKind::Function)
                    .any(|member| {
                        ctx.table.signature(member) == signature
                            && same_optional_type(ctx, ctx.table.value_type(member), return_type)
                    })
            })
        }
        SymbolKind::Property => {
            let property_type = ctx.table.value_type(requirement);
            owners.iter().any(|owner| {
                ctx.table
                    .child_of_kind(*owner, name, SymbolKind::Property)
                    .is_some_and(|member| {
                        same_optional_type(ctx, ctx.table.value_type(member), property_type)
                    })
            })
        }
        _ => true,
    }
}

fn check_contracts(ctx: &mut Context, node: NodeId, ty: SymbolId, type_name: &str) {
    for contract in required_contracts(ctx, ty) {
        let missing: Vec<String> = ctx
            .table
            .children(contract)
            .iter()
            .copied()
            .filter(|requirement| !implements(ctx, ty, *requirement))
            .map(|requirement| ctx.table.name(requirement).to_string())
            .collect();

        let contract = ctx.fqn(contract);
        for member in missing {
            ctx.error(
                ErrorImpl::MissingContractMember {
                    type_name: type_name.to_string(),
                    contract: contract.clone(),
                    member,
                },
                node,
            );
        }
    }
}
