//! Scope and reference resolution.
//!
//! Name lookup walks outward from a use site: enclosing blocks (only
//! variables declared before the use), then the enclosing callable's
//! parameters, then members of the enclosing type, then functions and types
//! visible through the file's import set.

use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        expressions::PropertyAccessExpr,
        types::TypeKind,
    },
    errors::errors::{ErrorImpl, WarningImpl},
    symbols::{
        symbol_table::LookupError,
        symbols::{DeclaredType, SymbolData, SymbolId, SymbolKind, ValueSymbol},
    },
};

use super::{context::Context, declarations::file_members};

/// What a bare name refers to at its use site.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Variable, parameter, property or enum case.
    Value(SymbolId),
    Type(SymbolId),
    /// Every function overload visible under the name.
    Functions(Vec<SymbolId>),
}

/// Links each written conformance of the file's types to a base class or a
/// contract.
pub fn link_conformances(ctx: &mut Context, file: NodeId) {
    let Some((_, _, members)) = file_members(ctx, file) else {
        return;
    };

    for member in members {
        let NodeKind::TypeDecl(decl) = ctx.ast.kind(member) else {
            continue;
        };
        let conformances = decl.conformances.clone();
        let kind = decl.kind;
        let type_name = decl.name.clone();
        let Some(ty) = ctx.ast.symbol(member) else {
            continue;
        };

        for conformance in conformances {
            let Some(target) = ctx.resolve_type_ref(conformance, Some(ty)) else {
                continue;
            };
            link_conformance(ctx, ty, kind, &type_name, target, conformance);
        }
    }
}

fn link_conformance(
    ctx: &mut Context,
    ty: SymbolId,
    kind: TypeKind,
    type_name: &str,
    target: SymbolId,
    node: NodeId,
) {
    if target == ty || ctx.table.base_chain(target).contains(&ty) {
        ctx.fail(
            ErrorImpl::CyclicInheritance {
                type_name: type_name.to_string(),
            },
            node,
        );
        return;
    }

    let found = match ctx.table.type_kind(target) {
        Some(TypeKind::Contract) => {
            ctx.table.add_contract(ty, target);
            return;
        }
        Some(TypeKind::Class) if kind == TypeKind::Class => {
            let existing = ctx.table.type_data(ty).and_then(|data| data.base_type);
            match existing {
                Some(first) if first != target => {
                    let first = ctx.fqn(first);
                    let second = ctx.fqn(target);
                    ctx.fail(
                        ErrorImpl::MultipleBaseTypes {
                            type_name: type_name.to_string(),
                            first,
                            second,
                        },
                        node,
                    );
                }
                _ => ctx.table.set_base_type(ty, target),
            }
            return;
        }
        Some(found) => found.to_string(),
        None => "generic parameter".to_string(),
    };

    let conformance = ctx.fqn(target);
    ctx.fail(
        ErrorImpl::InvalidConformance {
            type_name: type_name.to_string(),
            conformance,
            kind: found,
        },
        node,
    );
}

/// Resolves a bare name as seen from `node`.
pub fn resolve_identifier(ctx: &Context, node: NodeId, name: &str) -> Result<Binding, LookupError> {
    let use_offset = ctx.ast.span(node).start.offset;

    for ancestor in ctx.ast.ancestors(node) {
        match ctx.ast.kind(ancestor) {
            NodeKind::Block(_) => {
                let Some(block) = ctx.ast.symbol(ancestor) else {
                    continue;
                };
                let visible = ctx
                    .table
                    .children_of_kind(block, SymbolKind::Variable)
                    .into_iter()
                    .rev()
                    .find(|variable| {
                        ctx.table.name(*variable) == name
                            && ctx
                                .table
                                .get(*variable)
                                .declaration
                                .is_some_and(|decl| ctx.ast.span(decl).end.offset <= use_offset)
                    });
                if let Some(variable) = visible {
                    return Ok(Binding::Value(variable));
                }
            }
            kind if kind.is_callable() => {
                if let Some(callable) = ctx.ast.symbol(ancestor) {
                    if let Some(parameter) =
                        ctx.table.child_of_kind(callable, name, SymbolKind::Parameter)
                    {
                        return Ok(Binding::Value(parameter));
                    }
                }
            }
            NodeKind::TypeDecl(_) => {
                let Some(ty) = ctx.ast.symbol(ancestor) else {
                    continue;
                };
                if let Some(property) = find_property(ctx, ty, name) {
                    return Ok(Binding::Value(property));
                }
                let methods = find_methods(ctx, ty, name);
                if !methods.is_empty() {
                    return Ok(Binding::Functions(methods));
                }
            }
            NodeKind::Module(_) => break,
            _ => {}
        }
    }

    let modules = ctx.table.imported_modules(ctx.ast, node);
    let functions = ctx.table.module_functions(&modules, name);
    if !functions.is_empty() {
        return Ok(Binding::Functions(functions));
    }

    ctx.table
        .find_type(ctx.ast, node, name, None)
        .map(Binding::Type)
}

/// Property named `name` on `ty` or the nearest base class declaring it.
pub fn find_property(ctx: &Context, ty: SymbolId, name: &str) -> Option<SymbolId> {
    std::iter::once(ty)
        .chain(ctx.table.base_chain(ty))
        .find_map(|owner| ctx.table.child_of_kind(owner, name, SymbolKind::Property))
}

/// Methods named `name` on `ty`, then on its base classes.
pub fn find_methods(ctx: &Context, ty: SymbolId, name: &str) -> Vec<SymbolId> {
    std::iter::once(ty)
        .chain(ctx.table.base_chain(ty))
        .flat_map(|owner| ctx.table.children_named(owner, name))
        .filter(|member| ctx.table.kind(*member) == SymbolKind::Function)
        .collect()
}

/// Type a `self` at `node` refers to.
pub fn resolve_self(ctx: &Context, node: NodeId) -> Option<SymbolId> {
    let ty = ctx.ast.enclosing_type(node)?;
    ctx.ast.symbol(ty)
}

/// Dotted name spelled by an identifier or a chain of member accesses, e.g.
/// `Geometry.Point`.
pub fn dotted_path(ctx: &Context, node: NodeId) -> Option<String> {
    match ctx.ast.kind(node) {
        NodeKind::Identifier(identifier) => Some(identifier.name.clone()),
        NodeKind::MemberAccess(access) => {
            let target = dotted_path(ctx, access.target)?;
            Some(format!("{}.{}", target, access.member))
        }
        _ => None,
    }
}

/// The type an expression names when it is used as a type, e.g. the callee
/// of a construction or the target of `Color.red`.
pub fn resolve_type_expr(ctx: &Context, node: NodeId) -> Option<SymbolId> {
    match ctx.ast.kind(node) {
        NodeKind::Identifier(identifier) => {
            match resolve_identifier(ctx, node, &identifier.name) {
                Ok(Binding::Type(ty)) => Some(ty),
                _ => None,
            }
        }
        NodeKind::MemberAccess(_) => {
            let path = dotted_path(ctx, node)?;
            ctx.table.find_type(ctx.ast, node, &path, None).ok()
        }
        _ => None,
    }
}

/// Declares the block symbol for `block`, creating every sibling block of
/// its scope first so positions line up with `scope_blocks`.
pub fn declare_block(ctx: &mut Context, block: NodeId) -> Option<SymbolId> {
    if let Some(symbol) = ctx.ast.symbol(block) {
        return Some(symbol);
    }

    let scope_node = ctx
        .ast
        .ancestors(block)
        .into_iter()
        .find(|ancestor| {
            let kind = ctx.ast.kind(*ancestor);
            matches!(kind, NodeKind::Block(_)) || kind.is_callable()
        })?;
    let scope = match ctx.ast.symbol(scope_node) {
        Some(scope) => scope,
        None if matches!(ctx.ast.kind(scope_node), NodeKind::Block(_)) => {
            declare_block(ctx, scope_node)?
        }
        None => return None,
    };

    let siblings = ctx.ast.scope_blocks(scope_node);
    let mut existing = ctx.table.children_of_kind(scope, SymbolKind::Block);
    for (index, sibling) in siblings.iter().enumerate() {
        if index >= existing.len() {
            let symbol = ctx
                .table
                .add_symbol("block", Some(scope), Some(*sibling), SymbolData::Block);
            existing.push(symbol);
        }
        ctx.ast.set_symbol(*sibling, Some(existing[index]));
    }

    ctx.ast.symbol(block)
}

/// Declares a local variable in the block enclosing `node`.
pub fn declare_variable(
    ctx: &mut Context,
    node: NodeId,
    ty: Option<SymbolId>,
) -> Option<SymbolId> {
    let NodeKind::VarDecl(decl) = ctx.ast.kind(node) else {
        return None;
    };
    let name = decl.name.clone();
    let mutable = decl.mutable;

    let block_node = ctx
        .ast
        .ancestors(node)
        .into_iter()
        .find(|ancestor| matches!(ctx.ast.kind(*ancestor), NodeKind::Block(_)))?;
    let block = declare_block(ctx, block_node)?;

    if let Some(existing) = ctx.table.child_of_kind(block, &name, SymbolKind::Variable) {
        if ctx.table.get(existing).declaration == Some(node) {
            if let Some(ty) = ty {
                update_variable_type(ctx, existing, ty);
            }
            return Some(existing);
        }
        ctx.fail(ErrorImpl::AlreadyDeclared { name }, node);
        return None;
    }

    if let Ok(Binding::Value(outer)) = resolve_identifier(ctx, node, &name) {
        if matches!(
            ctx.table.kind(outer),
            SymbolKind::Variable | SymbolKind::Parameter
        ) {
            ctx.warning(WarningImpl::ShadowedDeclaration { name: name.clone() }, node);
        }
    }

    let symbol = ctx.table.add_symbol(
        &name,
        Some(block),
        Some(node),
        SymbolData::Variable(ValueSymbol {
            ty: DeclaredType::Unknown,
            type_name: String::new(),
            mutable,
        }),
    );
    if let Some(ty) = ty {
        update_variable_type(ctx, symbol, ty);
    }
    ctx.ast.set_symbol(node, Some(symbol));
    Some(symbol)
}

fn update_variable_type(ctx: &mut Context, variable: SymbolId, ty: SymbolId) {
    let fqn = ctx.fqn(ty);
    let entry = ctx.table.get_mut(variable);
    entry.set_declared_type(DeclaredType::Known(ty));
    entry.set_type_name(&fqn);
}

/// Rewrites a `MemberAccess` whose member is a property into a
/// `PropertyAccess` bound to `property`. Returns the node now in the tree.
pub fn reclassify_member_access(ctx: &mut Context, node: NodeId, property: SymbolId) -> NodeId {
    let NodeKind::MemberAccess(access) = ctx.ast.kind(node) else {
        return node;
    };
    let target = access.target;
    let name = access.member.clone();
    let span = ctx.ast.span(node).clone();

    let replacement = ctx.ast.alloc(
        NodeKind::PropertyAccess(PropertyAccessExpr {
            target,
            property: name,
        }),
        span,
    );

    match ctx.ast.replace(node, replacement) {
        Ok(()) => {
            ctx.ast.set_symbol(replacement, Some(property));
            replacement
        }
        Err(error) => {
            // Leave the tree as it was
            ctx.ast.get_mut(target).parent = Some(node);
            ctx.diagnostics.push_error(error);
            node
        }
    }
}
