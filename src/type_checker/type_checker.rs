use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        expressions::ErrorNode,
        types::{ResolutionStatus, TypeKind},
    },
    errors::errors::ErrorImpl,
    semantic::{
        context::Context,
        declarations::file_members,
        scope::{
            declare_block, declare_variable, dotted_path, find_methods, find_property,
            reclassify_member_access, resolve_identifier, resolve_self, resolve_type_expr, Binding,
        },
    },
    symbols::{
        symbol_table::{CallArgument, LookupError},
        symbols::{DeclaredType, SymbolId, SymbolKind},
    },
};

/// What a call expression is calling, once the callee is resolved.
enum Callee {
    Functions(String, Vec<SymbolId>),
    Construct(SymbolId),
}

/// Type checks property initializers and callable bodies of one file.
pub fn type_check_file(ctx: &mut Context, file: NodeId) {
    let Some((_, name, members)) = file_members(ctx, file) else {
        return;
    };
    log::debug!("type checking module {}", name);

    for member in members {
        match ctx.ast.kind(member) {
            NodeKind::TypeDecl(_) => type_check_type(ctx, member),
            NodeKind::Function(_) => type_check_callable(ctx, member),
            _ => {}
        }
    }
}

fn type_check_type(ctx: &mut Context, node: NodeId) {
    let NodeKind::TypeDecl(decl) = ctx.ast.kind(node).clone() else {
        return;
    };
    if ctx.ast.symbol(node).is_none() {
        return;
    }

    for member in &decl.members {
        if matches!(ctx.ast.kind(*member), NodeKind::Property(_)) {
            type_check_property(ctx, *member);
        }
    }

    for member in &decl.members {
        if ctx.ast.kind(*member).is_callable() {
            type_check_callable(ctx, *member);
        }
    }
}

/// Checks a property initializer against the written type, or infers the
/// property's type from it when none is written.
///
/// Runs at most once per property: either from its type's turn in the body
/// pass or earlier, from the first use of an unannotated property.
pub fn type_check_property(ctx: &mut Context, node: NodeId) {
    let NodeKind::Property(property) = ctx.ast.kind(node).clone() else {
        return;
    };
    let Some(symbol) = ctx.ast.symbol(node) else {
        return;
    };
    let Some(initializer) = property.initializer else {
        return;
    };
    if ctx.ast.status(initializer) != ResolutionStatus::Unresolved {
        return;
    }
    if property.ty.is_none() {
        ctx.ast.set_status(node, ResolutionStatus::Resolving);
    }

    let declared = ctx.table.value_type(symbol);
    let value = type_check_expr(ctx, initializer, declared);

    match (declared, value) {
        (Some(declared), Some(value)) if !ctx.table.same_type(declared, value) => {
            let expected = ctx.fqn(declared);
            let received = ctx.fqn(value);
            ctx.error(ErrorImpl::TypeMismatch { expected, received }, initializer);
            ctx.ast.set_status(node, ResolutionStatus::Failed);
        }
        (None, Some(value)) if property.ty.is_none() => {
            let fqn = ctx.fqn(value);
            let entry = ctx.table.get_mut(symbol);
            entry.set_declared_type(DeclaredType::Known(value));
            entry.set_type_name(&fqn);
            ctx.resolved(node, Some(symbol), Some(value));
            log::trace!("inferred {} for property {}", fqn, property.name);
        }
        (None, None) if property.ty.is_none() => ctx.ast.set_status(node, ResolutionStatus::Failed),
        _ => {}
    }
}

pub fn type_check_callable(ctx: &mut Context, node: NodeId) {
    if ctx.ast.symbol(node).is_none() {
        return;
    }

    let body = match ctx.ast.kind(node) {
        NodeKind::Function(function) => function.body,
        NodeKind::Init(init) => init.body,
        NodeKind::Operator(operator) => operator.body,
        _ => None,
    };

    if let Some(body) = body {
        type_check_block(ctx, body);
    }
}

pub fn type_check_block(ctx: &mut Context, block: NodeId) {
    let NodeKind::Block(stmt) = ctx.ast.kind(block) else {
        return;
    };
    let statements = stmt.statements.clone();

    match declare_block(ctx, block) {
        Some(symbol) => ctx.resolved(block, Some(symbol), None),
        None => ctx.ast.set_status(block, ResolutionStatus::Failed),
    }

    for statement in statements {
        type_check_stmt(ctx, statement);
    }
}

pub fn type_check_stmt(ctx: &mut Context, stmt: NodeId) {
    match ctx.ast.kind(stmt).clone() {
        NodeKind::Block(_) => type_check_block(ctx, stmt),
        NodeKind::VarDecl(decl) => {
            let scope = ctx
                .ast
                .enclosing_callable(stmt)
                .and_then(|callable| ctx.ast.symbol(callable));

            let mut failed = false;
            let annotation = match decl.ty {
                Some(type_ref) => {
                    let resolved = ctx.resolve_type_ref(type_ref, scope);
                    failed |= resolved.is_none();
                    resolved
                }
                None => None,
            };

            let value = decl
                .initializer
                .and_then(|initializer| type_check_expr(ctx, initializer, annotation));

            if let (Some(annotation), Some(value), Some(initializer)) =
                (annotation, value, decl.initializer)
            {
                if !ctx.table.same_type(annotation, value) {
                    let expected = ctx.fqn(annotation);
                    let received = ctx.fqn(value);
                    ctx.error(ErrorImpl::TypeMismatch { expected, received }, initializer);
                    failed = true;
                }
            }

            if decl.ty.is_none() && decl.initializer.is_none() {
                ctx.error(ErrorImpl::MissingTypeAnnotation { name: decl.name.clone() }, stmt);
                failed = true;
            }

            let ty = annotation.or(value);
            let symbol = declare_variable(ctx, stmt, ty);
            match (symbol, ty) {
                (Some(symbol), Some(ty)) if !failed => ctx.resolved(stmt, Some(symbol), Some(ty)),
                _ => ctx.ast.set_status(stmt, ResolutionStatus::Failed),
            }
        }
        NodeKind::Return(ret) => {
            let expected = ctx
                .ast
                .enclosing_callable(stmt)
                .and_then(|callable| ctx.ast.symbol(callable))
                .and_then(|callable| ctx.table.value_type(callable));

            let value = ret.value.map(|value| type_check_expr(ctx, value, expected));
            match value {
                Some(None) => ctx.ast.set_status(stmt, ResolutionStatus::Failed),
                _ => ctx.resolved(stmt, None, None),
            }
        }
        NodeKind::If(stmt_if) => {
            let condition = ctx.table.builtin("Bool");
            type_check_expr(ctx, stmt_if.condition, condition);
            type_check_block(ctx, stmt_if.then_block);
            if let Some(else_branch) = stmt_if.else_branch {
                type_check_stmt(ctx, else_branch);
            }
            ctx.resolved(stmt, None, None);
        }
        NodeKind::While(stmt_while) => {
            let condition = ctx.table.builtin("Bool");
            type_check_expr(ctx, stmt_while.condition, condition);
            type_check_block(ctx, stmt_while.body);
            ctx.resolved(stmt, None, None);
        }
        NodeKind::Error(_) => {}
        _ => {
            type_check_expr(ctx, stmt, None);
        }
    }
}

fn finish(ctx: &mut Context, node: NodeId, ty: Option<SymbolId>) -> Option<SymbolId> {
    ctx.ast.set_result_type(node, ty);
    let status = match ty {
        Some(_) if ctx.ast.status(node) != ResolutionStatus::Failed => ResolutionStatus::Resolved,
        _ => ResolutionStatus::Failed,
    };
    ctx.ast.set_status(node, status);
    ty
}

/// Type of the value `symbol` names, as used at `node`. An unannotated
/// property not yet inferred is inferred here, so uses may precede the
/// declaration in any file.
fn value_of(ctx: &mut Context, symbol: SymbolId, node: NodeId) -> Option<SymbolId> {
    if ctx.table.kind(symbol) == SymbolKind::EnumCase {
        return ctx.table.parent(symbol);
    }
    if let Some(ty) = ctx.table.value_type(symbol) {
        return Some(ty);
    }

    let name = ctx.table.name(symbol).to_string();
    let Some(declaration) = ctx.table.get(symbol).declaration else {
        ctx.fail(ErrorImpl::UnknownValueType { name }, node);
        return None;
    };

    match ctx.ast.status(declaration) {
        ResolutionStatus::Unresolved if ctx.table.kind(symbol) == SymbolKind::Property => {
            log::trace!("inferring property {} on first use", name);
            type_check_property(ctx, declaration);
            let ty = ctx.table.value_type(symbol);
            if ty.is_none() && ctx.ast.status(declaration) != ResolutionStatus::Failed {
                ctx.fail(ErrorImpl::UnknownValueType { name }, node);
            }
            ty
        }
        ResolutionStatus::Resolving => {
            ctx.fail(ErrorImpl::CyclicTypeInference { name }, node);
            None
        }
        // Already reported where it was declared
        ResolutionStatus::Failed => None,
        _ => {
            ctx.fail(ErrorImpl::UnknownValueType { name }, node);
            None
        }
    }
}

/// Resolves `node` and returns the type it evaluates to. `expected` is the
/// type the context wants, used to sharpen diagnostics.
///
/// Returns `None` when the expression failed; the failure has been reported
/// either here or at the sub-expression that caused it.
pub fn type_check_expr(ctx: &mut Context, node: NodeId, expected: Option<SymbolId>) -> Option<SymbolId> {
    ctx.ast.set_status(node, ResolutionStatus::Resolving);

    let ty = match ctx.ast.kind(node).clone() {
        NodeKind::Literal(literal) => ctx.table.literal_type(literal.kind),
        NodeKind::Identifier(identifier) => type_check_identifier(ctx, node, &identifier.name),
        NodeKind::SelfRef => match resolve_self(ctx, node) {
            Some(ty) => {
                ctx.ast.set_symbol(node, Some(ty));
                Some(ty)
            }
            None => {
                ctx.error(ErrorImpl::UndefinedName { name: "self".to_string() }, node);
                None
            }
        },
        NodeKind::MemberAccess(access) => {
            return type_check_member_access(ctx, node, access.target, &access.member)
        }
        NodeKind::PropertyAccess(access) => {
            let target = type_check_expr(ctx, access.target, None);
            match target.and_then(|target| find_property(ctx, target, &access.property)) {
                Some(property) => {
                    ctx.ast.set_symbol(node, Some(property));
                    value_of(ctx, property, node)
                }
                None => None,
            }
        }
        NodeKind::Call(_) => type_check_call(ctx, node),
        NodeKind::Argument(argument) => type_check_expr(ctx, argument.value, expected),
        NodeKind::Binary(_) => type_check_binary(ctx, node, expected),
        NodeKind::Unary(unary) => type_check_expr(ctx, unary.operand, expected),
        NodeKind::Assignment(_) => type_check_assignment(ctx, node),
        _ => None,
    };

    finish(ctx, node, ty)
}

fn type_check_identifier(ctx: &mut Context, node: NodeId, name: &str) -> Option<SymbolId> {
    match resolve_identifier(ctx, node, name) {
        Ok(Binding::Value(symbol)) => {
            ctx.ast.set_symbol(node, Some(symbol));
            value_of(ctx, symbol, node)
        }
        Ok(Binding::Type(_)) | Ok(Binding::Functions(_)) => {
            ctx.error(ErrorImpl::ExpectedMember { name: name.to_string() }, node);
            None
        }
        Err(error) => {
            report_name_lookup(ctx, error, node);
            None
        }
    }
}

fn report_name_lookup(ctx: &mut Context, error: LookupError, node: NodeId) {
    match error {
        LookupError::NotFound { name } => ctx.fail(ErrorImpl::UndefinedName { name }, node),
        LookupError::Ambiguous { name, modules } => ctx.report_ambiguous(name, modules, node),
    }
}

fn type_check_member_access(
    ctx: &mut Context,
    node: NodeId,
    target: NodeId,
    member: &str,
) -> Option<SymbolId> {
    if let Some(ty) = resolve_type_expr(ctx, target) {
        ctx.resolved(target, Some(ty), None);

        let Some(case) = ctx.table.child_of_kind(ty, member, SymbolKind::EnumCase) else {
            let type_name = ctx.fqn(ty);
            ctx.fail(
                ErrorImpl::TypeDoesNotContainProperty {
                    type_name,
                    property: member.to_string(),
                },
                node,
            );
            return None;
        };
        ctx.resolved(node, Some(case), Some(ty));
        return Some(ty);
    }

    let Some(target_ty) = type_check_expr(ctx, target, None) else {
        ctx.ast.set_status(node, ResolutionStatus::Failed);
        return None;
    };

    let Some(property) = find_property(ctx, target_ty, member) else {
        let type_name = ctx.fqn(target_ty);
        ctx.fail(
            ErrorImpl::TypeDoesNotContainProperty {
                type_name,
                property: member.to_string(),
            },
            node,
        );
        return None;
    };

    let ty = value_of(ctx, property, node);
    let replacement = reclassify_member_access(ctx, node, property);
    match ty {
        Some(ty) => ctx.resolved(replacement, Some(property), Some(ty)),
        None => ctx.ast.set_status(replacement, ResolutionStatus::Failed),
    }
    ty
}

fn describe_arguments(ctx: &Context, arguments: &[CallArgument]) -> String {
    arguments
        .iter()
        .map(|argument| {
            let ty = argument
                .ty
                .map(|ty| ctx.fqn(ty))
                .unwrap_or_else(|| "?".to_string());
            match &argument.label {
                Some(label) => format!("{}: {}", label, ty),
                None => ty,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn choose_overload(
    ctx: &mut Context,
    node: NodeId,
    name: &str,
    candidates: &[SymbolId],
    arguments: &[CallArgument],
) -> Option<SymbolId> {
    let chosen = candidates
        .iter()
        .copied()
        .find(|candidate| ctx.table.args_match_parameters(arguments, *candidate));

    if chosen.is_none() {
        let arguments = describe_arguments(ctx, arguments);
        ctx.error(
            ErrorImpl::NoMatchingOverload {
                name: name.to_string(),
                arguments,
            },
            node,
        );
    }
    chosen
}

fn resolve_callee(ctx: &mut Context, callee: NodeId) -> Option<Callee> {
    match ctx.ast.kind(callee).clone() {
        NodeKind::Identifier(identifier) => {
            let name = identifier.name;
            match resolve_identifier(ctx, callee, &name) {
                Ok(Binding::Functions(functions)) => Some(Callee::Functions(name, functions)),
                Ok(Binding::Type(ty)) => Some(Callee::Construct(ty)),
                Ok(Binding::Value(_)) => {
                    ctx.fail(ErrorImpl::NotCallable { name }, callee);
                    None
                }
                Err(error) => {
                    report_name_lookup(ctx, error, callee);
                    None
                }
            }
        }
        NodeKind::MemberAccess(access) => {
            if let Some(ty) = resolve_type_expr(ctx, callee) {
                return Some(Callee::Construct(ty));
            }

            let owner = match resolve_type_expr(ctx, access.target) {
                Some(ty) => {
                    ctx.resolved(access.target, Some(ty), None);
                    ty
                }
                None => {
                    let module = dotted_path(ctx, access.target)
                        .and_then(|path| ctx.table.module_by_path(&path));
                    if let Some(module) = module {
                        let functions = ctx.table.module_functions(&[module], &access.member);
                        if !functions.is_empty() {
                            ctx.resolved(access.target, Some(module), None);
                            return Some(Callee::Functions(access.member, functions));
                        }
                    }
                    type_check_expr(ctx, access.target, None)?
                }
            };

            let methods = find_methods(ctx, owner, &access.member);
            if methods.is_empty() {
                let type_name = ctx.fqn(owner);
                ctx.fail(
                    ErrorImpl::TypeDoesNotContainMethod {
                        type_name,
                        method: access.member,
                    },
                    callee,
                );
                return None;
            }
            Some(Callee::Functions(access.member, methods))
        }
        _ => {
            type_check_expr(ctx, callee, None);
            ctx.fail(
                ErrorImpl::NotCallable {
                    name: "expression".to_string(),
                },
                callee,
            );
            None
        }
    }
}

fn type_check_call(ctx: &mut Context, node: NodeId) -> Option<SymbolId> {
    let NodeKind::Call(call) = ctx.ast.kind(node).clone() else {
        return None;
    };

    let mut arguments = vec![];
    for argument in &call.arguments {
        let (label, value) = match ctx.ast.kind(*argument) {
            NodeKind::Argument(argument) => (argument.label.clone(), argument.value),
            _ => (None, *argument),
        };
        let ty = type_check_expr(ctx, value, None);
        finish(ctx, *argument, ty);
        arguments.push(CallArgument { label, ty });
    }

    let callee = resolve_callee(ctx, call.callee)?;
    if arguments.iter().any(|argument| argument.ty.is_none()) {
        return None;
    }

    match callee {
        Callee::Functions(name, functions) => {
            let chosen = choose_overload(ctx, node, &name, &functions, &arguments)?;
            ctx.resolved(call.callee, Some(chosen), None);
            ctx.ast.set_symbol(node, Some(chosen));
            ctx.table.value_type(chosen)
        }
        Callee::Construct(ty) => {
            ctx.resolved(call.callee, Some(ty), None);
            construct(ctx, node, ty, &arguments)
        }
    }
}

fn construct(
    ctx: &mut Context,
    node: NodeId,
    ty: SymbolId,
    arguments: &[CallArgument],
) -> Option<SymbolId> {
    let name = ctx.fqn(ty);

    if ctx.table.kind(ty) != SymbolKind::Type
        || matches!(
            ctx.table.type_kind(ty),
            Some(TypeKind::Contract) | Some(TypeKind::Enum)
        )
    {
        ctx.error(ErrorImpl::NotCallable { name }, node);
        return None;
    }

    let inits = ctx.table.children_of_kind(ty, SymbolKind::Init);
    if inits.is_empty() {
        if arguments.is_empty() {
            return Some(ty);
        }
        let arguments = describe_arguments(ctx, arguments);
        ctx.error(ErrorImpl::NoMatchingOverload { name, arguments }, node);
        return None;
    }

    let init = choose_overload(ctx, node, &name, &inits, arguments)?;
    ctx.ast.set_symbol(node, Some(init));
    Some(ty)
}

/// Same-typed operands need no operator. Otherwise the operator is searched
/// on both operand types, and finding it on both sides is ambiguous.
fn type_check_binary(ctx: &mut Context, node: NodeId, expected: Option<SymbolId>) -> Option<SymbolId> {
    let NodeKind::Binary(binary) = ctx.ast.kind(node).clone() else {
        return None;
    };

    let left = type_check_expr(ctx, binary.left, None);
    let right = type_check_expr(ctx, binary.right, None);
    let (Some(left), Some(right)) = (left, right) else {
        return None;
    };

    if ctx.table.same_type(left, right) {
        return Some(left);
    }

    let from_left = ctx.table.find_operators(left, binary.operator, left, right);
    let from_right = ctx.table.find_operators(right, binary.operator, left, right);

    let operator = binary.operator.symbol().to_string();
    let left_name = ctx.fqn(left);
    let right_name = ctx.fqn(right);

    let candidates: Vec<SymbolId> = from_left.iter().chain(from_right.iter()).copied().collect();
    match candidates.as_slice() {
        [] => {
            let expected = expected.map(|expected| ctx.fqn(expected));
            ctx.error(
                ErrorImpl::NoBinaryOverload {
                    operator,
                    left: left_name,
                    right: right_name,
                    expected,
                },
                node,
            );
            None
        }
        [operator_symbol] => {
            ctx.ast.set_symbol(node, Some(*operator_symbol));
            ctx.table.value_type(*operator_symbol)
        }
        _ => {
            ctx.error(
                ErrorImpl::AmbiguousOperatorOverload {
                    operator,
                    left: left_name,
                    right: right_name,
                },
                node,
            );
            None
        }
    }
}

/// A mismatched assignment swaps its target for an `Error` node.
fn type_check_assignment(ctx: &mut Context, node: NodeId) -> Option<SymbolId> {
    let NodeKind::Assignment(assignment) = ctx.ast.kind(node).clone() else {
        return None;
    };

    let target_ty = type_check_expr(ctx, assignment.target, None);
    let value_ty = type_check_expr(ctx, assignment.value, target_ty);
    let (Some(target_ty), Some(value_ty)) = (target_ty, value_ty) else {
        return None;
    };

    if ctx.table.same_type(target_ty, value_ty) {
        return Some(target_ty);
    }

    let expected = ctx.fqn(target_ty);
    let received = ctx.fqn(value_ty);

    // The target slot may hold a reclassified node by now
    let target = match ctx.ast.kind(node) {
        NodeKind::Assignment(assignment) => assignment.target,
        _ => assignment.target,
    };
    let span = ctx.ast.span(target).clone();
    let error_node = ctx.ast.alloc(
        NodeKind::Error(ErrorNode {
            message: format!("cannot assign {} to {}", received, expected),
        }),
        span,
    );
    ctx.ast.set_status(error_node, ResolutionStatus::Failed);
    if let Err(error) = ctx.ast.replace(target, error_node) {
        ctx.diagnostics.push_error(error);
    }

    ctx.fail(ErrorImpl::TypeMismatch { expected, received }, node);
    None
}
