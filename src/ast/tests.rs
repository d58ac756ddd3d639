//! Unit tests for the AST arena.

use super::{
    ast::{Ast, NodeKind},
    expressions::{AssignmentExpr, IdentifierExpr, LiteralExpr, MemberAccessExpr, PropertyAccessExpr},
    statements::{BlockStmt, IfStmt},
    types::LiteralKind,
};
use crate::Span;

fn ident(ast: &mut Ast, name: &str) -> super::ast::NodeId {
    ast.alloc(
        NodeKind::Identifier(IdentifierExpr {
            name: name.to_string(),
        }),
        Span::null(),
    )
}

#[test]
fn test_alloc_wires_parents() {
    let mut ast = Ast::new();
    let target = ident(&mut ast, "a");
    let value = ast.alloc(
        NodeKind::Literal(LiteralExpr {
            kind: LiteralKind::Integer,
            value: "1".to_string(),
        }),
        Span::null(),
    );
    let assignment = ast.alloc(
        NodeKind::Assignment(AssignmentExpr { target, value }),
        Span::null(),
    );

    assert_eq!(ast.parent(target), Some(assignment));
    assert_eq!(ast.parent(value), Some(assignment));
    assert_eq!(ast.parent(assignment), None);
    assert_eq!(ast.children(assignment), vec![target, value]);
}

#[test]
fn test_replace_swaps_slot() {
    let mut ast = Ast::new();
    let object = ident(&mut ast, "self");
    let access = ast.alloc(
        NodeKind::MemberAccess(MemberAccessExpr {
            target: object,
            member: "x".to_string(),
        }),
        Span::null(),
    );
    let value = ident(&mut ast, "b");
    let assignment = ast.alloc(
        NodeKind::Assignment(AssignmentExpr {
            target: access,
            value,
        }),
        Span::null(),
    );

    let property = ast.alloc(
        NodeKind::PropertyAccess(PropertyAccessExpr {
            target: object,
            property: "x".to_string(),
        }),
        Span::null(),
    );
    ast.replace(access, property).unwrap();

    match ast.kind(assignment) {
        NodeKind::Assignment(assignment) => assert_eq!(assignment.target, property),
        other => panic!("expected assignment, got {:?}", other),
    }
    assert_eq!(ast.parent(property), Some(assignment));
    assert_eq!(ast.parent(access), None);
}

#[test]
fn test_replace_root_is_internal_error() {
    let mut ast = Ast::new();
    let root = ident(&mut ast, "a");
    let other = ident(&mut ast, "b");

    let error = ast.replace(root, other).unwrap_err();
    assert_eq!(error.get_error_name(), "InternalInvariant");
}

#[test]
fn test_scope_blocks_are_positional() {
    let mut ast = Ast::new();
    let inner_then = ast.alloc(NodeKind::Block(BlockStmt { statements: vec![] }), Span::null());
    let inner_else = ast.alloc(NodeKind::Block(BlockStmt { statements: vec![] }), Span::null());
    let condition = ident(&mut ast, "c");
    let if_stmt = ast.alloc(
        NodeKind::If(IfStmt {
            condition,
            then_block: inner_then,
            else_branch: Some(inner_else),
        }),
        Span::null(),
    );
    let nested = ast.alloc(NodeKind::Block(BlockStmt { statements: vec![] }), Span::null());
    let outer = ast.alloc(
        NodeKind::Block(BlockStmt {
            statements: vec![if_stmt, nested],
        }),
        Span::null(),
    );

    assert_eq!(ast.scope_blocks(outer), vec![inner_then, inner_else, nested]);
    assert_eq!(ast.descendants(outer)[0], outer);
}
