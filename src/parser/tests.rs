//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - File headers and the implicit module
//! - Type declarations and members
//! - Statements and expressions
//! - Recovery from syntax errors

use std::rc::Rc;

use super::parser::parse;
use crate::ast::{
    ast::{Ast, NodeId, NodeKind},
    types::{BinaryOperator, TypeKind, Visibility},
};
use crate::lexer::lexer::tokenize;

fn parse_source(source: &str) -> (Ast, NodeId, usize) {
    let tokens = tokenize(source.to_string(), Some("test.tn".to_string())).unwrap();
    let mut ast = Ast::new();
    let (root, errors) = parse(&mut ast, tokens, Rc::new("test.tn".to_string()));
    (ast, root, errors.len())
}

fn module_members(ast: &Ast, root: NodeId) -> (String, Vec<NodeId>) {
    let NodeKind::File(file) = ast.kind(root) else {
        panic!("root is not a file");
    };
    let NodeKind::Module(module) = ast.kind(file.module) else {
        panic!("file has no module");
    };
    (module.name.clone(), module.members.clone())
}

#[test]
fn test_parse_implicit_module() {
    let (ast, root, errors) = parse_source("fn main() { }");

    assert_eq!(errors, 0);
    let (name, members) = module_members(&ast, root);
    assert_eq!(name, "Main");
    assert_eq!(members.len(), 1);
}

#[test]
fn test_parse_module_and_imports() {
    let (ast, root, errors) = parse_source("module Geometry.Shapes;\nimport Core;\nimport Graphics.Vectors;\n");

    assert_eq!(errors, 0);
    let (name, _) = module_members(&ast, root);
    assert_eq!(name, "Geometry.Shapes");

    let NodeKind::File(file) = ast.kind(root) else {
        panic!("root is not a file");
    };
    let paths: Vec<String> = file
        .imports
        .iter()
        .map(|import| match ast.kind(*import) {
            NodeKind::Import(import) => import.path.clone(),
            other => panic!("expected import, got {:?}", other),
        })
        .collect();
    assert_eq!(paths, vec!["Core", "Graphics.Vectors"]);
}

#[test]
fn test_parse_struct_with_members() {
    let source = "public struct Point: Printable {\n  var x: Int32;\n  let y: Int32 = 0\n  init(x: Int32) { self.x = x; }\n  fn length() -> Float64;\n  operator +(a: Point, b: Point) -> Point { return a; }\n}";
    let (ast, root, errors) = parse_source(source);

    assert_eq!(errors, 0);
    let (_, members) = module_members(&ast, root);
    let NodeKind::TypeDecl(decl) = ast.kind(members[0]) else {
        panic!("expected type declaration");
    };

    assert_eq!(decl.name, "Point");
    assert_eq!(decl.kind, TypeKind::Struct);
    assert_eq!(decl.visibility, Visibility::Public);
    assert_eq!(decl.conformances.len(), 1);
    assert_eq!(decl.members.len(), 5);

    assert!(matches!(ast.kind(decl.members[0]), NodeKind::Property(p) if p.mutable && p.initializer.is_none()));
    assert!(matches!(ast.kind(decl.members[1]), NodeKind::Property(p) if !p.mutable && p.initializer.is_some()));
    assert!(matches!(ast.kind(decl.members[2]), NodeKind::Init(i) if i.parameters.len() == 1));
    assert!(matches!(ast.kind(decl.members[3]), NodeKind::Function(f) if f.body.is_none()));
    assert!(matches!(ast.kind(decl.members[4]), NodeKind::Operator(o) if o.operator == BinaryOperator::Add));
}

#[test]
fn test_parse_enum_cases() {
    let (ast, root, errors) = parse_source("enum Color { case red, green\n case blue; }");

    assert_eq!(errors, 0);
    let (_, members) = module_members(&ast, root);
    let NodeKind::TypeDecl(decl) = ast.kind(members[0]) else {
        panic!("expected type declaration");
    };
    assert_eq!(decl.kind, TypeKind::Enum);
    assert_eq!(decl.members.len(), 3);
}

#[test]
fn test_parse_precedence() {
    let (ast, root, errors) = parse_source("fn f() { a = 1 + 2 * 3; }");

    assert_eq!(errors, 0);
    let (_, members) = module_members(&ast, root);
    let NodeKind::Function(function) = ast.kind(members[0]) else {
        panic!("expected function");
    };
    let body = function.body.unwrap();
    let NodeKind::Block(block) = ast.kind(body) else {
        panic!("expected block");
    };
    let NodeKind::Assignment(assignment) = ast.kind(block.statements[0]) else {
        panic!("expected assignment");
    };
    let NodeKind::Binary(sum) = ast.kind(assignment.value) else {
        panic!("expected binary");
    };
    assert_eq!(sum.operator, BinaryOperator::Add);
    assert!(matches!(ast.kind(sum.right), NodeKind::Binary(product) if product.operator == BinaryOperator::Multiply));
}

#[test]
fn test_parse_labelled_call_and_member_access() {
    let (ast, root, errors) = parse_source("fn f() { let p = Point(x: 1, y: 2); p.x; }");

    assert_eq!(errors, 0);
    let (_, members) = module_members(&ast, root);
    let calls: Vec<NodeId> = ast
        .descendants(members[0])
        .into_iter()
        .filter(|node| matches!(ast.kind(*node), NodeKind::Call(_)))
        .collect();
    assert_eq!(calls.len(), 1);

    let NodeKind::Call(call) = ast.kind(calls[0]) else {
        unreachable!();
    };
    assert_eq!(call.arguments.len(), 2);
    assert!(matches!(ast.kind(call.arguments[0]), NodeKind::Argument(a) if a.label.as_deref() == Some("x")));

    let accesses = ast
        .descendants(members[0])
        .into_iter()
        .filter(|node| matches!(ast.kind(*node), NodeKind::MemberAccess(m) if m.member == "x"))
        .count();
    assert_eq!(accesses, 1);
}

#[test]
fn test_parse_control_flow() {
    let (_, _, errors) = parse_source(
        "fn f(x: Int32) -> Int32 { while x < 10 { x = x + 1; } if x > 5 { return 1; } else if x > 2 { return 2; } else { return 3; } }",
    );

    assert_eq!(errors, 0);
}

#[test]
fn test_recovers_after_bad_statement() {
    let (ast, root, errors) = parse_source("fn f() { let = 5; var ok = 1; }\nfn g() { }");

    assert_eq!(errors, 1);
    let (_, members) = module_members(&ast, root);
    assert_eq!(members.len(), 2);

    let NodeKind::Function(function) = ast.kind(members[0]) else {
        panic!("expected function");
    };
    let NodeKind::Block(block) = ast.kind(function.body.unwrap()) else {
        panic!("expected block");
    };
    assert_eq!(block.statements.len(), 2);
    assert!(ast.kind(block.statements[0]).is_error());
    assert!(matches!(ast.kind(block.statements[1]), NodeKind::VarDecl(v) if v.name == "ok"));
}

#[test]
fn test_recovers_after_bad_declaration() {
    let (ast, root, errors) = parse_source("var stray = 1;\nstruct A { }");

    assert_eq!(errors, 1);
    let (_, members) = module_members(&ast, root);
    assert_eq!(members.len(), 2);
    assert!(ast.kind(members[0]).is_error());
    assert!(matches!(ast.kind(members[1]), NodeKind::TypeDecl(_)));
}
