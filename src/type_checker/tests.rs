use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        types::ResolutionStatus,
    },
    config::Config,
    errors::errors::ErrorImpl,
    semantic::semantic::Compilation,
    symbols::symbols::SymbolKind,
};

fn analyze_sources(sources: &[(&str, &str)]) -> Compilation {
    let mut compilation = Compilation::new(Config::default());
    for (file, source) in sources {
        compilation.add_source(source, file).unwrap();
    }
    compilation.analyze();
    compilation
}

fn analyze_source(source: &str) -> Compilation {
    analyze_sources(&[("test.tn", source)])
}

fn error_names(compilation: &Compilation) -> Vec<String> {
    compilation
        .diagnostics
        .errors()
        .iter()
        .map(|error| error.get_error_name().to_string())
        .collect()
}

fn nodes_where(compilation: &Compilation, predicate: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
    compilation
        .files
        .iter()
        .flat_map(|file| compilation.ast.descendants(*file))
        .filter(|node| predicate(compilation.ast.kind(*node)))
        .collect()
}

fn variable_type(compilation: &Compilation, name: &str) -> Option<String> {
    nodes_where(compilation, |kind| matches!(kind, NodeKind::VarDecl(decl) if decl.name == name))
        .first()
        .and_then(|node| compilation.ast.result_type(*node))
        .map(|ty| compilation.table.fqn(ty))
}

#[test]
fn test_literal_types() {
    let compilation =
        analyze_source("fn f() { let a = 1; let b = 1.5; let c = \"text\"; let d = true; }");

    assert!(compilation.diagnostics.is_empty());
    assert_eq!(variable_type(&compilation, "a").as_deref(), Some("Core.Int32"));
    assert_eq!(variable_type(&compilation, "b").as_deref(), Some("Core.Float64"));
    assert_eq!(variable_type(&compilation, "c").as_deref(), Some("Core.String"));
    assert_eq!(variable_type(&compilation, "d").as_deref(), Some("Core.Bool"));
}

#[test]
fn test_same_type_operands_need_no_operator() {
    let compilation = analyze_source("fn f() { let a = 1 + 2 * 3; }");

    assert!(compilation.diagnostics.is_empty());
    assert_eq!(variable_type(&compilation, "a").as_deref(), Some("Core.Int32"));
    for binary in nodes_where(&compilation, |kind| matches!(kind, NodeKind::Binary(_))) {
        assert_eq!(compilation.ast.symbol(binary), None);
        assert_eq!(compilation.ast.status(binary), ResolutionStatus::Resolved);
    }
}

#[test]
fn test_user_operator() {
    let compilation = analyze_source(
        "struct Meters {\n  var value: Float64;\n  operator +(a: Meters, b: Float64) -> Meters { return a; }\n}\nfn f(m: Meters) { let n = m + 1.5; }",
    );

    assert!(compilation.diagnostics.is_empty());
    assert_eq!(variable_type(&compilation, "n").as_deref(), Some("Main.Meters"));

    let binary = nodes_where(&compilation, |kind| matches!(kind, NodeKind::Binary(_)))[0];
    let operator = compilation.ast.symbol(binary).unwrap();
    assert_eq!(compilation.table.kind(operator), SymbolKind::Operator);
}

#[test]
fn test_operator_found_on_both_operands() {
    let compilation = analyze_source(
        "struct A { operator +(l: A, r: B) -> A { return l; } }\nstruct B { operator +(l: A, r: B) -> A { return l; } }\nfn f(a: A, b: B) { let c = a + b; }",
    );

    assert_eq!(error_names(&compilation), vec!["AmbiguousOperatorOverload"]);
}

#[test]
fn test_missing_binary_operator() {
    let untyped = analyze_source("fn f() { let x = 1 + \"s\"; }");
    assert_eq!(error_names(&untyped), vec!["NoBinaryOverload"]);
    assert!(matches!(
        untyped.diagnostics.errors()[0].get_error(),
        ErrorImpl::NoBinaryOverload { expected: None, .. }
    ));

    let typed = analyze_source("fn f() { let x: Int32 = 1 + \"s\"; }");
    assert_eq!(error_names(&typed), vec!["NoBinaryOverload"]);
    assert!(matches!(
        typed.diagnostics.errors()[0].get_error(),
        ErrorImpl::NoBinaryOverload { expected: Some(expected), .. } if expected == "Core.Int32"
    ));
}

#[test]
fn test_assignment_mismatch_replaces_target() {
    let compilation = analyze_source("fn f() { var x = 1; x = \"s\"; }");

    assert_eq!(error_names(&compilation), vec!["TypeMismatch"]);

    let assignment = nodes_where(&compilation, |kind| matches!(kind, NodeKind::Assignment(_)))[0];
    let NodeKind::Assignment(assignment_expr) = compilation.ast.kind(assignment) else {
        unreachable!()
    };
    assert!(compilation.ast.kind(assignment_expr.target).is_error());
    assert_eq!(compilation.ast.parent(assignment_expr.target), Some(assignment));
    assert_eq!(compilation.ast.status(assignment), ResolutionStatus::Failed);
    assert!(!compilation.can_generate());
}

#[test]
fn test_member_access_becomes_property_access() {
    let compilation =
        analyze_source("struct P { var x: Int32; }\nfn f(p: P) -> Int32 { return p.x; }");

    assert!(compilation.diagnostics.is_empty());
    assert!(nodes_where(&compilation, |kind| matches!(kind, NodeKind::MemberAccess(_))).is_empty());

    let access = nodes_where(&compilation, |kind| matches!(kind, NodeKind::PropertyAccess(_)));
    assert_eq!(access.len(), 1);
    let property = compilation.ast.symbol(access[0]).unwrap();
    assert_eq!(compilation.table.fqn(property), "Main.P.x");
    assert_eq!(
        compilation.ast.result_type(access[0]),
        compilation.table.builtin("Int32")
    );
}

#[test]
fn test_overload_selection() {
    let compilation = analyze_source(
        "fn g(a: Int32) -> Int32 { return a; }\nfn g(a: String) -> String { return a; }\nfn f() { let x = g(a: 1); let y = g(a: \"s\"); let z = g(b: 1); }",
    );

    assert_eq!(error_names(&compilation), vec!["NoMatchingOverload"]);
    assert_eq!(variable_type(&compilation, "x").as_deref(), Some("Core.Int32"));
    assert_eq!(variable_type(&compilation, "y").as_deref(), Some("Core.String"));
    assert_eq!(variable_type(&compilation, "z"), None);
    assert!(compilation.diagnostics.errors()[0]
        .get_error()
        .to_string()
        .contains("b: Core.Int32"));
}

#[test]
fn test_arguments_must_be_labelled() {
    let compilation = analyze_source(
        "struct P { var x: Int32; }\nfn g(a: Int32) -> Int32 { return a; }\nfn f() { let y = g(1); let p = P(1); }",
    );

    assert_eq!(
        error_names(&compilation),
        vec!["NoMatchingOverload", "NoMatchingOverload"]
    );
    assert!(compilation.diagnostics.errors()[0]
        .get_error()
        .to_string()
        .contains("(Core.Int32)"));
}

#[test]
fn test_method_calls() {
    let compilation = analyze_source(
        "class Base { fn size() -> Int32 { return 1; } }\nclass C: Base { }\nfn f(c: C) { let n = c.size(); let m = c.missing(); }",
    );

    assert_eq!(error_names(&compilation), vec!["TypeDoesNotContainMethod"]);
    assert_eq!(variable_type(&compilation, "n").as_deref(), Some("Core.Int32"));
}

#[test]
fn test_module_qualified_call() {
    let compilation = analyze_sources(&[
        (
            "util.tn",
            "module Util;\npublic fn twice(a: Int32) -> Int32 { return a + a; }",
        ),
        (
            "app.tn",
            "module App;\nimport Util;\nfn f() { let x = Util.twice(a: 2); }",
        ),
    ]);

    assert!(compilation.diagnostics.is_empty());
    assert_eq!(variable_type(&compilation, "x").as_deref(), Some("Core.Int32"));
}

#[test]
fn test_values_and_types_in_the_wrong_place() {
    let not_callable = analyze_source("fn f() { let x = 1; let y = x(); }");
    assert_eq!(error_names(&not_callable), vec!["NotCallable"]);

    let type_as_value = analyze_source("struct P { }\nfn f() { let x = P; }");
    assert_eq!(error_names(&type_as_value), vec!["ExpectedMember"]);

    let undefined = analyze_source("fn f() { let x = nothing; }");
    assert_eq!(error_names(&undefined), vec!["UndefinedName"]);
}

#[test]
fn test_enum_cases() {
    let compilation = analyze_source(
        "enum Color { case red, blue }\nfn f() { let c = Color.red; let d = Color.green; }",
    );

    assert_eq!(error_names(&compilation), vec!["TypeDoesNotContainProperty"]);
    assert_eq!(variable_type(&compilation, "c").as_deref(), Some("Main.Color"));
}

#[test]
fn test_property_type_inference() {
    let compilation = analyze_source("class Counter { var count = 0; }");

    assert!(compilation.diagnostics.is_empty());
    let count = compilation.table.find_by_fqn("Main.Counter.count").unwrap();
    assert_eq!(
        compilation.table.value_type(count),
        compilation.table.builtin("Int32")
    );
    assert_eq!(
        compilation.table.get(count).type_name().as_deref(),
        Some("Core.Int32")
    );
}

#[test]
fn test_property_initializer_mismatch() {
    let compilation = analyze_source("class Counter { var count: Int32 = \"zero\"; }");
    assert_eq!(error_names(&compilation), vec!["TypeMismatch"]);
}

#[test]
fn test_missing_type_annotation() {
    let property = analyze_source("struct S { var count; }");
    assert_eq!(error_names(&property), vec!["MissingTypeAnnotation"]);

    let local = analyze_source("fn f() { var x; }");
    assert_eq!(error_names(&local), vec!["MissingTypeAnnotation"]);
}

#[test]
fn test_self_outside_type() {
    let compilation = analyze_source("fn f() { let x = self; }");
    assert_eq!(error_names(&compilation), vec!["UndefinedName"]);
}

#[test]
fn test_property_access_is_replaced_in_every_slot() {
    let compilation = analyze_source(
        "class P { var x = 0; }\nfn f(p: P) -> Int32 {\n  p.x = 1;\n  p.x;\n  return p.x + 2;\n}",
    );

    assert!(compilation.diagnostics.is_empty(), "{:?}", error_names(&compilation));
    assert!(nodes_where(&compilation, |kind| matches!(kind, NodeKind::MemberAccess(_))).is_empty());

    let accesses = nodes_where(&compilation, |kind| matches!(kind, NodeKind::PropertyAccess(_)));
    assert_eq!(accesses.len(), 3);

    let mut parents: Vec<&str> = accesses
        .iter()
        .filter_map(|access| compilation.ast.parent(*access))
        .map(|parent| match compilation.ast.kind(parent) {
            NodeKind::Assignment(_) => "assignment",
            NodeKind::Block(_) => "block",
            NodeKind::Binary(_) => "binary",
            _ => "other",
        })
        .collect();
    parents.sort();
    assert_eq!(parents, vec!["assignment", "binary", "block"]);

    for access in accesses {
        assert_eq!(compilation.ast.status(access), ResolutionStatus::Resolved);
        assert_eq!(
            compilation.ast.result_type(access),
            compilation.table.builtin("Int32")
        );
    }
}

#[test]
fn test_inferred_property_used_before_its_declaration() {
    let across_files = analyze_sources(&[
        ("a.tn", "fn f() -> Int32 { let b = B(); return b.y; }"),
        ("b.tn", "class B { var y = 5; }"),
    ]);
    assert!(across_files.diagnostics.is_empty(), "{:?}", error_names(&across_files));
    assert!(across_files.can_generate());

    let same_file = analyze_source(
        "class A { fn g() -> Int32 { return B().y; } }\nclass B { var y = 5; }",
    );
    assert!(same_file.diagnostics.is_empty(), "{:?}", error_names(&same_file));
    assert!(same_file.can_generate());
}

#[test]
fn test_inferred_property_chain() {
    let compilation = analyze_source("class A { var x = B().y; }\nclass B { var y = 1.5; }");

    assert!(compilation.diagnostics.is_empty(), "{:?}", error_names(&compilation));
    let x = compilation.table.find_by_fqn("Main.A.x").unwrap();
    assert_eq!(
        compilation.table.value_type(x),
        compilation.table.builtin("Float64")
    );
}

#[test]
fn test_cyclic_property_inference() {
    let compilation = analyze_source("class A { var x = y; var y = x; }");

    assert_eq!(error_names(&compilation), vec!["CyclicTypeInference"]);
    assert!(!compilation.can_generate());
}

#[test]
fn test_inherited_properties() {
    let compilation = analyze_source(
        "class Base { var id = 1; var tag = 0; }\nclass Derived: Base {\n  var tag = \"d\";\n  fn show() -> Int32 { return self.id; }\n}\nfn f(d: Derived) -> String { return d.tag; }",
    );

    assert!(compilation.diagnostics.is_empty(), "{:?}", error_names(&compilation));
    let accesses = nodes_where(&compilation, |kind| matches!(kind, NodeKind::PropertyAccess(_)));
    let mut properties: Vec<String> = accesses
        .iter()
        .filter_map(|access| compilation.ast.symbol(*access))
        .map(|property| compilation.table.fqn(property))
        .collect();
    properties.sort();
    assert_eq!(properties, vec!["Main.Base.id", "Main.Derived.tag"]);
}
