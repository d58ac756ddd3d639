//! End-to-end tests for the analysis pipeline.
//!
//! Every test runs the full pipeline: library import, lexing, parsing and
//! all semantic passes over one or more files.

use std::io::Write;

use tempfile::NamedTempFile;
use tern::{
    ast::ast::NodeKind,
    config::Config,
    errors::errors::ErrorImpl,
    semantic::semantic::Compilation,
    symbols::symbols::SymbolKind,
};

fn compile(config: Config, sources: &[(&str, &str)]) -> Compilation {
    let mut compilation = Compilation::new(config);
    compilation.import_libraries();
    for (file, source) in sources {
        compilation
            .add_source(source, file)
            .expect("source should lex");
    }
    compilation.analyze();
    compilation
}

fn error_names(compilation: &Compilation) -> Vec<String> {
    compilation
        .diagnostics
        .errors()
        .iter()
        .map(|error| error.get_error_name().to_string())
        .collect()
}

fn variable_type(compilation: &Compilation, name: &str) -> Option<String> {
    compilation
        .files
        .iter()
        .flat_map(|file| compilation.ast.descendants(*file))
        .find(|node| matches!(compilation.ast.kind(*node), NodeKind::VarDecl(decl) if decl.name == name))
        .and_then(|node| compilation.ast.result_type(node))
        .map(|ty| compilation.table.fqn(ty))
}

#[test]
fn test_struct_declaration_and_construction() {
    let compilation = compile(
        Config::default(),
        &[(
            "geometry.tn",
            "module Geometry;\nstruct Point { var x: Int32; var y: Int32 }\nfn main() { let p = Point(x: 1, y: 2); }",
        )],
    );

    assert!(compilation.diagnostics.is_empty());
    assert!(compilation.can_generate());

    let table = &compilation.table;
    let point = table.find_by_fqn("Geometry.Point").unwrap();
    let properties = table.children_of_kind(point, SymbolKind::Property);
    assert_eq!(properties.len(), 2);
    for property in properties {
        assert_eq!(table.value_type(property), table.builtin("Int32"));
    }
    assert_eq!(variable_type(&compilation, "p").as_deref(), Some("Geometry.Point"));
}

#[test]
fn test_ambiguous_reference_names_both_modules() {
    let compilation = compile(
        Config::default(),
        &[
            ("a.tn", "module Physics;\npublic struct Vector { }"),
            ("b.tn", "module Graphics;\npublic struct Vector { }"),
            (
                "main.tn",
                "module App;\nimport Physics;\nimport Graphics;\nfn f(v: Vector) { }",
            ),
        ],
    );

    assert_eq!(error_names(&compilation), vec!["AmbiguousTypes"]);
    let ErrorImpl::AmbiguousTypes { modules, .. } = compilation.diagnostics.errors()[0].get_error()
    else {
        panic!("expected AmbiguousTypes");
    };
    assert!(modules.contains(&"Physics".to_string()));
    assert!(modules.contains(&"Graphics".to_string()));
    assert_eq!(compilation.diagnostics.fixits().len(), 2);
}

#[test]
fn test_binary_without_overload() {
    let compilation = compile(
        Config::default(),
        &[("main.tn", "fn f() { let x = 1 + \"a\"; }")],
    );

    assert_eq!(error_names(&compilation), vec!["NoBinaryOverload"]);
    let message = compilation.diagnostics.errors()[0].get_error().to_string();
    assert!(message.contains("Int32"));
    assert!(message.contains("String"));
}

#[test]
fn test_base_type_and_contracts() {
    let compilation = compile(
        Config::default(),
        &[(
            "main.tn",
            "class A { }\nclass B: A { }\ncontract IFoo { }\nclass C: IFoo { }",
        )],
    );

    assert!(compilation.diagnostics.is_empty());
    let table = &compilation.table;
    let a = table.find_by_fqn("Main.A");
    let b = table.type_data(table.find_by_fqn("Main.B").unwrap()).unwrap();
    assert_eq!(b.base_type, a);
    assert!(b.contracts.is_empty());

    let c = table.type_data(table.find_by_fqn("Main.C").unwrap()).unwrap();
    assert_eq!(c.base_type, None);
    assert_eq!(c.contracts, vec![table.find_by_fqn("Main.IFoo").unwrap()]);
}

#[test]
fn test_inference_and_missing_annotation() {
    let compilation = compile(
        Config::default(),
        &[("main.tn", "fn f() { var x = 5; var y; }")],
    );

    assert_eq!(variable_type(&compilation, "x").as_deref(), Some("Core.Int32"));
    assert_eq!(error_names(&compilation), vec!["MissingTypeAnnotation"]);
    assert!(!compilation.can_generate());
}

#[test]
fn test_declaration_order_does_not_matter() {
    let compilation = compile(
        Config::default(),
        &[
            (
                "shapes.tn",
                "module Shapes;\nimport Units;\npublic class Circle: Shape {\n  var radius: Length;\n  init(radius: Length) { self.radius = radius; }\n  fn area() -> Float64 { return radius.value * radius.value; }\n}",
            ),
            (
                "base.tn",
                "module Shapes;\npublic contract Shape { fn area() -> Float64; }",
            ),
            (
                "units.tn",
                "module Units;\npublic struct Length { var value: Float64; }",
            ),
        ],
    );

    assert!(
        compilation.diagnostics.is_empty(),
        "{:?}",
        error_names(&compilation)
    );
    assert!(compilation.can_generate());
}

#[test]
fn test_imported_library_types() {
    let mut library = NamedTempFile::new().unwrap();
    write!(
        library,
        r#"{{
  "name": "Acme.Geometry",
  "types": [
    {{
      "name": "Vector",
      "namespace": "Acme.Geometry",
      "kind": "struct",
      "constructors": [
        {{ "parameters": [{{ "name": "x", "type_name": "System.Double" }}, {{ "name": "y", "type_name": "System.Double" }}] }}
      ],
      "methods": [
        {{ "name": "Dot", "parameters": [{{ "name": "other", "type_name": "Acme.Geometry.Vector" }}], "return_type": "System.Double" }}
      ]
    }}
  ]
}}"#
    )
    .unwrap();

    let config = Config {
        libraries: vec![library.path().to_path_buf()],
        ..Config::default()
    };
    let compilation = compile(
        config,
        &[(
            "main.tn",
            "import Acme.Geometry;\nfn f() -> Float64 {\n  let v = Vector(x: 1.0, y: 2.0);\n  return v.Dot(other: v);\n}",
        )],
    );

    assert!(
        compilation.diagnostics.is_empty(),
        "{:?}",
        error_names(&compilation)
    );
    assert_eq!(variable_type(&compilation, "v").as_deref(), Some("Acme.Geometry.Vector"));

    let vector = compilation.table.find_by_fqn("Acme.Geometry.Vector").unwrap();
    assert!(compilation.table.type_data(vector).unwrap().is_external);
}

#[test]
fn test_unreadable_library_is_a_warning() {
    let config = Config {
        libraries: vec!["/definitely/not/a/library.json".into()],
        deny_warnings: false,
        ..Config::default()
    };
    let compilation = compile(config, &[("main.tn", "fn f() { }")]);

    assert!(!compilation.diagnostics.has_errors());
    assert_eq!(compilation.diagnostics.warnings().len(), 1);
    assert_eq!(
        compilation.diagnostics.warnings()[0].get_warning_name(),
        "LibraryUnavailable"
    );
    assert!(compilation.can_generate());
}

#[test]
fn test_type_identity_is_by_fqn() {
    let compilation = compile(
        Config::default(),
        &[
            ("a.tn", "module Left;\npublic struct Item { }"),
            ("b.tn", "module Right;\npublic struct Item { }"),
            (
                "main.tn",
                "module App;\nimport Left;\nfn f(item: Left.Item) -> Right.Item { return item; }",
            ),
        ],
    );

    assert_eq!(error_names(&compilation), vec!["TypeMismatch"]);
    let message = compilation.diagnostics.errors()[0].get_error().to_string();
    assert!(message.contains("Right.Item"));
    assert!(message.contains("Left.Item"));
}
