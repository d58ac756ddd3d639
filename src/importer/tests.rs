//! Unit tests for the external symbol importer.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use super::importer::import_references;
use crate::ast::types::{BinaryOperator, TypeKind};
use crate::errors::errors::Diagnostics;
use crate::symbols::{symbol_table::SymbolTable, symbols::SymbolKind};

const LIBRARY: &str = r#"{
  "name": "Acme.Geometry",
  "types": [
    {
      "name": "Shape",
      "namespace": "Acme.Geometry",
      "kind": "class",
      "fields": [{ "name": "id", "type_name": "System.Int64", "is_read_only": true }]
    },
    {
      "name": "Vector",
      "namespace": "Acme.Geometry",
      "kind": "struct",
      "interfaces": ["Acme.Geometry.IScalable"],
      "constructors": [
        { "parameters": [{ "name": "x", "type_name": "System.Double" }, { "name": "y", "type_name": "System.Double" }] }
      ],
      "methods": [
        {
          "name": "op_Addition",
          "is_static": true,
          "parameters": [{ "name": "a", "type_name": "Acme.Geometry.Vector" }, { "name": "b", "type_name": "Acme.Geometry.Vector" }],
          "return_type": "Acme.Geometry.Vector"
        },
        {
          "name": "Identity",
          "generic_parameters": ["T"],
          "parameters": [{ "name": "value", "type_name": "T" }],
          "return_type": "T"
        },
        {
          "name": "Broken",
          "parameters": [{ "name": "value", "type_name": "Acme.Missing" }],
          "return_type": "System.Void"
        }
      ],
      "properties": [{ "name": "Length", "type_name": "System.Double", "can_write": false }]
    },
    {
      "name": "Square",
      "namespace": "Acme.Geometry",
      "kind": "class",
      "base_type": "Acme.Geometry.Shape"
    },
    {
      "name": "IScalable",
      "namespace": "Acme.Geometry",
      "kind": "interface"
    },
    {
      "name": "List",
      "namespace": "Acme.Collections",
      "kind": "class",
      "generic_parameters": ["T"]
    },
    {
      "name": "Hidden",
      "namespace": "Acme.Geometry",
      "kind": "class",
      "is_public": false
    }
  ]
}"#;

fn import(json: &str) -> (SymbolTable, Diagnostics) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let mut table = SymbolTable::new();
    let mut diagnostics = Diagnostics::new();
    import_references(&mut table, &mut diagnostics, &[file.path().to_path_buf()]);
    (table, diagnostics)
}

#[test]
fn test_types_land_in_namespace_modules() {
    let (table, _) = import(LIBRARY);

    let vector = table.find_by_fqn("Acme.Geometry.Vector").unwrap();
    assert_eq!(table.kind(vector), SymbolKind::Type);
    assert_eq!(table.type_kind(vector), Some(TypeKind::Struct));
    assert!(table.module_by_path("Acme.Geometry").is_some());
    assert!(table.module_by_path("Acme.Collections").is_some());
    assert!(table.find_by_fqn("Acme.Geometry.Hidden").is_none());
}

#[test]
fn test_host_names_map_to_builtins() {
    let (table, _) = import(LIBRARY);

    let vector = table.find_by_fqn("Acme.Geometry.Vector").unwrap();
    let length = table
        .child_of_kind(vector, "Length", SymbolKind::Property)
        .unwrap();
    assert_eq!(table.value_type(length), table.builtin("Float64"));
    assert!(!table.get(length).is_mutable());

    let init = table.children_of_kind(vector, SymbolKind::Init)[0];
    assert_eq!(table.signature(init), vec!["Core.Float64", "Core.Float64"]);
}

#[test]
fn test_operator_methods_become_operators() {
    let (table, _) = import(LIBRARY);

    let vector = table.find_by_fqn("Acme.Geometry.Vector").unwrap();
    let operators = table.find_operators(vector, BinaryOperator::Add, vector, vector);
    assert_eq!(operators.len(), 1);
    assert_eq!(table.value_type(operators[0]), Some(vector));
}

#[test]
fn test_generic_return_resolves_to_method_parameter() {
    let (table, _) = import(LIBRARY);

    let vector = table.find_by_fqn("Acme.Geometry.Vector").unwrap();
    let identity = table
        .child_of_kind(vector, "Identity", SymbolKind::Function)
        .unwrap();
    let generic = table
        .child_of_kind(identity, "T", SymbolKind::GenericParameter)
        .unwrap();
    assert_eq!(table.value_type(identity), Some(generic));

    let list = table.find_by_fqn("Acme.Collections.List").unwrap();
    assert_eq!(table.type_kind(list), Some(TypeKind::Generic));
}

#[test]
fn test_inheritance_and_interfaces() {
    let (table, _) = import(LIBRARY);

    let square = table.find_by_fqn("Acme.Geometry.Square").unwrap();
    let shape = table.find_by_fqn("Acme.Geometry.Shape").unwrap();
    assert_eq!(table.type_data(square).unwrap().base_type, Some(shape));

    let vector = table.find_by_fqn("Acme.Geometry.Vector").unwrap();
    let scalable = table.find_by_fqn("Acme.Geometry.IScalable").unwrap();
    assert_eq!(table.type_data(vector).unwrap().contracts, vec![scalable]);
    assert_eq!(table.type_kind(scalable), Some(TypeKind::Contract));
}

#[test]
fn test_unresolvable_member_is_skipped_with_warning() {
    let (table, diagnostics) = import(LIBRARY);

    let vector = table.find_by_fqn("Acme.Geometry.Vector").unwrap();
    assert!(table
        .child_of_kind(vector, "Broken", SymbolKind::Function)
        .is_none());

    let skipped: Vec<_> = diagnostics
        .warnings()
        .iter()
        .filter(|warning| warning.get_warning_name() == "ImportSkipped")
        .collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].get_message().contains("Acme.Geometry.Vector.Broken"));
}

#[test]
fn test_missing_library_is_a_warning() {
    let mut table = SymbolTable::new();
    let mut diagnostics = Diagnostics::new();
    let before = table.len();

    import_references(
        &mut table,
        &mut diagnostics,
        &[PathBuf::from("/definitely/not/here.json")],
    );

    assert_eq!(table.len(), before);
    assert!(!diagnostics.has_errors());
    assert_eq!(diagnostics.warnings().len(), 1);
    assert_eq!(diagnostics.warnings()[0].get_warning_name(), "LibraryUnavailable");
}

#[test]
fn test_malformed_library_is_a_warning() {
    let (_, diagnostics) = import("{ not json");

    assert_eq!(diagnostics.warnings().len(), 1);
    assert_eq!(diagnostics.warnings()[0].get_warning_name(), "LibraryUnavailable");
}

#[test]
fn test_library_imported_twice_adds_members_once() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(LIBRARY.as_bytes()).unwrap();
    let path = file.path().to_path_buf();

    let mut table = SymbolTable::new();
    let mut diagnostics = Diagnostics::new();
    import_references(&mut table, &mut diagnostics, &[path.clone()]);
    let symbols = table.len();
    import_references(&mut table, &mut diagnostics, &[path]);

    assert_eq!(table.len(), symbols);
    let vector = table.find_by_fqn("Acme.Geometry.Vector").unwrap();
    assert_eq!(table.children_of_kind(vector, SymbolKind::Init).len(), 1);
    assert_eq!(
        table
            .find_operators(vector, BinaryOperator::Add, vector, vector)
            .len(),
        1
    );
}
