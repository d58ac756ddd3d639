//! Builtin `Core` module contents and name maps.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::ast::types::{LiteralKind, TypeKind};

/// Module holding the builtin types, imported by every file.
pub const CORE_MODULE: &str = "Core";

pub const BUILTIN_TYPES: &[(&str, TypeKind)] = &[
    ("Int8", TypeKind::Struct),
    ("Int16", TypeKind::Struct),
    ("Int32", TypeKind::Struct),
    ("Int64", TypeKind::Struct),
    ("UInt8", TypeKind::Struct),
    ("UInt16", TypeKind::Struct),
    ("UInt32", TypeKind::Struct),
    ("UInt64", TypeKind::Struct),
    ("Float32", TypeKind::Struct),
    ("Float64", TypeKind::Struct),
    ("Bool", TypeKind::Struct),
    ("String", TypeKind::Struct),
    ("Char", TypeKind::Struct),
    ("Void", TypeKind::Primitive),
];

pub const VOID: &str = "Void";

pub fn literal_type_name(kind: LiteralKind) -> &'static str {
    match kind {
        LiteralKind::Integer => "Int32",
        LiteralKind::Float => "Float64",
        LiteralKind::String => "String",
        LiteralKind::Boolean => "Bool",
    }
}

const HOST_PAIRS: &[(&str, &str)] = &[
    ("System.SByte", "Int8"),
    ("System.Int16", "Int16"),
    ("System.Int32", "Int32"),
    ("System.Int64", "Int64"),
    ("System.Byte", "UInt8"),
    ("System.UInt16", "UInt16"),
    ("System.UInt32", "UInt32"),
    ("System.UInt64", "UInt64"),
    ("System.Single", "Float32"),
    ("System.Double", "Float64"),
    ("System.Boolean", "Bool"),
    ("System.String", "String"),
    ("System.Char", "Char"),
    ("System.Void", "Void"),
];

lazy_static! {
    pub static ref HOST_TO_BUILTIN: HashMap<&'static str, &'static str> =
        HOST_PAIRS.iter().copied().collect();
    pub static ref BUILTIN_TO_HOST: HashMap<&'static str, &'static str> = HOST_PAIRS
        .iter()
        .map(|(host, builtin)| (*builtin, *host))
        .collect();
}

/// Builtin name for a host runtime type name, e.g. `System.Int32` -> `Int32`.
pub fn builtin_for_host(host: &str) -> Option<&'static str> {
    HOST_TO_BUILTIN.get(host).copied()
}

pub fn host_for_builtin(builtin: &str) -> Option<&'static str> {
    BUILTIN_TO_HOST.get(builtin).copied()
}
