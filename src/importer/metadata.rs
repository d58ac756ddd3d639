//! Serialized description of a precompiled library.
//!
//! Type names use the host runtime's spelling, e.g. `System.Int32` or
//! `Acme.Geometry.Vector`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryMetadata {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeMetadataKind {
    Class,
    Struct,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeMetadata {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub kind: TypeMetadataKind,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    #[serde(default)]
    pub constructors: Vec<ConstructorMetadata>,
    #[serde(default)]
    pub methods: Vec<MethodMetadata>,
    #[serde(default)]
    pub fields: Vec<FieldMetadata>,
    #[serde(default)]
    pub properties: Vec<PropertyMetadata>,
    #[serde(default)]
    pub enum_values: Vec<String>,
}

impl TypeMetadata {
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterMetadata {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructorMetadata {
    #[serde(default)]
    pub parameters: Vec<ParameterMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodMetadata {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterMetadata>,
    pub return_type: String,
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    #[serde(default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub is_read_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub can_write: bool,
}
