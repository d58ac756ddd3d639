use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    ast::types::{BinaryOperator, TypeKind, Visibility},
    errors::errors::{Diagnostics, Warning, WarningImpl},
    symbols::{
        builtins::builtin_for_host,
        symbol_table::SymbolTable,
        symbols::{
            DeclaredType, FunctionSymbol, InitSymbol, OperatorSymbol, PropertySymbol, SymbolData,
            SymbolId, SymbolKind, TypeSymbol, ValueSymbol,
        },
    },
    Span,
};

use super::metadata::{
    LibraryMetadata, MethodMetadata, ParameterMetadata, TypeMetadata, TypeMetadataKind,
};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn load_library(path: &Path) -> Result<LibraryMetadata, ImportError> {
    let content = fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads each referenced library and imports it. Never fails: unreadable
/// libraries become `LibraryUnavailable` warnings.
pub fn import_references(
    table: &mut SymbolTable,
    diagnostics: &mut Diagnostics,
    paths: &[PathBuf],
) {
    for path in paths {
        match load_library(path) {
            Ok(library) => {
                let origin = path.display().to_string();
                import_library(table, diagnostics, &library, &origin);
            }
            Err(error) => {
                log::warn!("skipping library: {}", error);
                diagnostics.push_warning(Warning::new(
                    WarningImpl::LibraryUnavailable {
                        library: path.display().to_string(),
                        reason: error.to_string(),
                    },
                    Span::at_file(&path.display().to_string()),
                ));
            }
        }
    }
}

struct Importer<'a> {
    table: &'a mut SymbolTable,
    diagnostics: &'a mut Diagnostics,
    origin: &'a str,
}

/// Imports `library` in two passes: every public type first, then members.
pub fn import_library(
    table: &mut SymbolTable,
    diagnostics: &mut Diagnostics,
    library: &LibraryMetadata,
    origin: &str,
) {
    log::info!("importing library {} from {}", library.name, origin);

    let mut importer = Importer {
        table,
        diagnostics,
        origin,
    };

    let mut imported = vec![];
    for ty in &library.types {
        if !ty.is_public {
            log::debug!("not exporting non-public type {}", ty.full_name());
            continue;
        }
        let namespace = if ty.namespace.is_empty() {
            library.name.as_str()
        } else {
            ty.namespace.as_str()
        };
        if let Some(symbol) = importer.declare_type(namespace, ty) {
            imported.push((ty, symbol));
        }
    }

    for (metadata, symbol) in imported {
        importer.populate_type(metadata, symbol);
    }
}

impl Importer<'_> {
    fn skip(&mut self, item: String, reason: String) {
        log::warn!("skipping {} from {}: {}", item, self.origin, reason);
        self.diagnostics.push_warning(Warning::new(
            WarningImpl::ImportSkipped { item, reason },
            Span::at_file(self.origin),
        ));
    }

    /// Adds the type symbol, or returns `None` when an earlier library
    /// already declared it and its members.
    fn declare_type(&mut self, namespace: &str, metadata: &TypeMetadata) -> Option<SymbolId> {
        let module = self.table.find_or_create_module(namespace, true);

        if let Some(existing) = self
            .table
            .child_of_kind(module, &metadata.name, SymbolKind::Type)
        {
            log::debug!("type {} already imported", self.table.fqn(existing));
            return None;
        }

        let kind = if !metadata.generic_parameters.is_empty() {
            TypeKind::Generic
        } else {
            match metadata.kind {
                TypeMetadataKind::Class => TypeKind::Class,
                TypeMetadataKind::Struct => TypeKind::Struct,
                TypeMetadataKind::Interface => TypeKind::Contract,
                TypeMetadataKind::Enum => TypeKind::Enum,
            }
        };

        let mut data = TypeSymbol::new(kind, Visibility::Public);
        data.is_external = true;
        let ty = self
            .table
            .add_symbol(&metadata.name, Some(module), None, SymbolData::Type(data));

        for parameter in &metadata.generic_parameters {
            self.table
                .add_symbol(parameter, Some(ty), None, SymbolData::GenericParameter);
        }

        log::debug!("imported type {}", self.table.fqn(ty));
        Some(ty)
    }

    /// Host type name to a symbol. Generic parameters in `generics` win.
    fn resolve(&self, type_name: &str, generics: &[SymbolId]) -> Option<SymbolId> {
        if let Some(parameter) = generics
            .iter()
            .copied()
            .find(|parameter| self.table.name(*parameter) == type_name)
        {
            return Some(parameter);
        }

        if let Some(builtin) = builtin_for_host(type_name) {
            return self.table.builtin(builtin);
        }

        self.table.find_by_fqn(type_name).filter(|found| {
            matches!(
                self.table.kind(*found),
                SymbolKind::Type | SymbolKind::GenericParameter
            )
        })
    }

    fn resolve_parameters(
        &self,
        parameters: &[ParameterMetadata],
        generics: &[SymbolId],
    ) -> Result<Vec<(String, SymbolId)>, String> {
        parameters
            .iter()
            .map(|parameter| {
                self.resolve(&parameter.type_name, generics)
                    .map(|ty| (parameter.name.clone(), ty))
                    .ok_or_else(|| format!("unknown parameter type {}", parameter.type_name))
            })
            .collect()
    }

    fn add_parameters(&mut self, owner: SymbolId, parameters: Vec<(String, SymbolId)>) {
        for (name, ty) in parameters {
            let type_name = self.table.fqn(ty);
            self.table.add_symbol(
                &name,
                Some(owner),
                None,
                SymbolData::Parameter(ValueSymbol {
                    ty: DeclaredType::Known(ty),
                    type_name,
                    mutable: false,
                }),
            );
        }
    }

    fn populate_type(&mut self, metadata: &TypeMetadata, ty: SymbolId) {
        let type_generics = self
            .table
            .children_of_kind(ty, SymbolKind::GenericParameter);

        if let Some(base) = &metadata.base_type {
            match self.resolve(base, &type_generics) {
                Some(base) if self.table.type_kind(base) == Some(TypeKind::Class) => {
                    self.table.set_base_type(ty, base)
                }
                _ => log::debug!("base type {} of {} not imported", base, metadata.full_name()),
            }
        }

        for interface in &metadata.interfaces {
            match self.resolve(interface, &type_generics) {
                Some(contract) => self.table.add_contract(ty, contract),
                None => log::debug!(
                    "interface {} of {} not imported",
                    interface,
                    metadata.full_name()
                ),
            }
        }

        for constructor in &metadata.constructors {
            match self.resolve_parameters(&constructor.parameters, &type_generics) {
                Ok(parameters) => {
                    let init = self.table.add_symbol(
                        "init",
                        Some(ty),
                        None,
                        SymbolData::Init(InitSymbol {
                            visibility: Visibility::Public,
                            synthesized: false,
                        }),
                    );
                    self.add_parameters(init, parameters);
                }
                Err(reason) => self.skip(format!("{}.init", metadata.full_name()), reason),
            }
        }

        for method in &metadata.methods {
            self.import_method(metadata, ty, method, &type_generics);
        }

        for field in &metadata.fields {
            self.import_property(metadata, ty, &field.name, &field.type_name, !field.is_read_only, &type_generics);
        }

        for property in &metadata.properties {
            self.import_property(metadata, ty, &property.name, &property.type_name, property.can_write, &type_generics);
        }

        for value in &metadata.enum_values {
            self.table
                .add_symbol(value, Some(ty), None, SymbolData::EnumCase);
        }
    }

    fn import_property(
        &mut self,
        metadata: &TypeMetadata,
        ty: SymbolId,
        name: &str,
        type_name: &str,
        mutable: bool,
        generics: &[SymbolId],
    ) {
        let Some(property_type) = self.resolve(type_name, generics) else {
            self.skip(
                format!("{}.{}", metadata.full_name(), name),
                format!("unknown type {}", type_name),
            );
            return;
        };

        let type_name = self.table.fqn(property_type);
        self.table.add_symbol(
            name,
            Some(ty),
            None,
            SymbolData::Property(PropertySymbol {
                ty: DeclaredType::Known(property_type),
                type_name,
                mutable,
                visibility: Visibility::Public,
                has_initializer: true,
            }),
        );
    }

    fn import_method(
        &mut self,
        metadata: &TypeMetadata,
        ty: SymbolId,
        method: &MethodMetadata,
        type_generics: &[SymbolId],
    ) {
        let item = format!("{}.{}", metadata.full_name(), method.name);

        if method.is_static && method.parameters.len() == 2 {
            if let Some(operator) = BinaryOperator::from_host_method(&method.name) {
                self.import_operator(item, ty, operator, method, type_generics);
                return;
            }
        }

        let unknown = method
            .parameters
            .iter()
            .map(|parameter| parameter.type_name.as_str())
            .chain(std::iter::once(method.return_type.as_str()))
            .find(|name| {
                !method.generic_parameters.iter().any(|generic| generic == name)
                    && self.resolve(name, type_generics).is_none()
            });
        if let Some(unknown) = unknown {
            self.skip(item, format!("unknown type {}", unknown));
            return;
        }

        let function = self.table.add_symbol(
            &method.name,
            Some(ty),
            None,
            SymbolData::Function(FunctionSymbol {
                visibility: Visibility::Public,
                return_type: DeclaredType::Unknown,
                is_static: method.is_static,
                is_external: true,
            }),
        );

        let mut generics: Vec<SymbolId> = method
            .generic_parameters
            .iter()
            .map(|parameter| {
                self.table
                    .add_symbol(parameter, Some(function), None, SymbolData::GenericParameter)
            })
            .collect();
        generics.extend(type_generics.iter().copied());

        // A return type named like one of the method's generics is that generic
        let return_type = self.resolve(&method.return_type, &generics);
        if let Ok(parameters) = self.resolve_parameters(&method.parameters, &generics) {
            self.add_parameters(function, parameters);
        }
        if let Some(return_type) = return_type {
            self.table
                .get_mut(function)
                .set_declared_type(DeclaredType::Known(return_type));
        }
    }

    fn import_operator(
        &mut self,
        item: String,
        ty: SymbolId,
        operator: BinaryOperator,
        method: &MethodMetadata,
        generics: &[SymbolId],
    ) {
        let resolved = self
            .resolve_parameters(&method.parameters, generics)
            .and_then(|parameters| {
                self.resolve(&method.return_type, generics)
                    .map(|return_type| (parameters, return_type))
                    .ok_or_else(|| format!("unknown return type {}", method.return_type))
            });

        match resolved {
            Ok((parameters, return_type)) => {
                let symbol = self.table.add_symbol(
                    operator.symbol(),
                    Some(ty),
                    None,
                    SymbolData::Operator(OperatorSymbol {
                        operator,
                        return_type: DeclaredType::Known(return_type),
                    }),
                );
                self.add_parameters(symbol, parameters);
            }
            Err(reason) => self.skip(item, reason),
        }
    }
}
