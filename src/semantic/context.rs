use crate::{
    ast::{
        ast::{Ast, NodeId, NodeKind},
        types::{ResolutionStatus, TypeKind},
    },
    errors::errors::{Diagnostics, Error, ErrorImpl, FixIt, Warning, WarningImpl},
    symbols::{
        symbol_table::{LookupError, SymbolTable},
        symbols::{SymbolId, SymbolKind},
    },
};

/// Everything a pass reads and writes, handed to every pass function.
pub struct Context<'a> {
    pub ast: &'a mut Ast,
    pub table: &'a mut SymbolTable,
    pub diagnostics: &'a mut Diagnostics,
}

impl<'a> Context<'a> {
    pub fn new(
        ast: &'a mut Ast,
        table: &'a mut SymbolTable,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Context {
            ast,
            table,
            diagnostics,
        }
    }

    /// Reports `error` at `node`.
    pub fn error(&mut self, error: ErrorImpl, node: NodeId) {
        let span = self.ast.span(node).clone();
        self.diagnostics.push_error(Error::new(error, span));
    }

    pub fn warning(&mut self, warning: WarningImpl, node: NodeId) {
        let span = self.ast.span(node).clone();
        self.diagnostics.push_warning(Warning::new(warning, span));
    }

    /// Reports `error` at `node` and marks the node failed.
    pub fn fail(&mut self, error: ErrorImpl, node: NodeId) {
        self.error(error, node);
        self.ast.set_status(node, ResolutionStatus::Failed);
    }

    pub fn resolved(&mut self, node: NodeId, symbol: Option<SymbolId>, ty: Option<SymbolId>) {
        let entry = self.ast.get_mut(node);
        entry.symbol = symbol;
        entry.result_type = ty;
        entry.status = ResolutionStatus::Resolved;
    }

    pub fn fqn(&self, id: SymbolId) -> String {
        self.table.fqn(id)
    }

    /// Reports a failed type lookup for `name` at `node`.
    pub fn report_lookup(&mut self, error: LookupError, node: NodeId) {
        match error {
            LookupError::NotFound { name } => {
                self.fail(ErrorImpl::UndefinedTopLevel { name }, node)
            }
            LookupError::Ambiguous { name, modules } => self.report_ambiguous(name, modules, node),
        }
    }

    /// `AmbiguousTypes` plus one qualifying fix-it per candidate module.
    pub fn report_ambiguous(&mut self, name: String, modules: Vec<String>, node: NodeId) {
        let span = self.ast.span(node).clone();
        for module in &modules {
            self.diagnostics.push_fixit(FixIt {
                message: format!("use the `{}` declared in `{}`", name, module),
                replacement: format!("{}.{}", module, name),
                span: span.clone(),
            });
        }
        self.fail(ErrorImpl::AmbiguousTypes { name, modules }, node);
    }

    /// Resolves a `TypeRef` node, rewriting its name to the FQN and recording
    /// the kind. Reports and returns `None` on failure.
    pub fn resolve_type_ref(&mut self, type_ref: NodeId, scope: Option<SymbolId>) -> Option<SymbolId> {
        let NodeKind::TypeRef(reference) = self.ast.kind(type_ref) else {
            return None;
        };
        let name = reference.name.clone();

        match self.table.find_type(self.ast, type_ref, &name, scope) {
            Ok(ty) => {
                let fqn = self.table.fqn(ty);
                let kind = match self.table.kind(ty) {
                    SymbolKind::GenericParameter => Some(TypeKind::Generic),
                    _ => self.table.type_kind(ty),
                };

                if let NodeKind::TypeRef(reference) = self.ast.kind_mut(type_ref) {
                    reference.name = fqn;
                    reference.kind = kind;
                }
                self.resolved(type_ref, Some(ty), Some(ty));
                log::trace!("type {} resolved to {}", name, self.table.fqn(ty));
                Some(ty)
            }
            Err(error) => {
                self.report_lookup(error, type_ref);
                None
            }
        }
    }
}
