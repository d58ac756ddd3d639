use std::{rc::Rc, time::Instant};

use crate::{
    ast::{
        ast::{Ast, NodeId},
        types::ResolutionStatus,
    },
    config::Config,
    errors::errors::Diagnostics,
    importer::importer::import_references,
    lexer::lexer::tokenize,
    parser::parser::parse,
    symbols::symbol_table::SymbolTable,
    type_checker::type_checker::type_check_file,
};

use super::{
    context::Context,
    declarations::{register_members, resolve_member_references},
    implementation::check_implementations,
    scope::link_conformances,
};

type Pass = fn(&mut Context, NodeId);

const PASSES: &[(&str, Pass)] = &[
    ("member registration", register_members),
    ("member references", resolve_member_references),
    ("conformances", link_conformances),
    ("bodies", type_check_file),
    ("implementation", check_implementations),
];

/// Runs every pass over every file, finishing a pass on all files before the
/// next one starts.
pub fn analyze(ast: &mut Ast, files: &[NodeId], table: &mut SymbolTable, diagnostics: &mut Diagnostics) {
    let mut ctx = Context::new(ast, table, diagnostics);

    for (name, pass) in PASSES {
        let start = Instant::now();
        for file in files {
            pass(&mut ctx, *file);
        }
        log::info!(
            "{} pass over {} file(s) took {:?}",
            name,
            files.len(),
            start.elapsed()
        );
    }
}

/// One compilation: every source file shares a single AST arena and symbol
/// table.
#[derive(Debug, Default)]
pub struct Compilation {
    pub ast: Ast,
    pub files: Vec<NodeId>,
    pub table: SymbolTable,
    pub diagnostics: Diagnostics,
    pub config: Config,
}

impl Compilation {
    pub fn new(config: Config) -> Self {
        Compilation {
            config,
            ..Compilation::default()
        }
    }

    /// Lexes and parses `source`. Syntax errors are recorded; a file that
    /// fails to lex is not added.
    pub fn add_source(&mut self, source: &str, file: &str) -> Option<NodeId> {
        let tokens = match tokenize(source.to_string(), Some(file.to_string())) {
            Ok(tokens) => tokens,
            Err(error) => {
                self.diagnostics.push_error(error);
                return None;
            }
        };

        let (root, errors) = parse(&mut self.ast, tokens, Rc::new(file.to_string()));
        for error in errors {
            self.diagnostics.push_error(error);
        }

        self.files.push(root);
        Some(root)
    }

    pub fn import_libraries(&mut self) {
        let libraries = self.config.libraries.clone();
        import_references(&mut self.table, &mut self.diagnostics, &libraries);
    }

    pub fn analyze(&mut self) {
        analyze(
            &mut self.ast,
            &self.files,
            &mut self.table,
            &mut self.diagnostics,
        );
    }

    /// Nodes reachable from a file root that ended up `Failed`.
    pub fn failed_nodes(&self) -> Vec<NodeId> {
        self.files
            .iter()
            .flat_map(|file| self.ast.descendants(*file))
            .filter(|node| self.ast.status(*node) == ResolutionStatus::Failed)
            .collect()
    }

    /// Whether a code generator may consume the analyzed tree.
    pub fn can_generate(&self) -> bool {
        let clean = if self.config.deny_warnings {
            self.diagnostics.is_empty()
        } else {
            !self.diagnostics.has_errors()
        };
        clean && self.failed_nodes().is_empty()
    }
}
