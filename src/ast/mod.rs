//! Arena-backed abstract syntax tree.
//!
//! - ast: `NodeId`, `Node`, `NodeKind` and the `Ast` arena
//! - declarations: files, modules, types, members and type references
//! - statements: blocks and control flow
//! - expressions: literals, access, calls and operators
//! - types: shared enums such as `TypeKind` and `ResolutionStatus`
//!
//! Parents are stored as indices. The semantic passes annotate nodes in place
//! and may swap any child slot for another node.

pub mod ast;
pub mod declarations;
pub mod expressions;
pub mod statements;
pub mod types;

#[cfg(test)]
mod tests;
