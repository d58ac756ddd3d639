//! Semantic analysis module.
//!
//! Turns parsed files into a symbol table and an annotated AST. Passes run
//! over every file before the next pass starts, so forward references and
//! references across files resolve regardless of declaration order:
//!
//! 1. Member registration: a symbol for every declaration
//! 2. Member references: parameter, return and property types
//! 3. Conformances: base classes and contracts
//! 4. Bodies: scopes, names, expressions and operators (see `type_checker`)
//! 5. Implementation: bodies, returns, mutability, initialization, contracts
//!
//! A pass never stops at the first problem. Failures are recorded as
//! diagnostics and the offending node is marked `Failed`.

pub mod context;
pub mod declarations;
pub mod implementation;
pub mod scope;
pub mod semantic;
