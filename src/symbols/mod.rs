//! Symbol model and symbol table.
//!
//! - symbols: `Symbol`, `SymbolKind` and per-kind data
//! - builtins: the `Core` module, literal types and the host-name map
//! - symbol_table: the arena of symbols with FQN, import-visibility and
//!   overload queries
//!
//! Queries return `Option` or `Result`; turning a miss into a diagnostic is
//! the caller's job.

pub mod builtins;
pub mod symbol_table;
pub mod symbols;
