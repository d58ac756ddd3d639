//! Expression and operator type resolution.
//!
//! Walks callable bodies and property initializers, resolving every
//! expression to a type in the symbol table:
//!
//! - Literals map to their `Core` types
//! - Names resolve through the scope resolver
//! - Member accesses become property accesses or enum cases
//! - Calls pick an overload by strict argument matching
//! - Binary operators of mixed operand types are looked up on both operands
//!
//! A mismatched assignment has its target replaced by an `Error` node. Nodes
//! that fail are marked `Failed` and never count as resolved.

pub mod type_checker;

#[cfg(test)]
mod tests;
