//! Parser module for building the arena AST.
//!
//! This module contains the parser that transforms a stream of tokens
//! into nodes of an `Ast`. It uses a Pratt parser for expressions
//! with proper operator precedence and handles:
//!
//! - File headers (module declaration and imports)
//! - Type, function, init, operator, property and enum case declarations
//! - Statements (variables, control flow, blocks)
//! - Expressions (binary ops, calls with labels, member access, literals)
//! - Error recovery: a failed declaration or statement becomes an `Error`
//!   leaf and parsing resumes at the next synchronisation point
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod decl;
pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
