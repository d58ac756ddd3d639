//! External symbol importer.
//!
//! Reads precompiled-library metadata (JSON) and injects its public types
//! into the symbol table under modules named after each type's namespace.
//! Import is best-effort: anything that cannot be resolved is skipped with a
//! warning.

pub mod importer;
pub mod metadata;

#[cfg(test)]
mod tests;
