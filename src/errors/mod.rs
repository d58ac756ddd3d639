//! Diagnostics produced by the compiler front end.
//!
//! This module defines the records collected while compiling:
//!
//! - Errors with source span information and a diagnostic code
//! - Warnings for best-effort steps that skipped input
//! - Fix-its suggesting a concrete replacement
//! - The append-only `Diagnostics` collector that passes write into
//!
//! Draining and presenting the collected records belongs to the caller.

pub mod errors;

#[cfg(test)]
mod tests;
