//! Error types and error handling for the compiler.
//!
//! This module defines the error type shared by every phase:
//!
//! - Error structures carrying the source line and unit name
//! - Lex, parse, tagging and codegen variants
//! - Tips rendered next to the error name

pub mod errors;

#[cfg(test)]
mod tests;
