//! Type tagging and semantic analysis module.
//!
//! This module walks a parsed unit once before code generation. It:
//!
//! - Infers the `VarType` of every expression in place
//! - Coerces loop bounds to `int` and conditions to `boolean`
//! - Records every variable it meets, by storage class, in a `ScopeContext`
//! - Derives the parameter list of the unit from the positional arguments it uses
//!
//! Type problems are logged and collected but never stop compilation.

pub mod scope;
pub mod type_checker;

#[cfg(test)]
mod tests;
