//! Code generation module for the compiler.
//!
//! This module contains the LLVM-based code generator that lowers tagged
//! units into one module. It handles:
//!
//! - Stack slots for locals and zero initialised module slots for globals
//! - Lowering of statements into explicit basic blocks
//! - Calls to other units and to native builtins
//! - The synthesized entry point, verification and optimization
//! - JIT execution of the finished program

pub mod builtins;
pub mod compiler;
pub mod expr;
pub mod program;
pub mod stmt;

#[cfg(test)]
mod tests;
