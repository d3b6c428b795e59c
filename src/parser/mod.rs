//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module transforms a stream of tokens into the body of one
//! compilation unit. It is a recursive descent parser with:
//!
//! - Statement dispatch on the leading keyword (`if`, `for`, `while`, `repeat`)
//! - Assignment detected after the fact, once `:=` follows a parsed expression
//! - Right associative binary operators without precedence levels
//! - Semicolon separated call arguments
//!
//! Primary expressions and statements are dispatched through lookup tables
//! keyed by token kind.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
