//! Lexical analysis module for the compiler.
//!
//! This module contains the lexer (tokenizer) that converts source code
//! into a stream of tokens for parsing. It handles:
//!
//! - Multi-word keywords (`end if`, `end for`, `end while`)
//! - Variable sigils (`$` for locals, `<>` for persistents)
//! - Line terminators, which are significant in the grammar
//! - Comments, which are discarded

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
