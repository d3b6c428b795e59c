use lazy_static::lazy_static;
use regex::Regex;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("end if", TokenKind::EndIf);
        map.insert("for", TokenKind::For);
        map.insert("end for", TokenKind::EndFor);
        map.insert("while", TokenKind::While);
        map.insert("end while", TokenKind::EndWhile);
        map.insert("repeat", TokenKind::Repeat);
        map.insert("until", TokenKind::Until);
        map
    };
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Trims, lowercases and collapses inner whitespace of an identifier, so that
/// `End  If` and `end if` name the same keyword.
pub fn normalize_identifier(raw: &str) -> String {
    WHITESPACE_RUN
        .replace_all(raw.trim(), " ")
        .to_lowercase()
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    EndLine,
    Identifier,
    Number,
    String,

    Dollar,  // $
    Diamond, // <>

    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    Semicolon,
    Colon,

    Affect,   // :=
    Operator, // anything else

    // Reserved
    If,
    Else,
    EndIf,
    For,
    EndFor,
    While,
    EndWhile,
    Repeat,
    Until,

    Nil,
}

impl TokenKind {
    /// Kinds that close a block without being consumed by it.
    pub fn is_block_terminator(&self) -> bool {
        matches!(
            self,
            TokenKind::EOF
                | TokenKind::Else
                | TokenKind::EndIf
                | TokenKind::EndFor
                | TokenKind::EndWhile
                | TokenKind::Until
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

/// Tokens compare by kind only.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Token {}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}
