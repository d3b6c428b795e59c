use std::rc::Rc;

use tracing::{debug, warn};

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, MK_SPAN, MK_TOKEN,
};

use super::tokens::{normalize_identifier, Token, TokenKind, RESERVED_LOOKUP};

/// Character-stream tokenizer with a single character of pushback.
///
/// Every token rule reads one character past its end; that character is
/// handed back through `unread` and returned again by the next `read`.
#[derive(Clone)]
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    /// Last character returned by `read`
    current: Option<char>,
    /// `current` was pushed back and must be returned again
    virtual_char: bool,
    /// Line of the next raw character
    line: u32,
    /// Line of `current`
    char_line: u32,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("stdin"))
        };

        Lexer {
            source: source.chars().collect(),
            pos: 0,
            current: None,
            virtual_char: false,
            line: 1,
            char_line: 1,
            file: file_name,
        }
    }

    pub fn get_position(&self) -> Position {
        Position(self.char_line, Rc::clone(&self.file))
    }

    /// Returns the next character, with `\r\n` and lone `\r` folded into `\n`.
    fn read(&mut self) -> Option<char> {
        if self.virtual_char {
            self.virtual_char = false;
            return self.current;
        }

        let mut next = self.source.get(self.pos).copied();
        if next.is_some() {
            self.pos += 1;
        }

        if next == Some('\r') {
            if self.source.get(self.pos) == Some(&'\n') {
                self.pos += 1;
            }
            next = Some('\n');
        }

        self.char_line = self.line;
        if next == Some('\n') {
            self.line += 1;
        }

        self.current = next;
        next
    }

    fn unread(&mut self) {
        self.virtual_char = true;
    }

    /// Whether the character after the current one is a digit, without consuming it.
    fn next_is_digit(&self) -> bool {
        !self.virtual_char && self.source.get(self.pos).is_some_and(|c| c.is_ascii_digit())
    }

    fn make_token(&self, kind: TokenKind, value: String, start_line: u32) -> Token {
        MK_TOKEN!(kind, value, MK_SPAN!(start_line, self.char_line, self.file))
    }

    /// Produces the next token, `EOF` once the input is exhausted.
    ///
    /// # Returns
    ///
    /// The token, or an `UnterminatedString` error when a string literal
    /// reaches the end of the input.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        let mut current = self.read();
        while current.is_some_and(|c| c != '\n' && c.is_whitespace()) {
            current = self.read();
        }

        let start_line = self.char_line;

        let Some(c) = current else {
            return Ok(self.make_token(TokenKind::EOF, String::from("EOF"), start_line));
        };

        if c == '\n' {
            return Ok(self.make_token(TokenKind::EndLine, String::from("\\n"), start_line));
        }

        if c.is_alphabetic() || c == '_' {
            return Ok(self.identifier(c, start_line));
        }

        if c.is_ascii_digit() || (c == '.' && self.next_is_digit()) {
            return Ok(self.number(c, start_line));
        }

        if c == '"' {
            return self.string(start_line);
        }

        self.symbol(c, start_line)
    }

    fn identifier(&mut self, first: char, start_line: u32) -> Token {
        let mut raw = String::from(first);

        while let Some(c) = self.read() {
            if c.is_alphanumeric() || c == '_' || c == ' ' || c == '\t' {
                raw.push(c);
            } else {
                self.unread();
                break;
            }
        }

        let value = normalize_identifier(&raw);

        match RESERVED_LOOKUP.get(value.as_str()) {
            Some(kind) => self.make_token(*kind, value, start_line),
            None => self.make_token(TokenKind::Identifier, value, start_line),
        }
    }

    fn number(&mut self, first: char, start_line: u32) -> Token {
        let mut value = String::from(first);
        let mut seen_dot = first == '.';

        while let Some(c) = self.read() {
            if c.is_ascii_digit() {
                value.push(c);
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                value.push(c);
            } else {
                self.unread();
                break;
            }
        }

        self.make_token(TokenKind::Number, value, start_line)
    }

    fn string(&mut self, start_line: u32) -> Result<Token, Error> {
        let mut value = String::new();

        loop {
            match self.read() {
                Some('"') => break,
                Some(c) => value.push(c),
                None => {
                    return Err(Error::new(
                        ErrorImpl::UnterminatedString,
                        Position(start_line, Rc::clone(&self.file)),
                    ))
                }
            }
        }

        Ok(self.make_token(TokenKind::String, value, start_line))
    }

    /// Reads one more character and keeps it when it equals `expected`.
    fn follows(&mut self, expected: char) -> bool {
        match self.read() {
            Some(c) if c == expected => true,
            Some(_) => {
                self.unread();
                false
            }
            None => false,
        }
    }

    fn symbol(&mut self, c: char, start_line: u32) -> Result<Token, Error> {
        let (kind, value) = match c {
            '(' => (TokenKind::OpenParen, String::from("(")),
            ')' => (TokenKind::CloseParen, String::from(")")),
            '{' => (TokenKind::OpenCurly, String::from("{")),
            '}' => (TokenKind::CloseCurly, String::from("}")),
            ';' => (TokenKind::Semicolon, String::from(";")),
            '$' => (TokenKind::Dollar, String::from("$")),
            ':' => {
                if self.follows('=') {
                    (TokenKind::Affect, String::from(":="))
                } else {
                    (TokenKind::Colon, String::from(":"))
                }
            }
            '<' => {
                if self.follows('>') {
                    (TokenKind::Diamond, String::from("<>"))
                } else if self.follows('=') {
                    (TokenKind::Operator, String::from("<="))
                } else {
                    (TokenKind::Operator, String::from("<"))
                }
            }
            '>' => {
                if self.follows('=') {
                    (TokenKind::Operator, String::from(">="))
                } else {
                    (TokenKind::Operator, String::from(">"))
                }
            }
            '!' => {
                if self.follows('=') {
                    (TokenKind::Operator, String::from("!="))
                } else {
                    (TokenKind::Operator, String::from("!"))
                }
            }
            '/' => {
                if self.follows('/') {
                    self.skip_line_comment();
                    warn!(line = start_line, "Comments not stored");
                    return self.next_token();
                } else if self.follows('*') {
                    self.skip_block_comment();
                    warn!(line = start_line, "Comments not stored");
                    return self.next_token();
                } else {
                    (TokenKind::Operator, String::from("/"))
                }
            }
            other => (TokenKind::Operator, String::from(other)),
        };

        Ok(self.make_token(kind, value, start_line))
    }

    /// Leaves the terminating newline in place so it still ends the statement.
    fn skip_line_comment(&mut self) {
        while let Some(c) = self.read() {
            if c == '\n' {
                self.unread();
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let mut previous = None;
        while let Some(c) = self.read() {
            if previous == Some('*') && c == '/' {
                return;
            }
            previous = Some(c);
        }
    }
}

/// Tokenizes a whole source text, including the trailing `EOF` token.
///
/// # Arguments
///
/// * `source` - The program text
/// * `file` - Name used in positions, `stdin` when absent
pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);
    let mut tokens = vec![];

    loop {
        let token = lex.next_token()?;
        let is_eof = token.kind == TokenKind::EOF;
        tokens.push(token);

        if is_eof {
            break;
        }
    }

    debug!(file = %lex.file, count = tokens.len(), "Tokenized");
    Ok(tokens)
}
