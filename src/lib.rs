#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// A source location: 1-based line number and the name of the unit it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }

    /// Builds a span covering `start` up to the end of `end`.
    pub fn merge(start: &Span, end: &Span) -> Self {
        Span {
            start: start.start.clone(),
            end: end.end.clone(),
        }
    }
}

/// Library level configuration for a program build.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Run the optimizer pipeline over the finished module.
    pub optimize: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions { optimize: true }
    }
}

/// Returns the text of the 1-based `line` of `source`, without its terminator.
pub fn get_line(source: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }

    source
        .split('\n')
        .nth((line - 1) as usize)
        .map(|text| text.trim_end_matches('\r'))
}

pub fn display_error(error: &Error, source: &str) {
    /*
        Error: UnknownFunction (Function `foo` is not declared)
        -> main.4dm:3
           |
         3 | alert(foo(1))
           | ^^^^^^^^^^^^^
    */

    let position = error.get_position();
    let line_string = position.0.to_string();
    let padding = line_string.len() + 2;

    if let ErrorTip::None = error.get_tip() {
        eprintln!("Error: {}", error.get_error_name());
    } else {
        eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    eprintln!("-> {}:{}", position.1, position.0);

    let Some(line_text) = get_line(source, position.0) else {
        return;
    };

    let (line_text_removed, _) = remove_starting_whitespace(line_text);
    let line_text_removed = line_text_removed.trim_end();

    eprintln!("{:>padding$}", "|");
    eprintln!("{} | {}", line_string, line_text_removed);
    eprintln!(
        "{:>padding$} {}",
        "|",
        "^".repeat(line_text_removed.chars().count().max(1))
    );
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += c.len_utf8();
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}
