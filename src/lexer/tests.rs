//! Unit tests for the lexer module.
//!
//! - Keywords, including multi-word ones
//! - Identifiers with embedded spaces
//! - Numeric and string literals
//! - Sigils and operators
//! - Comments and line terminators
//! - Error cases

use indoc::indoc;
use pretty_assertions::assert_eq;

use super::{
    lexer::{tokenize, Lexer},
    tokens::{normalize_identifier, TokenKind},
};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.4dm".to_string()))
        .unwrap()
        .iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    assert_eq!(
        kinds("if($a)"),
        vec![
            TokenKind::If,
            TokenKind::OpenParen,
            TokenKind::Dollar,
            TokenKind::Identifier,
            TokenKind::CloseParen,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_words_on_one_line_form_one_identifier() {
    let source = "else end if".to_string();
    let tokens = tokenize(source, Some("test.4dm".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "else end if");
    assert_eq!(tokens[1].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_keywords_on_separate_lines() {
    let source = "If\nELSE\nEnd If\nfor\nend   for\nwhile\nend while\nrepeat\nuntil";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::If,
            TokenKind::EndLine,
            TokenKind::Else,
            TokenKind::EndLine,
            TokenKind::EndIf,
            TokenKind::EndLine,
            TokenKind::For,
            TokenKind::EndLine,
            TokenKind::EndFor,
            TokenKind::EndLine,
            TokenKind::While,
            TokenKind::EndLine,
            TokenKind::EndWhile,
            TokenKind::EndLine,
            TokenKind::Repeat,
            TokenKind::EndLine,
            TokenKind::Until,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo Bar_1 + my variable(".to_string();
    let tokens = tokenize(source, Some("test.4dm".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo bar_1");
    assert_eq!(tokens[1].kind, TokenKind::Operator);
    assert_eq!(tokens[1].value, "+");
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
    assert_eq!(tokens[2].value, "my variable");
    assert_eq!(tokens[3].kind, TokenKind::OpenParen);
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_normalize_identifier() {
    assert_eq!(normalize_identifier("  End   IF "), "end if");
    assert_eq!(normalize_identifier("Alert"), "alert");
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 3.14 0 100.".to_string();
    let tokens = tokenize(source, Some("test.4dm".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].kind, TokenKind::Number);
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].kind, TokenKind::Number);
    assert_eq!(tokens[2].value, "0");
    assert_eq!(tokens[3].kind, TokenKind::Number);
    assert_eq!(tokens[3].value, "100.");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_number_with_leading_dot() {
    let tokens = tokenize(".5 + x.\n".to_string(), Some("test.4dm".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, ".5");
    assert_eq!(tokens[1].value, "+");
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
    assert_eq!(tokens[3].kind, TokenKind::Operator);
    assert_eq!(tokens[3].value, ".");
}

#[test]
fn test_tabs_inside_keywords() {
    assert_eq!(
        kinds("end\tif\nend \t while\n"),
        vec![
            TokenKind::EndIf,
            TokenKind::EndLine,
            TokenKind::EndWhile,
            TokenKind::EndLine,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_strings() {
    let source = r#""hello" "two words" "no \n escapes""#.to_string();
    let tokens = tokenize(source, Some("test.4dm".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].value, "two words");
    assert_eq!(tokens[2].kind, TokenKind::String);
    assert_eq!(tokens[2].value, "no \\n escapes");
    assert_eq!(tokens[3].kind, TokenKind::EOF);
}

#[test]
fn test_unterminated_string_is_fatal() {
    let source = "alert(1)\n\"never closed".to_string();
    let error = tokenize(source, Some("test.4dm".to_string())).unwrap_err();

    assert_eq!(error.get_error_name(), "UnterminatedString");
    assert_eq!(error.get_position().0, 2);
    assert!(error.is_fatal());
}

#[test]
fn test_tokenize_sigils_and_assignment() {
    let source = "$a := <>b : c".to_string();
    let tokens = tokenize(source, Some("test.4dm".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Dollar);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].value, "a");
    assert_eq!(tokens[2].kind, TokenKind::Affect);
    assert_eq!(tokens[3].kind, TokenKind::Diamond);
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[4].value, "b");
    assert_eq!(tokens[5].kind, TokenKind::Colon);
    assert_eq!(tokens[6].kind, TokenKind::Identifier);
    assert_eq!(tokens[7].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_operators() {
    let source = "< <= > >= = # != ! + - * / & | ^".to_string();
    let tokens = tokenize(source, Some("test.4dm".to_string())).unwrap();

    let values = tokens
        .iter()
        .take_while(|token| token.kind != TokenKind::EOF)
        .map(|token| {
            assert_eq!(token.kind, TokenKind::Operator);
            token.value.as_str()
        })
        .collect::<Vec<&str>>();

    assert_eq!(
        values,
        vec!["<", "<=", ">", ">=", "=", "#", "!=", "!", "+", "-", "*", "/", "&", "|", "^"]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        kinds("( ) { } ;"),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::Semicolon,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_comments_are_discarded() {
    let source = indoc! {"
        // first line
        alert(1) // trailing
        /* block
           comment */ alert(2)
    "};

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::EndLine,
            TokenKind::Identifier,
            TokenKind::OpenParen,
            TokenKind::Number,
            TokenKind::CloseParen,
            TokenKind::EndLine,
            TokenKind::Identifier,
            TokenKind::OpenParen,
            TokenKind::Number,
            TokenKind::CloseParen,
            TokenKind::EndLine,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_unterminated_block_comment_runs_to_end() {
    assert_eq!(
        kinds("alert(1) /* open"),
        vec![
            TokenKind::Identifier,
            TokenKind::OpenParen,
            TokenKind::Number,
            TokenKind::CloseParen,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_carriage_returns_are_normalized() {
    let source = "a\r\nb\rc\n".to_string();
    let tokens = tokenize(source, Some("test.4dm".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].kind, TokenKind::EndLine);
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
    assert_eq!(tokens[2].span.start.0, 2);
    assert_eq!(tokens[3].kind, TokenKind::EndLine);
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[4].span.start.0, 3);
    assert_eq!(tokens[5].kind, TokenKind::EndLine);
    assert_eq!(tokens[6].kind, TokenKind::EOF);
    assert_eq!(tokens[6].span.start.0, 4);
}

#[test]
fn test_line_numbers_across_comments_and_strings() {
    let source = "/* one\ntwo */ \"three\nfour\" five".to_string();
    let tokens = tokenize(source, Some("test.4dm".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].span.start.0, 2);
    assert_eq!(tokens[0].span.end.0, 3);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].span.start.0, 3);
}

#[test]
fn test_next_token_repeats_eof() {
    let mut lexer = Lexer::new(String::from("x"), None);

    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::EOF);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::EOF);
    assert_eq!(lexer.get_position().1.as_str(), "stdin");
}

#[test]
fn test_tokens_compare_by_kind() {
    let tokens = tokenize(String::from("foo bar + baz"), None).unwrap();

    assert!(tokens[0] == tokens[2]);
    assert!(tokens[0] != tokens[1]);
}
