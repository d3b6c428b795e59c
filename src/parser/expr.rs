use crate::{
    ast::{
        ast::{Expr, ExprKind},
        types::{StorageClass, VarType},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::parser::Parser;

/// `expression := primary (operator expression)?`
///
/// Every operator takes the whole rest of the expression as its right
/// operand, so chains associate to the right and there are no precedence
/// levels.
pub fn parse_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let left = parse_primary_expr(parser)?;

    if parser.current_token_kind() != TokenKind::Operator {
        return Ok(left);
    }

    let operator = parser.advance().value.clone();
    let right = parse_expr(parser)?;
    let span = Span::merge(&left.span, &right.span);

    Ok(Expr::new(
        ExprKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    ))
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let kind = parser.current_token_kind();
    match parser.get_nud_lookup().get(&kind).copied() {
        Some(handler) => handler(parser),
        None => Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        )),
    }
}

fn parse_variable_name(parser: &mut Parser, storage: StorageClass) -> Result<Expr, Error> {
    let sigil = parser.advance().span.clone();

    match parser.current_token_kind() {
        // `$1` is lexed as a number
        TokenKind::Identifier | TokenKind::Number => {
            let token = parser.advance().clone();
            Ok(Expr::variable(
                token.value,
                storage,
                Span::merge(&sigil, &token.span),
            ))
        }
        _ => Err(parser.unexpected("expected a variable name")),
    }
}

pub fn parse_local_variable_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parse_variable_name(parser, StorageClass::Local)
}

pub fn parse_persistent_variable_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parse_variable_name(parser, StorageClass::Persistent)
}

/// A bare name is a global variable, unless an argument list follows it.
pub fn parse_identifier_expr(parser: &mut Parser) -> Result<Expr, Error> {
    if parser.peek_kind(1) != TokenKind::OpenParen {
        let token = parser.advance().clone();
        return Ok(Expr::variable(token.value, StorageClass::Global, token.span));
    }

    let name = parser.advance().clone();
    parser.advance();

    let mut arguments = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            arguments.push(parse_expr(parser)?);

            if parser.current_token_kind() == TokenKind::Semicolon {
                parser.advance();
            } else {
                break;
            }
        }
    }

    let close = parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::new(
        ExprKind::Call {
            name: name.value,
            arguments,
        },
        Span::merge(&name.span, &close.span),
    ))
}

pub fn parse_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance().clone();
    let var_type = match token.kind {
        TokenKind::String => VarType::String,
        _ => VarType::Number,
    };

    Ok(Expr::literal(token.value, var_type, token.span))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// A prefix operator binds to the following primary only.
pub fn parse_unary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator = parser.advance().clone();
    let operand = parse_primary_expr(parser)?;
    let span = Span::merge(&operator.span, &operand.span);

    Ok(Expr::new(
        ExprKind::Unary {
            operator: operator.value,
            operand: Box::new(operand),
        },
        span,
    ))
}
