use crate::{
    ast::ast::{
        AssignmentStmt, Block, Expr, ExpressionStmt, ForStmt, IfStmt, RepeatStmt, Stmt, WhileStmt,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Span,
};

use super::{
    expr::{parse_expr, parse_primary_expr},
    parser::Parser,
};

/// Parses statements until a block terminator (`EOF`, `else`, `end if`,
/// `end for`, `end while`, `until`), which is left in place.
pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    let start = parser.current_token().span.clone();
    let mut body = vec![];

    loop {
        parser.skip_end_lines();
        if parser.current_token_kind().is_block_terminator() {
            break;
        }

        body.push(parse_stmt(parser)?);
    }

    Ok(Block {
        body,
        span: Span::merge(&start, &parser.current_token().span),
    })
}

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let kind = parser.current_token_kind();
    if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied() {
        return handler(parser);
    }

    let expression = parse_expr(parser)?;

    let stmt = if parser.current_token_kind() == TokenKind::Affect {
        if !expression.is_var() {
            return Err(Error::new(
                ErrorImpl::InvalidAssignmentTarget,
                expression.span.start.clone(),
            ));
        }

        parser.advance();
        let value = parse_expr(parser)?;

        Stmt::Assignment(AssignmentStmt {
            span: Span::merge(&expression.span, &value.span),
            variable: expression,
            value,
        })
    } else {
        Stmt::Expression(ExpressionStmt {
            span: expression.span.clone(),
            expression,
        })
    };

    expect_statement_end(parser)?;

    Ok(stmt)
}

/// A statement ends at a line break, or right before a block terminator.
fn expect_statement_end(parser: &mut Parser) -> Result<(), Error> {
    match parser.current_token_kind() {
        TokenKind::EndLine => {
            parser.advance();
            Ok(())
        }
        kind if kind.is_block_terminator() => Ok(()),
        _ => Err(parser.unexpected("expected end of line")),
    }
}

fn expect_closing(parser: &mut Parser, kind: TokenKind, message: &str) -> Result<Token, Error> {
    let error = parser.unexpected(message);
    parser.expect_error(kind, Some(error))
}

fn parse_condition(parser: &mut Parser) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let condition = parse_expr(parser)?;
    parser.expect(TokenKind::CloseParen)?;
    Ok(condition)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.clone();

    let condition = parse_condition(parser)?;
    let then_body = parse_block(parser)?;

    let else_body = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(parse_block(parser)?)
    } else {
        None
    };

    let end = expect_closing(parser, TokenKind::EndIf, "expected `end if`")?;
    expect_statement_end(parser)?;

    Ok(Stmt::If(IfStmt {
        condition,
        then_body,
        else_body,
        span: Span::merge(&start, &end.span),
    }))
}

pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.clone();

    parser.expect(TokenKind::OpenParen)?;

    let variable = parse_primary_expr(parser)?;
    if !variable.is_var() {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: String::from("expression"),
                message: String::from("expected a loop variable"),
            },
            variable.span.start.clone(),
        ));
    }

    parser.expect(TokenKind::Semicolon)?;
    let begin = parse_expr(parser)?;
    parser.expect(TokenKind::Semicolon)?;
    let end_value = parse_expr(parser)?;

    let increment = if parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
        Some(parse_expr(parser)?)
    } else {
        None
    };

    parser.expect(TokenKind::CloseParen)?;

    let body = parse_block(parser)?;

    let end = expect_closing(parser, TokenKind::EndFor, "expected `end for`")?;
    expect_statement_end(parser)?;

    Ok(Stmt::For(ForStmt {
        variable,
        begin,
        end: end_value,
        increment,
        body,
        span: Span::merge(&start, &end.span),
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.clone();

    let condition = parse_condition(parser)?;
    let body = parse_block(parser)?;

    let end = expect_closing(parser, TokenKind::EndWhile, "expected `end while`")?;
    expect_statement_end(parser)?;

    Ok(Stmt::While(WhileStmt {
        condition,
        body,
        span: Span::merge(&start, &end.span),
    }))
}

pub fn parse_repeat_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.clone();

    let body = parse_block(parser)?;

    expect_closing(parser, TokenKind::Until, "expected `until`")?;
    let condition = parse_condition(parser)?;
    let end = condition.span.clone();
    expect_statement_end(parser)?;

    Ok(Stmt::Repeat(RepeatStmt {
        body,
        condition,
        span: Span::merge(&start, &end),
    }))
}
