use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        statements::{BlockStmt, IfStmt, ReturnStmt, VarDeclStmt, WhileStmt},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    if let Some(handler) = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied()
    {
        return handler(parser);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_error(TokenKind::Semicolon, "`;` after expression")?;

    Ok(expr)
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start_token = parser.advance();
    let mutable = start_token.kind == TokenKind::Var;

    let name = parser
        .expect_error(TokenKind::Identifier, "identifier during variable declaration")?
        .value;

    let ty = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser)?)
    } else {
        None
    };

    let initializer = if parser.eat(TokenKind::Assignment) {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect_error(TokenKind::Semicolon, "`;` after variable declaration")?;

    let span = parser.span_from(&start_token.span);
    Ok(parser.alloc(
        NodeKind::VarDecl(VarDeclStmt {
            name,
            mutable,
            ty,
            initializer,
        }),
        span,
    ))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span;

    let value = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect_error(TokenKind::Semicolon, "`;` after return")?;

    let span = parser.span_from(&start);
    Ok(parser.alloc(NodeKind::Return(ReturnStmt { value }), span))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_block = parse_block_stmt(parser)?;

    let else_branch = if parser.eat(TokenKind::Else) {
        if parser.current_token_kind() == TokenKind::If {
            Some(parse_if_stmt(parser)?)
        } else {
            Some(parse_block_stmt(parser)?)
        }
    } else {
        None
    };

    let span = parser.span_from(&start);
    Ok(parser.alloc(
        NodeKind::If(IfStmt {
            condition,
            then_block,
            else_branch,
        }),
        span,
    ))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block_stmt(parser)?;

    let span = parser.span_from(&start);
    Ok(parser.alloc(NodeKind::While(WhileStmt { condition, body }), span))
}

/// Parses `{ stmt* }`, recovering from errors in individual statements.
pub fn parse_block_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect_error(TokenKind::OpenCurly, "`{`")?.span;

    let mut statements = vec![];

    while parser.current_token_kind() != TokenKind::CloseCurly && parser.has_tokens() {
        let position = parser.position();
        match parse_stmt(parser) {
            Ok(stmt) => statements.push(stmt),
            Err(error) => statements.push(parser.recover(position, error)),
        }
    }

    parser.expect_error(TokenKind::CloseCurly, "`}` to close block")?;

    let span = parser.span_from(&start);
    Ok(parser.alloc(NodeKind::Block(BlockStmt { statements }), span))
}
